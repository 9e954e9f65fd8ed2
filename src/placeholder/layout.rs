//! Stacked recognition boxes.

use super::{RECOGNITION_STYLE, SlideEditor};
use crate::ooxml::Result;
use crate::ooxml::pptx::Geometry;
use serde::Deserialize;
use tracing::debug;

/// A vertical stack of equally sized boxes, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ColumnLayout {
    pub left: f64,
    pub top: f64,
    pub spacing: f64,
    pub width: f64,
    pub height: f64,
}

impl ColumnLayout {
    pub const BIRTHDAYS: ColumnLayout = ColumnLayout {
        left: 0.0,
        top: 2.01,
        spacing: 0.85,
        width: 6.67,
        height: 1.04,
    };

    pub const ANNIVERSARIES: ColumnLayout = ColumnLayout {
        left: 6.67,
        ..Self::BIRTHDAYS
    };

    /// Geometry of the `row`-th box (0-based).
    pub fn row(&self, row: usize) -> Geometry {
        Geometry::from_inches(
            self.left,
            self.top + self.spacing * row as f64,
            self.width,
            self.height,
        )
    }
}

/// Replace the boxes named `{prefix}N` with one box per message.
///
/// Every existing shape whose name starts with `prefix` is removed first,
/// whatever the previous count was; the new boxes are `{prefix}1`,
/// `{prefix}2`, ... in message order.
pub fn write_column<E, S>(
    editor: &mut E,
    prefix: &str,
    messages: &[S],
    layout: &ColumnLayout,
) -> Result<usize>
where
    E: SlideEditor + ?Sized,
    S: AsRef<str>,
{
    let removed = editor.remove_shapes_with_prefix(prefix)?;
    debug!(prefix, removed, added = messages.len(), "rewrite recognition column");

    for (i, message) in messages.iter().enumerate() {
        let name = format!("{}{}", prefix, i + 1);
        editor.add_text_box(&name, message.as_ref(), &RECOGNITION_STYLE, layout.row(i))?;
    }

    Ok(messages.len())
}
