//! Mapping of fetched values onto named slide shapes.
//!
//! [`render`] and [`render_image`] decide what a slot should receive;
//! [`apply`] carries the decision out through a [`SlideEditor`]. A value
//! that is absent yields no instruction at all, so the slot keeps whatever
//! the last successful run left in it.

pub mod layout;
pub mod panels;
pub mod style;

use crate::ooxml::Result;
use crate::ooxml::pptx::{Geometry, ImageFormat, SlideMut, TextStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub use layout::{ColumnLayout, write_column};
pub use style::{RECOGNITION_STYLE, style_for};

/// Which slide a slot lives on; selects the style source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideKind {
    Recognition,
    Fact,
    Weather,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageAction {
    None,
    /// Remove the picture named after the slot
    Remove,
    /// Remove the picture named after the slot, then insert this file
    Replace { path: PathBuf, geometry: Geometry },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderInstruction {
    pub slot: String,
    pub text: Option<String>,
    pub style: TextStyle,
    /// Existing paragraphs are discarded before writing
    pub clear_first: bool,
    pub image: ImageAction,
}

/// Text instruction for `slot`, or `None` when there is no value to write.
pub fn render(slot: &str, value: Option<&str>, kind: SlideKind) -> Option<RenderInstruction> {
    let text = value?;
    let style = match kind {
        SlideKind::Recognition => RECOGNITION_STYLE,
        SlideKind::Fact | SlideKind::Weather => style_for(slot),
    };

    Some(RenderInstruction {
        slot: slot.to_string(),
        text: Some(text.to_string()),
        style,
        clear_first: true,
        image: ImageAction::None,
    })
}

/// Picture instruction for `slot`: always drop the old picture, insert the
/// new one when there is a file for it.
pub fn render_image(slot: &str, image: Option<&Path>, geometry: Geometry) -> RenderInstruction {
    let image = match image {
        Some(path) => ImageAction::Replace {
            path: path.to_path_buf(),
            geometry,
        },
        None => ImageAction::Remove,
    };

    RenderInstruction {
        slot: slot.to_string(),
        text: None,
        style: style_for(slot),
        clear_first: true,
        image,
    }
}

/// The slide operations the mapper needs.
pub trait SlideEditor {
    fn shape_names(&self) -> Result<Vec<String>>;

    /// Replace the text body of the shapes named `name`; `false` if none has one.
    fn set_text(&mut self, name: &str, text: &str, style: &TextStyle) -> Result<bool>;

    fn remove_shapes(&mut self, name: &str) -> Result<usize>;

    fn remove_shapes_with_prefix(&mut self, prefix: &str) -> Result<usize>;

    fn set_hidden(&mut self, name: &str, hidden: bool) -> Result<bool>;

    fn add_text_box(
        &mut self,
        name: &str,
        text: &str,
        style: &TextStyle,
        geometry: Geometry,
    ) -> Result<()>;

    fn add_picture(&mut self, name: &str, image: &[u8], geometry: Geometry) -> Result<()>;
}

impl SlideEditor for SlideMut<'_> {
    fn shape_names(&self) -> Result<Vec<String>> {
        SlideMut::shape_names(self)
    }

    fn set_text(&mut self, name: &str, text: &str, style: &TextStyle) -> Result<bool> {
        SlideMut::set_text(self, name, text, style)
    }

    fn remove_shapes(&mut self, name: &str) -> Result<usize> {
        SlideMut::remove_shapes(self, name)
    }

    fn remove_shapes_with_prefix(&mut self, prefix: &str) -> Result<usize> {
        SlideMut::remove_shapes_with_prefix(self, prefix)
    }

    fn set_hidden(&mut self, name: &str, hidden: bool) -> Result<bool> {
        SlideMut::set_hidden(self, name, hidden)
    }

    fn add_text_box(
        &mut self,
        name: &str,
        text: &str,
        style: &TextStyle,
        geometry: Geometry,
    ) -> Result<()> {
        SlideMut::add_text_box(self, name, text, style, geometry)
    }

    fn add_picture(&mut self, name: &str, image: &[u8], geometry: Geometry) -> Result<()> {
        SlideMut::add_picture(self, name, image, geometry)
    }
}

/// Carry out one instruction.
///
/// A missing slot is reported with a warning and `false`, never an error.
/// An unreadable or unrecognised picture file leaves the slot empty.
pub fn apply<E: SlideEditor + ?Sized>(editor: &mut E, instruction: &RenderInstruction) -> Result<bool> {
    let slot = instruction.slot.as_str();
    let mut applied = true;

    if let Some(text) = &instruction.text {
        if !editor.set_text(slot, text, &instruction.style)? {
            warn!(slot, "no shape with a text body under this name");
            applied = false;
        }
    }

    match &instruction.image {
        ImageAction::None => {},
        ImageAction::Remove => {
            let removed = editor.remove_shapes(slot)?;
            debug!(slot, removed, "removed picture");
        },
        ImageAction::Replace { path, geometry } => {
            editor.remove_shapes(slot)?;
            applied &= insert_picture(editor, slot, path, *geometry)?;
        },
    }

    Ok(applied)
}

fn insert_picture<E: SlideEditor + ?Sized>(
    editor: &mut E,
    slot: &str,
    path: &Path,
    geometry: Geometry,
) -> Result<bool> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            warn!(slot, path = %path.display(), error = %e, "cannot read picture");
            return Ok(false);
        },
    };
    if ImageFormat::detect_from_bytes(&data).is_none() {
        warn!(slot, path = %path.display(), "not a supported image");
        return Ok(false);
    }

    editor.add_picture(slot, &data, geometry)?;
    Ok(true)
}


#[cfg(test)]
mod tests {
    use super::fake::{FakeShape, FakeSlide};
    use super::*;
    use crate::common::RGBColor;
    use std::io::Write;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn icon_geometry() -> Geometry {
        Geometry::from_inches(5.70, 3.29, 1.93, 2.00)
    }

    #[test]
    fn test_render_absent_value_is_untouched() {
        assert_eq!(render("TemperatureBox", None, SlideKind::Weather), None);
    }

    #[test]
    fn test_render_uses_table_style() {
        let instruction = render("TemperatureBox", Some("72 F"), SlideKind::Weather).unwrap();
        assert_eq!(instruction.text.as_deref(), Some("72 F"));
        assert!(instruction.clear_first);
        assert_eq!(instruction.image, ImageAction::None);
        assert_eq!(instruction.style.size_pt, 72.0);

        let instruction = render("SomethingElse", Some(""), SlideKind::Fact).unwrap();
        assert_eq!(instruction.text.as_deref(), Some(""));
        assert_eq!(instruction.style, style::DEFAULT_STYLE);

        let instruction = render("BirthdayBox1", Some("x"), SlideKind::Recognition).unwrap();
        assert_eq!(instruction.style, RECOGNITION_STYLE);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut slide = FakeSlide::with(vec![FakeShape::text_box("WindBox", "stale")]);
        let instruction = render("WindBox", Some("NW at 5 MPH"), SlideKind::Weather).unwrap();

        assert!(apply(&mut slide, &instruction).unwrap());
        let once = slide.clone();
        assert!(apply(&mut slide, &instruction).unwrap());
        assert_eq!(slide, once);

        let wind = slide.get("WindBox").unwrap();
        assert_eq!(wind.text.as_deref(), Some("NW at 5 MPH"));
        assert_eq!(wind.style.unwrap().color, RGBColor::WHITE);
    }

    #[test]
    fn test_apply_to_missing_slot_is_a_no_op() {
        let mut slide = FakeSlide::with(vec![FakeShape::text_box("WindBox", "stale")]);
        let before = slide.clone();
        let instruction = render("HumidityBox", Some("40%"), SlideKind::Weather).unwrap();

        assert!(!apply(&mut slide, &instruction).unwrap());
        assert_eq!(slide, before);
    }

    #[test]
    fn test_image_without_file_only_removes() {
        let mut slide = FakeSlide::with(vec![
            FakeShape::picture("FactImage"),
            FakeShape::picture("FactImage"),
        ]);
        let instruction = render_image("FactImage", None, icon_geometry());
        assert_eq!(instruction.image, ImageAction::Remove);

        assert!(apply(&mut slide, &instruction).unwrap());
        assert_eq!(slide.count("FactImage"), 0);
    }

    #[test]
    fn test_image_replace_never_duplicates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PNG).unwrap();

        let mut slide = FakeSlide::with(vec![FakeShape::picture("CurrentWeatherImage")]);
        let instruction = render_image("CurrentWeatherImage", Some(file.path()), icon_geometry());
        for _ in 0..3 {
            assert!(apply(&mut slide, &instruction).unwrap());
        }

        assert_eq!(slide.count("CurrentWeatherImage"), 1);
        let shape = slide.get("CurrentWeatherImage").unwrap();
        assert_eq!(shape.picture.as_ref().unwrap().0, PNG);
        assert_eq!(shape.geometry, Some(icon_geometry()));
    }

    #[test]
    fn test_unreadable_picture_leaves_slot_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("sun.png");
        let garbage = dir.path().join("garbage.png");
        std::fs::write(&garbage, b"<html>not found</html>").unwrap();

        for path in [missing, garbage] {
            let mut slide = FakeSlide::with(vec![FakeShape::picture("CurrentWeatherImage")]);
            let instruction = render_image("CurrentWeatherImage", Some(&path), icon_geometry());
            assert!(!apply(&mut slide, &instruction).unwrap());
            assert_eq!(slide.count("CurrentWeatherImage"), 0);
        }
    }
}
