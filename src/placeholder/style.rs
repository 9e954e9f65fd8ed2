//! Run styles for the signage slots.

use crate::common::RGBColor;
use crate::ooxml::pptx::TextStyle;

/// Font of every panel slot
pub const PANEL_FONT: &str = "Arial Rounded MT Bold";

/// Style of slots missing from [`SLOT_STYLES`]
pub const DEFAULT_STYLE: TextStyle = panel(20.0, false, RGBColor::WHITE);

/// Style of the generated birthday and anniversary boxes
pub const RECOGNITION_STYLE: TextStyle = TextStyle {
    font_name: "Calibri",
    size_pt: 24.0,
    bold: false,
    italic: false,
    color: RGBColor::BLACK,
};

const fn panel(size_pt: f64, bold: bool, color: RGBColor) -> TextStyle {
    TextStyle {
        font_name: PANEL_FONT,
        size_pt,
        bold,
        italic: false,
        color,
    }
}

pub const SLOT_STYLES: [(&str, TextStyle); 6] = [
    ("TemperatureBox", panel(72.0, true, RGBColor::WHITE)),
    ("HumidityBox", panel(36.0, true, RGBColor::WHITE)),
    ("WindBox", panel(20.0, false, RGBColor::WHITE)),
    ("WeatherBox", panel(24.0, false, RGBColor::WHITE)),
    ("DateBox", panel(36.0, false, RGBColor::BLACK)),
    ("FactBox", panel(20.0, false, RGBColor::BLACK)),
];

/// Style for a slot name, [`DEFAULT_STYLE`] when the name is not listed.
pub fn style_for(slot: &str) -> TextStyle {
    SLOT_STYLES
        .iter()
        .find(|(name, _)| *name == slot)
        .map(|(_, style)| *style)
        .unwrap_or(DEFAULT_STYLE)
}
