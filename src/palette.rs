//! Annotation colors.

use image::Rgb;
use serde::{Serialize, Serializer};

/// A palette entry; the name doubles as the color tag handed to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedColor {
    pub name: &'static str,
    pub rgb: Rgb<u8>,
}

impl NamedColor {
    const fn new(name: &'static str, r: u8, g: u8, b: u8) -> Self {
        Self { name, rgb: Rgb([r, g, b]) }
    }
}

impl Serialize for NamedColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

pub const ANNOTATE_COLORS: [NamedColor; 10] = [
    NamedColor::new("red", 255, 0, 0),
    NamedColor::new("blue", 0, 0, 255),
    NamedColor::new("green", 0, 128, 0),
    NamedColor::new("purple", 128, 0, 128),
    NamedColor::new("orange", 255, 165, 0),
    NamedColor::new("magenta", 255, 0, 255),
    NamedColor::new("cyan", 0, 255, 255),
    NamedColor::new("lime", 0, 255, 0),
    NamedColor::new("brown", 165, 42, 42),
    NamedColor::new("gold", 255, 215, 0),
];

/// Word boxes are never palette-cycled.
pub const TEXT_BOX_COLOR: NamedColor = NamedColor::new("green", 0, 128, 0);

/// Color for the region at `position` within the selection.
pub fn color_for_position(position: usize) -> NamedColor {
    ANNOTATE_COLORS[position % ANNOTATE_COLORS.len()]
}
