//! The 16-entry ANSI color table.
//!
//! Eight "dark" tones indexed 0-7 plus eight "bright" tones indexed 8-15.
//! These are the only colors the console deals in; palette selection beyond
//! them belongs to the renderer.

use serde::{Deserialize, Serialize};

/// 24-bit RGB color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

/// Channel level used for the dark half of the table.
pub const DARK_LEVEL: u8 = 180;

/// Channel level used for the bright half of the table.
pub const BRIGHT_LEVEL: u8 = 255;

/// The standard 16-color table: dark tones first, bright tones second.
/// Bright black is a mid grey rather than pure black so it stays visible
/// against the default background.
pub const ANSI_COLORS: [Rgb; 16] = [
    Rgb::new(0, 0, 0),
    Rgb::new(DARK_LEVEL, 0, 0),
    Rgb::new(0, DARK_LEVEL, 0),
    Rgb::new(DARK_LEVEL, DARK_LEVEL, 0),
    Rgb::new(0, 0, DARK_LEVEL),
    Rgb::new(DARK_LEVEL, 0, DARK_LEVEL),
    Rgb::new(0, DARK_LEVEL, DARK_LEVEL),
    Rgb::new(DARK_LEVEL, DARK_LEVEL, DARK_LEVEL),
    Rgb::new(96, 96, 96),
    Rgb::new(BRIGHT_LEVEL, 0, 0),
    Rgb::new(0, BRIGHT_LEVEL, 0),
    Rgb::new(BRIGHT_LEVEL, BRIGHT_LEVEL, 0),
    Rgb::new(0, 0, BRIGHT_LEVEL),
    Rgb::new(BRIGHT_LEVEL, 0, BRIGHT_LEVEL),
    Rgb::new(0, BRIGHT_LEVEL, BRIGHT_LEVEL),
    Rgb::new(BRIGHT_LEVEL, BRIGHT_LEVEL, BRIGHT_LEVEL),
];

/// Look up a color by its 0-7 index, selecting the bright variant when
/// `bright` is set.
pub fn ansi_color(index: usize, bright: bool) -> Rgb {
    ANSI_COLORS[(index & 7) + if bright { 8 } else { 0 }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_halves() {
        assert_eq!(ansi_color(0, false), Rgb::new(0, 0, 0));
        assert_eq!(ansi_color(7, false), Rgb::new(180, 180, 180));
        assert_eq!(ansi_color(0, true), Rgb::new(96, 96, 96));
        assert_eq!(ansi_color(7, true), Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_index_masked() {
        // Out-of-range indices wrap into the 8-entry half.
        assert_eq!(ansi_color(9, false), ansi_color(1, false));
    }
}
