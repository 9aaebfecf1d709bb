//! Text attributes applied to grid cells.
//!
//! A `TextAttributes` value is immutable and compared by value; the same
//! `Arc<TextAttributes>` is shared by every cell drawn with it, so a full
//! screen of uniform text costs one allocation, not one per cell.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::{ansi_color, Rgb};

/// Foreground and background colors for a run of cells.
///
/// Never mutated after construction; build a new value to change colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextAttributes {
    foreground: Rgb,
    background: Rgb,
}

impl TextAttributes {
    pub const fn new(foreground: Rgb, background: Rgb) -> Self {
        TextAttributes {
            foreground,
            background,
        }
    }

    /// The stock console attributes: dark white on black.
    pub fn default_console() -> Self {
        TextAttributes::new(ansi_color(7, false), ansi_color(0, false))
    }

    /// Convenience for the common shared form.
    pub fn shared(foreground: Rgb, background: Rgb) -> Arc<Self> {
        Arc::new(TextAttributes::new(foreground, background))
    }

    pub fn foreground(&self) -> Rgb {
        self.foreground
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    /// Same background, new foreground.
    pub fn with_foreground(&self, foreground: Rgb) -> Self {
        TextAttributes::new(foreground, self.background)
    }

    /// Same foreground, new background.
    pub fn with_background(&self, background: Rgb) -> Self {
        TextAttributes::new(self.foreground, background)
    }
}

impl Default for TextAttributes {
    fn default() -> Self {
        TextAttributes::default_console()
    }
}
