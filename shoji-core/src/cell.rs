//! A single character position in the grid.

use std::sync::Arc;

use crate::attrs::TextAttributes;

/// One character plus the attributes it is drawn with.
///
/// Attributes are shared by reference; cloning a cell clones the `Arc`,
/// not the attribute value.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub attrs: Arc<TextAttributes>,
}

impl Cell {
    pub fn new(ch: char, attrs: Arc<TextAttributes>) -> Self {
        Cell { ch, attrs }
    }

    /// A blank (space) cell with the given attributes.
    pub fn blank(attrs: Arc<TextAttributes>) -> Self {
        Cell { ch: ' ', attrs }
    }

    pub fn is_blank(&self) -> bool {
        self.ch == ' '
    }

    /// Display width of this cell's character. Wide characters (CJK, some
    /// emoji) report 2; control characters report 1 so the grid never
    /// collapses a column.
    pub fn width(&self) -> usize {
        use unicode_width::UnicodeWidthChar;
        self.ch.width().unwrap_or(1).max(1)
    }

    /// Overwrite in place, keeping the allocation of the shared attributes
    /// when they match.
    pub fn set(&mut self, ch: char, attrs: &Arc<TextAttributes>) {
        self.ch = ch;
        if !Arc::ptr_eq(&self.attrs, attrs) {
            self.attrs = Arc::clone(attrs);
        }
    }
}
