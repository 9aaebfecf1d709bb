//! Cursor position and appearance.

use serde::{Deserialize, Serialize};

/// How the cursor is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorKind {
    /// Thin bar, shown while accepting input.
    Insert,
    /// Full-cell block.
    Overstrike,
    /// Not drawn at all.
    Invisible,
}

impl Default for CursorKind {
    fn default() -> Self {
        CursorKind::Invisible
    }
}

/// Cursor position in grid coordinates (column, row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    pub col: usize,
    pub row: usize,
}

impl Cursor {
    pub fn new(col: usize, row: usize) -> Self {
        Cursor { col, row }
    }

    /// Force the position inside a `columns` x `rows` area.
    pub fn clamp(&mut self, columns: usize, rows: usize) {
        self.col = self.col.min(columns.saturating_sub(1));
        self.row = self.row.min(rows.saturating_sub(1));
    }

    /// True if the position addresses a cell of a `columns` x `rows` area.
    pub fn in_bounds(&self, columns: usize, rows: usize) -> bool {
        self.col < columns && self.row < rows
    }
}
