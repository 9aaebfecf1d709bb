//! Dirty-region accumulation.
//!
//! Every cell mutation is unioned into one pending rectangle so that many
//! small writes coalesce into a single repaint notification.

use serde::{Deserialize, Serialize};

/// Bounding box of cells touched since the last flush, in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirtyRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl DirtyRect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        DirtyRect {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle covering a single cell.
    pub fn cell(x: usize, y: usize) -> Self {
        DirtyRect::new(x, y, 1, 1)
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &DirtyRect) -> DirtyRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        DirtyRect::new(x, y, right - x, bottom - y)
    }

    /// Union a single cell into this rectangle.
    pub fn add_cell(&mut self, x: usize, y: usize) {
        *self = self.union(&DirtyRect::cell(x, y));
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union() {
        let a = DirtyRect::cell(2, 3);
        let b = DirtyRect::cell(5, 1);
        let u = a.union(&b);
        assert_eq!(u, DirtyRect::new(2, 1, 4, 3));
        assert!(u.contains(2, 3));
        assert!(u.contains(5, 1));
    }

    #[test]
    fn test_add_cell_is_bounding_box() {
        let mut rect = DirtyRect::cell(4, 4);
        rect.add_cell(4, 4);
        assert_eq!(rect, DirtyRect::cell(4, 4));
        rect.add_cell(0, 9);
        assert_eq!(rect, DirtyRect::new(0, 4, 5, 6));
    }
}
