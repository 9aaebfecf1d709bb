//! One row of the character grid.

use std::sync::Arc;

use crate::attrs::TextAttributes;
use crate::cell::Cell;

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    /// A blank row of `columns` cells sharing `attrs`.
    pub fn blank(columns: usize, attrs: &Arc<TextAttributes>) -> Self {
        Row {
            cells: vec![Cell::blank(Arc::clone(attrs)); columns],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    pub fn get_mut(&mut self, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(col)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Reset every cell to a blank with `attrs`, keeping the allocation.
    pub fn fill_blank(&mut self, attrs: &Arc<TextAttributes>) {
        for cell in &mut self.cells {
            cell.set(' ', attrs);
        }
    }

    /// Grow or shrink to `columns`, blank-padding new cells.
    pub fn resize(&mut self, columns: usize, attrs: &Arc<TextAttributes>) {
        if columns > self.cells.len() {
            self.cells.resize(columns, Cell::blank(Arc::clone(attrs)));
        } else {
            self.cells.truncate(columns);
        }
    }

    /// The row's characters as a string, for snapshots and tests.
    pub fn text(&self) -> String {
        self.cells.iter().map(|c| c.ch).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> Arc<TextAttributes> {
        Arc::new(TextAttributes::default_console())
    }

    #[test]
    fn test_blank_row() {
        let row = Row::blank(10, &attrs());
        assert_eq!(row.len(), 10);
        assert!(row.cells().iter().all(Cell::is_blank));
    }

    #[test]
    fn test_resize_preserves_prefix() {
        let attrs = attrs();
        let mut row = Row::blank(4, &attrs);
        row.get_mut(2).unwrap().set('x', &attrs);

        row.resize(8, &attrs);
        assert_eq!(row.len(), 8);
        assert_eq!(row.get(2).unwrap().ch, 'x');
        assert!(row.get(7).unwrap().is_blank());

        row.resize(2, &attrs);
        assert_eq!(row.text(), "  ");
    }

    #[test]
    fn test_fill_blank_reuses_allocation() {
        let attrs = attrs();
        let mut row = Row::blank(4, &attrs);
        row.get_mut(0).unwrap().set('a', &attrs);
        let ptr = row.cells().as_ptr();
        row.fill_blank(&attrs);
        assert_eq!(row.cells().as_ptr(), ptr);
        assert_eq!(row.text(), "    ");
    }
}
