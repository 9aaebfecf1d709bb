//! The character grid with scrollback.
//!
//! `ScreenBuffer` remembers up to `scrollback` rows in total; the visible
//! window is the last `visible_rows` of them. Public cursor coordinates are
//! window-relative, mapped onto absolute grid rows internally so the cursor
//! rides the bottom of the grid as it scrolls.
//!
//! All mutation is single-threaded here; concurrent callers go through
//! [`crate::sink::SharedScreen`], which owns the one exclusive lock covering
//! grid, cursor, and dirty state.

use std::sync::Arc;

use crate::attrs::TextAttributes;
use crate::cell::Cell;
use crate::cursor::{Cursor, CursorKind};
use crate::dirty::DirtyRect;
use crate::row::Row;
use crate::sink::Renderer;
use crate::snapshot::Snapshot;

/// Callback invoked after the grid geometry changes, with the new
/// (columns, visible rows).
pub type ResizeListener = Box<dyn FnMut(usize, usize) + Send>;

pub struct ScreenBuffer {
    /// Remembered rows, oldest first. Never shorter than `visible_rows`,
    /// never longer than `scrollback`.
    rows: Vec<Row>,
    columns: usize,
    visible_rows: usize,
    /// Maximum number of rows ever remembered.
    scrollback: usize,

    /// Cursor in absolute grid coordinates.
    cursor: Cursor,
    cursor_kind: CursorKind,

    /// Attributes applied by advancing writes.
    attrs: Arc<TextAttributes>,
    /// Attributes used for blank fill.
    default_attrs: Arc<TextAttributes>,

    /// Pending repaint region in absolute grid coordinates.
    dirty: Option<DirtyRect>,

    renderer: Option<Box<dyn Renderer>>,
    resize_listeners: Vec<ResizeListener>,
}

impl ScreenBuffer {
    /// A blank buffer of `columns` x `rows` with capacity for `scrollback`
    /// remembered rows. The capacity is raised to at least `rows`.
    pub fn new(columns: usize, rows: usize, scrollback: usize) -> Self {
        let default_attrs = Arc::new(TextAttributes::default_console());
        let grid = (0..rows).map(|_| Row::blank(columns, &default_attrs)).collect();
        ScreenBuffer {
            rows: grid,
            columns,
            visible_rows: rows,
            scrollback: scrollback.max(rows),
            cursor: Cursor::default(),
            cursor_kind: CursorKind::Invisible,
            attrs: Arc::clone(&default_attrs),
            default_attrs,
            dirty: None,
            renderer: None,
            resize_listeners: Vec::new(),
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Rows shown at one time.
    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// Rows currently remembered, including scrollback.
    pub fn remembered_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn scrollback(&self) -> usize {
        self.scrollback
    }

    /// Absolute index of the first visible row.
    fn origin(&self) -> usize {
        self.rows.len() - self.visible_rows
    }

    /// Cursor position in window coordinates.
    pub fn cursor(&self) -> (usize, usize) {
        let row = self.cursor.row.saturating_sub(self.origin());
        (self.cursor.col, row)
    }

    /// Move the cursor, window coordinates, clamped into the grid.
    pub fn set_cursor(&mut self, col: usize, row: usize) {
        let (old_col, old_row) = (self.cursor.col, self.cursor.row);
        self.cursor = Cursor::new(col, row + self.origin());
        self.cursor.clamp(self.columns, self.rows.len());
        self.mark_dirty_cell(old_col, old_row);
        self.mark_dirty_cell(self.cursor.col, self.cursor.row);
        self.notify_cursor();
    }

    pub fn cursor_kind(&self) -> CursorKind {
        self.cursor_kind
    }

    pub fn set_cursor_kind(&mut self, kind: CursorKind) {
        self.cursor_kind = kind;
        self.mark_dirty_cell(self.cursor.col, self.cursor.row);
        self.notify_cursor();
    }

    /// Attributes applied by subsequent advancing writes.
    pub fn attributes(&self) -> Arc<TextAttributes> {
        Arc::clone(&self.attrs)
    }

    pub fn set_attributes(&mut self, attrs: Arc<TextAttributes>) {
        self.attrs = attrs;
    }

    pub fn default_attributes(&self) -> Arc<TextAttributes> {
        Arc::clone(&self.default_attrs)
    }

    /// Attach the renderer that receives draw and repaint instructions.
    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderer = Some(renderer);
    }

    /// Register a callback fired whenever the grid geometry changes.
    pub fn on_resize(&mut self, listener: ResizeListener) {
        self.resize_listeners.push(listener);
    }

    /// Cell at window coordinates, if in range.
    pub fn cell_at(&self, col: usize, row: usize) -> Option<&Cell> {
        self.rows.get(self.origin() + row).and_then(|r| r.get(col))
    }

    /// Text of the visible window, one string per row.
    pub fn visible_text(&self) -> Vec<String> {
        self.rows[self.origin()..].iter().map(Row::text).collect()
    }

    /// Text of an absolute grid row (index 0 is the oldest remembered row).
    pub fn row_text(&self, row: usize) -> Option<String> {
        self.rows.get(row).map(Row::text)
    }

    pub fn snapshot(&self) -> Snapshot {
        let (col, row) = self.cursor();
        Snapshot {
            columns: self.columns,
            rows: self.visible_rows,
            cursor: Cursor::new(col, row),
            lines: self.rows.iter().map(Row::text).collect(),
        }
    }

    // ------------------------------------------------------------------
    // Writing

    /// Write with the current attributes, advancing the cursor.
    pub fn write(&mut self, ch: char) {
        let attrs = Arc::clone(&self.attrs);
        self.output_raw(ch, &attrs, false);
    }

    /// Write with explicit attributes, advancing the cursor.
    pub fn write_with(&mut self, ch: char, attrs: &Arc<TextAttributes>) {
        self.output_raw(ch, attrs, false);
    }

    pub fn write_str(&mut self, s: &str) {
        let attrs = Arc::clone(&self.attrs);
        for ch in s.chars() {
            self.output_raw(ch, &attrs, false);
        }
    }

    pub fn write_str_with(&mut self, s: &str, attrs: &Arc<TextAttributes>) {
        for ch in s.chars() {
            self.output_raw(ch, attrs, false);
        }
    }

    /// Single-keystroke echo path: bypasses repaint coalescing and posts its
    /// own notification. Never use it for bulk output.
    pub fn write_immediate(&mut self, ch: char, attrs: &Arc<TextAttributes>) {
        self.output_raw(ch, attrs, true);
    }

    /// Positional write, window coordinates. Does not move the cursor and
    /// never scrolls; out-of-range positions are ignored.
    pub fn write_at(&mut self, col: usize, row: usize, ch: char) {
        let attrs = Arc::clone(&self.attrs);
        self.write_at_with(col, row, ch, &attrs);
    }

    pub fn write_at_with(&mut self, col: usize, row: usize, ch: char, attrs: &Arc<TextAttributes>) {
        let abs = self.origin() + row;
        match self.rows.get_mut(abs).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                cell.set(ch, attrs);
                self.mark_dirty_cell(col, abs);
            }
            None => log::debug!("positional write outside grid: ({col}, {row})"),
        }
    }

    fn output_raw(&mut self, ch: char, attrs: &Arc<TextAttributes>, immediate: bool) {
        match ch {
            '\t' => {
                for _ in 0..4 {
                    self.output_raw(' ', attrs, false);
                }
            }
            '\r' => {}
            '\n' => self.advance('\n'),
            _ => {
                // A cursor left out of range by a concurrent resize is
                // clamped back in and the write retried once.
                for attempt in 0..2 {
                    let Cursor { col, row } = self.cursor;
                    let in_range = self
                        .rows
                        .get_mut(row)
                        .and_then(|r| r.get_mut(col))
                        .map(|cell| cell.set(ch, attrs))
                        .is_some();
                    if in_range {
                        self.mark_dirty_cell(col, row);
                        self.advance(ch);
                        if immediate {
                            let cursor = self.cursor;
                            let origin = self.origin();
                            if let Some(renderer) = self.renderer.as_mut() {
                                renderer.draw_cell(col, row.saturating_sub(origin), ch, attrs);
                                renderer.request_repaint(
                                    DirtyRect::cell(col, row)
                                        .union(&DirtyRect::cell(cursor.col, cursor.row)),
                                );
                            }
                        }
                        return;
                    }
                    if attempt == 0 {
                        log::debug!("cursor out of range at ({col}, {row}), clamping");
                    }
                    let rows = self.rows.len();
                    self.cursor.clamp(self.columns, rows);
                }
            }
        }
    }

    /// Move the cursor appropriately for having just output `ch`.
    fn advance(&mut self, ch: char) {
        match ch {
            '\n' => {
                self.cursor.col = 0;
                self.cursor.row += 1;
                if self.cursor.row >= self.rows.len() {
                    self.scroll_by_one_row();
                }
            }
            '\r' => {}
            _ => {
                self.cursor.col += 1;
                if self.cursor.col >= self.columns {
                    self.cursor.col = 0;
                    self.cursor.row += 1;
                    if self.cursor.row >= self.rows.len() {
                        self.scroll_by_one_row();
                    }
                }
            }
        }
        self.mark_dirty_cell(self.cursor.col, self.cursor.row);
        self.notify_cursor();
    }

    // ------------------------------------------------------------------
    // Geometry

    /// Change the visible size. Remembered rows only ever grow here; the
    /// scrollback capacity is raised if the new window would exceed it.
    pub fn resize(&mut self, columns: usize, rows: usize) {
        self.scrollback = self.scrollback.max(rows);
        let remembered = self.rows.len().max(rows);
        self.set_grid_size(columns, remembered, rows);
    }

    fn set_grid_size(&mut self, columns: usize, remembered: usize, visible: usize) {
        // Keep the cursor on a surviving row before anything is dropped.
        while self.cursor.row >= remembered {
            self.evict_oldest_row();
        }

        if columns == self.columns {
            // Column count unchanged: rows are kept as-is, only the row
            // count is padded or truncated.
            while self.rows.len() < remembered {
                self.rows.push(Row::blank(columns, &self.default_attrs));
            }
            self.rows.truncate(remembered);
        } else {
            // Column count changed: every retained row is copied up to the
            // smaller width and blank-padded beyond it.
            for row in &mut self.rows {
                row.resize(columns, &self.default_attrs);
            }
            while self.rows.len() < remembered {
                self.rows.push(Row::blank(columns, &self.default_attrs));
            }
            self.rows.truncate(remembered);
        }

        self.columns = columns;
        self.visible_rows = visible.min(self.rows.len());
        self.cursor.clamp(self.columns, self.rows.len());
        self.mark_all_dirty();
        self.fire_resized();
    }

    /// Insert a blank row at absolute index `at`.
    ///
    /// Below capacity the grid grows by one and rows from `at` shift down.
    /// At capacity the oldest row's storage is recycled: rows `[1..=at]`
    /// shift up, the old first row is blanked and re-inserted at `at`.
    pub fn insert_row(&mut self, at: usize) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let at = at.min(len - 1);
        if len < self.scrollback {
            // Inserting at the last row means appending below it.
            let at = if at == len - 1 { at + 1 } else { at };
            self.rows
                .insert(at, Row::blank(self.columns, &self.default_attrs));
            self.fire_resized();
        } else {
            let mut spare = self.rows.remove(0);
            spare.fill_blank(&self.default_attrs);
            let at = at.min(self.rows.len());
            self.rows.insert(at, spare);
        }
        self.mark_all_dirty();
    }

    /// Scroll one row: grows the grid while below capacity, otherwise
    /// recycles the oldest row and pulls the cursor up with the content.
    fn scroll_by_one_row(&mut self) {
        let old_len = self.rows.len();
        self.insert_row(old_len - 1);
        if self.rows.len() == old_len {
            self.cursor.row = self.cursor.row.saturating_sub(1);
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.scroll_notify();
        }
    }

    /// Drop the oldest row, shifting everything up one. Used to keep the
    /// cursor valid when the grid must shrink.
    fn evict_oldest_row(&mut self) {
        if self.rows.len() > 1 {
            let mut spare = self.rows.remove(0);
            spare.fill_blank(&self.default_attrs);
            self.rows.push(spare);
        }
        self.cursor.row = self.cursor.row.saturating_sub(1);
    }

    fn fire_resized(&mut self) {
        let mut listeners = std::mem::take(&mut self.resize_listeners);
        for listener in &mut listeners {
            listener(self.columns, self.visible_rows);
        }
        self.resize_listeners.append(&mut listeners);
    }

    // ------------------------------------------------------------------
    // Repaint

    fn mark_dirty_cell(&mut self, col: usize, row: usize) {
        match &mut self.dirty {
            Some(rect) => rect.add_cell(col, row),
            None => self.dirty = Some(DirtyRect::cell(col, row)),
        }
    }

    fn mark_all_dirty(&mut self) {
        let all = DirtyRect::new(0, 0, self.columns, self.rows.len());
        self.dirty = Some(match self.dirty.take() {
            Some(rect) => rect.union(&all),
            None => all,
        });
    }

    fn notify_cursor(&mut self) {
        let (col, row) = self.cursor();
        let kind = self.cursor_kind;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_cursor(col, row, kind);
        }
    }

    /// Take and clear the pending dirty rectangle. Meant to be called at a
    /// bounded rate, not after every character.
    pub fn flush_dirty(&mut self) -> Option<DirtyRect> {
        self.dirty.take()
    }

    /// Flush the dirty rectangle into the attached renderer, if any.
    pub fn flush_to_renderer(&mut self) {
        if let Some(rect) = self.dirty.take() {
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.request_repaint(rect);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(buffer: &ScreenBuffer) -> String {
        buffer.visible_text().join("\n")
    }

    #[test]
    fn test_new_buffer() {
        let buffer = ScreenBuffer::new(80, 25, 200);
        assert_eq!(buffer.columns(), 80);
        assert_eq!(buffer.visible_rows(), 25);
        assert_eq!(buffer.remembered_rows(), 25);
        assert_eq!(buffer.cursor(), (0, 0));
    }

    #[test]
    fn test_write_advances() {
        let mut buffer = ScreenBuffer::new(10, 3, 10);
        buffer.write_str("hi");
        assert_eq!(buffer.cursor(), (2, 0));
        assert_eq!(buffer.cell_at(0, 0).unwrap().ch, 'h');
        assert_eq!(buffer.cell_at(1, 0).unwrap().ch, 'i');
    }

    #[test]
    fn test_tab_is_four_spaces() {
        let mut buffer = ScreenBuffer::new(20, 3, 10);
        buffer.write('\t');
        assert_eq!(buffer.cursor(), (4, 0));
        assert_eq!(&buffer.visible_text()[0][..4], "    ");
    }

    #[test]
    fn test_carriage_return_ignored() {
        let mut buffer = ScreenBuffer::new(10, 3, 10);
        buffer.write_str("a\rb");
        assert_eq!(buffer.cursor(), (2, 0));
        assert_eq!(&buffer.visible_text()[0][..2], "ab");
    }

    #[test]
    fn test_newline() {
        let mut buffer = ScreenBuffer::new(10, 3, 10);
        buffer.write_str("a\nb");
        assert_eq!(buffer.cursor(), (1, 1));
        assert_eq!(buffer.cell_at(0, 1).unwrap().ch, 'b');
    }

    #[test]
    fn test_wrap_at_column_limit() {
        let mut buffer = ScreenBuffer::new(4, 3, 10);
        buffer.write_str("abcde");
        assert_eq!(buffer.cursor(), (1, 1));
        assert_eq!(buffer.visible_text()[0], "abcd");
        assert_eq!(&buffer.visible_text()[1][..1], "e");
    }

    #[test]
    fn test_scroll_grows_until_capacity() {
        let mut buffer = ScreenBuffer::new(5, 2, 4);
        buffer.write_str("a\nb\nc");
        // Grid grew to 3 remembered rows; window shows the last two.
        assert_eq!(buffer.remembered_rows(), 3);
        assert_eq!(buffer.visible_text(), vec!["b    ", "c    "]);
        assert_eq!(buffer.row_text(0).unwrap(), "a    ");
    }

    #[test]
    fn test_scroll_recycles_at_capacity() {
        let mut buffer = ScreenBuffer::new(5, 2, 3);
        buffer.write_str("a\nb\nc\nd");
        assert_eq!(buffer.remembered_rows(), 3);
        // "a" was the oldest and is gone.
        assert_eq!(buffer.row_text(0).unwrap(), "b    ");
        assert_eq!(buffer.visible_text(), vec!["c    ", "d    "]);
        assert_eq!(buffer.cursor(), (1, 1));
    }

    #[test]
    fn test_insert_row_capacity_bound() {
        let mut buffer = ScreenBuffer::new(4, 2, 5);
        for _ in 0..20 {
            let last = buffer.remembered_rows() - 1;
            buffer.insert_row(last);
            assert!(buffer.remembered_rows() <= 5);
        }
        assert_eq!(buffer.remembered_rows(), 5);
    }

    #[test]
    fn test_insert_row_discards_oldest_first() {
        let mut buffer = ScreenBuffer::new(3, 2, 2);
        buffer.write_str("ab");
        buffer.set_cursor(0, 1);
        buffer.write_str("cd");
        // At capacity: inserting at the bottom recycles row 0.
        buffer.insert_row(1);
        assert_eq!(buffer.row_text(0).unwrap(), "cd ");
        assert_eq!(buffer.row_text(1).unwrap(), "   ");
    }

    #[test]
    fn test_positional_write_does_not_move_cursor() {
        let mut buffer = ScreenBuffer::new(10, 3, 10);
        buffer.write_at(5, 2, 'x');
        assert_eq!(buffer.cursor(), (0, 0));
        assert_eq!(buffer.cell_at(5, 2).unwrap().ch, 'x');
        // Out of range is silently ignored.
        buffer.write_at(50, 50, 'y');
    }

    #[test]
    fn test_resize_same_columns_preserves_rows() {
        let mut buffer = ScreenBuffer::new(6, 2, 10);
        buffer.write_str("ab\ncd");
        buffer.resize(6, 4);
        assert_eq!(buffer.row_text(0).unwrap(), "ab    ");
        assert_eq!(buffer.row_text(1).unwrap(), "cd    ");
        assert_eq!(buffer.visible_rows(), 4);
    }

    #[test]
    fn test_resize_wider_preserves_text() {
        let mut buffer = ScreenBuffer::new(4, 2, 10);
        buffer.write_str("abcd");
        buffer.resize(8, 2);
        assert_eq!(buffer.row_text(0).unwrap(), "abcd    ");
    }

    #[test]
    fn test_resize_narrower_truncates() {
        let mut buffer = ScreenBuffer::new(8, 2, 10);
        buffer.write_str("abcdefgh");
        buffer.resize(4, 2);
        assert_eq!(buffer.row_text(0).unwrap(), "abcd");
        let (col, row) = buffer.cursor();
        assert!(col < 4 && row < 2);
    }

    #[test]
    fn test_cursor_in_bounds_after_operations() {
        let mut buffer = ScreenBuffer::new(10, 5, 20);
        buffer.set_cursor(9, 4);
        buffer.resize(3, 2);
        let (col, row) = buffer.cursor();
        assert!(col < 3 && row < 2);
        buffer.write_str("xyzzy\n\n\n");
        let (col, row) = buffer.cursor();
        assert!(col < 3 && row < 2);
    }

    #[test]
    fn test_dirty_rect_bounds_writes() {
        let mut buffer = ScreenBuffer::new(10, 3, 10);
        assert!(buffer.flush_dirty().is_none());
        buffer.write_at(2, 1, 'a');
        buffer.write_at(5, 2, 'b');
        let rect = buffer.flush_dirty().unwrap();
        assert!(rect.contains(2, buffer.remembered_rows() - 2));
        assert!(rect.contains(5, buffer.remembered_rows() - 1));
        assert!(buffer.flush_dirty().is_none());
    }

    #[test]
    fn test_resize_listener_fires() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc as StdArc;

        let fired = StdArc::new(AtomicUsize::new(0));
        let mut buffer = ScreenBuffer::new(10, 3, 10);
        let counter = StdArc::clone(&fired);
        buffer.on_resize(Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        buffer.resize(12, 4);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_visible_window_follows_scroll() {
        let mut buffer = ScreenBuffer::new(3, 2, 10);
        for i in 0..6 {
            buffer.write(char::from(b'0' + i));
            buffer.write('\n');
        }
        assert_eq!(text(&buffer).lines().count(), 2);
        // Cursor sits on the last visible row.
        let (_, row) = buffer.cursor();
        assert_eq!(row, 1);
    }
}
