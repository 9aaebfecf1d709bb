//! The capability seams between the grid, its drivers, and its renderer.
//!
//! `TerminalSink` is what output producers (the escape interpreter, the line
//! editor, command output) write into. The local grid implements it via
//! [`SharedScreen`]; the remote protocol's server facade implements it over a
//! byte stream. Which one a session uses is decided at construction.
//!
//! `Renderer` is the consumer side: the core sends it draw, cursor, and
//! repaint instructions and never cares what pixels come out.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::attrs::TextAttributes;
use crate::cursor::CursorKind;
use crate::dirty::DirtyRect;
use crate::screen::ScreenBuffer;

/// Receives drawing instructions from the core. Implementations live outside
/// this workspace; a trivial one can ignore everything but `request_repaint`
/// and read cells back off the buffer on its own schedule.
pub trait Renderer: Send {
    /// Immediate single-cell echo, window coordinates.
    fn draw_cell(&mut self, col: usize, row: usize, ch: char, attrs: &TextAttributes);

    /// Cursor moved or changed shape, window coordinates.
    fn set_cursor(&mut self, col: usize, row: usize, kind: CursorKind);

    /// The grid scrolled; viewports tracking the bottom should snap there.
    fn scroll_notify(&mut self);

    /// Batched repaint request covering `dirty`, absolute grid coordinates.
    fn request_repaint(&mut self, dirty: DirtyRect);
}

/// Write-side capability of a console: character output, cursor control,
/// and attribute state. Coordinates are window-relative.
pub trait TerminalSink: Send {
    fn columns(&self) -> usize;
    fn rows(&self) -> usize;

    fn cursor(&self) -> (usize, usize);
    fn set_cursor(&mut self, col: usize, row: usize);
    fn set_cursor_kind(&mut self, _kind: CursorKind) {}

    /// Attributes applied by subsequent writes.
    fn attributes(&self) -> Arc<TextAttributes>;
    fn set_attributes(&mut self, attrs: Arc<TextAttributes>);

    /// Write at the cursor and advance it, wrapping and scrolling as needed.
    fn write(&mut self, ch: char);

    /// Write at an explicit position without touching the cursor.
    fn write_at(&mut self, col: usize, row: usize, ch: char);

    /// Keystroke-echo variant of `write`; implementations may repaint
    /// eagerly instead of waiting for the coalescing flush.
    fn write_immediate(&mut self, ch: char) {
        self.write(ch);
    }

    fn write_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.write(ch);
        }
    }

    /// Insert a blank row at the given window row.
    fn insert_row(&mut self, at: usize);

    /// Viewport paging; grid-backed sinks leave this to their renderer.
    fn page_up(&mut self) {}
    fn page_down(&mut self) {}
}

/// The shared, lockable form of [`ScreenBuffer`]: one exclusive lock covers
/// grid, cursor, and dirty state, so interleaved resizes, scrolls, and
/// writes from different threads each see fully-applied prior operations.
#[derive(Clone)]
pub struct SharedScreen {
    inner: Arc<Mutex<ScreenBuffer>>,
}

impl SharedScreen {
    pub fn new(buffer: ScreenBuffer) -> Self {
        SharedScreen {
            inner: Arc::new(Mutex::new(buffer)),
        }
    }

    /// Lock the underlying buffer. A poisoned lock is taken over rather than
    /// propagated; the buffer has no invariants a panic can break mid-write
    /// that the next clamp will not repair.
    pub fn lock(&self) -> MutexGuard<'_, ScreenBuffer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` under the buffer lock.
    pub fn with<R>(&self, f: impl FnOnce(&mut ScreenBuffer) -> R) -> R {
        f(&mut self.lock())
    }
}

impl TerminalSink for SharedScreen {
    fn columns(&self) -> usize {
        self.lock().columns()
    }

    fn rows(&self) -> usize {
        self.lock().visible_rows()
    }

    fn cursor(&self) -> (usize, usize) {
        self.lock().cursor()
    }

    fn set_cursor(&mut self, col: usize, row: usize) {
        self.lock().set_cursor(col, row);
    }

    fn set_cursor_kind(&mut self, kind: CursorKind) {
        self.lock().set_cursor_kind(kind);
    }

    fn attributes(&self) -> Arc<TextAttributes> {
        self.lock().attributes()
    }

    fn set_attributes(&mut self, attrs: Arc<TextAttributes>) {
        self.lock().set_attributes(attrs);
    }

    fn write(&mut self, ch: char) {
        self.lock().write(ch);
    }

    fn write_at(&mut self, col: usize, row: usize, ch: char) {
        self.lock().write_at(col, row, ch);
    }

    fn write_immediate(&mut self, ch: char) {
        let mut buffer = self.lock();
        let attrs = buffer.attributes();
        buffer.write_immediate(ch, &attrs);
    }

    fn write_str(&mut self, s: &str) {
        // One lock acquisition for the whole run, not one per character.
        self.lock().write_str(s);
    }

    fn insert_row(&mut self, at: usize) {
        let mut buffer = self.lock();
        let abs = buffer.remembered_rows() - buffer.visible_rows() + at;
        buffer.insert_row(abs);
    }
}
