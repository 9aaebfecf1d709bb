//! Shoji console core.
//!
//! This crate provides the platform-independent console building blocks:
//! - Character grid with bounded scrollback and ring-recycled rows
//! - Immutable, shared text attributes and the 16-color ANSI table
//! - Cursor state and dirty-rectangle repaint coalescing
//! - The `TerminalSink` / `Renderer` capability seams
//!
//! It has NO rendering dependencies and can be used headlessly for testing.

pub mod attrs;
pub mod cell;
pub mod color;
pub mod cursor;
pub mod dirty;
pub mod repaint;
pub mod row;
pub mod screen;
pub mod sink;
pub mod snapshot;

pub use attrs::TextAttributes;
pub use cell::Cell;
pub use color::{ansi_color, Rgb, ANSI_COLORS};
pub use cursor::{Cursor, CursorKind};
pub use dirty::DirtyRect;
pub use repaint::{RepaintPump, DEFAULT_REPAINT_INTERVAL};
pub use row::Row;
pub use screen::ScreenBuffer;
pub use sink::{Renderer, SharedScreen, TerminalSink};
pub use snapshot::Snapshot;

/// Default visible geometry for a new console.
pub const DEFAULT_COLUMNS: usize = 80;
pub const DEFAULT_ROWS: usize = 25;

/// Default maximum remembered rows.
pub const DEFAULT_SCROLLBACK: usize = 200;
