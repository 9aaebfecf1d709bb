//! Shoji console services.
//!
//! Builds the high-level console on top of the core grid:
//! - The [`Console`] capability: blocking reads, attributed writes
//! - A line editor with in-line editing and history recall
//! - Key and pointer event fan-out
//! - `io::Read` / `io::Write` adapters for stream-oriented callers
//! - Session context and TOML configuration

pub mod config;
pub mod console;
pub mod editor;
pub mod input;
pub mod io;
pub mod local;
pub mod session;

pub use config::ConsoleConfig;
pub use console::Console;
pub use editor::LineEditor;
pub use input::{Bias, EventHub, KeyEvent, PointerEvent, PointerKind};
pub use io::{ConsoleReader, ConsoleWriter};
pub use local::LocalConsole;
pub use session::ConsoleSession;
