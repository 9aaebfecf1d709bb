//! The console capability.
//!
//! A `Console` is the high-level text surface a program talks to: blocking
//! line input with editing and recall, attributed output, and current
//! attribute state. The grid-backed [`crate::local::LocalConsole`] and the
//! remote protocol's stream-backed console both implement it; which one a
//! program gets is decided where the session is constructed, never by
//! downcasting.

use std::sync::Arc;

use shoji_core::TextAttributes;

pub trait Console: Send + Sync {
    /// Enter edit mode and block until the user commits a line. The
    /// returned text does not include the terminating newline.
    fn read_line(&self) -> String;

    /// As `read_line`, but echoes a mask character instead of the typed
    /// text.
    fn read_password(&self) -> String;

    /// Write text with the console's current attributes.
    fn write(&self, text: &str);

    /// Attributes applied to subsequent `write` calls.
    fn attributes(&self) -> Arc<TextAttributes>;

    fn set_attributes(&self, attrs: Arc<TextAttributes>);
}
