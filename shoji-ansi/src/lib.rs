//! Shoji ANSI escape interpreter.
//!
//! A streaming decoder for the console's supported escape subset: cursor
//! movement, save/restore, clears, and SGR colors. Everything else in a
//! byte stream is passed through to the sink as plain output, and malformed
//! sequences are dropped without ever surfacing an error.

pub mod decoder;
pub mod params;

pub use decoder::AnsiDecoder;
pub use params::ParamReader;
