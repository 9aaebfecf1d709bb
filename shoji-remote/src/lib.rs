//! Shoji remote console protocol.
//!
//! Proxies a console's input and output across a single duplex byte stream.
//! One marker byte (0x1A) separates control frames from literal traffic;
//! the server side is an invisible [`server::RemoteConsole`] whose reads
//! pull input from the client on demand, and the client side is a
//! [`client::RemoteConsoleClient`] relaying onto a real local console.
//!
//! Connections are deliberately unauthenticated; anyone who can reach the
//! stream gets the console.

pub mod client;
pub mod frame;
pub mod server;

pub use client::{ClientExit, RemoteConsoleClient};
pub use frame::{encode_color, parse_color, RemoteFrame, MARKER};
pub use server::{RemoteConsole, RemoteSink};

use thiserror::Error;

/// Failures of the duplex stream. Every variant is fatal to the session
/// that owns it; the protocol never retries.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("remote stream failed: {0}")]
    Stream(#[source] std::io::Error),
}
