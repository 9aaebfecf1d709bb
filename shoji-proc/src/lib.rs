//! Shoji process supervision.
//!
//! Spawns a child with redirected stdio and a working directory, pumps
//! bytes between its streams and external sources/sinks on dedicated
//! threads, and shuts the whole arrangement down with bounded escalation
//! when asked to stop.

pub mod error;
pub mod supervisor;

pub use error::SpawnError;
pub use supervisor::{Lifecycle, ManagedProcess, ProcessBuilder};
