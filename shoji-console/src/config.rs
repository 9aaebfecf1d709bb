//! Console configuration.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shoji_core::{ScreenBuffer, DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_SCROLLBACK};

/// Geometry for a console session. Loaded from TOML, with every field
/// optional:
///
/// ```toml
/// columns = 100
/// rows = 30
/// scrollback = 500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub columns: usize,
    pub rows: usize,
    /// Maximum rows remembered, including the visible window.
    pub scrollback: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            scrollback: DEFAULT_SCROLLBACK,
        }
    }
}

impl ConsoleConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load from a TOML file. A missing file yields the defaults; a file
    /// that exists but does not parse is an error.
    pub fn load(path: &Path) -> io::Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                return Ok(ConsoleConfig::default());
            }
            Err(e) => return Err(e),
        };
        Self::from_toml_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// A fresh screen buffer with this geometry.
    pub fn screen_buffer(&self) -> ScreenBuffer {
        ScreenBuffer::new(self.columns, self.rows, self.scrollback)
    }
}
