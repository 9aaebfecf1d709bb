//! Serializable captures of buffer state, for tests and tooling.

use serde::{Deserialize, Serialize};

use crate::cursor::Cursor;

/// A flattened picture of a [`crate::screen::ScreenBuffer`]: geometry,
/// cursor, and the text of every remembered row (oldest first). Attributes
/// are not captured; snapshots exist to compare text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub columns: usize,
    /// Visible row count.
    pub rows: usize,
    /// Cursor in window coordinates.
    pub cursor: Cursor,
    pub lines: Vec<String>,
}

impl Snapshot {
    /// The visible window's text, rows joined with newlines.
    pub fn visible_text(&self) -> String {
        let skip = self.lines.len().saturating_sub(self.rows);
        self.lines[skip..].join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::ScreenBuffer;

    #[test]
    fn test_snapshot_round_trip() {
        let mut buffer = ScreenBuffer::new(5, 2, 4);
        buffer.write_str("ab\ncd");
        let snapshot = buffer.snapshot();

        let json = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();
        assert_eq!(restored, snapshot);
        assert_eq!(restored.visible_text(), "ab   \ncd   ");
    }

    #[test]
    fn test_visible_text_skips_scrollback() {
        let mut buffer = ScreenBuffer::new(3, 1, 3);
        buffer.write_str("a\nb");
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.lines.len(), 2);
        assert_eq!(snapshot.visible_text(), "b  ");
    }
}
