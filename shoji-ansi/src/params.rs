//! CSI parameter extraction.
//!
//! Parameters arrive as semicolon-separated decimal text. Each is pulled
//! off the front in turn; a missing or malformed parameter yields the
//! caller's default instead of an error.

/// Sequential reader over the accumulated parameter bytes of one sequence.
pub struct ParamReader<'a> {
    rest: &'a [u8],
}

impl<'a> ParamReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ParamReader { rest: buf }
    }

    /// Next parameter, or `default` when missing or unparseable.
    pub fn next_or(&mut self, default: i32) -> i32 {
        if self.rest.is_empty() {
            return default;
        }
        let end = self
            .rest
            .iter()
            .position(|&b| b == b';')
            .unwrap_or(self.rest.len());
        let segment = &self.rest[..end];
        self.rest = if end < self.rest.len() {
            &self.rest[end + 1..]
        } else {
            &[]
        };
        std::str::from_utf8(segment)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }
}
