//! Streaming interpreter for the supported ANSI escape subset.
//!
//! The decoder is byte-oriented and resumable: `feed` may be called with
//! arbitrarily sized chunks, including chunks that split a sequence in the
//! middle of a parameter, and state carries over between calls. Output and
//! interpreted commands are applied to a [`TerminalSink`].
//!
//! Supported: cursor up/down/left/right (`A`/`B`/`C`/`D`), absolute
//! position (`H`), save/restore (`s`/`u`), clear to end of line (`K`),
//! clear screen mode 2 (`J`), and SGR colors (`m`). Anything else is
//! discarded without an error; a console must survive hostile byte streams.

use std::sync::Arc;

use shoji_core::{ansi_color, TerminalSink, TextAttributes};

use crate::params::ParamReader;

const ESCAPE: u8 = 0x1b;

/// Longest run of parameter bytes one sequence may accumulate. Anything
/// longer is malformed and the whole sequence is dropped.
const MAX_PARAM_BYTES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Plain output.
    Ground,
    /// Escape byte seen, awaiting `[`.
    EscapeSeen,
    /// Inside `ESC [`, accumulating parameters.
    Csi,
}

/// Incremental escape-sequence decoder driving a terminal sink.
pub struct AnsiDecoder {
    state: State,
    /// Pending parameter bytes of the sequence being accumulated.
    buf: Vec<u8>,
    /// Cursor save-point for `ESC[s` / `ESC[u`.
    saved_cursor: (usize, usize),
    bright: bool,
    foreground: usize,
    background: usize,
}

impl Default for AnsiDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnsiDecoder {
    pub fn new() -> Self {
        AnsiDecoder {
            state: State::Ground,
            buf: Vec::with_capacity(MAX_PARAM_BYTES),
            saved_cursor: (0, 0),
            bright: false,
            foreground: 7,
            background: 0,
        }
    }

    /// Feed a chunk of bytes, writing output and applying commands to
    /// `sink`. Decoding never fails; malformed sequences are discarded.
    pub fn feed<S: TerminalSink>(&mut self, bytes: &[u8], sink: &mut S) {
        for &byte in bytes {
            self.advance(byte, sink);
        }
    }

    fn advance<S: TerminalSink>(&mut self, byte: u8, sink: &mut S) {
        match self.state {
            State::Ground => {
                if byte == ESCAPE {
                    self.state = State::EscapeSeen;
                } else {
                    sink.write(byte as char);
                }
            }
            State::EscapeSeen => {
                if byte == b'[' {
                    self.buf.clear();
                    self.state = State::Csi;
                } else {
                    log::debug!("discarding escape followed by {byte:#04x}");
                    self.state = State::Ground;
                }
            }
            State::Csi => match byte {
                b'0'..=b'9' | b';' => {
                    if self.buf.len() >= MAX_PARAM_BYTES {
                        log::debug!("escape sequence too long, discarding");
                        self.buf.clear();
                        self.state = State::Ground;
                    } else {
                        self.buf.push(byte);
                    }
                }
                _ => {
                    self.state = State::Ground;
                    self.dispatch(byte, sink);
                }
            },
        }
    }

    fn dispatch<S: TerminalSink>(&mut self, terminator: u8, sink: &mut S) {
        match terminator {
            b'A' => self.cursor_up(sink),
            b'B' => self.cursor_down(sink),
            b'C' => self.cursor_right(sink),
            b'D' => self.cursor_left(sink),
            b'H' => self.cursor_position(sink),
            b's' => self.save_cursor(sink),
            b'u' => self.restore_cursor(sink),
            b'K' => self.clear_to_end(sink),
            b'J' => self.clear_screen(sink),
            b'm' => self.select_colors(sink),
            _ => log::debug!("unrecognized escape terminator {:?}", terminator as char),
        }
    }

    fn params(&self) -> ParamReader<'_> {
        ParamReader::new(&self.buf)
    }

    fn cursor_up<S: TerminalSink>(&mut self, sink: &mut S) {
        let count = self.params().next_or(1).max(0) as usize;
        let (x, y) = sink.cursor();
        sink.set_cursor(x, y.saturating_sub(count));
    }

    fn cursor_down<S: TerminalSink>(&mut self, sink: &mut S) {
        let count = self.params().next_or(1).max(0) as usize;
        let (x, y) = sink.cursor();
        let max = sink.rows().saturating_sub(1);
        sink.set_cursor(x, (y + count).min(max));
    }

    fn cursor_right<S: TerminalSink>(&mut self, sink: &mut S) {
        let count = self.params().next_or(1).max(0) as usize;
        let (x, y) = sink.cursor();
        let max = sink.columns().saturating_sub(1);
        sink.set_cursor((x + count).min(max), y);
    }

    fn cursor_left<S: TerminalSink>(&mut self, sink: &mut S) {
        let count = self.params().next_or(1).max(0) as usize;
        let (x, y) = sink.cursor();
        sink.set_cursor(x.saturating_sub(count), y);
    }

    fn cursor_position<S: TerminalSink>(&mut self, sink: &mut S) {
        // Parameters are 1-based, row first; a missing parameter
        // suppresses the whole command.
        let mut params = self.params();
        let y = params.next_or(-1) - 1;
        let x = params.next_or(-1) - 1;
        if x >= 0 && y >= 0 {
            let x = (x as usize).min(sink.columns().saturating_sub(1));
            let y = (y as usize).min(sink.rows().saturating_sub(1));
            sink.set_cursor(x, y);
        }
    }

    fn save_cursor<S: TerminalSink>(&mut self, sink: &mut S) {
        self.saved_cursor = sink.cursor();
    }

    fn restore_cursor<S: TerminalSink>(&mut self, sink: &mut S) {
        // The grid may have shrunk since the save; clamp at restore time.
        let (x, y) = self.saved_cursor;
        let x = x.min(sink.columns().saturating_sub(1));
        let y = y.min(sink.rows().saturating_sub(1));
        self.saved_cursor = (x, y);
        sink.set_cursor(x, y);
    }

    fn clear_to_end<S: TerminalSink>(&mut self, sink: &mut S) {
        let (x, y) = sink.cursor();
        let columns = sink.columns();
        // Advancing blanks up to the second-to-last column, one positional
        // blank for the last so the write never wraps or scrolls.
        for _ in x..columns.saturating_sub(1) {
            sink.write(' ');
        }
        sink.write_at(columns.saturating_sub(1), y, ' ');
        sink.set_cursor(x, y);
    }

    fn clear_screen<S: TerminalSink>(&mut self, sink: &mut S) {
        if self.params().next_or(-1) != 2 {
            return;
        }
        let columns = sink.columns();
        let rows = sink.rows();
        sink.set_cursor(0, 0);
        // One short of the full area so the run of advancing blanks cannot
        // push the last row out; the final cell is written positionally.
        for _ in 0..(columns * rows).saturating_sub(1) {
            sink.write(' ');
        }
        sink.write_at(
            columns.saturating_sub(1),
            rows.saturating_sub(1),
            ' ',
        );
        sink.set_cursor(0, 0);
    }

    fn select_colors<S: TerminalSink>(&mut self, sink: &mut S) {
        // Borrow only the parameter buffer so the attribute fields below
        // (`bright`/`foreground`/`background`) can be mutated while the
        // reader is alive; `self.params()` would borrow all of `self`.
        let mut params = ParamReader::new(&self.buf);
        loop {
            let parameter = params.next_or(-1);
            match parameter {
                -1 => break,
                0 => {
                    self.bright = false;
                    self.foreground = 7;
                    self.background = 0;
                }
                1 => self.bright = true,
                30..=37 => self.foreground = (parameter - 30) as usize,
                40..=47 => self.background = (parameter - 40) as usize,
                _ => {}
            }
        }
        // One attribute value for the whole sequence, applied at the end.
        sink.set_attributes(Arc::new(TextAttributes::new(
            ansi_color(self.foreground, self.bright),
            ansi_color(self.background, false),
        )));
    }
}
