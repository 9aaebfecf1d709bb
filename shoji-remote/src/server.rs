//! The invisible server-side console.
//!
//! A `RemoteConsole` has no grid of its own: output, attribute changes, and
//! input requests travel to a client over the duplex stream, and committed
//! input lines come back. Requests are demand-driven: a frame is emitted
//! only when a read is attempted with nothing buffered, so neither side
//! accumulates unbounded speculative traffic.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shoji_core::{CursorKind, TerminalSink, TextAttributes, DEFAULT_COLUMNS, DEFAULT_ROWS};
use shoji_console::Console;

use crate::frame::{RemoteFrame, MARKER};

struct AttrState {
    current: Arc<TextAttributes>,
    /// What the wire last saw; `None` until the first change ships.
    last_sent: Option<TextAttributes>,
}

pub struct RemoteConsole<R: Read + Send, W: Write + Send> {
    reader: Mutex<BufReader<R>>,
    writer: Mutex<W>,
    attrs: Mutex<AttrState>,
}

impl<R: Read + Send, W: Write + Send> RemoteConsole<R, W> {
    pub fn new(client_in: R, client_out: W) -> Self {
        RemoteConsole {
            reader: Mutex::new(BufReader::new(client_in)),
            writer: Mutex::new(client_out),
            attrs: Mutex::new(AttrState {
                current: Arc::new(TextAttributes::default_console()),
                last_sent: None,
            }),
        }
    }

    fn reader_lock(&self) -> MutexGuard<'_, BufReader<R>> {
        self.reader.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn writer_lock(&self) -> MutexGuard<'_, W> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read one committed line from the client. If no input is already
    /// buffered, a request frame is sent first so the client knows to
    /// prompt; this is what keeps requests lazy.
    pub fn try_read_line(&self, password: bool) -> io::Result<String> {
        let mut reader = self.reader_lock();
        if reader.buffer().is_empty() {
            let frame = if password {
                RemoteFrame::ReadPassword
            } else {
                RemoteFrame::ReadLine
            };
            let mut writer = self.writer_lock();
            writer.write_all(&frame.to_bytes())?;
            writer.flush()?;
        }
        let mut line = String::new();
        let count = reader.read_line(&mut line)?;
        if count == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "remote client closed the stream",
            ));
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    /// Send output text, doubling any literal marker bytes.
    pub fn try_write(&self, text: &str) -> io::Result<()> {
        let mut bytes = Vec::with_capacity(text.len());
        for &b in text.as_bytes() {
            if b == MARKER {
                RemoteFrame::LiteralMarker.encode(&mut bytes);
            } else {
                bytes.push(b);
            }
        }
        let mut writer = self.writer_lock();
        writer.write_all(&bytes)?;
        writer.flush()
    }

    /// Ship attribute changes, but only the halves that differ from what
    /// the wire last saw.
    pub fn try_set_attributes(&self, attrs: Arc<TextAttributes>) -> io::Result<()> {
        let mut state = self.attrs.lock().unwrap_or_else(PoisonError::into_inner);
        let mut bytes = Vec::new();
        let foreground_changed = state
            .last_sent
            .map_or(true, |prev| prev.foreground() != attrs.foreground());
        let background_changed = state
            .last_sent
            .map_or(true, |prev| prev.background() != attrs.background());
        if foreground_changed {
            RemoteFrame::Foreground(attrs.foreground()).encode(&mut bytes);
        }
        if background_changed {
            RemoteFrame::Background(attrs.background()).encode(&mut bytes);
        }
        if !bytes.is_empty() {
            let mut writer = self.writer_lock();
            writer.write_all(&bytes)?;
            writer.flush()?;
        }
        state.last_sent = Some(*attrs);
        state.current = attrs;
        Ok(())
    }

    /// Stream loss is fatal to the session that owns this console.
    fn session_lost(&self, error: io::Error) -> ! {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            log::info!("remote client disconnected, ending session");
            std::process::exit(0);
        }
        log::error!("remote console stream failed: {error}");
        std::process::exit(1);
    }
}

impl<R: Read + Send, W: Write + Send> Console for RemoteConsole<R, W> {
    fn read_line(&self) -> String {
        match self.try_read_line(false) {
            Ok(line) => line,
            Err(e) => self.session_lost(e),
        }
    }

    fn read_password(&self) -> String {
        match self.try_read_line(true) {
            Ok(line) => line,
            Err(e) => self.session_lost(e),
        }
    }

    fn write(&self, text: &str) {
        if let Err(e) = self.try_write(text) {
            self.session_lost(e);
        }
    }

    fn attributes(&self) -> Arc<TextAttributes> {
        let state = self.attrs.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&state.current)
    }

    fn set_attributes(&self, attrs: Arc<TextAttributes>) {
        if let Err(e) = self.try_set_attributes(attrs) {
            self.session_lost(e);
        }
    }
}

/// `TerminalSink` facade over a remote console, for output producers that
/// speak the sink contract. The remote end owns the real grid, so geometry
/// is nominal and cursor operations have nowhere to go.
pub struct RemoteSink<R: Read + Send, W: Write + Send> {
    console: Arc<RemoteConsole<R, W>>,
}

impl<R: Read + Send, W: Write + Send> RemoteSink<R, W> {
    pub fn new(console: Arc<RemoteConsole<R, W>>) -> Self {
        RemoteSink { console }
    }
}

impl<R: Read + Send, W: Write + Send> TerminalSink for RemoteSink<R, W> {
    fn columns(&self) -> usize {
        DEFAULT_COLUMNS
    }

    fn rows(&self) -> usize {
        DEFAULT_ROWS
    }

    fn cursor(&self) -> (usize, usize) {
        (0, 0)
    }

    fn set_cursor(&mut self, _col: usize, _row: usize) {}

    fn set_cursor_kind(&mut self, _kind: CursorKind) {}

    fn attributes(&self) -> Arc<TextAttributes> {
        self.console.attributes()
    }

    fn set_attributes(&mut self, attrs: Arc<TextAttributes>) {
        Console::set_attributes(&*self.console, attrs);
    }

    fn write(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.console.write(ch.encode_utf8(&mut buf));
    }

    fn write_at(&mut self, _col: usize, _row: usize, ch: char) {
        // No grid to address; degrade to ordinary output.
        self.write(ch);
    }

    fn write_str(&mut self, s: &str) {
        self.console.write(s);
    }

    fn insert_row(&mut self, _at: usize) {}
}
