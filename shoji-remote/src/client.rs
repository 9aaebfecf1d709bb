//! Client-side pump: decode frames inline with pass-through output.
//!
//! The client owns a real console (usually grid-backed) and relays between
//! it and the server: literal bytes print, request frames trigger a local
//! blocking read whose result is written back, color frames update local
//! attributes. End-of-stream from the server ends the session; it is a
//! lifecycle event, not an I/O error to retry.

use std::io::{BufReader, Read, Write};
use std::sync::Arc;

use shoji_console::Console;

use crate::frame::{parse_color, MARKER};
use crate::RemoteError;

/// Why the client pump stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientExit {
    /// The server closed its half of the stream.
    PeerClosed,
}

pub struct RemoteConsoleClient<R: Read, W: Write> {
    console: Arc<dyn Console>,
    input: BufReader<R>,
    output: W,
}

impl<R: Read, W: Write> RemoteConsoleClient<R, W> {
    pub fn new(console: Arc<dyn Console>, server_in: R, server_out: W) -> Self {
        RemoteConsoleClient {
            console,
            input: BufReader::new(server_in),
            output: server_out,
        }
    }

    /// Relay until the server goes away. Returns how the session ended;
    /// I/O failures on either half are fatal and surface as errors.
    pub fn run(mut self) -> Result<ClientExit, RemoteError> {
        loop {
            let byte = match self.next_byte()? {
                Some(byte) => byte,
                None => return Ok(ClientExit::PeerClosed),
            };
            if byte == MARKER {
                match self.process_frame()? {
                    Some(exit) => return Ok(exit),
                    None => {}
                }
            } else {
                self.write_char(byte as char);
            }
        }
    }

    /// Convenience for binaries: run the relay and exit the process when
    /// the session ends, as a proxied console has nothing left to do.
    pub fn run_to_exit(self) -> ! {
        match self.run() {
            Ok(ClientExit::PeerClosed) => {
                log::info!("server closed the session");
                std::process::exit(0);
            }
            Err(e) => {
                log::error!("remote session failed: {e}");
                std::process::exit(1);
            }
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>, RemoteError> {
        let mut byte = [0u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(RemoteError::Stream(e)),
            }
        }
    }

    /// Handle the byte after a marker. Returns `Some` when the stream
    /// ended mid-frame.
    fn process_frame(&mut self) -> Result<Option<ClientExit>, RemoteError> {
        let tag = match self.next_byte()? {
            Some(tag) => tag,
            None => return Ok(Some(ClientExit::PeerClosed)),
        };
        match tag {
            b'R' => self.answer_request(false)?,
            b'P' => self.answer_request(true)?,
            b'F' => {
                let code = match self.read_color_code()? {
                    Some(code) => code,
                    None => return Ok(Some(ClientExit::PeerClosed)),
                };
                let attrs = self.console.attributes().with_foreground(parse_color(code));
                self.console.set_attributes(Arc::new(attrs));
            }
            b'B' => {
                let code = match self.read_color_code()? {
                    Some(code) => code,
                    None => return Ok(Some(ClientExit::PeerClosed)),
                };
                let attrs = self.console.attributes().with_background(parse_color(code));
                self.console.set_attributes(Arc::new(attrs));
            }
            MARKER => self.write_char(MARKER as char),
            other => log::debug!("unknown remote frame tag {other:#04x}, ignoring"),
        }
        Ok(None)
    }

    /// Perform the local blocking read and send the result back.
    fn answer_request(&mut self, password: bool) -> Result<(), RemoteError> {
        let line = if password {
            self.console.read_password()
        } else {
            self.console.read_line()
        };
        self.output
            .write_all(line.as_bytes())
            .and_then(|_| self.output.write_all(b"\n"))
            .and_then(|_| self.output.flush())
            .map_err(RemoteError::Stream)
    }

    fn read_color_code(&mut self) -> Result<Option<[u8; 3]>, RemoteError> {
        let mut code = [0u8; 3];
        for slot in &mut code {
            match self.next_byte()? {
                Some(byte) => *slot = byte,
                None => return Ok(None),
            }
        }
        Ok(Some(code))
    }

    fn write_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.console.write(ch.encode_utf8(&mut buf));
    }
}
