//! `std::io` adapters over a console.
//!
//! `ConsoleReader` turns committed lines into a byte stream for code that
//! wants an `io::Read` (subprocess pumps, line-oriented protocols); bytes
//! only become available when the user commits a line. `ConsoleWriter` is
//! the matching `io::Write` for attributed console output.

use std::io::{self, Read, Write};
use std::sync::Arc;

use crate::console::Console;

/// Reads committed console lines, each terminated with `'\n'`.
pub struct ConsoleReader {
    console: Arc<dyn Console>,
    pending: Vec<u8>,
    offset: usize,
}

impl ConsoleReader {
    pub fn new(console: Arc<dyn Console>) -> Self {
        ConsoleReader {
            console,
            pending: Vec::new(),
            offset: 0,
        }
    }
}

impl Read for ConsoleReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.offset >= self.pending.len() {
            // Block for the next committed line.
            let mut line = self.console.read_line();
            line.push('\n');
            self.pending = line.into_bytes();
            self.offset = 0;
        }
        let available = &self.pending[self.offset..];
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.offset += count;
        Ok(count)
    }
}

/// Writes bytes to a console with its current attributes.
pub struct ConsoleWriter {
    console: Arc<dyn Console>,
}

impl ConsoleWriter {
    pub fn new(console: Arc<dyn Console>) -> Self {
        ConsoleWriter { console }
    }
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyEvent;
    use crate::local::LocalConsole;
    use shoji_core::{ScreenBuffer, SharedScreen};
    use std::io::BufRead;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_writer_lands_on_screen() {
        let screen = SharedScreen::new(ScreenBuffer::new(10, 3, 10));
        let console: Arc<dyn Console> = Arc::new(LocalConsole::new(screen.clone()));
        let mut writer = ConsoleWriter::new(console);
        writer.write_all(b"hi").unwrap();
        assert_eq!(&screen.lock().visible_text()[0][..2], "hi");
    }

    #[test]
    fn test_reader_yields_committed_lines() {
        let screen = SharedScreen::new(ScreenBuffer::new(20, 3, 10));
        let console = Arc::new(LocalConsole::new(screen));

        let reading: Arc<dyn Console> = console.clone();
        let handle = thread::spawn(move || {
            let mut lines = std::io::BufReader::new(ConsoleReader::new(reading));
            let mut line = String::new();
            lines.read_line(&mut line).unwrap();
            line
        });

        for _ in 0..100 {
            if console.is_reading() {
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }
        for c in "pwd".chars() {
            console.handle_key(&KeyEvent::Char(c));
        }
        console.handle_key(&KeyEvent::Enter);

        assert_eq!(handle.join().unwrap(), "pwd\n");
    }
}
