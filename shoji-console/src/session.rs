//! Session context wiring the pieces together.
//!
//! A `ConsoleSession` owns the screen, the console, the event registries,
//! and the repaint coalescer. It is an explicit context object handed to
//! whatever needs console access; nothing here reaches for process-wide
//! state. An application entry point may of course create one session and
//! treat it as its default.

use std::sync::Arc;

use shoji_core::{Renderer, RepaintPump, SharedScreen, DEFAULT_REPAINT_INTERVAL};

use crate::config::ConsoleConfig;
use crate::console::Console;
use crate::input::{EventHub, KeyEvent, PointerEvent};
use crate::io::{ConsoleReader, ConsoleWriter};
use crate::local::LocalConsole;

pub struct ConsoleSession {
    screen: SharedScreen,
    console: Arc<LocalConsole>,
    events: EventHub,
    /// Present once a renderer is attached.
    repaint: Option<RepaintPump>,
}

impl ConsoleSession {
    /// A headless session (no renderer): everything works, nothing repaints.
    pub fn new(config: &ConsoleConfig) -> Self {
        let screen = SharedScreen::new(config.screen_buffer());
        let console = Arc::new(LocalConsole::new(screen.clone()));
        ConsoleSession {
            screen,
            console,
            events: EventHub::new(),
            repaint: None,
        }
    }

    /// A session with a renderer attached and the repaint coalescer running.
    pub fn with_renderer(config: &ConsoleConfig, renderer: Box<dyn Renderer>) -> Self {
        let mut session = Self::new(config);
        session.screen.lock().set_renderer(renderer);
        session.repaint = Some(RepaintPump::start(
            session.screen.clone(),
            DEFAULT_REPAINT_INTERVAL,
        ));
        session
    }

    pub fn screen(&self) -> &SharedScreen {
        &self.screen
    }

    pub fn console(&self) -> Arc<dyn Console> {
        let console: Arc<dyn Console> = self.console.clone();
        console
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// True while some caller is blocked in `read_line`/`read_password`.
    pub fn is_reading(&self) -> bool {
        self.console.is_reading()
    }

    /// Stop the repaint coalescer, if one is running. Dropping the session
    /// does the same.
    pub fn stop_repaint(&mut self) {
        if let Some(mut pump) = self.repaint.take() {
            pump.stop();
        }
    }

    /// Entry point for the input-dispatch thread: feeds the line editor
    /// first, then any registered key listeners.
    pub fn dispatch_key(&self, event: KeyEvent) {
        self.console.handle_key(&event);
        self.events.dispatch_key(&event);
    }

    pub fn dispatch_pointer(&self, event: PointerEvent) {
        self.events.dispatch_pointer(&event);
    }

    /// A blocking reader over committed lines.
    pub fn reader(&self) -> ConsoleReader {
        ConsoleReader::new(self.console())
    }

    /// A writer that prints with the console's current attributes.
    pub fn writer(&self) -> ConsoleWriter {
        ConsoleWriter::new(self.console())
    }
}
