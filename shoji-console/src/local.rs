//! The grid-backed console.

use std::sync::Arc;

use shoji_core::{CursorKind, SharedScreen, TextAttributes};

use crate::console::Console;
use crate::editor::LineEditor;
use crate::input::KeyEvent;

/// A [`Console`] whose output lands in a local [`SharedScreen`] and whose
/// input comes from key events dispatched into its line editor.
///
/// The console expects to be the sole manager of its screen; writing to the
/// screen behind its back while a read is pending will scramble the edit
/// line's cursor arithmetic.
pub struct LocalConsole {
    screen: SharedScreen,
    editor: LineEditor<SharedScreen>,
}

impl LocalConsole {
    pub fn new(screen: SharedScreen) -> Self {
        screen.lock().set_cursor_kind(CursorKind::Invisible);
        LocalConsole {
            editor: LineEditor::new(screen.clone()),
            screen,
        }
    }

    pub fn screen(&self) -> &SharedScreen {
        &self.screen
    }

    /// Feed one key event from the input-dispatch thread.
    pub fn handle_key(&self, event: &KeyEvent) {
        self.editor.handle_key(event);
    }

    /// True while a `read_line` is pending.
    pub fn is_reading(&self) -> bool {
        self.editor.is_editing()
    }
}

impl Console for LocalConsole {
    fn read_line(&self) -> String {
        self.editor.read_line(false)
    }

    fn read_password(&self) -> String {
        self.editor.read_line(true)
    }

    fn write(&self, text: &str) {
        self.screen.lock().write_str(text);
    }

    fn attributes(&self) -> Arc<TextAttributes> {
        self.screen.lock().attributes()
    }

    fn set_attributes(&self, attrs: Arc<TextAttributes>) {
        self.screen.lock().set_attributes(attrs);
    }
}
