//! Blocking line editor with history recall.
//!
//! The editor is a state machine driven from the input-dispatch thread via
//! [`LineEditor::handle_key`], while the thread that called `read_line`
//! blocks on a one-slot channel. Enter commits the line and hands it to the
//! waiter; the commit-to-history transition and the handoff happen under
//! the same lock, so a second read cannot slip in between them.
//!
//! Echo goes through the sink's immediate-write path so single keystrokes
//! show up without waiting for the repaint coalescer, and edits in the
//! middle of the line redraw only the suffix from the cursor onward.

use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Mutex, MutexGuard, PoisonError};

use shoji_core::{CursorKind, TerminalSink};

use crate::input::KeyEvent;

pub struct LineEditor<S: TerminalSink> {
    /// Serializes concurrent `read_line` callers: one pending read at a time.
    read_gate: Mutex<()>,
    state: Mutex<EditorState<S>>,
}

struct EditorState<S> {
    sink: S,
    /// True while keystrokes are being accepted into the buffer.
    editing: bool,
    /// Echo a mask instead of typed characters.
    password: bool,
    /// The in-progress line.
    buffer: Vec<char>,
    /// Index into `buffer`, 0..=len.
    cursor: usize,
    /// Committed lines, oldest first.
    history: Vec<String>,
    /// Which history slot is currently displayed.
    recall: usize,
    /// The blocked reader, if any.
    waiter: Option<SyncSender<String>>,
}

/// Mask character echoed in password mode.
const MASK: char = '*';

impl<S: TerminalSink> LineEditor<S> {
    pub fn new(sink: S) -> Self {
        LineEditor {
            read_gate: Mutex::new(()),
            state: Mutex::new(EditorState {
                sink,
                editing: false,
                password: false,
                buffer: Vec::new(),
                cursor: 0,
                history: Vec::new(),
                recall: 0,
                waiter: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, EditorState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until a line is committed by the dispatch thread. `password`
    /// selects masked echo.
    pub fn read_line(&self, password: bool) -> String {
        let _gate = self
            .read_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let receiver: Receiver<String> = {
            let mut state = self.state();
            state.enter_edit(password);
            let (sender, receiver) = mpsc::sync_channel(1);
            state.waiter = Some(sender);
            receiver
        };
        // The rendezvous: dispatch signals from under the state lock, we
        // wake up here. A dropped sender (editor torn down) reads as empty.
        receiver.recv().unwrap_or_default()
    }

    /// True if a `read_line` is pending.
    pub fn is_editing(&self) -> bool {
        self.state().editing
    }

    /// Dispatch one key event. Events outside edit mode are ignored.
    pub fn handle_key(&self, event: &KeyEvent) {
        let mut state = self.state();
        if !state.editing {
            return;
        }
        match *event {
            KeyEvent::Char(c) if !c.is_control() => state.insert_char(c),
            KeyEvent::Char(_) => {}
            KeyEvent::Backspace => state.backspace(),
            KeyEvent::Delete => state.delete(),
            KeyEvent::Escape => state.clear_entered(),
            KeyEvent::Enter => state.commit(),
            KeyEvent::Left => {
                if state.cursor > 0 {
                    state.move_cursor(-1);
                }
            }
            KeyEvent::Right => {
                if state.cursor < state.buffer.len() {
                    state.move_cursor(1);
                }
            }
            KeyEvent::Home => {
                let back = state.cursor as isize;
                state.move_cursor(-back);
            }
            KeyEvent::End => {
                let forward = (state.buffer.len() - state.cursor) as isize;
                state.move_cursor(forward);
            }
            KeyEvent::Up => state.recall_up(),
            KeyEvent::Down => state.recall_down(),
            KeyEvent::PageUp => state.sink.page_up(),
            KeyEvent::PageDown => state.sink.page_down(),
        }
        debug_assert!(state.cursor <= state.buffer.len());
    }
}

impl<S: TerminalSink> EditorState<S> {
    fn enter_edit(&mut self, password: bool) {
        self.sink.set_cursor_kind(CursorKind::Insert);
        self.editing = true;
        self.password = password;
        self.buffer.clear();
        self.cursor = 0;
        // A fresh slot at the tail of the recall buffer holds this line.
        self.recall = self.history.len();
        self.history.push(String::new());
    }

    fn exit_edit(&mut self) {
        self.sink.set_cursor_kind(CursorKind::Invisible);
        self.editing = false;
        if !self.buffer.is_empty() {
            let text: String = self.buffer.iter().collect();
            let last = self.history.len() - 1;
            self.history[last] = text;
        } else {
            self.history.pop();
        }
    }

    fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += 1;

        // The advancing write moves the screen cursor for us.
        let echo = if self.password { MASK } else { c };
        self.sink.write_immediate(echo);

        if self.cursor < self.buffer.len() {
            self.refresh_suffix();
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.move_cursor(-1);
            self.buffer.remove(self.cursor);
            self.refresh_suffix();
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
            self.refresh_suffix();
        }
    }

    fn commit(&mut self) {
        let forward = (self.buffer.len() - self.cursor) as isize;
        self.move_cursor(forward);
        self.sink.write('\n');
        let text: String = self.buffer.iter().collect();
        // Fold into history and wake the reader without releasing the
        // state lock in between.
        self.exit_edit();
        if let Some(waiter) = self.waiter.take() {
            let _ = waiter.send(text);
        }
    }

    /// Blank the visible line and empty the buffer.
    fn clear_entered(&mut self) {
        let back = self.cursor as isize;
        self.move_cursor(-back);
        for c in &mut self.buffer {
            *c = ' ';
        }
        self.refresh_suffix();
        self.buffer.clear();
    }

    fn recall_up(&mut self) {
        let new_index = self.recall.saturating_sub(1);
        self.set_recall(new_index);
    }

    fn recall_down(&mut self) {
        let new_index = (self.recall + 1).min(self.history.len() - 1);
        self.set_recall(new_index);
    }

    fn set_recall(&mut self, new_index: usize) {
        // Unsaved edits stay with the slot being navigated away from.
        self.history[self.recall] = self.buffer.iter().collect();
        self.recall = new_index;

        // Blank out the old text, then draw the new slot's text.
        let old_len = self.buffer.len();
        self.buffer = vec![' '; old_len];
        let back = self.cursor as isize;
        self.move_cursor(-back);
        self.refresh_suffix();

        self.buffer = self.history[self.recall].chars().collect();
        self.refresh_suffix();
        let forward = self.buffer.len() as isize;
        self.move_cursor(forward);
    }

    /// Redraw from the cursor to the end of the line, plus one trailing
    /// blank to erase the previous longest extent, then put the screen
    /// cursor back where it belongs.
    fn refresh_suffix(&mut self) {
        self.sink.set_cursor_kind(CursorKind::Invisible);
        if !self.password {
            let suffix: String = self.buffer[self.cursor..].iter().collect();
            self.sink.write_str(&suffix);
        } else {
            for _ in self.cursor..self.buffer.len() {
                self.sink.write(MASK);
            }
        }
        self.sink.write(' ');
        let delta = (self.buffer.len() - self.cursor + 1) as isize;
        self.cursor = (self.cursor as isize + delta) as usize;
        self.move_cursor(-delta);
        self.sink.set_cursor_kind(CursorKind::Insert);
    }

    /// Move the logical cursor by `delta`, carrying the screen cursor with
    /// it: wrap across line boundaries and scroll when the cursor would
    /// leave the bottom of the window.
    fn move_cursor(&mut self, delta: isize) {
        self.cursor = (self.cursor as isize + delta).max(0) as usize;

        let (x, y) = self.sink.cursor();
        let columns = self.sink.columns() as isize;
        let mut new_x = x as isize + delta;
        let mut new_y = y as isize;
        while new_x < 0 {
            new_y -= 1;
            new_x += columns;
        }
        while new_x >= columns {
            new_y += 1;
            new_x -= columns;
        }
        while new_y >= self.sink.rows() as isize {
            let bottom = self.sink.rows() - 1;
            self.sink.insert_row(bottom);
            new_y -= 1;
        }
        self.sink.set_cursor(new_x as usize, new_y.max(0) as usize);
    }
}
