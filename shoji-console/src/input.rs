//! Input event model and fan-out.
//!
//! Events are dispatched through explicit per-category registries; there is
//! no base-class event plumbing to inherit from. The input thread calls
//! `dispatch_*`, subscribers get a shared reference to the event.

use std::sync::Mutex;

/// A keyboard event, already translated from whatever windowing toolkit
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// A typed character. Control characters are not delivered here.
    Char(char),
    Enter,
    Backspace,
    Delete,
    Escape,
    Left,
    Right,
    Home,
    End,
    Up,
    Down,
    PageUp,
    PageDown,
}

/// Which half of the cell the pointer landed in; lets selection code snap
/// to the nearer cell boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Press,
    Release,
    Click,
    Move,
    Drag,
}

/// A pointer event in cell coordinates. `row` may be negative when the
/// user has scrolled back; negative rows address scrollback lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub col: usize,
    pub row: isize,
    pub kind: PointerKind,
    pub bias: Bias,
    pub clicks: u8,
}

type KeyListener = Box<dyn Fn(&KeyEvent) + Send>;
type PointerListener = Box<dyn Fn(&PointerEvent) + Send>;

/// Subscriber registries for the input event categories.
#[derive(Default)]
pub struct EventHub {
    key_listeners: Mutex<Vec<KeyListener>>,
    pointer_listeners: Mutex<Vec<PointerListener>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key(&self, listener: KeyListener) {
        self.key_listeners.lock().unwrap_or_else(|e| e.into_inner()).push(listener);
    }

    pub fn on_pointer(&self, listener: PointerListener) {
        self.pointer_listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(listener);
    }

    pub fn dispatch_key(&self, event: &KeyEvent) {
        let listeners = self.key_listeners.lock().unwrap_or_else(|e| e.into_inner());
        for listener in listeners.iter() {
            listener(event);
        }
    }

    pub fn dispatch_pointer(&self, event: &PointerEvent) {
        let listeners = self
            .pointer_listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        for listener in listeners.iter() {
            listener(event);
        }
    }
}
