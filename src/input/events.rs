//! Resolved input events and where they go.
//!
//! Handlers push [`InputEvent`]s into an [`EventSink`]. Delivery is
//! fire-and-forget: a sink that can't take an event drops it.

use std::collections::VecDeque;
use std::sync::mpsc::Sender;

use super::resolver::KeycodeAction;
use crate::keymap::HostModifiers;
use crate::keymap::NO_UNICODE;

// =============================================================================
// Event Types
// =============================================================================

/// One resolved key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The raw scan code (0..=127).
    pub native_code: u16,
    /// Text produced by the key, if any.
    pub unicode: Option<char>,
    /// Key symbol with modifier bits stripped.
    pub symbol: u32,
    pub modifiers: HostModifiers,
    pub pressed: bool,
    pub autorepeat: bool,
}

impl KeyEvent {
    /// Split a resolved symbol word and table unicode value into an event.
    pub fn new(native_code: u16, unicode: u16, symbol_word: u32, pressed: bool, autorepeat: bool) -> Self {
        Self {
            native_code,
            unicode: text(unicode),
            symbol: HostModifiers::strip(symbol_word),
            modifiers: HostModifiers::of(symbol_word),
            pressed,
            autorepeat,
        }
    }
}

fn text(unicode: u16) -> Option<char> {
    if unicode == NO_UNICODE {
        None
    } else {
        char::from_u32(u32::from(unicode))
    }
}

bitflags::bitflags! {
    /// Pointer buttons currently held.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseButtons: u8 {
        const LEFT   = 0x01;
        const MIDDLE = 0x02;
        const RIGHT  = 0x04;
    }
}

/// Absolute pointer state after one burst of packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerEvent {
    pub x: i32,
    pub y: i32,
    pub buttons: MouseButtons,
    /// Wheel steps accumulated over the burst; negative is away from the user.
    pub wheel: i32,
}

/// Everything a handler can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Pointer(PointerEvent),
    /// Console switching, reboot and zap requests for the host to act on.
    System(KeycodeAction),
}

// =============================================================================
// Sinks
// =============================================================================

/// Receiver of resolved events.
pub trait EventSink {
    fn deliver(&mut self, event: InputEvent);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn deliver(&mut self, event: InputEvent) {
        (**self).deliver(event);
    }
}

impl EventSink for Vec<InputEvent> {
    fn deliver(&mut self, event: InputEvent) {
        self.push(event);
    }
}

impl EventSink for Sender<InputEvent> {
    fn deliver(&mut self, event: InputEvent) {
        if self.send(event).is_err() {
            log::debug!("[console-input] event receiver gone, dropping {:?}", event);
        }
    }
}

/// Maximum events held by an [`EventQueue`].
pub const MAX_EVENTS: usize = 256;

/// Bounded FIFO of events. When full the oldest event is overwritten.
#[derive(Debug)]
pub struct EventQueue {
    events: VecDeque<InputEvent>,
    dropped: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(MAX_EVENTS),
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        if self.events.len() == MAX_EVENTS {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }

    /// Number of pending events.
    pub fn pending_count(&self) -> usize {
        self.events.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.events.is_empty()
    }

    /// Events lost to overflow since creation.
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    /// Drain all pending events.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        self.events.drain(..).collect()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventQueue {
    fn deliver(&mut self, event: InputEvent) {
        self.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::symbols;

    fn pointer(x: i32) -> InputEvent {
        InputEvent::Pointer(PointerEvent { x, ..Default::default() })
    }

    #[test]
    fn test_key_event_splits_symbol_word() {
        let word = symbols::HOME | HostModifiers::KEYPAD.bits();
        let ev = KeyEvent::new(71, NO_UNICODE, word, true, false);
        assert_eq!(ev.symbol, symbols::HOME);
        assert_eq!(ev.modifiers, HostModifiers::KEYPAD);
        assert_eq!(ev.unicode, None);
    }

    #[test]
    fn test_key_event_text() {
        let ev = KeyEvent::new(18, 0xe9, symbols::UNKNOWN, true, false);
        assert_eq!(ev.unicode, Some('é'));
        let surrogate = KeyEvent::new(18, 0xd800, symbols::UNKNOWN, true, false);
        assert_eq!(surrogate.unicode, None);
    }

    #[test]
    fn test_queue_push_pop() {
        let mut q = EventQueue::new();
        assert!(!q.has_pending());

        q.push(pointer(1));
        assert!(q.has_pending());
        assert_eq!(q.pending_count(), 1);

        assert_eq!(q.pop(), Some(pointer(1)));
        assert!(!q.has_pending());
    }

    #[test]
    fn test_queue_overwrites_oldest() {
        let mut q = EventQueue::new();
        for i in 0..(MAX_EVENTS as i32 + 2) {
            q.push(pointer(i));
        }
        assert_eq!(q.pending_count(), MAX_EVENTS);
        assert_eq!(q.dropped_count(), 2);
        assert_eq!(q.pop(), Some(pointer(2)));
    }

    #[test]
    fn test_queue_drain() {
        let mut q = EventQueue::new();
        q.deliver(pointer(1));
        q.deliver(InputEvent::System(KeycodeAction::Reboot));
        let events = q.drain();
        assert_eq!(events, vec![pointer(1), InputEvent::System(KeycodeAction::Reboot)]);
        assert!(!q.has_pending());
    }

    #[test]
    fn test_channel_sink_survives_closed_receiver() {
        let (mut tx, rx) = std::sync::mpsc::channel();
        tx.deliver(pointer(3));
        assert_eq!(rx.recv().unwrap(), pointer(3));
        drop(rx);
        tx.deliver(pointer(4));
    }
}
