//! Host Module - Conversion to crossterm events
//!
//! Bridges resolved console events into crossterm's event model, so a UI
//! loop written against crossterm can run on a bare console.
//!
//! # API
//!
//! - `to_host_key` - Convert a resolved KeyEvent to a crossterm KeyEvent
//! - `PointerTracker` - Turn absolute pointer snapshots into crossterm MouseEvents
//! - `HostSink` - EventSink that forwards everything as crossterm Events
//!
//! # Example
//!
//! ```ignore
//! use spark_console_input::{HostSink, KeyboardHandler, NoLeds};
//!
//! let (tx, rx) = std::sync::mpsc::channel();
//! let sink = HostSink::new(move |ev| { let _ = tx.send(ev); });
//! let mut keyboard = KeyboardHandler::new(NoLeds, sink);
//! keyboard.process_byte(30);
//! assert!(rx.try_recv().is_ok());
//! ```

use crossterm::event::{
    Event as CrosstermEvent,
    KeyCode, KeyEventKind, KeyEventState, KeyModifiers,
    KeyEvent as CrosstermKeyEvent,
    ModifierKeyCode,
    MouseButton as CrosstermMouseButton,
    MouseEvent as CrosstermMouseEvent,
    MouseEventKind,
};

use super::events::{EventSink, InputEvent, KeyEvent, MouseButtons, PointerEvent};
use crate::keymap::symbols as sym;
use crate::keymap::HostModifiers;

// =============================================================================
// KEY CONVERSION
// =============================================================================

/// Convert a resolved key event to crossterm's representation.
pub fn to_host_key(event: &KeyEvent) -> CrosstermKeyEvent {
    let kind = if !event.pressed {
        KeyEventKind::Release
    } else if event.autorepeat {
        KeyEventKind::Repeat
    } else {
        KeyEventKind::Press
    };

    let mut state = KeyEventState::NONE;
    if event.modifiers.contains(HostModifiers::KEYPAD) {
        state |= KeyEventState::KEYPAD;
    }

    CrosstermKeyEvent::new_with_kind_and_state(
        convert_key_code(event),
        convert_modifiers(event.modifiers),
        kind,
        state,
    )
}

fn convert_key_code(event: &KeyEvent) -> KeyCode {
    if let Some(code) = special_key(event.symbol) {
        return code;
    }
    match event.unicode {
        Some(c) if !c.is_control() => KeyCode::Char(c),
        // Control combinations carry a C0 character; report the base key.
        _ => latin1(event.symbol).map(KeyCode::Char).unwrap_or(KeyCode::Null),
    }
}

fn latin1(symbol: u32) -> Option<char> {
    match symbol {
        0x20..=0x7e | 0xa0..=0xff => Some(char::from(symbol as u8).to_ascii_lowercase()),
        _ => None,
    }
}

fn special_key(symbol: u32) -> Option<KeyCode> {
    let code = match symbol {
        sym::ESCAPE => KeyCode::Esc,
        sym::TAB => KeyCode::Tab,
        sym::BACKTAB => KeyCode::BackTab,
        sym::BACKSPACE => KeyCode::Backspace,
        sym::RETURN | sym::ENTER => KeyCode::Enter,
        sym::INSERT => KeyCode::Insert,
        sym::DELETE => KeyCode::Delete,
        sym::PAUSE => KeyCode::Pause,
        sym::PRINT | sym::SYS_REQ => KeyCode::PrintScreen,
        sym::CLEAR => KeyCode::KeypadBegin,
        sym::HOME => KeyCode::Home,
        sym::END => KeyCode::End,
        sym::LEFT => KeyCode::Left,
        sym::UP => KeyCode::Up,
        sym::RIGHT => KeyCode::Right,
        sym::DOWN => KeyCode::Down,
        sym::PAGE_UP => KeyCode::PageUp,
        sym::PAGE_DOWN => KeyCode::PageDown,
        sym::CAPS_LOCK => KeyCode::CapsLock,
        sym::NUM_LOCK => KeyCode::NumLock,
        sym::SCROLL_LOCK => KeyCode::ScrollLock,
        sym::MENU => KeyCode::Menu,
        sym::SHIFT => KeyCode::Modifier(ModifierKeyCode::LeftShift),
        sym::CONTROL => KeyCode::Modifier(ModifierKeyCode::LeftControl),
        sym::ALT => KeyCode::Modifier(ModifierKeyCode::LeftAlt),
        sym::META => KeyCode::Modifier(ModifierKeyCode::LeftMeta),
        sym::ALT_GR => KeyCode::Modifier(ModifierKeyCode::IsoLevel3Shift),
        sym::F1..=sym::F35 => KeyCode::F((symbol - sym::F1 + 1) as u8),
        _ => return None,
    };
    Some(code)
}

/// Convert host modifier bits to crossterm modifiers. Keypad is a key state,
/// not a modifier, and is left out.
fn convert_modifiers(mods: HostModifiers) -> KeyModifiers {
    let mut out = KeyModifiers::NONE;
    out.set(KeyModifiers::SHIFT, mods.contains(HostModifiers::SHIFT));
    out.set(KeyModifiers::CONTROL, mods.contains(HostModifiers::CONTROL));
    out.set(KeyModifiers::ALT, mods.contains(HostModifiers::ALT));
    out.set(KeyModifiers::META, mods.contains(HostModifiers::META));
    out
}

// =============================================================================
// POINTER CONVERSION
// =============================================================================

const BUTTONS: [(MouseButtons, CrosstermMouseButton); 3] = [
    (MouseButtons::LEFT, CrosstermMouseButton::Left),
    (MouseButtons::RIGHT, CrosstermMouseButton::Right),
    (MouseButtons::MIDDLE, CrosstermMouseButton::Middle),
];

/// Remembers the last pointer snapshot to derive crossterm's edge events.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    last: Option<PointerEvent>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events for the step from the previous snapshot to `current`.
    ///
    /// Motion comes first (Drag with a previously held button, else Moved),
    /// then button edges, then one scroll event per wheel step.
    pub fn update(&mut self, current: &PointerEvent) -> Vec<CrosstermMouseEvent> {
        let prev = self.last.unwrap_or(PointerEvent { wheel: 0, buttons: MouseButtons::empty(), ..*current });
        let (column, row) = (to_cell(current.x), to_cell(current.y));
        let event = |kind| CrosstermMouseEvent { kind, column, row, modifiers: KeyModifiers::NONE };
        let mut out = Vec::new();

        if (prev.x, prev.y) != (current.x, current.y) {
            let held = BUTTONS.iter().find(|(b, _)| prev.buttons.contains(*b));
            out.push(event(match held {
                Some(&(_, button)) => MouseEventKind::Drag(button),
                None => MouseEventKind::Moved,
            }));
        }

        for (bit, button) in BUTTONS {
            match (prev.buttons.contains(bit), current.buttons.contains(bit)) {
                (false, true) => out.push(event(MouseEventKind::Down(button))),
                (true, false) => out.push(event(MouseEventKind::Up(button))),
                _ => {}
            }
        }

        let scroll = if current.wheel < 0 { MouseEventKind::ScrollUp } else { MouseEventKind::ScrollDown };
        for _ in 0..current.wheel.unsigned_abs() {
            out.push(event(scroll));
        }

        self.last = Some(*current);
        out
    }
}

fn to_cell(v: i32) -> u16 {
    v.clamp(0, i32::from(u16::MAX)) as u16
}

// =============================================================================
// SINK
// =============================================================================

/// Forwards key and pointer events as crossterm events. System actions are
/// for the host to handle directly and are not forwarded.
pub struct HostSink<F: FnMut(CrosstermEvent)> {
    tracker: PointerTracker,
    emit: F,
}

impl<F: FnMut(CrosstermEvent)> HostSink<F> {
    pub fn new(emit: F) -> Self {
        Self { tracker: PointerTracker::new(), emit }
    }
}

impl<F: FnMut(CrosstermEvent)> EventSink for HostSink<F> {
    fn deliver(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key(key) => (self.emit)(CrosstermEvent::Key(to_host_key(&key))),
            InputEvent::Pointer(pointer) => {
                for mouse in self.tracker.update(&pointer) {
                    (self.emit)(CrosstermEvent::Mouse(mouse));
                }
            }
            InputEvent::System(action) => {
                log::debug!("[console-input] host sink ignoring {:?}", action);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
