//! Keycode interpretation.
//!
//! Turns one raw scan-code transition plus the live modifier, lock and
//! compose state into at most one [`KeyEvent`] and one [`KeycodeAction`].
//!
//! ```text
//! code ─► lookup(plain, exact) ─► modifier?  ─► update mask, no event
//!                                 lock?      ─► toggle on first press, no event
//!                                 system?    ─► action on first press, no event
//!                                 compose?   ─► composer, maybe no event
//!                                 otherwise  ─► add live modifiers
//!                                               ─► composition
//!                                               ─► keypad remap (NumLock off)
//!                                               ─► KeyEvent
//! ```

use super::events::KeyEvent;
use crate::keymap::symbols as sym;
use crate::keymap::{HostModifiers, Keymap, TableModifiers, NO_UNICODE, system};
use crate::state::{ComposeState, Composer, DeadKey, Feed, KeyboardState, LedControl, Lock};

// =============================================================================
// Actions
// =============================================================================

/// Side effect requested by a keycode, besides any key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeycodeAction {
    #[default]
    None,
    CapsLock(bool),
    NumLock(bool),
    ScrollLock(bool),
    Reboot,
    PreviousConsole,
    NextConsole,
    /// Switch to the numbered virtual console.
    SwitchConsole(u8),
    /// Terminate the application.
    Zap,
}

impl KeycodeAction {
    fn lock(lock: Lock, on: bool) -> Self {
        match lock {
            Lock::Caps => Self::CapsLock(on),
            Lock::Num => Self::NumLock(on),
            Lock::Scroll => Self::ScrollLock(on),
        }
    }

    /// The LED change this action asks for, if it is a lock action.
    pub fn led_change(self) -> Option<(Lock, bool)> {
        match self {
            Self::CapsLock(on) => Some((Lock::Caps, on)),
            Self::NumLock(on) => Some((Lock::Num, on)),
            Self::ScrollLock(on) => Some((Lock::Scroll, on)),
            _ => None,
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

/// Outcome of resolving one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub event: Option<KeyEvent>,
    pub action: KeycodeAction,
}

impl Resolution {
    fn action(action: KeycodeAction) -> Self {
        Self { event: None, action }
    }

    fn event(event: KeyEvent) -> Self {
        Self { event: Some(event), action: KeycodeAction::None }
    }
}

/// Navigation symbol for a keypad code when NumLock is off.
fn keypad_navigation(code: u16) -> Option<u32> {
    Some(match code {
        71 => sym::HOME,
        72 => sym::UP,
        73 => sym::PAGE_UP,
        75 => sym::LEFT,
        76 => sym::CLEAR,
        77 => sym::RIGHT,
        79 => sym::END,
        80 => sym::DOWN,
        81 => sym::PAGE_DOWN,
        82 => sym::INSERT,
        83 => sym::DELETE,
        _ => return None,
    })
}

// =============================================================================
// Resolver
// =============================================================================

/// Modifier, lock and compose state for one keyboard.
#[derive(Debug, Clone, Default)]
pub struct KeycodeResolver {
    state: KeyboardState,
    composer: Composer,
    zap_enabled: bool,
}

impl KeycodeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zap(mut self, enabled: bool) -> Self {
        self.zap_enabled = enabled;
        self
    }

    pub fn set_zap_enabled(&mut self, enabled: bool) {
        self.zap_enabled = enabled;
    }

    pub fn zap_enabled(&self) -> bool {
        self.zap_enabled
    }

    pub fn state(&self) -> &KeyboardState {
        &self.state
    }

    pub fn compose_state(&self) -> ComposeState {
        self.composer.state()
    }

    /// Clear modifiers and composition, take the locks from the LEDs.
    pub fn reset(&mut self, leds: &mut impl LedControl) {
        self.state.reset(leds);
        self.composer.reset();
    }

    pub fn resolve(&mut self, keymap: &Keymap, code: u16, pressed: bool, autorepeat: bool) -> Resolution {
        let first_press = pressed && !autorepeat;
        let live = self.state.modifiers;
        let caps_lock = self.state.locks.caps_lock;

        let found = keymap.lookup(code, live, caps_lock);
        let Some(entry) = found.selected() else {
            log::trace!("[console-input] no mapping for keycode {} (modifiers {:02x})", code, live.bits());
            return Resolution::default();
        };
        log::trace!(
            "[console-input] keycode {} pressed={} repeat={} -> symbol {:08x} unicode {:04x}",
            code,
            pressed,
            autorepeat,
            entry.symbol,
            entry.unicode
        );

        let mut modifiers = live;
        if caps_lock && found.exact.is_some_and(|m| m.is_letter()) {
            modifiers ^= TableModifiers::SHIFT;
        }

        if entry.is_modifier() && entry.special != 0 {
            let bits = TableModifiers::from_bits_retain(entry.special as u8);
            if pressed {
                self.state.press_modifier(bits);
            } else {
                self.state.release_modifier(bits);
            }
            return Resolution::default();
        }

        if let Some(lock) = Lock::from_symbol(entry.symbol) {
            if !first_press {
                return Resolution::default();
            }
            let on = self.state.locks.toggle(lock);
            log::debug!("[console-input] {:?} lock {}", lock, if on { "on" } else { "off" });
            return Resolution::action(KeycodeAction::lock(lock, on));
        }

        if entry.is_system() && entry.special != 0 {
            if !first_press {
                return Resolution::default();
            }
            return Resolution::action(self.system_action(entry.special));
        }

        let compose = keymap.compose_enabled();

        if compose && HostModifiers::strip(entry.symbol) == sym::MULTI_KEY {
            self.composer.compose_key(first_press);
            return Resolution::default();
        }

        let mut unicode = entry.unicode;
        let mut symbol = entry.symbol;

        if compose && entry.is_dead() {
            match self.composer.dead_key(unicode, first_press) {
                DeadKey::Repeated => symbol = sym::UNKNOWN,
                DeadKey::Pending | DeadKey::Ignored => return Resolution::default(),
            }
        }

        // Plain symbols take the live modifiers on top; an exact entry whose
        // symbol carries its own modifier bits is reported as is.
        let fell_back = found.exact.is_none();
        let bare_exact = found.exact.is_some_and(|m| !HostModifiers::carried_by(m.symbol));
        if fell_back || bare_exact {
            symbol |= HostModifiers::from_table(modifiers).bits();
        }

        if compose && first_press && !entry.is_modifier() {
            match self.composer.feed(unicode, keymap) {
                Feed::Pass => {}
                Feed::Swallow => return Resolution::default(),
                Feed::Emit(composed) => {
                    unicode = composed;
                    symbol = sym::UNKNOWN;
                }
            }
        }

        if !self.state.locks.num_lock && HostModifiers::of(symbol).contains(HostModifiers::KEYPAD) {
            if let Some(nav) = keypad_navigation(code) {
                unicode = NO_UNICODE;
                symbol = nav | HostModifiers::of(symbol).bits();
            }
        }

        Resolution::event(KeyEvent::new(code, unicode, symbol, pressed, autorepeat))
    }

    fn system_action(&self, special: u16) -> KeycodeAction {
        match special {
            system::REBOOT => KeycodeAction::Reboot,
            system::ZAP if self.zap_enabled => KeycodeAction::Zap,
            system::ZAP => {
                log::debug!("[console-input] zap requested but disabled");
                KeycodeAction::None
            }
            system::CONSOLE_PREVIOUS => KeycodeAction::PreviousConsole,
            system::CONSOLE_NEXT => KeycodeAction::NextConsole,
            system::CONSOLE_FIRST..=system::CONSOLE_LAST => {
                KeycodeAction::SwitchConsole((special & system::CONSOLE_MASK) as u8)
            }
            other => {
                log::debug!("[console-input] unknown system action {:#06x}", other);
                KeycodeAction::None
            }
        }
    }
}
