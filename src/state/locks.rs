//! Modifier and lock state, mirrored on the keyboard LEDs.
//!
//! Modifiers change only on press/release of `IS_MODIFIER` mappings. Locks
//! toggle only on a genuine first press and start from whatever the LEDs
//! show when the keymap is (re)loaded.

use std::io;

use crate::keymap::TableModifiers;

// =============================================================================
// LEDs
// =============================================================================

bitflags::bitflags! {
    /// Keyboard LED mask as read from and written to the device.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Leds: i32 {
        const CAPS_LOCK   = 0x01;
        const NUM_LOCK    = 0x02;
        const SCROLL_LOCK = 0x04;
    }
}

/// Read and drive the keyboard LEDs.
pub trait LedControl {
    fn leds(&mut self) -> io::Result<Leds>;
    fn set_leds(&mut self, leds: Leds) -> io::Result<()>;
}

impl<T: LedControl + ?Sized> LedControl for &mut T {
    fn leds(&mut self) -> io::Result<Leds> {
        (**self).leds()
    }

    fn set_leds(&mut self, leds: Leds) -> io::Result<()> {
        (**self).set_leds(leds)
    }
}

/// A keyboard without controllable LEDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLeds;

impl LedControl for NoLeds {
    fn leds(&mut self) -> io::Result<Leds> {
        Err(io::ErrorKind::Unsupported.into())
    }

    fn set_leds(&mut self, _leds: Leds) -> io::Result<()> {
        Err(io::ErrorKind::Unsupported.into())
    }
}

/// Set or clear one LED, leaving the others as the device reports them.
/// Failures are logged and otherwise ignored.
pub fn switch_led(ctl: &mut impl LedControl, lock: Lock, on: bool) {
    let mut leds = match ctl.leds() {
        Ok(leds) => leds,
        Err(e) => {
            log::warn!("[console-input] switch_led: failed to query led states: {}", e);
            return;
        }
    };
    leds.set(lock.led(), on);
    if let Err(e) = ctl.set_leds(leds) {
        log::warn!("[console-input] switch_led: failed to set led states: {}", e);
    }
}

// =============================================================================
// Locks
// =============================================================================

/// One of the three toggle locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lock {
    Caps,
    Num,
    Scroll,
}

impl Lock {
    /// The lock a key symbol toggles, if any.
    pub fn from_symbol(symbol: u32) -> Option<Self> {
        use crate::keymap::symbols as sym;
        match symbol {
            sym::CAPS_LOCK => Some(Self::Caps),
            sym::NUM_LOCK => Some(Self::Num),
            sym::SCROLL_LOCK => Some(Self::Scroll),
            _ => None,
        }
    }

    pub fn led(self) -> Leds {
        match self {
            Self::Caps => Leds::CAPS_LOCK,
            Self::Num => Leds::NUM_LOCK,
            Self::Scroll => Leds::SCROLL_LOCK,
        }
    }
}

/// The three lock booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockState {
    pub caps_lock: bool,
    pub num_lock: bool,
    pub scroll_lock: bool,
}

impl LockState {
    pub fn from_leds(leds: Leds) -> Self {
        Self {
            caps_lock: leds.contains(Leds::CAPS_LOCK),
            num_lock: leds.contains(Leds::NUM_LOCK),
            scroll_lock: leds.contains(Leds::SCROLL_LOCK),
        }
    }

    pub fn get(&self, lock: Lock) -> bool {
        match lock {
            Lock::Caps => self.caps_lock,
            Lock::Num => self.num_lock,
            Lock::Scroll => self.scroll_lock,
        }
    }

    pub fn set(&mut self, lock: Lock, on: bool) {
        match lock {
            Lock::Caps => self.caps_lock = on,
            Lock::Num => self.num_lock = on,
            Lock::Scroll => self.scroll_lock = on,
        }
    }

    /// Flip a lock and return its new value.
    pub fn toggle(&mut self, lock: Lock) -> bool {
        let on = !self.get(lock);
        self.set(lock, on);
        on
    }
}

// =============================================================================
// Keyboard state
// =============================================================================

/// Live modifier mask plus lock state for one keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardState {
    pub modifiers: TableModifiers,
    pub locks: LockState,
}

impl KeyboardState {
    /// Clear modifiers and take the locks from the LEDs.
    ///
    /// If the LEDs can't be read every lock is forced off and the LEDs are
    /// cleared to match.
    pub fn reset(&mut self, ctl: &mut impl LedControl) {
        self.modifiers = TableModifiers::empty();
        match ctl.leds() {
            Ok(leds) => {
                self.locks = LockState::from_leds(leds);
                log::debug!(
                    "[console-input] locks from leds: caps={} num={} scroll={}",
                    self.locks.caps_lock,
                    self.locks.num_lock,
                    self.locks.scroll_lock
                );
            }
            Err(e) => {
                log::warn!("[console-input] failed to query led states ({}), setting all locks off", e);
                self.locks = LockState::default();
                if let Err(e) = ctl.set_leds(Leds::empty()) {
                    log::warn!("[console-input] failed to clear led states: {}", e);
                }
            }
        }
    }

    pub fn press_modifier(&mut self, bits: TableModifiers) {
        self.modifiers |= bits;
    }

    pub fn release_modifier(&mut self, bits: TableModifiers) {
        self.modifiers -= bits;
    }
}
