//! Dead-key and Compose-key composition.
//!
//! ```text
//!            Compose key                 key in first column
//!   Idle ─────────────────► AwaitingFirst ──────────────────► AwaitingSecond(accent)
//!    ▲                            │ other key (processed normally)     │
//!    │◄───────────────────────────┘                                    │
//!    │            dead key ───────────────────────────────────────────►│
//!    │◄──────────── next key: composed char, or the bare accent ───────┘
//! ```
//!
//! Only genuine first presses of non-modifier keys move the machine;
//! releases, autorepeats and modifier taps leave it where it is.

use crate::keymap::{Keymap, NO_UNICODE};

/// Where composition stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeState {
    #[default]
    Idle,
    /// The Compose key was pressed; the next key picks the accent.
    AwaitingFirst,
    /// An accent is pending; the next key completes it.
    AwaitingSecond(u16),
}

/// Outcome of a dead-key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadKey {
    /// The accent is now pending. Nothing to report.
    Pending,
    /// Same dead key pressed twice: composition is cancelled and the key is
    /// reported as a plain accent character.
    Repeated,
    /// Release, autorepeat, or a dead key without text. Nothing to report.
    Ignored,
}

/// What to do with an ordinary key after composition had its say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// Not part of a composition; report the key as resolved.
    Pass,
    /// Consumed as the accent of a Compose sequence.
    Swallow,
    /// Report this character instead of the key's own text.
    Emit(u16),
}

#[derive(Debug, Clone, Default)]
pub struct Composer {
    state: ComposeState,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ComposeState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = ComposeState::Idle;
    }

    /// The Compose key went down (or up, or repeated).
    pub fn compose_key(&mut self, first_press: bool) {
        if first_press {
            self.state = ComposeState::AwaitingFirst;
        }
    }

    pub fn dead_key(&mut self, unicode: u16, first_press: bool) -> DeadKey {
        if !first_press {
            return DeadKey::Ignored;
        }
        match self.state {
            ComposeState::AwaitingSecond(pending) if pending == unicode => {
                self.state = ComposeState::Idle;
                DeadKey::Repeated
            }
            _ if unicode != NO_UNICODE => {
                self.state = ComposeState::AwaitingSecond(unicode);
                DeadKey::Pending
            }
            _ => DeadKey::Ignored,
        }
    }

    /// Offer a first press of a non-modifier key.
    pub fn feed(&mut self, unicode: u16, keymap: &Keymap) -> Feed {
        match self.state {
            ComposeState::Idle => Feed::Pass,
            ComposeState::AwaitingFirst => {
                if unicode != NO_UNICODE && keymap.starts_composition(unicode) {
                    self.state = ComposeState::AwaitingSecond(unicode);
                    Feed::Swallow
                } else {
                    self.state = ComposeState::Idle;
                    Feed::Pass
                }
            }
            ComposeState::AwaitingSecond(pending) => {
                self.state = ComposeState::Idle;
                let composed = (unicode != NO_UNICODE)
                    .then(|| keymap.compose(pending, unicode))
                    .flatten()
                    .map(|c| c.result)
                    .filter(|&r| r != NO_UNICODE);
                Feed::Emit(composed.unwrap_or(pending))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::ComposeEntry;

    const ACUTE: u16 = 0xb4;

    fn keymap() -> Keymap {
        Keymap::new(
            vec![],
            vec![
                ComposeEntry::new(ACUTE, 'e' as u16, 0xe9),
                ComposeEntry::new(ACUTE, 'x' as u16, NO_UNICODE),
                ComposeEntry::new('o' as u16, '/' as u16, 0xf8),
            ],
            true,
        )
    }

    #[test]
    fn test_dead_key_then_base() {
        let map = keymap();
        let mut c = Composer::new();
        assert_eq!(c.dead_key(ACUTE, true), DeadKey::Pending);
        assert_eq!(c.state(), ComposeState::AwaitingSecond(ACUTE));
        assert_eq!(c.feed('e' as u16, &map), Feed::Emit(0xe9));
        assert_eq!(c.state(), ComposeState::Idle);
    }

    #[test]
    fn test_dead_key_then_unknown_base_gives_accent() {
        let map = keymap();
        let mut c = Composer::new();
        c.dead_key(ACUTE, true);
        assert_eq!(c.feed('q' as u16, &map), Feed::Emit(ACUTE));
    }

    #[test]
    fn test_none_result_gives_accent() {
        let map = keymap();
        let mut c = Composer::new();
        c.dead_key(ACUTE, true);
        assert_eq!(c.feed('x' as u16, &map), Feed::Emit(ACUTE));
    }

    #[test]
    fn test_dead_key_twice_cancels() {
        let mut c = Composer::new();
        c.dead_key(ACUTE, true);
        assert_eq!(c.dead_key(ACUTE, true), DeadKey::Repeated);
        assert_eq!(c.state(), ComposeState::Idle);
    }

    #[test]
    fn test_different_dead_key_replaces_pending() {
        let mut c = Composer::new();
        c.dead_key(ACUTE, true);
        assert_eq!(c.dead_key(0x60, true), DeadKey::Pending);
        assert_eq!(c.state(), ComposeState::AwaitingSecond(0x60));
    }

    #[test]
    fn test_dead_key_release_and_repeat_ignored() {
        let mut c = Composer::new();
        assert_eq!(c.dead_key(ACUTE, false), DeadKey::Ignored);
        assert_eq!(c.state(), ComposeState::Idle);
        c.dead_key(ACUTE, true);
        assert_eq!(c.dead_key(ACUTE, false), DeadKey::Ignored);
        assert_eq!(c.state(), ComposeState::AwaitingSecond(ACUTE));
    }

    #[test]
    fn test_compose_key_sequence() {
        let map = keymap();
        let mut c = Composer::new();
        c.compose_key(true);
        assert_eq!(c.state(), ComposeState::AwaitingFirst);
        assert_eq!(c.feed('o' as u16, &map), Feed::Swallow);
        assert_eq!(c.feed('/' as u16, &map), Feed::Emit(0xf8));
    }

    #[test]
    fn test_compose_key_abandoned() {
        let map = keymap();
        let mut c = Composer::new();
        c.compose_key(true);
        assert_eq!(c.feed('z' as u16, &map), Feed::Pass);
        assert_eq!(c.state(), ComposeState::Idle);
    }

    #[test]
    fn test_compose_key_release_keeps_state() {
        let mut c = Composer::new();
        c.compose_key(true);
        c.compose_key(false);
        assert_eq!(c.state(), ComposeState::AwaitingFirst);
    }

    #[test]
    fn test_idle_passes() {
        let map = keymap();
        let mut c = Composer::new();
        assert_eq!(c.feed('e' as u16, &map), Feed::Pass);
    }
}
