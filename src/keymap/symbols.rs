//! Key symbols and host modifier bits.
//!
//! Symbols share one `u32` word with the host modifier bits, the layout the
//! `.qmap` format stores. Printable keys use their Latin-1 code point
//! (letters uppercase); everything else lives above `0x0100_0000`.

use super::TableModifiers;

// =============================================================================
// Symbols
// =============================================================================

pub const ESCAPE: u32 = 0x0100_0000;
pub const TAB: u32 = 0x0100_0001;
pub const BACKTAB: u32 = 0x0100_0002;
pub const BACKSPACE: u32 = 0x0100_0003;
pub const RETURN: u32 = 0x0100_0004;
pub const ENTER: u32 = 0x0100_0005;
pub const INSERT: u32 = 0x0100_0006;
pub const DELETE: u32 = 0x0100_0007;
pub const PAUSE: u32 = 0x0100_0008;
pub const PRINT: u32 = 0x0100_0009;
pub const SYS_REQ: u32 = 0x0100_000a;
pub const CLEAR: u32 = 0x0100_000b;

pub const HOME: u32 = 0x0100_0010;
pub const END: u32 = 0x0100_0011;
pub const LEFT: u32 = 0x0100_0012;
pub const UP: u32 = 0x0100_0013;
pub const RIGHT: u32 = 0x0100_0014;
pub const DOWN: u32 = 0x0100_0015;
pub const PAGE_UP: u32 = 0x0100_0016;
pub const PAGE_DOWN: u32 = 0x0100_0017;

pub const SHIFT: u32 = 0x0100_0020;
pub const CONTROL: u32 = 0x0100_0021;
pub const META: u32 = 0x0100_0022;
pub const ALT: u32 = 0x0100_0023;
pub const CAPS_LOCK: u32 = 0x0100_0024;
pub const NUM_LOCK: u32 = 0x0100_0025;
pub const SCROLL_LOCK: u32 = 0x0100_0026;

/// F1; F2..F35 follow contiguously.
pub const F1: u32 = 0x0100_0030;
pub const F35: u32 = 0x0100_0052;

pub const MENU: u32 = 0x0100_0055;
pub const ALT_GR: u32 = 0x0100_1103;

/// The Compose key.
pub const MULTI_KEY: u32 = 0x0100_1120;

pub const DEAD_GRAVE: u32 = 0x0100_1250;
pub const DEAD_ACUTE: u32 = 0x0100_1251;
pub const DEAD_CIRCUMFLEX: u32 = 0x0100_1252;
pub const DEAD_TILDE: u32 = 0x0100_1253;
pub const DEAD_DIAERESIS: u32 = 0x0100_1257;

/// No symbol. Composed characters are reported with this.
pub const UNKNOWN: u32 = 0x01ff_ffff;

/// Function key `n` (1-based).
pub const fn function(n: u8) -> u32 {
    F1 + n as u32 - 1
}

// =============================================================================
// Host modifiers
// =============================================================================

bitflags::bitflags! {
    /// Modifier bits as reported to the host, stored in the symbol word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HostModifiers: u32 {
        const SHIFT   = 0x0200_0000;
        const CONTROL = 0x0400_0000;
        const ALT     = 0x0800_0000;
        const META    = 0x1000_0000;
        const KEYPAD  = 0x2000_0000;
    }
}

impl HostModifiers {
    /// The modifier bits carried by a symbol word.
    pub const fn of(symbol: u32) -> Self {
        Self::from_bits_truncate(symbol)
    }

    /// True if `symbol` carries any modifier bit of its own.
    pub const fn carried_by(symbol: u32) -> bool {
        symbol & Self::all().bits() != 0
    }

    /// Strip modifier bits from a symbol word.
    pub const fn strip(symbol: u32) -> u32 {
        symbol & !Self::all().bits()
    }

    /// Translate a table modifier mask. AltGr has no host bit.
    pub fn from_table(mods: TableModifiers) -> Self {
        let mut host = Self::empty();
        if mods.intersects(TableModifiers::SHIFT | TableModifiers::SHIFT_L | TableModifiers::SHIFT_R) {
            host |= Self::SHIFT;
        }
        if mods.intersects(TableModifiers::CONTROL | TableModifiers::CTRL_L | TableModifiers::CTRL_R) {
            host |= Self::CONTROL;
        }
        if mods.contains(TableModifiers::ALT) {
            host |= Self::ALT;
        }
        host
    }
}
