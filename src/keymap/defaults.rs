//! Built-in US keymap for AT set-1 key codes.
//!
//! Codes 1-88 are the classic XT layout. Extended keys use the console's
//! key-code mode numbering: 89 keypad Enter, 90 right Control, 91 keypad
//! slash, 92 PrintScreen, 93 right Alt (AltGr), 94-103 the navigation
//! block, 104/105 left/right Meta, 106 Menu, 107 Pause.
//!
//! AltGr on the grave, apostrophe and `6` keys produces dead accents and
//! the right Meta key is Compose; both only act once composition is on.

use super::symbols::{self as sym, HostModifiers};
use super::{system, ComposeEntry, Mapping, MappingFlags, TableModifiers};

// =============================================================================
// Builders
// =============================================================================

const NONE: TableModifiers = TableModifiers::empty();
const SHIFT: TableModifiers = TableModifiers::SHIFT;
const CTRL: TableModifiers = TableModifiers::CONTROL;
const ALT: TableModifiers = TableModifiers::ALT;
const ALTGR: TableModifiers = TableModifiers::ALT_GR;
const ALTGR_SHIFT: TableModifiers = TableModifiers::ALT_GR.union(TableModifiers::SHIFT);
const CTRL_ALT: TableModifiers = TableModifiers::CONTROL.union(TableModifiers::ALT);

const KP: u32 = HostModifiers::KEYPAD.bits();
const NO_TEXT: u16 = super::NO_UNICODE;

const fn key(code: u16, symbol: u32) -> Mapping {
    Mapping::new(code, NO_TEXT, symbol, NONE, MappingFlags::empty(), 0)
}

const fn text(code: u16, ch: char, symbol: u32, mods: TableModifiers) -> Mapping {
    Mapping::new(code, ch as u16, symbol, mods, MappingFlags::empty(), 0)
}

/// A printable ASCII key whose symbol is the character itself.
const fn ascii(code: u16, ch: char, mods: TableModifiers) -> Mapping {
    text(code, ch, ch as u32, mods)
}

const fn letter(code: u16, ch: char, mods: TableModifiers) -> Mapping {
    let upper = (ch as u8).to_ascii_uppercase() as u32;
    Mapping::new(code, ch as u16, upper, mods, MappingFlags::IS_LETTER, 0)
}

/// Control+letter: the C0 control character.
const fn control(code: u16, upper: char) -> Mapping {
    Mapping::new(code, upper as u16 - 0x40, upper as u32, CTRL, MappingFlags::empty(), 0)
}

const fn keypad(code: u16, ch: char, symbol: u32) -> Mapping {
    Mapping::new(code, ch as u16, symbol | KP, NONE, MappingFlags::empty(), 0)
}

const fn modifier(code: u16, symbol: u32, held: TableModifiers) -> Mapping {
    Mapping::new(code, NO_TEXT, symbol, NONE, MappingFlags::IS_MODIFIER, held.bits() as u16)
}

const fn dead(code: u16, accent: u16, symbol: u32, mods: TableModifiers) -> Mapping {
    Mapping::new(code, accent, symbol, mods, MappingFlags::IS_DEAD, 0)
}

const fn sys_key(code: u16, symbol: u32, mods: TableModifiers, action: u16) -> Mapping {
    Mapping::new(code, NO_TEXT, symbol, mods, MappingFlags::IS_SYSTEM, action)
}

const fn console(code: u16, n: u8) -> Mapping {
    sys_key(code, sym::function(n + 1), ALT, system::CONSOLE_FIRST + n as u16)
}

/// Plain, shifted and Control variants of a letter key.
macro_rules! letter_key {
    ($code:expr, $lower:expr, $upper:expr) => {
        [letter($code, $lower, NONE), letter($code, $upper, SHIFT), control($code, $upper)]
    };
}

// =============================================================================
// Tables
// =============================================================================

const LETTERS: [[Mapping; 3]; 26] = [
    letter_key!(16, 'q', 'Q'),
    letter_key!(17, 'w', 'W'),
    letter_key!(18, 'e', 'E'),
    letter_key!(19, 'r', 'R'),
    letter_key!(20, 't', 'T'),
    letter_key!(21, 'y', 'Y'),
    letter_key!(22, 'u', 'U'),
    letter_key!(23, 'i', 'I'),
    letter_key!(24, 'o', 'O'),
    letter_key!(25, 'p', 'P'),
    letter_key!(30, 'a', 'A'),
    letter_key!(31, 's', 'S'),
    letter_key!(32, 'd', 'D'),
    letter_key!(33, 'f', 'F'),
    letter_key!(34, 'g', 'G'),
    letter_key!(35, 'h', 'H'),
    letter_key!(36, 'j', 'J'),
    letter_key!(37, 'k', 'K'),
    letter_key!(38, 'l', 'L'),
    letter_key!(44, 'z', 'Z'),
    letter_key!(45, 'x', 'X'),
    letter_key!(46, 'c', 'C'),
    letter_key!(47, 'v', 'V'),
    letter_key!(48, 'b', 'B'),
    letter_key!(49, 'n', 'N'),
    letter_key!(50, 'm', 'M'),
];

const OTHER_KEYS: &[Mapping] = &[
    // Escape and the number row
    text(1, '\u{1b}', sym::ESCAPE, NONE),
    ascii(2, '1', NONE),
    ascii(2, '!', SHIFT),
    ascii(3, '2', NONE),
    ascii(3, '@', SHIFT),
    ascii(4, '3', NONE),
    ascii(4, '#', SHIFT),
    ascii(5, '4', NONE),
    ascii(5, '$', SHIFT),
    ascii(6, '5', NONE),
    ascii(6, '%', SHIFT),
    ascii(7, '6', NONE),
    ascii(7, '^', SHIFT),
    dead(7, 0x5e, sym::DEAD_CIRCUMFLEX, ALTGR),
    ascii(8, '7', NONE),
    ascii(8, '&', SHIFT),
    ascii(9, '8', NONE),
    ascii(9, '*', SHIFT),
    ascii(10, '9', NONE),
    ascii(10, '(', SHIFT),
    ascii(11, '0', NONE),
    ascii(11, ')', SHIFT),
    ascii(12, '-', NONE),
    ascii(12, '_', SHIFT),
    ascii(13, '=', NONE),
    ascii(13, '+', SHIFT),
    text(14, '\u{8}', sym::BACKSPACE, NONE),
    sys_key(14, sym::BACKSPACE, CTRL_ALT, system::ZAP),
    text(15, '\t', sym::TAB, NONE),
    // Punctuation
    ascii(26, '[', NONE),
    ascii(26, '{', SHIFT),
    ascii(27, ']', NONE),
    ascii(27, '}', SHIFT),
    text(28, '\r', sym::RETURN, NONE),
    ascii(39, ';', NONE),
    ascii(39, ':', SHIFT),
    ascii(40, '\'', NONE),
    ascii(40, '"', SHIFT),
    dead(40, 0xb4, sym::DEAD_ACUTE, ALTGR),
    dead(40, 0xa8, sym::DEAD_DIAERESIS, ALTGR_SHIFT),
    ascii(41, '`', NONE),
    ascii(41, '~', SHIFT),
    dead(41, 0x60, sym::DEAD_GRAVE, ALTGR),
    dead(41, 0x7e, sym::DEAD_TILDE, ALTGR_SHIFT),
    ascii(43, '\\', NONE),
    ascii(43, '|', SHIFT),
    ascii(51, ',', NONE),
    ascii(51, '<', SHIFT),
    ascii(52, '.', NONE),
    ascii(52, '>', SHIFT),
    ascii(53, '/', NONE),
    ascii(53, '?', SHIFT),
    ascii(57, ' ', NONE),
    ascii(57, ' ', SHIFT),
    // Modifiers and locks
    modifier(29, sym::CONTROL, CTRL),
    modifier(42, sym::SHIFT, SHIFT),
    modifier(54, sym::SHIFT, SHIFT),
    modifier(56, sym::ALT, ALT),
    modifier(90, sym::CONTROL, CTRL),
    modifier(93, sym::ALT_GR, ALTGR),
    key(58, sym::CAPS_LOCK),
    key(69, sym::NUM_LOCK),
    key(70, sym::SCROLL_LOCK),
    // Function keys, Alt+Fn switches consoles
    key(59, sym::function(1)),
    key(60, sym::function(2)),
    key(61, sym::function(3)),
    key(62, sym::function(4)),
    key(63, sym::function(5)),
    key(64, sym::function(6)),
    key(65, sym::function(7)),
    key(66, sym::function(8)),
    key(67, sym::function(9)),
    key(68, sym::function(10)),
    key(87, sym::function(11)),
    key(88, sym::function(12)),
    console(59, 0),
    console(60, 1),
    console(61, 2),
    console(62, 3),
    console(63, 4),
    console(64, 5),
    console(65, 6),
    console(66, 7),
    console(67, 8),
    console(68, 9),
    console(87, 10),
    console(88, 11),
    // Keypad
    keypad(55, '*', '*' as u32),
    keypad(71, '7', '7' as u32),
    keypad(72, '8', '8' as u32),
    keypad(73, '9', '9' as u32),
    keypad(74, '-', '-' as u32),
    keypad(75, '4', '4' as u32),
    keypad(76, '5', '5' as u32),
    keypad(77, '6', '6' as u32),
    keypad(78, '+', '+' as u32),
    keypad(79, '1', '1' as u32),
    keypad(80, '2', '2' as u32),
    keypad(81, '3', '3' as u32),
    keypad(82, '0', '0' as u32),
    keypad(83, '.', '.' as u32),
    sys_key(83, sym::DELETE, CTRL_ALT, system::REBOOT),
    keypad(89, '\r', sym::ENTER),
    keypad(91, '/', '/' as u32),
    // Navigation block
    key(92, sym::PRINT),
    key(94, sym::HOME),
    key(95, sym::UP),
    key(96, sym::PAGE_UP),
    key(97, sym::LEFT),
    sys_key(97, sym::LEFT, ALT, system::CONSOLE_PREVIOUS),
    key(98, sym::RIGHT),
    sys_key(98, sym::RIGHT, ALT, system::CONSOLE_NEXT),
    key(99, sym::END),
    key(100, sym::DOWN),
    key(101, sym::PAGE_DOWN),
    key(102, sym::INSERT),
    text(103, '\u{7f}', sym::DELETE, NONE),
    sys_key(103, sym::DELETE, CTRL_ALT, system::REBOOT),
    key(104, sym::META),
    key(105, sym::MULTI_KEY),
    key(106, sym::MENU),
    key(107, sym::PAUSE),
    // Shifted Tab is Backtab; keep Control variants of the punctuation
    // that produces C0 characters on a terminal.
    Mapping::new(15, NO_TEXT, sym::BACKTAB, SHIFT, MappingFlags::empty(), 0),
    Mapping::new(26, 0x1b, '[' as u32, CTRL, MappingFlags::empty(), 0),
    Mapping::new(43, 0x1c, '\\' as u32, CTRL, MappingFlags::empty(), 0),
    Mapping::new(27, 0x1d, ']' as u32, CTRL, MappingFlags::empty(), 0),
    Mapping::new(7, 0x1e, '6' as u32, CTRL, MappingFlags::empty(), 0),
    Mapping::new(12, 0x1f, '-' as u32, CTRL, MappingFlags::empty(), 0),
    Mapping::new(3, 0x00, '2' as u32, CTRL, MappingFlags::empty(), 0),
    Mapping::new(57, 0x00, ' ' as u32, CTRL, MappingFlags::empty(), 0),
    // Shifted Escape and Return keep their text
    Mapping::new(1, 0x1b, sym::ESCAPE, SHIFT, MappingFlags::empty(), 0),
    Mapping::new(28, '\r' as u16, sym::RETURN, SHIFT, MappingFlags::empty(), 0),
];

const TABLE_LEN: usize = LETTERS.len() * 3 + OTHER_KEYS.len();

const fn flatten() -> [Mapping; TABLE_LEN] {
    let mut out = [key(0, 0); TABLE_LEN];
    let mut n = 0;
    let mut i = 0;
    while i < LETTERS.len() {
        let mut j = 0;
        while j < 3 {
            out[n] = LETTERS[i][j];
            n += 1;
            j += 1;
        }
        i += 1;
    }
    let mut k = 0;
    while k < OTHER_KEYS.len() {
        out[n] = OTHER_KEYS[k];
        n += 1;
        k += 1;
    }
    out
}

static TABLE: [Mapping; TABLE_LEN] = flatten();

/// The built-in mapping table.
pub static KEYMAP: &[Mapping] = &TABLE;

/// Latin-1 compositions. The same pairs serve dead keys (accent first) and
/// the Compose key (any starting character).
pub static COMPOSE: &[ComposeEntry] = &[
    // grave
    ComposeEntry::new(0x60, 0x61, 0xe0),
    ComposeEntry::new(0x60, 0x65, 0xe8),
    ComposeEntry::new(0x60, 0x69, 0xec),
    ComposeEntry::new(0x60, 0x6f, 0xf2),
    ComposeEntry::new(0x60, 0x75, 0xf9),
    ComposeEntry::new(0x60, 0x41, 0xc0),
    ComposeEntry::new(0x60, 0x45, 0xc8),
    ComposeEntry::new(0x60, 0x49, 0xcc),
    ComposeEntry::new(0x60, 0x4f, 0xd2),
    ComposeEntry::new(0x60, 0x55, 0xd9),
    ComposeEntry::new(0x60, 0x20, 0x60),
    // acute
    ComposeEntry::new(0xb4, 0x61, 0xe1),
    ComposeEntry::new(0xb4, 0x65, 0xe9),
    ComposeEntry::new(0xb4, 0x69, 0xed),
    ComposeEntry::new(0xb4, 0x6f, 0xf3),
    ComposeEntry::new(0xb4, 0x75, 0xfa),
    ComposeEntry::new(0xb4, 0x79, 0xfd),
    ComposeEntry::new(0xb4, 0x41, 0xc1),
    ComposeEntry::new(0xb4, 0x45, 0xc9),
    ComposeEntry::new(0xb4, 0x49, 0xcd),
    ComposeEntry::new(0xb4, 0x4f, 0xd3),
    ComposeEntry::new(0xb4, 0x55, 0xda),
    ComposeEntry::new(0xb4, 0x59, 0xdd),
    ComposeEntry::new(0xb4, 0x20, 0xb4),
    ComposeEntry::new(0x27, 0x65, 0xe9),
    ComposeEntry::new(0x27, 0x45, 0xc9),
    // circumflex
    ComposeEntry::new(0x5e, 0x61, 0xe2),
    ComposeEntry::new(0x5e, 0x65, 0xea),
    ComposeEntry::new(0x5e, 0x69, 0xee),
    ComposeEntry::new(0x5e, 0x6f, 0xf4),
    ComposeEntry::new(0x5e, 0x75, 0xfb),
    ComposeEntry::new(0x5e, 0x41, 0xc2),
    ComposeEntry::new(0x5e, 0x45, 0xca),
    ComposeEntry::new(0x5e, 0x49, 0xce),
    ComposeEntry::new(0x5e, 0x4f, 0xd4),
    ComposeEntry::new(0x5e, 0x55, 0xdb),
    ComposeEntry::new(0x5e, 0x20, 0x5e),
    // tilde
    ComposeEntry::new(0x7e, 0x61, 0xe3),
    ComposeEntry::new(0x7e, 0x6e, 0xf1),
    ComposeEntry::new(0x7e, 0x6f, 0xf5),
    ComposeEntry::new(0x7e, 0x41, 0xc3),
    ComposeEntry::new(0x7e, 0x4e, 0xd1),
    ComposeEntry::new(0x7e, 0x4f, 0xd5),
    ComposeEntry::new(0x7e, 0x20, 0x7e),
    // diaeresis
    ComposeEntry::new(0xa8, 0x61, 0xe4),
    ComposeEntry::new(0xa8, 0x65, 0xeb),
    ComposeEntry::new(0xa8, 0x69, 0xef),
    ComposeEntry::new(0xa8, 0x6f, 0xf6),
    ComposeEntry::new(0xa8, 0x75, 0xfc),
    ComposeEntry::new(0xa8, 0x79, 0xff),
    ComposeEntry::new(0xa8, 0x41, 0xc4),
    ComposeEntry::new(0xa8, 0x45, 0xcb),
    ComposeEntry::new(0xa8, 0x49, 0xcf),
    ComposeEntry::new(0xa8, 0x4f, 0xd6),
    ComposeEntry::new(0xa8, 0x55, 0xdc),
    ComposeEntry::new(0xa8, 0x20, 0xa8),
    // Compose-only ligatures and marks
    ComposeEntry::new(0x2c, 0x63, 0xe7),
    ComposeEntry::new(0x2c, 0x43, 0xc7),
    ComposeEntry::new(0x61, 0x65, 0xe6),
    ComposeEntry::new(0x41, 0x45, 0xc6),
    ComposeEntry::new(0x73, 0x73, 0xdf),
    ComposeEntry::new(0x6f, 0x2f, 0xf8),
    ComposeEntry::new(0x4f, 0x2f, 0xd8),
    ComposeEntry::new(0x61, 0x61, 0xe5),
    ComposeEntry::new(0x41, 0x41, 0xc5),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Keymap;

    #[test]
    fn test_every_mapped_code_has_plain_entry() {
        for m in KEYMAP {
            assert!(
                KEYMAP.iter().any(|p| p.raw_code == m.raw_code && p.is_plain()),
                "code {} has no plain entry",
                m.raw_code
            );
        }
    }

    #[test]
    fn test_no_filler_entries() {
        assert!(KEYMAP.iter().all(|m| m.raw_code != 0));
    }

    #[test]
    fn test_letters_are_flagged() {
        let map = Keymap::builtin();
        let a = map.lookup(30, NONE, false).selected().copied();
        assert_eq!(a.map(|m| m.unicode), Some('a' as u16));
        assert!(a.is_some_and(|m| m.is_letter()));
    }

    #[test]
    fn test_keypad_entries_carry_keypad_bit() {
        for code in 71..=83u16 {
            let m = Keymap::builtin().lookup(code, NONE, false).plain.copied();
            assert!(m.is_some_and(|m| m.symbol & KP != 0), "code {code}");
        }
    }

    #[test]
    fn test_dead_accents_compose() {
        let map = Keymap::builtin();
        for m in KEYMAP.iter().filter(|m| m.is_dead()) {
            assert!(map.starts_composition(m.unicode), "accent {:#x}", m.unicode);
        }
    }
}
