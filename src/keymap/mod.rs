//! Keymap tables.
//!
//! A keymap is an ordered list of scan-code mappings plus an optional
//! compose table. The built-in US table is static; a table loaded from a
//! `.qmap` file replaces it wholesale.
//!
//! ```text
//! raw code + live modifiers ──► Mapping (unicode, symbol, flags, special)
//! (pending accent, unicode) ──► ComposeEntry.result
//! ```

pub mod defaults;
pub mod qmap;
pub mod symbols;

use std::borrow::Cow;

pub use symbols::HostModifiers;

/// Unicode value meaning "no character".
pub const NO_UNICODE: u16 = 0xffff;

// =============================================================================
// Types
// =============================================================================

bitflags::bitflags! {
    /// Modifier mask as stored in the table and held in the live state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TableModifiers: u8 {
        const SHIFT   = 0x01;
        const ALT_GR  = 0x02;
        const CONTROL = 0x04;
        const ALT     = 0x08;
        const SHIFT_L = 0x10;
        const SHIFT_R = 0x20;
        const CTRL_L  = 0x40;
        const CTRL_R  = 0x80;
    }
}

bitflags::bitflags! {
    /// Per-mapping flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MappingFlags: u8 {
        const IS_DEAD     = 0x01;
        const IS_LETTER   = 0x02;
        const IS_MODIFIER = 0x04;
        const IS_SYSTEM   = 0x08;
    }
}

/// System action ids stored in `Mapping::special` for `IS_SYSTEM` entries.
pub mod system {
    pub const CONSOLE_FIRST: u16 = 0x0100;
    pub const CONSOLE_MASK: u16 = 0x007f;
    pub const CONSOLE_LAST: u16 = 0x017f;
    pub const CONSOLE_PREVIOUS: u16 = 0x0180;
    pub const CONSOLE_NEXT: u16 = 0x0181;
    pub const REBOOT: u16 = 0x0200;
    pub const ZAP: u16 = 0x0300;
}

/// One scan-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub raw_code: u16,
    /// `NO_UNICODE` when the key produces no text.
    pub unicode: u16,
    /// Key symbol, possibly carrying host modifier bits.
    pub symbol: u32,
    /// Modifiers that must be held for this entry; empty for the plain entry.
    pub modifiers: TableModifiers,
    pub flags: MappingFlags,
    /// Modifier bits for `IS_MODIFIER`, action id for `IS_SYSTEM`.
    pub special: u16,
}

impl Mapping {
    pub const fn new(
        raw_code: u16,
        unicode: u16,
        symbol: u32,
        modifiers: TableModifiers,
        flags: MappingFlags,
        special: u16,
    ) -> Self {
        Self { raw_code, unicode, symbol, modifiers, flags, special }
    }

    pub fn is_plain(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn is_dead(&self) -> bool {
        self.flags.contains(MappingFlags::IS_DEAD)
    }

    pub fn is_letter(&self) -> bool {
        self.flags.contains(MappingFlags::IS_LETTER)
    }

    pub fn is_modifier(&self) -> bool {
        self.flags.contains(MappingFlags::IS_MODIFIER)
    }

    pub fn is_system(&self) -> bool {
        self.flags.contains(MappingFlags::IS_SYSTEM)
    }
}

/// Composition of a pending accent with a following character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeEntry {
    pub first: u16,
    pub second: u16,
    /// `NO_UNICODE` marks a pair that explicitly does not compose.
    pub result: u16,
}

impl ComposeEntry {
    pub const fn new(first: u16, second: u16, result: u16) -> Self {
        Self { first, second, result }
    }
}

/// Result of scanning the table for one raw code.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lookup<'a> {
    /// First entry with no required modifiers.
    pub plain: Option<&'a Mapping>,
    /// First entry whose required modifiers equal the live mask.
    pub exact: Option<&'a Mapping>,
}

impl<'a> Lookup<'a> {
    /// The entry to act on: the exact match if any, else the plain one.
    pub fn selected(&self) -> Option<&'a Mapping> {
        self.exact.or(self.plain)
    }
}

// =============================================================================
// Keymap
// =============================================================================

/// An active mapping table and compose table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    mappings: Cow<'static, [Mapping]>,
    compose: Cow<'static, [ComposeEntry]>,
    compose_enabled: bool,
}

impl Keymap {
    /// A table built at runtime, e.g. by the `.qmap` loader.
    pub fn new(mappings: Vec<Mapping>, compose: Vec<ComposeEntry>, compose_enabled: bool) -> Self {
        Self {
            mappings: Cow::Owned(mappings),
            compose: Cow::Owned(compose),
            compose_enabled,
        }
    }

    /// The built-in US table. Composition is off.
    pub fn builtin() -> Self {
        Self {
            mappings: Cow::Borrowed(defaults::KEYMAP),
            compose: Cow::Borrowed(defaults::COMPOSE),
            compose_enabled: false,
        }
    }

    /// Turn dead-key and Compose handling on or off.
    pub fn with_compose(mut self, enabled: bool) -> Self {
        self.compose_enabled = enabled;
        self
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.mappings, Cow::Borrowed(_))
    }

    pub fn compose_enabled(&self) -> bool {
        self.compose_enabled
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    pub fn compose_table(&self) -> &[ComposeEntry] {
        &self.compose
    }

    /// Scan for `raw_code` in table order.
    ///
    /// Records the first plain entry and the first entry whose modifiers
    /// equal `live`. CapsLock flips Shift in the comparison for entries
    /// flagged `IS_LETTER`. Stops once both slots are filled.
    pub fn lookup(&self, raw_code: u16, live: TableModifiers, caps_lock: bool) -> Lookup<'_> {
        let mut found = Lookup::default();

        for m in self.mappings.iter().filter(|m| m.raw_code == raw_code) {
            if found.plain.is_none() && m.is_plain() {
                found.plain = Some(m);
            }

            let mut wanted = live;
            if caps_lock && m.is_letter() {
                wanted ^= TableModifiers::SHIFT;
            }
            if found.exact.is_none() && m.modifiers == wanted {
                found.exact = Some(m);
            }

            if found.plain.is_some() && found.exact.is_some() {
                break;
            }
        }

        found
    }

    /// True if `unicode` starts any compose pair.
    pub fn starts_composition(&self, unicode: u16) -> bool {
        self.compose.iter().any(|c| c.first == unicode)
    }

    /// First compose entry for the ordered pair, if any.
    pub fn compose(&self, first: u16, second: u16) -> Option<&ComposeEntry> {
        self.compose.iter().find(|c| c.first == first && c.second == second)
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::builtin()
    }
}
