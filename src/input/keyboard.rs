//! Keyboard handler.
//!
//! Owns the active keymap, resolver state, the LED collaborator and an
//! event sink. Device bytes go in, [`InputEvent`]s come out.
//!
//! ```text
//! byte ─► code = b & 0x7f, pressed = b & 0x80 == 0
//!      ─► KeycodeResolver ─► KeyEvent ─────────────► sink
//!                         └─► KeycodeAction ─┬─ lock ─► LEDs
//!                                            └─ other ► sink (System)
//! ```

use std::io::Read;
use std::path::Path;

use super::events::{EventSink, InputEvent};
use super::reader::{self, ReadStatus};
use super::resolver::{KeycodeAction, KeycodeResolver};
use crate::config::KeyboardConfig;
use crate::error::KeymapError;
use crate::keymap::{qmap, Keymap};
use crate::state::{switch_led, ComposeState, KeyboardState, LedControl};

/// Bytes read per `read` call.
pub const READ_CHUNK: usize = 32;

pub struct KeyboardHandler<L: LedControl, S: EventSink> {
    keymap: Keymap,
    resolver: KeycodeResolver,
    leds: L,
    sink: S,
}

impl<L: LedControl, S: EventSink> KeyboardHandler<L, S> {
    /// Handler with the built-in table. Locks start from the LEDs.
    pub fn new(leds: L, sink: S) -> Self {
        let mut handler = Self {
            keymap: Keymap::builtin(),
            resolver: KeycodeResolver::new(),
            leds,
            sink,
        };
        handler.resolver.reset(&mut handler.leds);
        handler
    }

    /// Handler configured from a [`KeyboardConfig`].
    ///
    /// A keymap that fails to load is logged and the built-in table is used.
    pub fn from_config(config: &KeyboardConfig, leds: L, sink: S) -> Self {
        let mut handler = Self::new(leds, sink);
        handler.resolver.set_zap_enabled(config.zap);
        if let Some(path) = &config.keymap {
            // Failure already logged; the built-in table stays.
            let _ = handler.load_keymap(path);
        }
        handler
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Process one device byte.
    pub fn process_byte(&mut self, byte: u8) -> KeycodeAction {
        let code = u16::from(byte & 0x7f);
        let pressed = byte & 0x80 == 0;
        self.process_keycode(code, pressed, false)
    }

    /// Resolve one transition and dispatch its event and action.
    pub fn process_keycode(&mut self, code: u16, pressed: bool, autorepeat: bool) -> KeycodeAction {
        let resolution = self.resolver.resolve(&self.keymap, code, pressed, autorepeat);

        if let Some(event) = resolution.event {
            self.sink.deliver(InputEvent::Key(event));
        }

        let action = resolution.action;
        match action.led_change() {
            Some((lock, on)) => switch_led(&mut self.leds, lock, on),
            None if !action.is_none() => self.sink.deliver(InputEvent::System(action)),
            None => {}
        }
        action
    }

    /// Drain everything the source has for now.
    pub fn read_available(&mut self, source: &mut impl Read) -> ReadStatus {
        reader::drain(source, READ_CHUNK, false, |bytes| {
            for &b in bytes {
                self.process_byte(b);
            }
        })
    }

    // =========================================================================
    // Keymaps
    // =========================================================================

    /// Load a `.qmap` file. On failure the current table stays active.
    pub fn load_keymap(&mut self, path: impl AsRef<Path>) -> Result<(), KeymapError> {
        let path = path.as_ref();
        match qmap::load(path) {
            Ok(keymap) => {
                log::debug!(
                    "[console-input] loaded keymap {} ({} mappings, {} compose entries)",
                    path.display(),
                    keymap.mappings().len(),
                    keymap.compose_table().len()
                );
                self.set_keymap(keymap);
                Ok(())
            }
            Err(e) => {
                log::warn!("[console-input] rejected keymap {}: {}", path.display(), e);
                Err(e)
            }
        }
    }

    /// Load a keymap from any byte stream. On failure the current table stays active.
    pub fn load_keymap_from(&mut self, source: &mut impl Read) -> Result<(), KeymapError> {
        match qmap::read(source) {
            Ok(keymap) => {
                self.set_keymap(keymap);
                Ok(())
            }
            Err(e) => {
                log::warn!("[console-input] rejected keymap: {}", e);
                Err(e)
            }
        }
    }

    /// Install a table and reset modifier, lock and compose state.
    pub fn set_keymap(&mut self, keymap: Keymap) {
        self.keymap = keymap;
        self.resolver.reset(&mut self.leds);
    }

    /// Go back to the built-in table.
    pub fn unload_keymap(&mut self) {
        log::debug!("[console-input] unloading keymap, restoring built-in table");
        self.set_keymap(Keymap::builtin());
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn state(&self) -> &KeyboardState {
        self.resolver.state()
    }

    pub fn compose_state(&self) -> ComposeState {
        self.resolver.compose_state()
    }

    pub fn set_zap_enabled(&mut self, enabled: bool) {
        self.resolver.set_zap_enabled(enabled);
    }

    pub fn leds(&self) -> &L {
        &self.leds
    }

    pub fn leds_mut(&mut self) -> &mut L {
        &mut self.leds
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
