//! # spark-console-input
//!
//! Console keyboard and mouse input for bare BSD consoles.
//!
//! Raw scan-code bytes from a keyboard device and fixed-size packets from
//! sysmouse are turned into abstract input events: key presses and
//! releases with resolved text, symbol and modifiers, and absolute pointer
//! state.
//!
//! ## Architecture
//!
//! ```text
//! /dev/ttyv*  ─► KeyboardDevice ─► KeyboardHandler ─► KeycodeResolver ─┐
//!                  (LEDs)              │ Keymap (built-in or .qmap)    │
//!                                      │ KeyboardState + Composer      ├─► EventSink
//! /dev/sysmouse ─► MouseDevice ──► MouseHandler ───► MouseDecoder ─────┘
//! ```
//!
//! Everything below the handlers is plain data and state; the devices are
//! optional and only needed on a real console.
//!
//! ## Modules
//!
//! - [`keymap`] - Mapping/compose tables, symbols, the `.qmap` format
//! - [`state`] - Modifier, lock and compose state
//! - [`input`] - Resolver, handlers, mouse decoder, crossterm bridge
//! - [`config`] - Handler specification strings
//! - [`device`] - Keyboard and sysmouse device nodes (unix)

pub mod config;
#[cfg(unix)]
pub mod device;
pub mod error;
pub mod input;
pub mod keymap;
pub mod state;

pub use config::{KeyboardConfig, MouseConfig};
#[cfg(unix)]
pub use device::{KeyboardDevice, MouseDevice};
pub use error::{ConfigError, DeviceError, KeymapError};

pub use input::{
    to_host_key, Bounds, EventQueue, EventSink, HostSink, InputEvent, KeyEvent, KeyboardHandler,
    KeycodeAction, KeycodeResolver, MouseButtons, MouseDecoder, MouseHandler, Packet, PacketLevel,
    PointerEvent, PointerTracker, ReadStatus, Resolution,
};

pub use keymap::{
    ComposeEntry, HostModifiers, Keymap, Mapping, MappingFlags, TableModifiers, NO_UNICODE,
};

pub use state::{
    ComposeState, KeyboardState, LedControl, Leds, Lock, LockState, NoLeds,
};
