//! Input handlers: device bytes → resolved events.
//!
//! # Architecture
//!
//! ```text
//! keyboard bytes ─► KeyboardHandler ─► KeycodeResolver ─┐
//!                        │  (Keymap, KeyboardState,     │
//!                        │   Composer, LEDs)            ├─► EventSink
//! mouse packets ──► MouseHandler ───► MouseDecoder ─────┘      │
//!                                                              ▼
//!                                             EventQueue / channel / HostSink
//! ```

pub mod events;
pub mod host;
pub mod keyboard;
pub mod mouse;
pub mod reader;
pub mod resolver;

pub use events::{EventQueue, EventSink, InputEvent, KeyEvent, MouseButtons, PointerEvent};
pub use host::{to_host_key, HostSink, PointerTracker};
pub use keyboard::KeyboardHandler;
pub use mouse::{Bounds, MouseDecoder, MouseHandler, Packet, PacketLevel};
pub use reader::ReadStatus;
pub use resolver::{KeycodeAction, KeycodeResolver, Resolution};
