//! State Module - Per-keyboard runtime state
//!
//! - **Locks** - Held modifiers, Caps/Num/Scroll lock, LED mirroring
//! - **Compose** - Dead-key and Compose-key sub-state machine
//!
//! Both are owned by one handler instance and reset whenever the keymap
//! is (re)loaded.

mod compose;
mod locks;

pub use compose::*;
pub use locks::*;
