//! Device plumbing for console keyboards and sysmouse.
//!
//! Thin OS layer: opens nodes, sets modes, restores them on drop. All the
//! interpretation lives in [`crate::input`].

pub mod ioctl;
pub mod keyboard;
pub mod mouse;

pub use keyboard::KeyboardDevice;
pub use mouse::MouseDevice;
