//! Handler specification strings.
//!
//! ```text
//! keyboard:  [/dev/<node>][:keymap=<file>][:enable-zap][:disable-zap]
//! mouse:     [/dev/<node>][:bounds=<left>,<top>,<width>,<height>]
//! ```
//!
//! Options are colon separated and may come in any order; the last one
//! wins. Unknown options are ignored.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::input::Bounds;

pub const DEFAULT_MOUSE_DEVICE: &str = "/dev/sysmouse";

// =============================================================================
// Keyboard
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyboardConfig {
    /// Keyboard node; `None` reads standard input.
    pub device: Option<PathBuf>,
    pub keymap: Option<PathBuf>,
    /// Honor the Ctrl+Alt+Backspace zap combination.
    pub zap: bool,
}

impl FromStr for KeyboardConfig {
    type Err = ConfigError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut config = Self::default();
        for option in options(spec) {
            match split(option) {
                (dev, None) if dev.starts_with("/dev/") => config.device = Some(dev.into()),
                ("keymap", value) => config.keymap = Some(required(option, value)?.into()),
                ("enable-zap", None) => config.zap = true,
                ("disable-zap", None) => config.zap = false,
                _ => ignored("keyboard", option),
            }
        }
        Ok(config)
    }
}

// =============================================================================
// Mouse
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseConfig {
    pub device: PathBuf,
    pub bounds: Bounds,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_MOUSE_DEVICE),
            bounds: Bounds::default(),
        }
    }
}

impl FromStr for MouseConfig {
    type Err = ConfigError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut config = Self::default();
        for option in options(spec) {
            match split(option) {
                (dev, None) if dev.starts_with("/dev/") => config.device = dev.into(),
                ("bounds", value) => config.bounds = required(option, value)?.parse()?,
                _ => ignored("mouse", option),
            }
        }
        Ok(config)
    }
}

impl FromStr for Bounds {
    type Err = ConfigError;

    /// `<left>,<top>,<width>,<height>` with positive width and height. The
    /// right and bottom edges must fit in an `i32`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidBounds(s.to_string());
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<i32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        match parts[..] {
            [left, top, width, height]
                if width > 0
                    && height > 0
                    && left.checked_add(width - 1).is_some()
                    && top.checked_add(height - 1).is_some() =>
            {
                Ok(Bounds::new(left, top, width, height))
            }
            _ => Err(invalid()),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn options(spec: &str) -> impl Iterator<Item = &str> {
    spec.split(':').map(str::trim).filter(|o| !o.is_empty())
}

fn split(option: &str) -> (&str, Option<&str>) {
    match option.split_once('=') {
        Some((key, value)) => (key, Some(value)),
        None => (option, None),
    }
}

fn required<'a>(option: &str, value: Option<&'a str>) -> Result<&'a str, ConfigError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingValue(option.to_string()))
}

fn ignored(handler: &str, option: &str) {
    log::debug!("[console-input] {} spec: ignoring unknown option `{}`", handler, option);
}
