//! Error types.
//!
//! Nothing in this crate is fatal to the host process. Every error here is
//! reported to the caller, logged, and the affected feature degrades
//! (built-in keymap stays active, locks fall back to off, an unsupported
//! mouse decodes nothing).

use std::io;

/// Failure to load a keymap file.
#[derive(Debug, thiserror::Error)]
pub enum KeymapError {
    #[error("keymap i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("not a keymap file (magic {0:#010x})")]
    BadMagic(u32),
    #[error("unsupported keymap version {0}")]
    UnsupportedVersion(u32),
    #[error("keymap contains no mappings")]
    Empty,
    #[error("keymap truncated: expected {expected} {what} records, got {got}")]
    Truncated {
        what: &'static str,
        expected: u32,
        got: u32,
    },
}

/// Failure while talking to an input device node.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("{op}({path}) failed: {source}")]
    Os {
        op: &'static str,
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("unsupported mouse protocol level {0}")]
    UnsupportedLevel(i32),
}

impl DeviceError {
    pub(crate) fn os(op: &'static str, path: &str, source: io::Error) -> Self {
        Self::Os {
            op,
            path: path.to_string(),
            source,
        }
    }

    /// Last OS error for `op` on `path`.
    pub(crate) fn last_os(op: &'static str, path: &str) -> Self {
        Self::os(op, path, io::Error::last_os_error())
    }
}

/// Malformed handler specification string.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("option `{0}` needs a value")]
    MissingValue(String),
    #[error("invalid bounds `{0}`: expected <left>,<top>,<width>,<height>")]
    InvalidBounds(String),
}
