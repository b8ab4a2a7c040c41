//! sysmouse device.

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;

use super::ioctl;
use crate::config::MouseConfig;
use crate::error::DeviceError;
use crate::input::{EventSink, MouseHandler, PacketLevel};

pub struct MouseDevice {
    file: File,
    name: String,
    level: PacketLevel,
}

impl MouseDevice {
    /// Open the node non-blocking and settle the packet size.
    ///
    /// If the level can't be queried the basic 5-byte protocol is assumed.
    pub fn open(config: &MouseConfig) -> Result<Self, DeviceError> {
        let name = config.device.display().to_string();
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&config.device)
            .map_err(|e| DeviceError::os("open", &name, e))?;

        let level = match ioctl::mouse_level(file.as_raw_fd()) {
            Ok(level) => PacketLevel::from_level(level)?,
            Err(e) => {
                log::warn!("[console-input] ioctl({}, MOUSE_GETLEVEL) failed: {}", name, e);
                PacketLevel::Basic
            }
        };
        log::debug!("[console-input] mouse {} using {:?} packets", name, level);

        Ok(Self { file, name, level })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> PacketLevel {
        self.level
    }

    /// A handler sized for this device.
    pub fn handler<S: EventSink>(&self, config: &MouseConfig, sink: S) -> MouseHandler<S> {
        MouseHandler::from_config(config, self.level, sink)
    }
}

impl AsRawFd for MouseDevice {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl Read for MouseDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_node() {
        let config = MouseConfig { device: "/nonexistent/sysmouse".into(), ..Default::default() };
        assert!(matches!(MouseDevice::open(&config), Err(DeviceError::Os { op: "open", .. })));
    }

    #[cfg(not(any(target_os = "freebsd", target_os = "dragonfly")))]
    #[test]
    fn test_level_query_failure_falls_back_to_basic() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = MouseConfig { device: file.path().to_path_buf(), ..Default::default() };
        let dev = MouseDevice::open(&config).unwrap();
        assert_eq!(dev.level(), PacketLevel::Basic);
        assert!(dev.handler(&config, Vec::new()).is_active());
    }
}
