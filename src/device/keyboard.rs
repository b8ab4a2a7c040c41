//! Console keyboard device.
//!
//! Opening switches the console to key-code mode and the tty to raw 8-bit
//! non-canonical input, non-blocking. Dropping restores all three.

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::fd::{AsRawFd, RawFd};
use std::path::Path;

use super::ioctl;
use crate::config::KeyboardConfig;
use crate::error::DeviceError;
use crate::state::{LedControl, Leds};

pub struct KeyboardDevice {
    fd: RawFd,
    name: String,
    /// Held only for opened nodes; stdin is never closed.
    _file: Option<File>,
    orig_mode: Option<i32>,
    orig_tty: Option<libc::termios>,
    orig_flags: Option<libc::c_int>,
}

impl KeyboardDevice {
    pub fn open(config: &KeyboardConfig) -> Result<Self, DeviceError> {
        Self::open_path(config.device.as_deref())
    }

    /// Open `path`, or adopt standard input when `None`.
    pub fn open_path(path: Option<&Path>) -> Result<Self, DeviceError> {
        let (fd, name, file) = match path {
            Some(path) => {
                let name = path.display().to_string();
                let file = OpenOptions::new()
                    .read(true)
                    .open(path)
                    .map_err(|e| DeviceError::os("open", &name, e))?;
                (file.as_raw_fd(), name, Some(file))
            }
            None => (libc::STDIN_FILENO, "STDIN".to_string(), None),
        };

        let mut dev = Self {
            fd,
            name,
            _file: file,
            orig_mode: None,
            orig_tty: None,
            orig_flags: None,
        };
        // Any failure below drops `dev`, which undoes what was already changed.
        dev.setup()?;
        log::debug!("[console-input] keyboard {} ready", dev.name);
        Ok(dev)
    }

    fn setup(&mut self) -> Result<(), DeviceError> {
        let mode = ioctl::keyboard_mode(self.fd).map_err(|e| DeviceError::os("KDGKBMODE", &self.name, e))?;
        ioctl::set_keyboard_mode(self.fd, ioctl::K_CODE)
            .map_err(|e| DeviceError::os("KDSKBMODE", &self.name, e))?;
        self.orig_mode = Some(mode);

        unsafe {
            let mut tty: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(self.fd, &mut tty) != 0 {
                return Err(DeviceError::last_os("tcgetattr", &self.name));
            }
            self.orig_tty = Some(tty);

            tty.c_iflag = libc::IGNPAR | libc::IGNBRK;
            tty.c_oflag = 0;
            tty.c_cflag = libc::CREAD | libc::CS8;
            tty.c_lflag = 0;
            tty.c_cc[libc::VTIME] = 0;
            tty.c_cc[libc::VMIN] = 1;
            libc::cfsetispeed(&mut tty, libc::B9600);
            libc::cfsetospeed(&mut tty, libc::B9600);
            if libc::tcsetattr(self.fd, libc::TCSANOW, &tty) != 0 {
                return Err(DeviceError::last_os("tcsetattr", &self.name));
            }

            let flags = libc::fcntl(self.fd, libc::F_GETFL);
            if flags < 0 || libc::fcntl(self.fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
                return Err(DeviceError::last_os("fcntl", &self.name));
            }
            self.orig_flags = Some(flags);
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn restore(&mut self) {
        unsafe {
            if let Some(tty) = self.orig_tty.take() {
                libc::tcsetattr(self.fd, libc::TCSANOW, &tty);
            }
            if let Some(flags) = self.orig_flags.take() {
                libc::fcntl(self.fd, libc::F_SETFL, flags);
            }
        }
        if let Some(mode) = self.orig_mode.take() {
            if let Err(e) = ioctl::set_keyboard_mode(self.fd, mode) {
                log::warn!("[console-input] {}: failed to restore keyboard mode: {}", self.name, e);
            }
        }
    }
}

impl Drop for KeyboardDevice {
    fn drop(&mut self) {
        self.restore();
    }
}

impl AsRawFd for KeyboardDevice {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Read for KeyboardDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }
}

impl LedControl for KeyboardDevice {
    fn leds(&mut self) -> io::Result<Leds> {
        ioctl::leds(self.fd).map(Leds::from_bits_retain)
    }

    fn set_leds(&mut self, leds: Leds) -> io::Result<()> {
        ioctl::set_leds(self.fd, leds.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_node_reports_path() {
        let err = KeyboardDevice::open_path(Some(Path::new("/nonexistent/kbd"))).err().unwrap();
        let msg = err.to_string();
        assert!(msg.starts_with("open(/nonexistent/kbd) failed"), "{}", msg);
    }

    #[cfg(not(any(target_os = "freebsd", target_os = "dragonfly")))]
    #[test]
    fn test_non_console_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = KeyboardDevice::open_path(Some(file.path())).err().unwrap();
        assert!(matches!(err, DeviceError::Os { op: "KDGKBMODE", .. }));
    }
}
