//! syscons/vt keyboard and sysmouse ioctls.
//!
//! Request numbers follow `<sys/ioccom.h>`:
//!
//! ```text
//! 31   29 28       16 15    8 7      0
//! ┌──────┬───────────┬───────┬────────┐
//! │inout │ param len │ group │ number │
//! └──────┴───────────┴───────┴────────┘
//! ```
//!
//! Only FreeBSD and DragonFly have these; elsewhere every call reports
//! `Unsupported` and callers degrade.

use std::io;
use std::os::fd::RawFd;

/// Keyboard mode delivering raw key codes.
pub const K_CODE: i32 = 2;

#[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
mod imp {
    use std::io;
    use std::mem::size_of;
    use std::os::fd::RawFd;

    use libc::{c_int, c_ulong};

    const IOCPARM_MASK: c_ulong = 0x1fff;
    const IOC_VOID: c_ulong = 0x2000_0000;
    const IOC_OUT: c_ulong = 0x4000_0000;

    const fn ioc(inout: c_ulong, group: u8, num: u8, len: usize) -> c_ulong {
        inout | ((len as c_ulong & IOCPARM_MASK) << 16) | ((group as c_ulong) << 8) | num as c_ulong
    }

    /// `_IOR(g, n, int)`
    const fn ior_int(group: u8, num: u8) -> c_ulong {
        ioc(IOC_OUT, group, num, size_of::<c_int>())
    }

    /// `_IOWINT(g, n)`: the int is passed by value.
    const fn iowint(group: u8, num: u8) -> c_ulong {
        ioc(IOC_VOID, group, num, size_of::<c_int>())
    }

    pub const KDGKBMODE: c_ulong = ior_int(b'K', 6);
    pub const KDSKBMODE: c_ulong = iowint(b'K', 7);
    pub const KDGETLED: c_ulong = ior_int(b'K', 65);
    pub const KDSETLED: c_ulong = iowint(b'K', 66);
    pub const MOUSE_GETLEVEL: c_ulong = ior_int(b'M', 4);

    pub fn get_int(fd: RawFd, request: c_ulong) -> io::Result<i32> {
        let mut value: c_int = 0;
        if unsafe { libc::ioctl(fd, request, &mut value as *mut c_int) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(value)
    }

    pub fn set_int(fd: RawFd, request: c_ulong, value: i32) -> io::Result<()> {
        if unsafe { libc::ioctl(fd, request, value as c_int) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_request_numbers() {
            assert_eq!(KDGKBMODE, 0x4004_4b06);
            assert_eq!(KDSKBMODE, 0x2004_4b07);
            assert_eq!(KDGETLED, 0x4004_4b41);
            assert_eq!(KDSETLED, 0x2004_4b42);
            assert_eq!(MOUSE_GETLEVEL, 0x4004_4d04);
        }
    }
}

#[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
mod calls {
    use super::imp::*;
    use std::io;
    use std::os::fd::RawFd;

    pub fn keyboard_mode(fd: RawFd) -> io::Result<i32> {
        get_int(fd, KDGKBMODE)
    }

    pub fn set_keyboard_mode(fd: RawFd, mode: i32) -> io::Result<()> {
        set_int(fd, KDSKBMODE, mode)
    }

    pub fn leds(fd: RawFd) -> io::Result<i32> {
        get_int(fd, KDGETLED)
    }

    pub fn set_leds(fd: RawFd, leds: i32) -> io::Result<()> {
        set_int(fd, KDSETLED, leds)
    }

    pub fn mouse_level(fd: RawFd) -> io::Result<i32> {
        get_int(fd, MOUSE_GETLEVEL)
    }
}

#[cfg(not(any(target_os = "freebsd", target_os = "dragonfly")))]
mod calls {
    use std::io;
    use std::os::fd::RawFd;

    fn unsupported<T>() -> io::Result<T> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "console ioctls need FreeBSD or DragonFly"))
    }

    pub fn keyboard_mode(_fd: RawFd) -> io::Result<i32> {
        unsupported()
    }

    pub fn set_keyboard_mode(_fd: RawFd, _mode: i32) -> io::Result<()> {
        unsupported()
    }

    pub fn leds(_fd: RawFd) -> io::Result<i32> {
        unsupported()
    }

    pub fn set_leds(_fd: RawFd, _leds: i32) -> io::Result<()> {
        unsupported()
    }

    pub fn mouse_level(_fd: RawFd) -> io::Result<i32> {
        unsupported()
    }
}

/// Current keyboard mode (`KDGKBMODE`).
pub fn keyboard_mode(fd: RawFd) -> io::Result<i32> {
    calls::keyboard_mode(fd)
}

/// Switch keyboard mode (`KDSKBMODE`).
pub fn set_keyboard_mode(fd: RawFd, mode: i32) -> io::Result<()> {
    calls::set_keyboard_mode(fd, mode)
}

/// LED mask (`KDGETLED`).
pub fn leds(fd: RawFd) -> io::Result<i32> {
    calls::leds(fd)
}

/// Write the LED mask (`KDSETLED`).
pub fn set_leds(fd: RawFd, leds: i32) -> io::Result<()> {
    calls::set_leds(fd, leds)
}

/// sysmouse protocol level (`MOUSE_GETLEVEL`).
pub fn mouse_level(fd: RawFd) -> io::Result<i32> {
    calls::mouse_level(fd)
}
