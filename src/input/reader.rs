//! Non-blocking drain of a device byte source.
//!
//! Called when the device descriptor is readable. Reads until the source
//! has nothing more to give this cycle, handing each chunk to a callback.

use std::io::{self, Read};

/// How a drain cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// End of file. The device is gone; stop polling it.
    Closed,
    /// No more data for now (would block, interrupted, or a short read).
    Drained,
    /// Read error other than would-block/interrupt. Already logged.
    Failed,
}

impl ReadStatus {
    /// True if the caller should keep polling the source.
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }
}

/// Read `chunk`-sized pieces until the source runs dry.
///
/// `on_data` sees every non-empty read. A read shorter than `chunk` ends
/// the cycle only when `stop_on_short` is set (fixed-size packet devices).
pub fn drain(
    source: &mut impl Read,
    chunk: usize,
    stop_on_short: bool,
    mut on_data: impl FnMut(&[u8]),
) -> ReadStatus {
    let mut buf = [0u8; 64];
    let chunk = chunk.clamp(1, buf.len());

    loop {
        match source.read(&mut buf[..chunk]) {
            Ok(0) => {
                log::warn!("[console-input] got EOF from the input device");
                return ReadStatus::Closed;
            }
            Ok(n) => {
                on_data(&buf[..n]);
                if stop_on_short && n < chunk {
                    return ReadStatus::Drained;
                }
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
                return ReadStatus::Drained;
            }
            Err(e) => {
                log::warn!("[console-input] could not read from input device: {}", e);
                return ReadStatus::Failed;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted reads: each entry is one `read` result.
    pub struct Script(pub VecDeque<io::Result<Vec<u8>>>);

    impl Script {
        pub fn new(steps: Vec<io::Result<Vec<u8>>>) -> Self {
            Self(steps.into())
        }

        pub fn would_block() -> io::Result<Vec<u8>> {
            Err(io::ErrorKind::WouldBlock.into())
        }
    }

    impl Read for Script {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                None => Err(io::ErrorKind::WouldBlock.into()),
                Some(Err(e)) => Err(e),
                Some(Ok(bytes)) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    Ok(n)
                }
            }
        }
    }

    #[test]
    fn test_drain_until_would_block() {
        let mut src = Script::new(vec![Ok(vec![1, 2]), Ok(vec![3]), Script::would_block()]);
        let mut seen = Vec::new();
        let status = drain(&mut src, 32, false, |d| seen.extend_from_slice(d));
        assert_eq!(status, ReadStatus::Drained);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_drain_eof_is_closed() {
        let mut src = Script::new(vec![Ok(vec![1]), Ok(vec![])]);
        let mut seen = Vec::new();
        let status = drain(&mut src, 32, false, |d| seen.extend_from_slice(d));
        assert_eq!(status, ReadStatus::Closed);
        assert!(!status.is_open());
        assert_eq!(seen, vec![1]);
    }

    #[test]
    fn test_drain_interrupted_ends_cycle() {
        let mut src = Script::new(vec![Err(io::ErrorKind::Interrupted.into()), Ok(vec![9])]);
        let status = drain(&mut src, 32, false, |_| panic!("no data expected"));
        assert_eq!(status, ReadStatus::Drained);
        assert_eq!(src.0.len(), 1);
    }

    #[test]
    fn test_drain_error_is_failed() {
        let mut src = Script::new(vec![Err(io::ErrorKind::PermissionDenied.into())]);
        assert_eq!(drain(&mut src, 32, false, |_| {}), ReadStatus::Failed);
    }

    #[test]
    fn test_drain_short_read_stops_packets() {
        let mut src = Script::new(vec![Ok(vec![0; 5]), Ok(vec![0; 3]), Ok(vec![0; 5])]);
        let mut reads = 0;
        let status = drain(&mut src, 5, true, |_| reads += 1);
        assert_eq!(status, ReadStatus::Drained);
        assert_eq!(reads, 2);
        assert_eq!(src.0.len(), 1);
    }

    #[test]
    fn test_drain_reads_at_most_chunk() {
        let mut src = Script::new(vec![Ok(vec![7; 10])]);
        let mut sizes = Vec::new();
        drain(&mut src, 4, true, |d| sizes.push(d.len()));
        assert_eq!(sizes, vec![4]);
    }
}
