//! `.qmap` keymap files.
//!
//! Layout, all integers big-endian:
//!
//! ```text
//! u32 magic            0x514d4150 ("QMAP")
//! u32 version          1
//! u32 keymap_size      number of mapping records, > 0
//! u32 keycompose_size  number of compose records
//! keymap_size  x { u16 keycode, u16 unicode, u32 symbol, u8 modifiers, u8 flags, u16 special }
//! keycompose_size x { u16 first, u16 second, u16 result }
//! ```
//!
//! Loading is all-or-nothing: any short read rejects the whole file.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use super::{ComposeEntry, Keymap, Mapping, MappingFlags, TableModifiers};
use crate::error::KeymapError;

pub const FILE_MAGIC: u32 = 0x514d_4150;
pub const FILE_VERSION: u32 = 1;

/// Cap on up-front allocation; larger files still load, just grow.
const PREALLOC_LIMIT: usize = 4096;

// =============================================================================
// Reading
// =============================================================================

/// Load a keymap file. Loaded tables always have composition enabled.
pub fn load(path: impl AsRef<Path>) -> Result<Keymap, KeymapError> {
    let file = File::open(path)?;
    read(&mut BufReader::new(file))
}

/// Read a keymap from any byte stream.
pub fn read(reader: &mut impl Read) -> Result<Keymap, KeymapError> {
    let magic = read_u32(reader)?;
    if magic != FILE_MAGIC {
        return Err(KeymapError::BadMagic(magic));
    }
    let version = read_u32(reader)?;
    if version != FILE_VERSION {
        return Err(KeymapError::UnsupportedVersion(version));
    }
    let keymap_size = read_u32(reader)?;
    let compose_size = read_u32(reader)?;
    if keymap_size == 0 {
        return Err(KeymapError::Empty);
    }

    let mut mappings = Vec::with_capacity((keymap_size as usize).min(PREALLOC_LIMIT));
    for got in 0..keymap_size {
        let m = read_mapping(reader).map_err(|e| truncated(e, "mapping", keymap_size, got))?;
        mappings.push(m);
    }

    let mut compose = Vec::with_capacity((compose_size as usize).min(PREALLOC_LIMIT));
    for got in 0..compose_size {
        let c = read_compose(reader).map_err(|e| truncated(e, "compose", compose_size, got))?;
        compose.push(c);
    }

    Ok(Keymap::new(mappings, compose, true))
}

fn truncated(err: io::Error, what: &'static str, expected: u32, got: u32) -> KeymapError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        KeymapError::Truncated { what, expected, got }
    } else {
        KeymapError::Io(err)
    }
}

fn read_mapping(r: &mut impl Read) -> io::Result<Mapping> {
    let mut rec = [0u8; 12];
    r.read_exact(&mut rec)?;
    Ok(Mapping {
        raw_code: u16::from_be_bytes([rec[0], rec[1]]),
        unicode: u16::from_be_bytes([rec[2], rec[3]]),
        symbol: u32::from_be_bytes([rec[4], rec[5], rec[6], rec[7]]),
        modifiers: TableModifiers::from_bits_retain(rec[8]),
        flags: MappingFlags::from_bits_retain(rec[9]),
        special: u16::from_be_bytes([rec[10], rec[11]]),
    })
}

fn read_compose(r: &mut impl Read) -> io::Result<ComposeEntry> {
    let mut rec = [0u8; 6];
    r.read_exact(&mut rec)?;
    Ok(ComposeEntry {
        first: u16::from_be_bytes([rec[0], rec[1]]),
        second: u16::from_be_bytes([rec[2], rec[3]]),
        result: u16::from_be_bytes([rec[4], rec[5]]),
    })
}

fn read_u32(r: &mut impl Read) -> Result<u32, KeymapError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            KeymapError::Truncated { what: "header", expected: 4, got: 0 }
        } else {
            KeymapError::Io(e)
        }
    })?;
    Ok(u32::from_be_bytes(buf))
}

// =============================================================================
// Writing
// =============================================================================

/// Serialize a keymap in the same layout `read` accepts.
pub fn write(keymap: &Keymap, out: &mut impl Write) -> io::Result<()> {
    let mappings = keymap.mappings();
    let compose = keymap.compose_table();

    out.write_all(&FILE_MAGIC.to_be_bytes())?;
    out.write_all(&FILE_VERSION.to_be_bytes())?;
    out.write_all(&(mappings.len() as u32).to_be_bytes())?;
    out.write_all(&(compose.len() as u32).to_be_bytes())?;

    for m in mappings {
        out.write_all(&m.raw_code.to_be_bytes())?;
        out.write_all(&m.unicode.to_be_bytes())?;
        out.write_all(&m.symbol.to_be_bytes())?;
        out.write_all(&[m.modifiers.bits(), m.flags.bits()])?;
        out.write_all(&m.special.to_be_bytes())?;
    }
    for c in compose {
        out.write_all(&c.first.to_be_bytes())?;
        out.write_all(&c.second.to_be_bytes())?;
        out.write_all(&c.result.to_be_bytes())?;
    }
    Ok(())
}

/// Serialize to a file at `path`.
pub fn save(keymap: &Keymap, path: impl AsRef<Path>) -> io::Result<()> {
    let mut file = io::BufWriter::new(File::create(path)?);
    write(keymap, &mut file)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Keymap {
        Keymap::new(
            vec![
                Mapping::new(30, 'a' as u16, 'A' as u32, TableModifiers::empty(), MappingFlags::IS_LETTER, 0),
                Mapping::new(
                    42,
                    0xffff,
                    0x0100_0020,
                    TableModifiers::empty(),
                    MappingFlags::IS_MODIFIER,
                    0x0001,
                ),
                Mapping::new(40, 0xb4, 0x0100_1251, TableModifiers::ALT_GR, MappingFlags::IS_DEAD, 0),
            ],
            vec![ComposeEntry::new(0xb4, 'e' as u16, 0xe9)],
            true,
        )
    }

    fn encode(map: &Keymap) -> Vec<u8> {
        let mut bytes = Vec::new();
        write(map, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_record_sizes() {
        let bytes = encode(&sample());
        assert_eq!(bytes.len(), 16 + 3 * 12 + 6);
        assert_eq!(&bytes[0..4], b"QMAP");
    }

    #[test]
    fn test_read_back() {
        let map = sample();
        let loaded = read(&mut encode(&map).as_slice()).unwrap();
        assert_eq!(loaded.mappings(), map.mappings());
        assert_eq!(loaded.compose_table(), map.compose_table());
        assert!(loaded.compose_enabled());
    }

    #[test]
    fn test_unknown_flag_bits_survive() {
        let map = Keymap::new(
            vec![Mapping::new(1, 0, 0, TableModifiers::empty(), MappingFlags::from_bits_retain(0xf0), 0)],
            vec![],
            true,
        );
        let loaded = read(&mut encode(&map).as_slice()).unwrap();
        assert_eq!(loaded.mappings()[0].flags.bits(), 0xf0);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = encode(&sample());
        bytes[0] = b'X';
        assert!(matches!(read(&mut bytes.as_slice()), Err(KeymapError::BadMagic(_))));
    }

    #[test]
    fn test_bad_version() {
        let mut bytes = encode(&sample());
        bytes[7] = 2;
        assert!(matches!(read(&mut bytes.as_slice()), Err(KeymapError::UnsupportedVersion(2))));
    }

    #[test]
    fn test_empty_keymap_rejected() {
        let empty = Keymap::new(vec![], vec![], true);
        assert!(matches!(read(&mut encode(&empty).as_slice()), Err(KeymapError::Empty)));
    }

    #[test]
    fn test_truncated_mapping() {
        let bytes = encode(&sample());
        let cut = &bytes[..16 + 12 + 5];
        match read(&mut &cut[..]) {
            Err(KeymapError::Truncated { what, expected, got }) => {
                assert_eq!(what, "mapping");
                assert_eq!(expected, 3);
                assert_eq!(got, 1);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_compose() {
        let bytes = encode(&sample());
        let cut = &bytes[..bytes.len() - 1];
        assert!(matches!(
            read(&mut &cut[..]),
            Err(KeymapError::Truncated { what: "compose", .. })
        ));
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(
            read(&mut &b"QMA"[..]),
            Err(KeymapError::Truncated { what: "header", .. })
        ));
    }
}
