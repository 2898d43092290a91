//! Binary vector-index file.
//!
//! Layout (all integers and floats little-endian):
//!
//! | offset | size            | field                      |
//! |--------|-----------------|----------------------------|
//! | 0      | 4               | magic `TRVI`               |
//! | 4      | 4               | format version (`1`)       |
//! | 8      | 4               | dimension                  |
//! | 12     | 4               | vector count `n`           |
//! | 16     | `4n`            | ordinals (`u32`)           |
//! | ...    | `4n * dimension`| vectors, row-major (`f32`) |

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::cache::l2::VectorIndex;

use super::error::{StorageError, StorageResult};

pub const INDEX_MAGIC: [u8; 4] = *b"TRVI";
pub const INDEX_VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

/// Serializes `index` into the on-disk layout.
pub fn encode_index(index: &VectorIndex) -> StorageResult<Vec<u8>> {
    let dimension = u32::try_from(index.dimension()).map_err(|_| StorageError::InvalidIndexFile {
        reason: format!("dimension {} exceeds u32", index.dimension()),
    })?;
    let count = u32::try_from(index.len()).map_err(|_| StorageError::InvalidIndexFile {
        reason: format!("vector count {} exceeds u32", index.len()),
    })?;

    let mut out = Vec::with_capacity(HEADER_LEN + 4 * (index.len() + index.values().len()));
    out.extend_from_slice(&INDEX_MAGIC);
    out.extend_from_slice(&INDEX_VERSION.to_le_bytes());
    out.extend_from_slice(&dimension.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    for ordinal in index.ordinals() {
        out.extend_from_slice(&ordinal.to_le_bytes());
    }
    for value in index.values() {
        out.extend_from_slice(&value.to_le_bytes());
    }
    Ok(out)
}

/// Parses the on-disk layout, validating header and length.
pub fn decode_index(bytes: &[u8]) -> StorageResult<VectorIndex> {
    let invalid = |reason: String| StorageError::InvalidIndexFile { reason };

    if bytes.len() < HEADER_LEN {
        return Err(invalid(format!("file too short ({} bytes)", bytes.len())));
    }
    if bytes[..4] != INDEX_MAGIC {
        return Err(invalid("bad magic".to_string()));
    }
    let version = read_u32(bytes, 4);
    if version != INDEX_VERSION {
        return Err(invalid(format!("unsupported version {}", version)));
    }
    let dimension = read_u32(bytes, 8) as usize;
    let count = read_u32(bytes, 12) as usize;

    let expected = count
        .checked_mul(dimension)
        .and_then(|values| values.checked_add(count))
        .and_then(|words| words.checked_mul(4))
        .and_then(|body| body.checked_add(HEADER_LEN))
        .ok_or_else(|| invalid("header sizes overflow".to_string()))?;
    if bytes.len() != expected {
        return Err(invalid(format!(
            "expected {} bytes for {} vectors of dimension {}, found {}",
            expected,
            count,
            dimension,
            bytes.len()
        )));
    }

    let ordinals_end = HEADER_LEN + 4 * count;
    let ordinals = bytes[HEADER_LEN..ordinals_end]
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    let values = bytes[ordinals_end..]
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    VectorIndex::from_parts(dimension, ordinals, values).map_err(|e| invalid(e.to_string()))
}

/// Memory-maps and decodes an index file.
pub fn read_index(path: &Path) -> StorageResult<VectorIndex> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Err(StorageError::InvalidIndexFile {
            reason: format!("{} is empty", path.display()),
        });
    }

    // SAFETY: the file is opened read-only and artifacts are replaced by rename, never
    // rewritten in place.
    let mmap = unsafe { Mmap::map(&file)? };
    decode_index(&mmap)
}

#[inline]
fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VectorIndex {
        VectorIndex::from_parts(2, vec![3, 0, 7], vec![0.6, 0.8, 1.0, 0.0, 0.0, -1.0])
            .expect("index")
    }

    #[test]
    fn test_decode_restores_index() {
        let bytes = encode_index(&sample()).expect("encode");
        assert_eq!(&bytes[..4], b"TRVI");
        assert_eq!(bytes.len(), 16 + 4 * 3 + 4 * 6);
        assert_eq!(decode_index(&bytes).expect("decode"), sample());
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        let mut bytes = encode_index(&sample()).expect("encode");
        bytes[0] = b'X';
        assert!(matches!(
            decode_index(&bytes),
            Err(StorageError::InvalidIndexFile { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_file() {
        let bytes = encode_index(&sample()).expect("encode");
        assert!(decode_index(&bytes[..bytes.len() - 4]).is_err());
        assert!(decode_index(&bytes[..10]).is_err());
    }

    #[test]
    fn test_read_index_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("vector_index.bin");
        std::fs::write(&path, encode_index(&sample()).expect("encode")).expect("write");

        assert_eq!(read_index(&path).expect("read"), sample());
    }

    #[test]
    fn test_read_index_empty_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("vector_index.bin");
        std::fs::write(&path, b"").expect("write");
        assert!(read_index(&path).is_err());
    }
}
