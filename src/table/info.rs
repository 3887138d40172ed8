//! Table metadata records

use bytes::Bytes;

use crate::error::{Result, StrataError};

/// Compression applied to a table's blocks
///
/// The integer values are part of the on-disk format and must never be
/// renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionCodec {
    #[default]
    None,
    Snappy,
    Zlib,
    Lz4,
    Zstd,
}

impl CompressionCodec {
    /// Every codec, in enumerant order
    pub const ALL: [CompressionCodec; 5] = [
        CompressionCodec::None,
        CompressionCodec::Snappy,
        CompressionCodec::Zlib,
        CompressionCodec::Lz4,
        CompressionCodec::Zstd,
    ];

    /// On-disk enumerant
    pub fn to_wire(self) -> i32 {
        match self {
            CompressionCodec::None => 0,
            CompressionCodec::Snappy => 1,
            CompressionCodec::Zlib => 2,
            CompressionCodec::Lz4 => 3,
            CompressionCodec::Zstd => 4,
        }
    }

    /// Parse an on-disk enumerant. Unknown values are corruption, not a
    /// reason to fall back to `None`.
    pub fn from_wire(value: i32) -> Result<Self> {
        match value {
            0 => Ok(CompressionCodec::None),
            1 => Ok(CompressionCodec::Snappy),
            2 => Ok(CompressionCodec::Zlib),
            3 => Ok(CompressionCodec::Lz4),
            4 => Ok(CompressionCodec::Zstd),
            other => Err(StrataError::CorruptMetadata(format!(
                "unknown compression codec enumerant {}",
                other
            ))),
        }
    }
}

/// Fixed metadata describing one table file
///
/// Offsets and lengths are byte ranges inside the table's own file; this
/// crate only carries them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableInfo {
    /// First key in the table. `None` only for an empty table; an empty key
    /// is `Some` of an empty buffer.
    pub first_key: Option<Bytes>,
    pub index_offset: u64,
    pub index_len: u64,
    pub filter_offset: u64,
    pub filter_len: u64,
    pub compression_codec: CompressionCodec,
}

/// Location of one data block inside a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMeta {
    pub offset: u64,
    pub first_key: Bytes,
}

/// Decoded index block: one entry per data block, in key order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableIndex {
    pub block_meta: Vec<BlockMeta>,
}

impl TableIndex {
    /// Index of the block that may hold `key`, i.e. the last block whose
    /// first key is `<= key`.
    pub fn find_block(&self, key: &[u8]) -> Option<usize> {
        let after = self
            .block_meta
            .partition_point(|meta| meta.first_key.as_ref() <= key);
        after.checked_sub(1)
    }
}
