//! Codec Module
//!
//! Binary encoding of table metadata.
//!
//! ## Record Format
//! ```text
//! ┌──────────────────────────────────────┬──────────────┐
//! │ Protobuf message (field-tagged)      │ CRC32 (4 LE) │
//! └──────────────────────────────────────┴──────────────┘
//! ```
//!
//! The message is self-describing: decoders skip fields they do not know, so
//! a record written by a newer schema still decodes here. The trailing CRC
//! covers the message bytes only.
//!
//! `TableInfo` and `TableIndex` are encoded independently; the index bytes
//! live inside the table file at `index_offset..index_offset + index_len`.

pub mod proto;

use bytes::{BufMut, Bytes};
use prost::Message;

use crate::error::{Result, StrataError};
use crate::table::{BlockMeta, CompressionCodec, TableIndex, TableInfo};

use proto::{BlockMetaRecord, TableIndexRecord, TableInfoRecord};

/// Checksum trailer size in bytes
pub const CHECKSUM_SIZE: usize = 4;

/// Encoding contract for table metadata, handed to the storage layer
pub trait TableInfoCodec: Send + Sync {
    fn encode_info(&self, info: &TableInfo) -> Bytes;

    fn decode_info(&self, bytes: &[u8]) -> Result<TableInfo>;

    fn encode_index(&self, index: &TableIndex) -> Bytes;

    fn decode_index(&self, bytes: &[u8]) -> Result<TableIndex>;
}

/// Protobuf + CRC32 codec
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufTableCodec;

impl TableInfoCodec for ProtobufTableCodec {
    fn encode_info(&self, info: &TableInfo) -> Bytes {
        encode_table_info(info)
    }

    fn decode_info(&self, bytes: &[u8]) -> Result<TableInfo> {
        decode_table_info(bytes)
    }

    fn encode_index(&self, index: &TableIndex) -> Bytes {
        encode_table_index(index)
    }

    fn decode_index(&self, bytes: &[u8]) -> Result<TableIndex> {
        decode_table_index(bytes)
    }
}

// =============================================================================
// TableInfo
// =============================================================================

/// Encode a table info record
pub fn encode_table_info(info: &TableInfo) -> Bytes {
    let record = TableInfoRecord {
        first_key: info.first_key.clone(),
        index_offset: info.index_offset,
        index_len: info.index_len,
        filter_offset: info.filter_offset,
        filter_len: info.filter_len,
        compression_codec: info.compression_codec.to_wire(),
    };
    seal(&record)
}

/// Decode a table info record
pub fn decode_table_info(bytes: &[u8]) -> Result<TableInfo> {
    let record = TableInfoRecord::decode(unseal(bytes)?)?;

    Ok(TableInfo {
        first_key: record.first_key,
        index_offset: record.index_offset,
        index_len: record.index_len,
        filter_offset: record.filter_offset,
        filter_len: record.filter_len,
        compression_codec: CompressionCodec::from_wire(record.compression_codec)?,
    })
}

// =============================================================================
// TableIndex
// =============================================================================

/// Encode a table index block
pub fn encode_table_index(index: &TableIndex) -> Bytes {
    let record = TableIndexRecord {
        block_meta: index
            .block_meta
            .iter()
            .map(|meta| BlockMetaRecord {
                offset: meta.offset,
                first_key: meta.first_key.clone(),
            })
            .collect(),
    };
    seal(&record)
}

/// Decode a table index block
pub fn decode_table_index(bytes: &[u8]) -> Result<TableIndex> {
    let record = TableIndexRecord::decode(unseal(bytes)?)?;

    Ok(TableIndex {
        block_meta: record
            .block_meta
            .into_iter()
            .map(|meta| BlockMeta {
                offset: meta.offset,
                first_key: meta.first_key,
            })
            .collect(),
    })
}

// =============================================================================
// Checksum framing
// =============================================================================

/// Serialize a message and append its CRC32
pub fn seal<M: Message>(message: &M) -> Bytes {
    let mut buf = message.encode_to_vec();
    let crc = crc32fast::hash(&buf);
    buf.put_u32_le(crc);
    Bytes::from(buf)
}

/// Verify the trailing CRC32 and return the message bytes
fn unseal(bytes: &[u8]) -> Result<&[u8]> {
    if bytes.len() < CHECKSUM_SIZE {
        return Err(StrataError::CorruptMetadata(format!(
            "record too short: expected at least {} bytes, got {}",
            CHECKSUM_SIZE,
            bytes.len()
        )));
    }

    let (payload, trailer) = bytes.split_at(bytes.len() - CHECKSUM_SIZE);
    let stored = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let computed = crc32fast::hash(payload);

    if stored != computed {
        return Err(StrataError::CorruptMetadata(format!(
            "checksum mismatch: stored 0x{:08x}, computed 0x{:08x}",
            stored, computed
        )));
    }

    Ok(payload)
}
