//! Protobuf message definitions for table metadata
//!
//! Hand-maintained equivalent of:
//!
//! ```text
//! message TableInfo {
//!   optional bytes first_key = 1;
//!   uint64 index_offset = 2;
//!   uint64 index_len = 3;
//!   uint64 filter_offset = 4;
//!   uint64 filter_len = 5;
//!   int32 compression_codec = 6;
//! }
//!
//! message BlockMeta {
//!   uint64 offset = 1;
//!   bytes first_key = 2;
//! }
//!
//! message TableIndex {
//!   repeated BlockMeta block_meta = 1;
//! }
//! ```
//!
//! Tags are append-only. Removed fields keep their tag reserved.

use bytes::Bytes;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableInfoRecord {
    #[prost(bytes = "bytes", optional, tag = "1")]
    pub first_key: ::core::option::Option<Bytes>,
    #[prost(uint64, tag = "2")]
    pub index_offset: u64,
    #[prost(uint64, tag = "3")]
    pub index_len: u64,
    #[prost(uint64, tag = "4")]
    pub filter_offset: u64,
    #[prost(uint64, tag = "5")]
    pub filter_len: u64,
    #[prost(int32, tag = "6")]
    pub compression_codec: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockMetaRecord {
    #[prost(uint64, tag = "1")]
    pub offset: u64,
    #[prost(bytes = "bytes", tag = "2")]
    pub first_key: Bytes,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableIndexRecord {
    #[prost(message, repeated, tag = "1")]
    pub block_meta: Vec<BlockMetaRecord>,
}
