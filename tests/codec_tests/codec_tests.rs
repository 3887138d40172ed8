//! Tests for the table metadata codec
//!
//! These tests verify:
//! - TableInfo and TableIndex survive encode → decode unchanged
//! - Absent and empty first keys stay distinct
//! - Unknown compression enumerants, bad checksums and truncation are
//!   reported as corrupt metadata
//! - Records written with extra (newer) fields still decode

use bytes::Bytes;
use proptest::prelude::*;
use prost::Message;
use strata::codec::proto::TableInfoRecord;
use strata::codec::{self, ProtobufTableCodec, TableInfoCodec, CHECKSUM_SIZE};
use strata::table::{BlockMeta, CompressionCodec, TableIndex, TableInfo};
use strata::StrataError;

// =============================================================================
// Helper Functions
// =============================================================================

fn info_with_key(first_key: Option<&'static [u8]>) -> TableInfo {
    TableInfo {
        first_key: first_key.map(Bytes::from_static),
        index_offset: 1024,
        index_len: 256,
        filter_offset: 1280,
        filter_len: 64,
        compression_codec: CompressionCodec::Snappy,
    }
}

/// TableInfo as a later schema version might write it, with a field this
/// crate does not know about
#[derive(Clone, PartialEq, Message)]
struct TableInfoRecordV2 {
    #[prost(bytes = "bytes", optional, tag = "1")]
    first_key: Option<Bytes>,
    #[prost(uint64, tag = "2")]
    index_offset: u64,
    #[prost(uint64, tag = "3")]
    index_len: u64,
    #[prost(uint64, tag = "4")]
    filter_offset: u64,
    #[prost(uint64, tag = "5")]
    filter_len: u64,
    #[prost(int32, tag = "6")]
    compression_codec: i32,
    #[prost(string, tag = "7")]
    last_key_hint: String,
    #[prost(uint64, tag = "8")]
    entry_count: u64,
}

fn codec_strategy() -> impl Strategy<Value = CompressionCodec> {
    prop::sample::select(CompressionCodec::ALL.to_vec())
}

fn info_strategy() -> impl Strategy<Value = TableInfo> {
    (
        prop::option::of(prop::collection::vec(any::<u8>(), 0..64)),
        any::<u64>(),
        any::<u64>(),
        any::<u64>(),
        any::<u64>(),
        codec_strategy(),
    )
        .prop_map(
            |(first_key, index_offset, index_len, filter_offset, filter_len, compression_codec)| {
                TableInfo {
                    first_key: first_key.map(Bytes::from),
                    index_offset,
                    index_len,
                    filter_offset,
                    filter_len,
                    compression_codec,
                }
            },
        )
}

// =============================================================================
// TableInfo Round-Trip Tests
// =============================================================================

proptest! {
    #[test]
    fn prop_table_info_round_trips(info in info_strategy()) {
        let encoded = codec::encode_table_info(&info);
        let decoded = codec::decode_table_info(&encoded).unwrap();
        prop_assert_eq!(decoded, info);
    }
}

#[test]
fn test_absent_first_key_round_trips_as_absent() {
    let info = info_with_key(None);
    let decoded = codec::decode_table_info(&codec::encode_table_info(&info)).unwrap();

    assert_eq!(decoded.first_key, None);
    assert_eq!(decoded, info);
}

#[test]
fn test_empty_first_key_round_trips_as_present() {
    let info = info_with_key(Some(b""));
    let decoded = codec::decode_table_info(&codec::encode_table_info(&info)).unwrap();

    assert_eq!(decoded.first_key, Some(Bytes::new()));
}

#[test]
fn test_every_codec_round_trips() {
    for compression_codec in CompressionCodec::ALL {
        let info = TableInfo {
            compression_codec,
            ..info_with_key(Some(b"k"))
        };
        let decoded = codec::decode_table_info(&codec::encode_table_info(&info)).unwrap();
        assert_eq!(decoded.compression_codec, compression_codec);
    }
}

#[test]
fn test_default_info_round_trips() {
    // All fields at their protobuf defaults encode to an empty message
    let info = TableInfo::default();
    let encoded = codec::encode_table_info(&info);

    assert_eq!(encoded.len(), CHECKSUM_SIZE);
    assert_eq!(codec::decode_table_info(&encoded).unwrap(), info);
}

#[test]
fn test_codec_enumerants_are_fixed() {
    assert_eq!(CompressionCodec::None.to_wire(), 0);
    assert_eq!(CompressionCodec::Snappy.to_wire(), 1);
    assert_eq!(CompressionCodec::Zlib.to_wire(), 2);
    assert_eq!(CompressionCodec::Lz4.to_wire(), 3);
    assert_eq!(CompressionCodec::Zstd.to_wire(), 4);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_unknown_compression_enumerant_is_corrupt() {
    let record = TableInfoRecord {
        first_key: Some(Bytes::from_static(b"a")),
        index_offset: 1,
        index_len: 2,
        filter_offset: 3,
        filter_len: 4,
        compression_codec: 99,
    };
    let err = codec::decode_table_info(&codec::seal(&record)).unwrap_err();

    assert!(matches!(err, StrataError::CorruptMetadata(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_negative_compression_enumerant_is_corrupt() {
    let record = TableInfoRecord {
        compression_codec: -1,
        ..TableInfoRecord::default()
    };
    let err = codec::decode_table_info(&codec::seal(&record)).unwrap_err();
    assert!(matches!(err, StrataError::CorruptMetadata(_)));
}

#[test]
fn test_flipped_bit_fails_checksum() {
    let encoded = codec::encode_table_info(&info_with_key(Some(b"first")));
    let mut damaged = encoded.to_vec();
    damaged[2] ^= 0x40;

    let err = codec::decode_table_info(&damaged).unwrap_err();
    assert!(matches!(err, StrataError::CorruptMetadata(_)));
}

#[test]
fn test_truncated_record_is_corrupt() {
    let encoded = codec::encode_table_info(&info_with_key(Some(b"first")));

    for len in [0, 1, CHECKSUM_SIZE - 1, encoded.len() - 1] {
        let err = codec::decode_table_info(&encoded[..len]).unwrap_err();
        assert!(
            matches!(err, StrataError::CorruptMetadata(_)),
            "length {} should be rejected",
            len
        );
    }
}

#[test]
fn test_malformed_payload_with_valid_checksum_is_corrupt() {
    // Field 1 declared as length-delimited with a length far past the end
    let payload = [0x0a, 0x7f, 0x01];
    let mut framed = payload.to_vec();
    framed.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());

    let err = codec::decode_table_info(&framed).unwrap_err();
    assert!(matches!(err, StrataError::CorruptMetadata(_)));
}

// =============================================================================
// Forward Compatibility Tests
// =============================================================================

#[test]
fn test_newer_record_with_extra_fields_decodes() {
    let newer = TableInfoRecordV2 {
        first_key: Some(Bytes::from_static(b"alpha")),
        index_offset: 10,
        index_len: 20,
        filter_offset: 30,
        filter_len: 40,
        compression_codec: CompressionCodec::Zstd.to_wire(),
        last_key_hint: "omega".to_string(),
        entry_count: 12345,
    };

    let decoded = codec::decode_table_info(&codec::seal(&newer)).unwrap();

    assert_eq!(decoded.first_key, Some(Bytes::from_static(b"alpha")));
    assert_eq!(decoded.index_offset, 10);
    assert_eq!(decoded.index_len, 20);
    assert_eq!(decoded.filter_offset, 30);
    assert_eq!(decoded.filter_len, 40);
    assert_eq!(decoded.compression_codec, CompressionCodec::Zstd);
}

#[test]
fn test_current_record_decodes_with_newer_schema() {
    let info = info_with_key(Some(b"k"));
    let encoded = codec::encode_table_info(&info);
    let payload = &encoded[..encoded.len() - CHECKSUM_SIZE];

    let newer = TableInfoRecordV2::decode(payload).unwrap();
    assert_eq!(newer.first_key, info.first_key);
    assert_eq!(newer.last_key_hint, "");
    assert_eq!(newer.entry_count, 0);
}

// =============================================================================
// TableIndex Tests
// =============================================================================

#[test]
fn test_index_round_trips() {
    let index = TableIndex {
        block_meta: vec![
            BlockMeta { offset: 0, first_key: Bytes::from_static(b"") },
            BlockMeta { offset: 4096, first_key: Bytes::from_static(b"m") },
            BlockMeta { offset: 8192, first_key: Bytes::from_static(b"t") },
        ],
    };

    let decoded = codec::decode_table_index(&codec::encode_table_index(&index)).unwrap();
    assert_eq!(decoded, index);
}

#[test]
fn test_empty_index_round_trips() {
    let index = TableIndex::default();
    let decoded = codec::decode_table_index(&codec::encode_table_index(&index)).unwrap();
    assert!(decoded.block_meta.is_empty());
}

#[test]
fn test_index_checksum_is_verified() {
    let index = TableIndex {
        block_meta: vec![BlockMeta { offset: 7, first_key: Bytes::from_static(b"key") }],
    };
    let mut damaged = codec::encode_table_index(&index).to_vec();
    let last = damaged.len() - 1;
    damaged[last] ^= 0xff;

    let err = codec::decode_table_index(&damaged).unwrap_err();
    assert!(matches!(err, StrataError::CorruptMetadata(_)));
}

#[test]
fn test_trait_object_matches_free_functions() {
    let codec_impl: Box<dyn TableInfoCodec> = Box::new(ProtobufTableCodec);
    let info = info_with_key(Some(b"key"));

    let via_trait = codec_impl.encode_info(&info);
    assert_eq!(via_trait, codec::encode_table_info(&info));
    assert_eq!(codec_impl.decode_info(&via_trait).unwrap(), info);

    let index = TableIndex {
        block_meta: vec![BlockMeta { offset: 1, first_key: Bytes::from_static(b"a") }],
    };
    let encoded = codec_impl.encode_index(&index);
    assert_eq!(codec_impl.decode_index(&encoded).unwrap(), index);
}
