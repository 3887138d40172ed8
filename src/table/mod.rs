//! Table Module
//!
//! Value types describing immutable on-disk tables.
//!
//! ## Responsibilities
//! - Identify tables by origin (WAL sequence or compacted ULID)
//! - Carry the per-table metadata record (`TableInfo`)
//! - Pair both with a lazily cached, decoded index block (`TableHandle`)
//!
//! Nothing in this module performs I/O. Index bytes are fetched by the
//! storage layer and handed to [`TableHandle::load_index`].

mod handle;
mod id;
mod info;

pub use handle::TableHandle;
pub use id::{TableId, TableIdGenerator};
pub use info::{BlockMeta, CompressionCodec, TableIndex, TableInfo};
