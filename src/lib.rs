//! # Strata
//!
//! The in-memory state core of an LSM key-value engine:
//! - Memtable lifecycle (active → frozen → flushed into L0)
//! - Ordered L0 table list, newest first
//! - Merging of background compaction results without losing concurrent flushes
//! - Binary metadata records for tables (first key, index/filter locations,
//!   compression codec)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Engine                             │
//! │            (Single Writer / Multi Reader, one mutex)        │
//! └───────┬──────────────────────┬──────────────────────┬───────┘
//!         │                      │                      │
//!         ▼                      ▼                      ▼
//!  ┌─────────────┐       ┌──────────────┐       ┌──────────────┐
//!  │  MemTables  │       │  CoreState   │◀──────│  Compaction  │
//!  │ active+imm  │──────▶│ L0 + levels  │ merge │    Worker    │
//!  └─────────────┘ flush └──────┬───────┘       └──────────────┘
//!                               │
//!                               ▼
//!                       ┌──────────────┐
//!                       │ TableHandle  │
//!                       │ + codec      │
//!                       └──────────────┘
//! ```
//!
//! Storage I/O, the WAL format and the compaction planner live outside this
//! crate, behind the [`flush::Flusher`] and [`compactor::Compactor`] traits.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod table;
pub mod codec;
pub mod memtable;
pub mod state;
pub mod flush;
pub mod compactor;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StrataError};
pub use config::Config;
pub use engine::Engine;
pub use state::{CoreState, DbState};
pub use table::{TableHandle, TableId, TableInfo};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Strata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
