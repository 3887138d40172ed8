//! State Module
//!
//! Tracks the shape of the tree and the memtables that feed it.
//!
//! ## Responsibilities
//! - Own the active memtable and the queue of frozen ones
//! - Promote flushed memtables into L0 (newest first)
//! - Merge compaction results without losing concurrently flushed tables
//!
//! ## Writer / Compactor Protocol
//! ```text
//!   writer                          compactor
//!   ──────                          ─────────
//!   freeze ─▶ flush ─▶ promote
//!        core_state_clone() ──────▶ compact(clone)
//!   freeze ─▶ flush ─▶ promote           │
//!        refresh_db_state(result) ◀──────┘
//! ```
//! The compactor never touches live state; it only returns a new `CoreState`.

mod core_state;
mod db_state;
mod merge;

pub use core_state::{CoreState, SortedRun};
pub use db_state::{DbState, StateSnapshot};
pub use merge::merge_compaction;
