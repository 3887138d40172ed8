//! Folding a compaction result back into live state
//!
//! The compactor works on a clone of the core state taken at some earlier
//! instant. Meanwhile the writer may have promoted more memtables, each
//! pushed onto the front of L0. Compaction only ever drops the oldest L0
//! tables (everything up to and including `l0_last_compacted`), so the live
//! L0 after a refresh is the live list cut at the marker:
//!
//! ```text
//!   live l0:       [N2, N1, C2, C1, M, O1]     (N* flushed after the snapshot)
//!   compacted l0:          [C2, C1]            marker = M
//!   merged l0:     [N2, N1, C2, C1]
//! ```
//!
//! The merge is a pure function so it can be tested without any locking.

use std::collections::VecDeque;

use tracing::{debug, error};

use crate::error::{Result, StrataError};
use crate::table::{TableHandle, TableId};

use super::CoreState;

/// Reconcile a compaction result against the live state.
///
/// - Without a marker, live L0 is kept as is and the compactor's L0 is not
///   consulted: the pass only rewrote higher levels.
/// - With a marker still in live L0, live L0 is cut right before it and the
///   survivors must end with exactly the compactor's L0.
/// - A marker no longer in live L0 that is at or before the boundary live
///   state records was folded in by a newer pass. Live L0 and its boundary
///   are kept.
/// - `higher_levels` is taken from the compaction; `last_flushed_wal_id` is
///   kept from live state.
///
/// Any other marker, or a compactor L0 that does not match the survivors, is
/// an [`StrataError::InvariantViolation`]: the compactor worked on state this
/// writer never produced.
pub fn merge_compaction(live: &CoreState, compacted: CoreState) -> Result<CoreState> {
    let CoreState {
        l0: compacted_l0,
        l0_last_compacted,
        higher_levels,
        ..
    } = compacted;

    let (l0, marker) = match l0_last_compacted {
        // Higher levels only; L0 is whatever live state holds now
        None => (live.l0.clone(), live.l0_last_compacted),
        Some(marker) => match live.l0.iter().position(|table| table.id() == &marker) {
            Some(cut) => {
                let l0 = live.l0.iter().take(cut).cloned().collect::<VecDeque<_>>();
                ensure_suffix(l0.iter(), compacted_l0.iter())?;
                (l0, Some(marker))
            }
            None if is_applied_boundary(&marker, live.l0_last_compacted.as_ref()) => {
                debug!(
                    marker = %marker,
                    "compaction boundary already applied by a newer pass"
                );
                (live.l0.clone(), live.l0_last_compacted)
            }
            None => {
                error!(marker = %marker, "compaction marker unknown to live state");
                return Err(StrataError::InvariantViolation(format!(
                    "l0_last_compacted {} is neither in live l0 nor at or before its compacted boundary",
                    marker
                )));
            }
        },
    };

    debug!(
        live_l0 = live.l0.len(),
        merged_l0 = l0.len(),
        compacted_l0 = compacted_l0.len(),
        runs = higher_levels.len(),
        "merged compaction result"
    );

    Ok(CoreState {
        l0,
        l0_last_compacted: marker,
        higher_levels,
        last_flushed_wal_id: live.last_flushed_wal_id,
    })
}

/// A marker missing from live L0 was already folded in when it is the live
/// boundary itself or an older id from the same origin.
fn is_applied_boundary(marker: &TableId, live_marker: Option<&TableId>) -> bool {
    match live_marker {
        Some(live_marker) => {
            marker == live_marker || marker.created_after(live_marker) == Some(false)
        }
        None => false,
    }
}

/// The compactor never reorders or fabricates L0 tables, so the tables it
/// still lists must be the oldest survivors, in the same order.
fn ensure_suffix<'a, L, C>(live: L, compacted: C) -> Result<()>
where
    L: DoubleEndedIterator<Item = &'a TableHandle> + ExactSizeIterator,
    C: DoubleEndedIterator<Item = &'a TableHandle> + ExactSizeIterator,
{
    if compacted.len() > live.len() {
        error!(
            live = live.len(),
            compacted = compacted.len(),
            "compaction returned more l0 tables than live state holds"
        );
        return Err(StrataError::InvariantViolation(format!(
            "compacted l0 has {} tables but only {} survive in live l0",
            compacted.len(),
            live.len()
        )));
    }

    for (position, (ours, theirs)) in live.rev().zip(compacted.rev()).enumerate() {
        if ours.id() != theirs.id() {
            error!(
                position,
                live = %ours.id(),
                compacted = %theirs.id(),
                "compacted l0 diverges from live l0"
            );
            return Err(StrataError::InvariantViolation(format!(
                "compacted l0 table {} does not match live l0 table {} ({} from the oldest end)",
                theirs.id(),
                ours.id(),
                position
            )));
        }
    }

    Ok(())
}
