//! Schedule conflict detection over a user's confirmed bookings.
//!
//! Two half-open intervals `[a.start, a.end)` and `[b.start, b.end)` conflict
//! iff `a.start < b.end && b.start < a.end`; touching endpoints do not count.

use crate::api::{ConfirmedSlot, TimeWindow};

/// Find the first confirmed slot whose activity window overlaps the
/// candidate window.
///
/// `held` is the set of activity time windows for the user's confirmed
/// bookings, in no particular order; the full set is scanned.
pub fn find_conflict<'a>(
    candidate: &TimeWindow,
    held: &'a [ConfirmedSlot],
) -> Option<&'a ConfirmedSlot> {
    held.iter().find(|slot| slot.window.overlaps(candidate))
}

/// Check whether the candidate window overlaps any held slot.
pub fn has_conflict(candidate: &TimeWindow, held: &[ConfirmedSlot]) -> bool {
    find_conflict(candidate, held).is_some()
}
