//! Picks the next few occurrences out of the pooled set.

use crate::event::Occurrence;
use crate::window::Window;

/// Keep occurrences inside `window`, sort them by start and return the
/// first `limit`. Occurrences with equal starts keep their pooled order.
pub fn select_upcoming<'a>(
    mut occurrences: Vec<Occurrence<'a>>,
    window: &Window,
    limit: usize,
) -> Vec<Occurrence<'a>> {
    occurrences.retain(|occ| window.contains(&occ.start));
    occurrences.sort_by_key(|occ| occ.start);
    occurrences.truncate(limit);
    occurrences
}
