//! Bounded top-N peak selection per aggregate metric.
//!
//! Each bin that survives the neighbour pre-filter is bubbled into an
//! `N`-slot list: an empty slot takes it outright, otherwise it swaps with
//! every occupant it beats and the displaced occupant carries on down the
//! list. Whatever falls off the end is dropped. O(F·N) overall, no sort.

use super::result::{Aggregates, Metric, PeakEntry, TopNSelection};

/// Neighbour pre-filter for interior bins.
///
/// A bin is skipped when its left neighbour is at least as large or its
/// right neighbour is strictly larger. The same direction is used for every
/// metric, including `Min`. A bin next to a missing value counts as an
/// endpoint and bypasses the filter, same as the first and last bin.
fn passes_neighbour_filter(entries: &[Option<PeakEntry>], idx: usize, value: f64) -> bool {
    if idx == 0 || idx + 1 >= entries.len() {
        return true;
    }
    match (entries[idx - 1], entries[idx + 1]) {
        (Some(left), Some(right)) => !(left.value >= value || value < right.value),
        _ => true,
    }
}

/// Pick up to `top_n` bins from one metric array, best first.
///
/// The returned vector always has `top_n` slots; unused trailing slots are
/// `None`. Bins whose metric value is `None` are never selected.
pub fn select_top_n(entries: &[Option<PeakEntry>], metric: Metric, top_n: usize) -> Vec<Option<usize>> {
    let mut slots: Vec<Option<PeakEntry>> = vec![None; top_n];

    for (idx, entry) in entries.iter().enumerate() {
        let Some(entry) = *entry else {
            continue;
        };
        if !passes_neighbour_filter(entries, idx, entry.value) {
            continue;
        }

        let mut candidate = entry;
        for slot in slots.iter_mut() {
            match slot {
                None => {
                    *slot = Some(candidate);
                    break;
                }
                Some(occupant) => {
                    if metric.beats(candidate.value, occupant.value) {
                        std::mem::swap(occupant, &mut candidate);
                    }
                }
            }
        }
    }

    slots
        .into_iter()
        .map(|slot| slot.map(|entry| entry.frequency_index))
        .collect()
}

/// Run the selection for `min`, `max` and `avg`.
pub fn select_peaks(aggregates: &Aggregates, top_n: usize) -> TopNSelection {
    let mut selection = TopNSelection::empty(top_n);
    for metric in Metric::ALL {
        *selection.metric_mut(metric) = select_top_n(aggregates.metric(metric), metric, top_n);
    }
    selection
}
