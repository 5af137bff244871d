//! Per-bin batch statistics: latest, minimum, maximum and average level.

use crate::data::filter::{valid_level, valid_levels};
use crate::data::model::SweepReading;

use super::result::{Aggregates, Metric, PeakEntry};

/// Statistics folded over one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStatistics {
    pub aggregates: Aggregates,
    pub mean_sweep_duration_s: Option<f64>,
}

/// Keep `candidate` in `slot` if the slot is empty or the candidate ranks
/// ahead of the occupant. Ties keep the occupant.
fn fold_extreme(slot: &mut Option<PeakEntry>, candidate: PeakEntry, metric: Metric) {
    let keep = matches!(slot, Some(current) if !metric.beats(candidate.value, current.value));
    if !keep {
        *slot = Some(candidate);
    }
}

/// Fold every sweep of the batch into per-bin statistics.
///
/// The average divides each bin's sum of valid readings by the total number
/// of sweeps, not by that bin's valid-reading count: failed readings pull the
/// average toward zero.
pub fn accumulate(sweeps: &[SweepReading], bins: usize) -> BatchStatistics {
    let Some(last) = sweeps.last() else {
        return BatchStatistics {
            aggregates: Aggregates::empty(bins),
            mean_sweep_duration_s: None,
        };
    };

    let mut aggregates = Aggregates::empty(bins);

    aggregates.latest = last
        .levels
        .iter()
        .enumerate()
        .map(|(bin, &level)| valid_level(level).map(|v| PeakEntry::new(bin, f64::from(v))))
        .collect();

    let mut sums = vec![0.0f64; bins];
    let mut seen = vec![false; bins];
    let mut total_time_ms = 0.0f64;

    for sweep in sweeps {
        total_time_ms += sweep.total_time_ms;

        for (bin, level) in valid_levels(&sweep.levels) {
            let entry = PeakEntry::new(bin, f64::from(level));
            fold_extreme(&mut aggregates.min[bin], entry, Metric::Min);
            fold_extreme(&mut aggregates.max[bin], entry, Metric::Max);
            sums[bin] += entry.value;
            seen[bin] = true;
        }
    }

    let count = sweeps.len() as f64;
    aggregates.avg = sums
        .iter()
        .zip(&seen)
        .enumerate()
        .map(|(bin, (&sum, &valid))| valid.then(|| PeakEntry::new(bin, sum / count)))
        .collect();

    BatchStatistics {
        aggregates,
        mean_sweep_duration_s: Some(total_time_ms / (1000.0 * count)),
    }
}
