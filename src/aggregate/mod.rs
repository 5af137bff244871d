/// Aggregation engine: one sweep batch in, one chart-ready summary out.
///
/// ```text
///   &[SweepReading] ──┬──► binner  ──► rows (≤ height)
///                     │
///                     └──► stats   ──► latest / min / max / avg
///                                          │
///                                          ▼
///                                       peaks ──► top-N per metric
/// ```
///
/// The engine is a pure function of its input; it keeps nothing between
/// calls.

pub mod binner;
pub mod error;
pub mod peaks;
pub mod result;
pub mod stats;

use log::debug;

use crate::config::AggregationConfig;
use crate::data::model::SweepReading;

pub use error::AggregateError;
pub use result::{AggregateRow, AggregationResult, Aggregates, Metric, PeakEntry, TopNSelection};

/// Every sweep must have the same bin count as the first one.
fn check_bin_counts(sweeps: &[SweepReading], expected: usize) -> Result<(), AggregateError> {
    match sweeps.iter().find(|s| s.bin_count() != expected) {
        Some(bad) => Err(AggregateError::BinCountMismatch {
            sweep_index: bad.sweep_index,
            expected,
            actual: bad.bin_count(),
        }),
        None => Ok(()),
    }
}

/// Aggregate an ordered sweep batch into waterfall rows, per-bin statistics
/// and per-metric peak lists.
///
/// Fails before doing any work if the configuration is invalid or the
/// sweeps disagree on their bin count. An empty batch is not an error.
pub fn aggregate(
    sweeps: &[SweepReading],
    config: &AggregationConfig,
) -> Result<AggregationResult, AggregateError> {
    config.validate()?;

    let Some(first) = sweeps.first() else {
        debug!("empty batch, nothing to aggregate");
        return Ok(AggregationResult::empty(config.top_n));
    };

    let bins = first.bin_count();
    check_bin_counts(sweeps, bins)?;

    let rows = binner::bin_rows(sweeps, config.height, bins);
    let stats = stats::accumulate(sweeps, bins);
    let peaks = peaks::select_peaks(&stats.aggregates, config.top_n);

    debug!(
        "aggregated {} sweeps x {} bins into {} rows (height {}, top {})",
        sweeps.len(),
        bins,
        rows.len(),
        config.height,
        config.top_n
    );

    Ok(AggregationResult {
        rows,
        aggregates: stats.aggregates,
        peaks,
        mean_sweep_duration_s: stats.mean_sweep_duration_s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(height: usize, top_n: usize) -> AggregationConfig {
        AggregationConfig::new(height, top_n)
    }

    #[test]
    fn empty_batch_is_not_an_error() {
        let result = aggregate(&[], &config(10, 3)).unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.bin_count(), 0);
        assert!(result.peaks.is_empty());
        assert_eq!(result.peaks.max.len(), 3);
        assert_eq!(result.mean_sweep_duration_s, None);
    }

    #[test]
    fn invalid_config_fails_even_for_empty_batch() {
        assert_eq!(aggregate(&[], &config(0, 3)), Err(AggregateError::InvalidHeight));
        assert_eq!(aggregate(&[], &config(3, 0)), Err(AggregateError::InvalidTopN));
    }

    #[test]
    fn mismatched_bin_count_is_rejected() {
        let sweeps = vec![
            SweepReading::new(0, 0, 10.0, vec![-50, -60]),
            SweepReading::new(7, 10, 10.0, vec![-50]),
        ];
        let err = aggregate(&sweeps, &config(10, 3)).unwrap_err();
        assert_eq!(
            err,
            AggregateError::BinCountMismatch {
                sweep_index: 7,
                expected: 2,
                actual: 1
            }
        );
        assert!(!err.is_configuration());
    }

    #[test]
    fn two_sweep_scenario() {
        let sweeps = vec![
            SweepReading::new(0, 1000, 500.0, vec![-50, -60]),
            SweepReading::new(1, 2000, 500.0, vec![-128, -40]),
        ];
        let result = aggregate(&sweeps, &config(1, 2)).unwrap();

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].levels, vec![-50.0, -50.0]);
        assert_eq!(result.rows[0].timestamp, 1000);

        let avg: Vec<_> = result.aggregates.avg.iter().map(|e| e.map(|e| e.value)).collect();
        assert_eq!(avg, vec![Some(-25.0), Some(-50.0)]);
        assert_eq!(result.peaks.max, vec![Some(1), Some(0)]);
        assert_eq!(result.peaks.min, vec![Some(1), Some(0)]);
        assert_eq!(result.peaks.avg, vec![Some(0), Some(1)]);
        assert_eq!(result.mean_sweep_duration_s, Some(0.5));
    }
}
