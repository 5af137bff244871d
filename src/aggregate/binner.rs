//! Waterfall row binning.
//!
//! Folds an ordered batch of sweeps into at most `height` rows. Sweeps are
//! assigned to contiguous groups using the real-valued interval
//! `len / height`; each row holds the per-bin mean of the valid readings in
//! its group.

use crate::data::filter::valid_levels;
use crate::data::model::{SweepReading, SENTINEL};

use super::result::AggregateRow;

/// Running sum and valid-reading count per bin for the row being built.
struct RowAccumulator {
    timestamp: i64,
    sweep_index: u64,
    sums: Vec<f64>,
    counts: Vec<u32>,
}

impl RowAccumulator {
    fn start(first: &SweepReading, bins: usize) -> Self {
        Self {
            timestamp: first.timestamp,
            sweep_index: first.sweep_index,
            sums: vec![0.0; bins],
            counts: vec![0; bins],
        }
    }

    fn add(&mut self, sweep: &SweepReading) {
        for (bin, level) in valid_levels(&sweep.levels) {
            self.sums[bin] += f64::from(level);
            self.counts[bin] += 1;
        }
    }

    fn finish(self) -> AggregateRow {
        let levels = self
            .sums
            .iter()
            .zip(&self.counts)
            .map(|(&sum, &count)| {
                if count > 0 {
                    sum / f64::from(count)
                } else {
                    f64::from(SENTINEL)
                }
            })
            .collect();
        AggregateRow {
            timestamp: self.timestamp,
            sweep_index: self.sweep_index,
            levels,
        }
    }
}

/// Bin `sweeps` into `min(height, sweeps.len())` rows.
///
/// `height` must be positive and every sweep must carry `bins` levels; the
/// engine checks both before calling.
pub fn bin_rows(sweeps: &[SweepReading], height: usize, bins: usize) -> Vec<AggregateRow> {
    let total = sweeps.len();
    if total == 0 {
        return Vec::new();
    }

    let interval = total as f64 / height as f64;
    let mut rows = Vec::with_capacity(height.min(total));
    let mut current: Option<RowAccumulator> = None;

    for (i, sweep) in sweeps.iter().enumerate() {
        let acc = current.get_or_insert_with(|| RowAccumulator::start(sweep, bins));
        acc.add(sweep);

        let boundary = (rows.len() + 1) as f64 * interval - 1.0;
        if i as f64 >= boundary || i + 1 == total {
            if let Some(acc) = current.take() {
                rows.push(acc.finish());
            }
        }
    }

    debug_assert!(rows.len() <= height);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep(n: u64, levels: Vec<i32>) -> SweepReading {
        SweepReading::new(n, 1000 * n as i64, 100.0, levels)
    }

    #[test]
    fn empty_batch_yields_no_rows() {
        assert!(bin_rows(&[], 10, 3).is_empty());
    }

    #[test]
    fn fewer_sweeps_than_height_gives_one_row_each() {
        let sweeps: Vec<_> = (0..4).map(|n| sweep(n, vec![-(n as i32)])).collect();
        let rows = bin_rows(&sweeps, 10, 1);
        assert_eq!(rows.len(), 4);
        for (n, row) in rows.iter().enumerate() {
            assert_eq!(row.sweep_index, n as u64);
            assert_eq!(row.levels, vec![-(n as f64)]);
        }
    }

    #[test]
    fn row_count_matches_height() {
        for total in [5usize, 7, 10, 13, 100, 101, 997] {
            let sweeps: Vec<_> = (0..total as u64).map(|n| sweep(n, vec![-60, -70])).collect();
            for height in [1usize, 2, 3, 5] {
                let rows = bin_rows(&sweeps, height, 2);
                assert_eq!(rows.len(), height.min(total), "total={total} height={height}");
            }
        }
    }

    #[test]
    fn rows_average_groups_and_start_at_first_sweep() {
        // 4 sweeps into 2 rows: [0, 1] and [2, 3]
        let sweeps = vec![
            sweep(0, vec![-10, -20]),
            sweep(1, vec![-20, -40]),
            sweep(2, vec![-30, -60]),
            sweep(3, vec![-50, -80]),
        ];
        let rows = bin_rows(&sweeps, 2, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].levels, vec![-15.0, -30.0]);
        assert_eq!(rows[0].sweep_index, 0);
        assert_eq!(rows[0].timestamp, 0);
        assert_eq!(rows[1].levels, vec![-40.0, -70.0]);
        assert_eq!(rows[1].sweep_index, 2);
        assert_eq!(rows[1].timestamp, 2000);
    }

    #[test]
    fn uneven_groups_follow_real_valued_interval() {
        // interval = 5 / 2 = 2.5: row 0 closes at i >= 1.5 (sweeps 0..=2)
        let sweeps: Vec<_> = (0..5).map(|n| sweep(n, vec![-(n as i32) * 10])).collect();
        let rows = bin_rows(&sweeps, 2, 1);
        assert_eq!(rows[0].levels, vec![-10.0]);
        assert_eq!(rows[1].sweep_index, 3);
        assert_eq!(rows[1].levels, vec![-35.0]);
    }

    #[test]
    fn sentinels_are_excluded_from_the_mean() {
        let sweeps = vec![sweep(0, vec![-128, -40]), sweep(1, vec![-50, -128])];
        let rows = bin_rows(&sweeps, 1, 2);
        assert_eq!(rows[0].levels, vec![-50.0, -40.0]);
    }

    #[test]
    fn all_sentinel_bin_stays_sentinel() {
        let sweeps = vec![sweep(0, vec![-128, -40]), sweep(1, vec![-128, -42])];
        let rows = bin_rows(&sweeps, 1, 2);
        assert_eq!(rows[0].levels[0], -128.0);
        assert!(!rows[0].levels[0].is_nan());
        assert_eq!(rows[0].levels[1], -41.0);
    }
}
