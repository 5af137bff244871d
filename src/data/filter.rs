use super::model::{Level, SweepReading, TimeRange, SENTINEL};

// ---------------------------------------------------------------------------
// Sentinel filter: the one place that decides what a failed reading is
// ---------------------------------------------------------------------------

/// Return the reading if it carries a measurement, `None` for the sentinel.
#[inline]
pub fn valid_level(level: Level) -> Option<Level> {
    if level == SENTINEL {
        None
    } else {
        Some(level)
    }
}

/// Iterate `(bin index, level)` over the valid readings of one sweep.
pub fn valid_levels(levels: &[Level]) -> impl Iterator<Item = (usize, Level)> + '_ {
    levels
        .iter()
        .enumerate()
        .filter_map(|(bin, &level)| valid_level(level).map(|v| (bin, v)))
}

// ---------------------------------------------------------------------------
// Time-range selection
// ---------------------------------------------------------------------------

/// Return the sweeps whose timestamp falls inside `range`, in input order.
pub fn select_range(sweeps: &[SweepReading], range: &TimeRange) -> Vec<SweepReading> {
    sweeps
        .iter()
        .filter(|sweep| range.contains(sweep.timestamp))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_filtered() {
        assert_eq!(valid_level(-128), None);
        assert_eq!(valid_level(-127), Some(-127));
        assert_eq!(valid_level(0), Some(0));
    }

    #[test]
    fn valid_levels_keeps_bin_indices() {
        let got: Vec<(usize, Level)> = valid_levels(&[-50, -128, -40]).collect();
        assert_eq!(got, vec![(0, -50), (2, -40)]);
    }

    #[test]
    fn select_range_keeps_order() {
        let sweeps = vec![
            SweepReading::new(0, 100, 5.0, vec![-1]),
            SweepReading::new(1, 200, 5.0, vec![-2]),
            SweepReading::new(2, 300, 5.0, vec![-3]),
        ];
        let picked = select_range(&sweeps, &TimeRange::new(150, 300));
        let order: Vec<u64> = picked.iter().map(|s| s.sweep_index).collect();
        assert_eq!(order, vec![1, 2]);

        assert!(select_range(&sweeps, &TimeRange::new(400, 500)).is_empty());
    }
}
