use serde::{Deserialize, Serialize};

/// A single level reading in dB, as reported by the receiver.
pub type Level = i32;

/// Reserved level meaning "failed reading"; carries no measurement.
pub const SENTINEL: Level = -128;

// ---------------------------------------------------------------------------
// SweepReading – one sweep of the receiver across all frequency bins
// ---------------------------------------------------------------------------

/// One sweep: a level per frequency bin at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReading {
    /// Sequence position of the sweep within its series.
    pub sweep_index: u64,
    /// Start of the sweep, milliseconds since the epoch.
    pub timestamp: i64,
    /// Time the sweep took, in milliseconds. Receivers report fractions.
    #[serde(default)]
    pub total_time_ms: f64,
    /// One reading per frequency bin; index-aligned across a batch.
    pub levels: Vec<Level>,
}

impl SweepReading {
    pub fn new(sweep_index: u64, timestamp: i64, total_time_ms: f64, levels: Vec<Level>) -> Self {
        Self {
            sweep_index,
            timestamp,
            total_time_ms,
            levels,
        }
    }

    /// Number of frequency bins in this sweep.
    pub fn bin_count(&self) -> usize {
        self.levels.len()
    }
}

// ---------------------------------------------------------------------------
// FrequencyAxis – bin index → frequency, passed through to the report layer
// ---------------------------------------------------------------------------

/// Linear frequency axis in units of `10^exp` Hz.
///
/// Bin `n` sits at `start + n * step`; the last bin is at (or just below)
/// `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyAxis {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
    /// Power of ten of the unit: 0 = Hz, 3 = kHz, 6 = MHz, 9 = GHz.
    #[serde(default)]
    pub exp: i32,
}

impl FrequencyAxis {
    /// Number of bins covered by `start..=stop` at `step` spacing.
    pub fn bin_count(&self) -> usize {
        if self.step <= 0.0 || self.stop < self.start {
            return 0;
        }
        ((self.stop - self.start) / self.step).round() as usize + 1
    }

    /// Frequency of a bin, in axis units.
    pub fn frequency(&self, bin: usize) -> f64 {
        self.start + bin as f64 * self.step
    }

    pub fn unit_label(&self) -> &'static str {
        match self.exp {
            0 => "Hz",
            3 => "kHz",
            6 => "MHz",
            9 => "GHz",
            _ => "?Hz",
        }
    }
}

// ---------------------------------------------------------------------------
// TimeRange – the user's selection on the time axis
// ---------------------------------------------------------------------------

/// Inclusive range of sweep timestamps, milliseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeRange {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Range covering every representable timestamp.
    pub fn all() -> Self {
        Self {
            start_ms: i64::MIN,
            end_ms: i64::MAX,
        }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.start_ms <= timestamp && timestamp <= self.end_ms
    }
}

// ---------------------------------------------------------------------------
// SweepBatch – the loaded series
// ---------------------------------------------------------------------------

/// A time-ordered series of sweeps plus its frequency-axis metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepBatch {
    /// Identifier of the monitoring configuration that produced the sweeps.
    #[serde(default)]
    pub series_id: String,
    #[serde(default)]
    pub axis: Option<FrequencyAxis>,
    pub sweeps: Vec<SweepReading>,
}

impl SweepBatch {
    /// Build a batch, ordering sweeps by `(timestamp, sweep_index)`.
    pub fn new(series_id: impl Into<String>, axis: Option<FrequencyAxis>, mut sweeps: Vec<SweepReading>) -> Self {
        sweeps.sort_by_key(|s| (s.timestamp, s.sweep_index));
        Self {
            series_id: series_id.into(),
            axis,
            sweeps,
        }
    }

    /// Number of sweeps.
    pub fn len(&self) -> usize {
        self.sweeps.len()
    }

    /// Whether the batch holds no sweeps.
    pub fn is_empty(&self) -> bool {
        self.sweeps.is_empty()
    }
}
