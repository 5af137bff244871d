use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AggregateRow – one downsampled waterfall row
// ---------------------------------------------------------------------------

/// Mean level per frequency bin over one group of consecutive sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// Timestamp of the first sweep folded into the row.
    pub timestamp: i64,
    /// Sweep index of the first sweep folded into the row.
    pub sweep_index: u64,
    /// Mean dB per bin; the sentinel where the bin had no valid reading.
    pub levels: Vec<f64>,
}

// ---------------------------------------------------------------------------
// PeakEntry / Metric
// ---------------------------------------------------------------------------

/// A per-bin aggregate value together with the bin it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakEntry {
    pub frequency_index: usize,
    pub value: f64,
}

impl PeakEntry {
    pub fn new(frequency_index: usize, value: f64) -> Self {
        Self {
            frequency_index,
            value,
        }
    }
}

/// Aggregate metrics that take part in peak selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Min,
    Max,
    Avg,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Min, Metric::Max, Metric::Avg];

    /// Whether `candidate` ranks strictly ahead of `incumbent` for this metric.
    ///
    /// Lower wins for `Min`, higher wins otherwise. Equal values never win,
    /// so the first-seen entry keeps its place.
    pub fn beats(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Metric::Min => candidate < incumbent,
            Metric::Max | Metric::Avg => candidate > incumbent,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::Min => "min",
            Metric::Max => "max",
            Metric::Avg => "avg",
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregates – per-bin statistics over a whole batch
// ---------------------------------------------------------------------------

/// Per-bin statistics, each indexed by frequency bin.
///
/// `None` marks a bin without any valid reading.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Aggregates {
    pub latest: Vec<Option<PeakEntry>>,
    pub min: Vec<Option<PeakEntry>>,
    pub max: Vec<Option<PeakEntry>>,
    pub avg: Vec<Option<PeakEntry>>,
}

impl Aggregates {
    /// All-`None` aggregates for `bins` frequency bins.
    pub fn empty(bins: usize) -> Self {
        Self {
            latest: vec![None; bins],
            min: vec![None; bins],
            max: vec![None; bins],
            avg: vec![None; bins],
        }
    }

    pub fn metric(&self, metric: Metric) -> &[Option<PeakEntry>] {
        match metric {
            Metric::Min => &self.min,
            Metric::Max => &self.max,
            Metric::Avg => &self.avg,
        }
    }

    /// Number of frequency bins covered.
    pub fn bin_count(&self) -> usize {
        self.latest.len()
    }
}

// ---------------------------------------------------------------------------
// TopNSelection – bounded best-first bin lists per metric
// ---------------------------------------------------------------------------

/// `N` slots per metric, best first; trailing slots stay `None` when fewer
/// than `N` bins qualified.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopNSelection {
    pub min: Vec<Option<usize>>,
    pub max: Vec<Option<usize>>,
    pub avg: Vec<Option<usize>>,
}

impl TopNSelection {
    /// `top_n` empty slots for every metric.
    pub fn empty(top_n: usize) -> Self {
        Self {
            min: vec![None; top_n],
            max: vec![None; top_n],
            avg: vec![None; top_n],
        }
    }

    pub fn metric(&self, metric: Metric) -> &[Option<usize>] {
        match metric {
            Metric::Min => &self.min,
            Metric::Max => &self.max,
            Metric::Avg => &self.avg,
        }
    }

    pub(crate) fn metric_mut(&mut self, metric: Metric) -> &mut Vec<Option<usize>> {
        match metric {
            Metric::Min => &mut self.min,
            Metric::Max => &mut self.max,
            Metric::Avg => &mut self.avg,
        }
    }

    /// The occupied slots of one metric, best first.
    pub fn selected(&self, metric: Metric) -> impl Iterator<Item = usize> + '_ {
        self.metric(metric).iter().map_while(|slot| *slot)
    }

    /// Whether no metric has any occupied slot.
    pub fn is_empty(&self) -> bool {
        Metric::ALL
            .iter()
            .all(|&m| self.metric(m).iter().all(Option::is_none))
    }
}

// ---------------------------------------------------------------------------
// AggregationResult – everything the chart needs for one range selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregationResult {
    pub rows: Vec<AggregateRow>,
    pub aggregates: Aggregates,
    pub peaks: TopNSelection,
    /// Mean sweep duration in seconds; absent for an empty batch.
    pub mean_sweep_duration_s: Option<f64>,
}

impl AggregationResult {
    /// Result for a batch without sweeps.
    pub fn empty(top_n: usize) -> Self {
        Self {
            rows: Vec::new(),
            aggregates: Aggregates::default(),
            peaks: TopNSelection::empty(top_n),
            mean_sweep_duration_s: None,
        }
    }

    /// Number of frequency bins covered by the result.
    pub fn bin_count(&self) -> usize {
        self.aggregates.bin_count()
    }
}
