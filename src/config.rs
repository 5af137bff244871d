use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateError;

/// Default number of waterfall rows.
pub const DEFAULT_CHART_HEIGHT: usize = 200;

/// Default width of each peak list.
pub const DEFAULT_TOP_N: usize = 5;

/// Settings consumed by the aggregation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Maximum number of rows produced for the waterfall chart.
    #[serde(default = "default_height")]
    pub height: usize,
    /// Number of slots in each per-metric peak list.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_height() -> usize {
    DEFAULT_CHART_HEIGHT
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_CHART_HEIGHT,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl AggregationConfig {
    pub fn new(height: usize, top_n: usize) -> Self {
        Self { height, top_n }
    }

    pub fn with_height(mut self, height: usize) -> Self {
        self.height = height;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn validate(&self) -> Result<(), AggregateError> {
        if self.height == 0 {
            return Err(AggregateError::InvalidHeight);
        }
        if self.top_n == 0 {
            return Err(AggregateError::InvalidTopN);
        }
        Ok(())
    }

    /// Read a config from a JSON file such as `{ "height": 300, "top_n": 3 }`.
    /// Missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text).context("parsing config JSON")
    }
}
