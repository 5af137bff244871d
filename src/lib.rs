//! Spectrum sweep aggregation for waterfall and level/frequency charts.
//!
//! A [`data::source::SweepSource`] supplies a time-ordered batch of sweeps;
//! [`aggregate::aggregate`] reduces it to at most `height` waterfall rows,
//! per-bin statistics and per-metric top-N peak lists; [`state::ChartState`]
//! holds the latest result and drops answers to superseded requests.

pub mod aggregate;
pub mod config;
pub mod data;
pub mod report;
pub mod state;

pub use aggregate::{aggregate, AggregateError, AggregationResult};
pub use config::AggregationConfig;
pub use data::model::{FrequencyAxis, Level, SweepBatch, SweepReading, TimeRange, SENTINEL};
