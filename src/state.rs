use anyhow::Result;
use log::{info, warn};

use crate::aggregate::{aggregate, AggregationResult};
use crate::config::AggregationConfig;
use crate::data::model::{FrequencyAxis, TimeRange};
use crate::data::source::SweepSource;

// ---------------------------------------------------------------------------
// Chart state
// ---------------------------------------------------------------------------

/// Proof that a request was issued; carries the generation it was issued at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What the chart currently shows, independent of rendering.
///
/// Results are applied wholesale and only if they answer the most recent
/// request; anything older is discarded on arrival.
#[derive(Debug, Default)]
pub struct ChartState {
    /// Engine settings for this chart.
    config: AggregationConfig,

    /// Generation of the most recently issued request.
    generation: u64,

    /// Result currently on screen (None until a range is applied).
    result: Option<AggregationResult>,

    /// Frequency axis of the series the current result came from.
    axis: Option<FrequencyAxis>,

    /// Status / error message shown next to the chart.
    pub status_message: Option<String>,
}

impl ChartState {
    pub fn new(config: AggregationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    pub fn result(&self) -> Option<&AggregationResult> {
        self.result.as_ref()
    }

    pub fn axis(&self) -> Option<&FrequencyAxis> {
        self.axis.as_ref()
    }

    /// Replace the configuration. The current result no longer matches it,
    /// so it is dropped and outstanding requests are invalidated.
    pub fn set_config(&mut self, config: AggregationConfig) {
        self.config = config;
        self.clear();
    }

    /// Issue a new request, superseding every earlier one.
    pub fn begin_request(&mut self) -> RequestTicket {
        self.generation += 1;
        RequestTicket {
            generation: self.generation,
        }
    }

    /// Whether `ticket` still answers the most recent request.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Install `result` if `ticket` is still current. Returns whether it was applied.
    pub fn apply(
        &mut self,
        ticket: RequestTicket,
        result: AggregationResult,
        axis: Option<FrequencyAxis>,
    ) -> bool {
        if !self.is_current(ticket) {
            warn!(
                "discarding stale result from request {} (latest is {})",
                ticket.generation, self.generation
            );
            return false;
        }
        info!(
            "applied request {}: {} rows, {} bins",
            ticket.generation,
            result.rows.len(),
            result.bin_count()
        );
        self.result = Some(result);
        self.axis = axis;
        self.status_message = None;
        true
    }

    /// Range deselected: drop the result and invalidate outstanding requests.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.result = None;
        self.axis = None;
    }

    /// Fetch `range` from `source`, aggregate it and apply it.
    ///
    /// Errors are recorded in `status_message` and returned; the previous
    /// result stays in place.
    pub fn run<S: SweepSource>(&mut self, source: &mut S, range: &TimeRange) -> Result<bool> {
        let ticket = self.begin_request();
        let outcome = source
            .fetch(range)
            .and_then(|batch| Ok((aggregate(&batch.sweeps, &self.config)?, batch.axis)));
        match outcome {
            Ok((result, axis)) => Ok(self.apply(ticket, result, axis)),
            Err(err) => {
                self.status_message = Some(format!("{err:#}"));
                Err(err)
            }
        }
    }
}
