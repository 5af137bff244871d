use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("chart height must be greater than zero")]
    InvalidHeight,
    #[error("top-N width must be greater than zero")]
    InvalidTopN,
    #[error("frequency bin count mismatch at sweep {sweep_index}: expected {expected}, got {actual}")]
    BinCountMismatch {
        sweep_index: u64,
        expected: usize,
        actual: usize,
    },
}

impl AggregateError {
    /// Whether the error comes from the configuration rather than the batch.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AggregateError::InvalidHeight | AggregateError::InvalidTopN)
    }
}
