use lightpath_schemas::general::ModulationFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LightpathError {
    #[error("Invalid {stage} parameter: {reason}")]
    InvalidParameter { stage: &'static str, reason: String },

    #[error("Modulation order {order} is not supported for {format:?} (valid: {valid:?})")]
    UnsupportedModulationOrder {
        format: ModulationFormat,
        order: usize,
        valid: &'static [usize],
    },

    #[error("Symbol rate {rate} Bd is outside the allowed range for {format:?} ({min} Bd to {max} Bd)")]
    SymbolRateOutOfRange {
        format: ModulationFormat,
        rate: f64,
        min: f64,
        max: f64,
    },

    #[error("Bit count {bits} is not a multiple of {bits_per_symbol} bits per symbol")]
    BitCountNotDivisible { bits: usize, bits_per_symbol: usize },

    #[error("Signal length mismatch at {stage}: expected {expected} samples, got {actual}")]
    LengthMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Incompatible stages: {0}")]
    IncompatibleStages(String),

    #[error("Received constellation points {first} and {second} coincide; symbols cannot be told apart")]
    IndistinguishableConstellation { first: usize, second: usize },

    #[error("{0} produced an empty signal")]
    EmptySignal(&'static str),

    #[error("Missing required stage: {0}")]
    MissingStage(&'static str),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),
}

impl LightpathError {
    pub(crate) fn invalid(stage: &'static str, reason: impl Into<String>) -> Self {
        LightpathError::InvalidParameter {
            stage,
            reason: reason.into(),
        }
    }

    /// True for the configuration-error family, i.e. everything that is
    /// rejected before numeric work starts.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            LightpathError::FileIO(..) | LightpathError::CsvError(..)
        )
    }
}
