use thiserror::Error;

/// Failures raised by the analysis core.
///
/// Every variant is a local, synchronous failure of the call that raised it.
/// Nothing here is retried internally; the caller decides whether to skip,
/// substitute a default or abort.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TripError {
    #[error("trip contains no samples")]
    EmptyTrip,
    #[error("sample index {index} out of range for trip of {len} samples")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("division by zero while computing {operation}")]
    DivisionByZero { operation: &'static str },
    #[error("sample {index} is earlier than the sample before it")]
    UnorderedSamples { index: usize },
    #[error("sample {index} has invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinate {
        index: usize,
        latitude: f64,
        longitude: f64,
    },
}

/// Failures raised while reading a trip from a trip log or GPX source.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read trip: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("line {line}: missing {field} field")]
    MissingField { line: usize, field: &'static str },
    #[error("Error at position {position}: {message}")]
    Xml { position: u64, message: String },
    #[error(transparent)]
    Trip(#[from] TripError),
}

/// Invalid analysis settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Empty duration")]
    EmptyDuration,
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
    #[error("Invalid duration unit: {0}")]
    InvalidDurationUnit(String),
    #[error("Unknown heuristic: {0} (expected h1, adjacent, h2 or zone)")]
    UnknownHeuristic(String),
    #[error("Invalid threshold: {0} (expected a positive number of kilometers)")]
    InvalidThreshold(String),
}
