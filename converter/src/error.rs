use thiserror::Error;

/// Reasons a chart file is rejected. Every variant is fatal for the file being read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Multiple BPMs detected: {0}")]
    UnsupportedTempoChange(String),

    #[error("Stop detected: {0}")]
    UnsupportedStop(String),

    #[error("Malformed field: {0}")]
    MalformedField(String),

    #[error("Unexpected end of input while reading {0}")]
    UnexpectedEndOfInput(&'static str),

    #[error("No BPM set before note data")]
    MissingTempo,

    #[error("Invalid number in {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}
