//! Error types for result aggregation, comparison and benchmark runs
//!
//! Every failure carries the label, value, command or file involved so the
//! message printed by the CLI is enough to locate the bad input.

use std::num::ParseIntError;
use thiserror::Error;

/// Result type alias for mbench operations.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors raised by the result set, the statistics engine and the runner.
#[derive(Error, Debug)]
pub enum BenchError {
    /// A sample value is not a base-10 integer.
    #[error("Invalid value '{value}' for label '{label}': {source}")]
    Parse {
        label: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// A measurement line is not of the form `label,value`.
    #[error("Malformed measurement line '{line}'\n  → Expected 'label,value'")]
    MalformedLine { line: String },

    /// The benchmarked command printed bytes that are not UTF-8.
    #[error("Command '{command}' printed invalid UTF-8: {source}")]
    InvalidUtf8 {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// A persisted result file could not be decoded.
    #[error("Malformed result file: {0}")]
    Csv(#[from] csv::Error),

    /// Statistics requested over a label without samples.
    #[error("No samples recorded for label '{label}'")]
    EmptyInput { label: String },

    /// A label is absent from the result set it was looked up in.
    #[error("Label '{label}' not found")]
    KeyNotFound { label: String },

    /// The benchmarked command could not be started or exited with failure.
    #[error("Command '{command}' failed: {reason}")]
    ProcessFailure { command: String, reason: String },

    /// A report could not be encoded as JSON.
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("Invalid value for '{field}': {message}")]
    InvalidConfig { field: String, message: String },

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The run was interrupted.
    #[error("Benchmark run cancelled")]
    Cancelled,
}

impl BenchError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a process failure for `command`.
    pub fn process(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProcessFailure {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// True for every variant caused by unparseable input text.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. }
                | Self::MalformedLine { .. }
                | Self::InvalidUtf8 { .. }
                | Self::Csv(_)
        )
    }
}
