// Configuration shared by the run, show and compare operations
//
// Built once by the entry point from the parsed command line and passed down
// explicitly; nothing below main reads CLI state directly.

use crate::cli::{Cli, OutputFormat};
use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of runs per benchmark invocation
pub const DEFAULT_RUNS: usize = 10;

/// Configuration for one mbench invocation
///
/// # Example
/// ```
/// use mbench::config::BenchConfig;
///
/// let config = BenchConfig::default();
/// assert_eq!(config.runs, 10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Number of times the benchmarked command is run
    pub runs: usize,

    /// How results are rendered on stdout
    pub format: OutputFormat,

    /// Draw a progress bar on stderr during `run`
    pub progress: bool,

    /// Report the completed runs when a `run` is interrupted
    ///
    /// When false, an interrupted run prints nothing and its samples are dropped.
    pub report_partial: bool,

    /// Extra destination for the raw rows of a `run`
    pub output: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            runs: DEFAULT_RUNS,
            format: OutputFormat::Machine,
            progress: true,
            report_partial: false,
            output: None,
        }
    }
}

impl From<&Cli> for BenchConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            runs: cli.runs,
            format: cli.output_format(),
            progress: !cli.no_progress,
            report_partial: cli.report_partial,
            output: cli.output.clone(),
        }
    }
}

impl BenchConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            return Err(BenchError::InvalidConfig {
                field: "runs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Format used by `show` and `compare`, which never print raw rows
    pub fn report_format(&self) -> OutputFormat {
        match self.format {
            OutputFormat::Json => OutputFormat::Json,
            OutputFormat::Machine | OutputFormat::Human => OutputFormat::Human,
        }
    }
}
