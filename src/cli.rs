//! CLI argument parsing for mbench

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Raw `label,v0,v1,...` rows, readable by `show` and `compare` (default)
    #[default]
    Machine,
    /// Aligned mean/stdev/min/max table
    Human,
    /// JSON document for tooling
    Json,
}

/// Long description printed by `mbench doc`
pub const DOC_TEXT: &str = "\
mbench batches runs of a microbenchmark and compares the results.

The 'run' command takes the benchmark command after '--'.
That command must print its results as CSV lines:

  test-section-0,value0
  test-section-1,value1
  ...
  test-section-N,valueN

Each run becomes a new column of the stored result.

Stored results can then be compared with the 'compare' command:

  mbench run -- command -csv > run.1.csv
  mbench run -- command -csv > run.2.csv
  mbench compare run.1.csv run.2.csv

The mean and stdev of every row are computed, and the comparison shows
how both measures moved between the two files.";

#[derive(Parser, Debug)]
#[command(name = "mbench")]
#[command(version)]
#[command(about = "Benchmark runner and statistics generator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Run the benchmarked command N times
    #[arg(
        short = 'n',
        long = "runs",
        value_name = "N",
        default_value = "10",
        global = true
    )]
    pub runs: usize,

    /// Format output for a human reader (same as --format human)
    #[arg(short = 'H', long = "human", global = true)]
    pub human: bool,

    /// Output format
    #[arg(long = "format", value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Also write the raw rows of a run to FILE
    #[arg(short = 'o', long = "output", value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// On interrupt, report the runs completed so far instead of discarding them
    #[arg(long = "report-partial", global = true)]
    pub report_partial: bool,

    /// Do not draw the progress bar
    #[arg(long = "no-progress", global = true)]
    pub no_progress: bool,

    /// Enable debug logging on stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run a command N times and collect its `label,value` lines
    Run {
        /// Command to benchmark (everything after --)
        #[arg(
            required = true,
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "COMMAND"
        )]
        command: Vec<String>,
    },
    /// Summarize stored result files
    Show {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },
    /// Compare each stored result file with the next one
    Compare {
        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,
    },
    /// Print usage and a description of the workflow
    Doc,
}

impl Cli {
    /// Effective output format; `-H` wins over `--format`
    pub fn output_format(&self) -> OutputFormat {
        if self.human {
            OutputFormat::Human
        } else {
            self.format.unwrap_or_default()
        }
    }
}
