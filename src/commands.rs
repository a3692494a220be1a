//! The `run`, `show`, `compare` and `doc` operations
//!
//! Each operation takes the invocation's [`BenchConfig`] and writes its report
//! to `out`. Diagnostics (header line, progress bar, logs) go to stderr.

use crate::cancel::CancellationToken;
use crate::cli::{Cli, OutputFormat, DOC_TEXT};
use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::persist;
use crate::progress::ProgressBar;
use crate::report::{self, ComparisonReport, FileReport, RunReport};
use crate::result_set::ResultSet;
use crate::runner::{self, CommandExecutor};
use crate::stats;
use clap::CommandFactory;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// How an operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Completed,
    /// Stopped early by the cancellation token
    Interrupted,
}

fn emit<W: Write + ?Sized>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|e| BenchError::io("writing report", e))
}

/// Run the benchmarked command `config.runs` times and report the results.
///
/// An interrupted run prints nothing unless `config.report_partial` is set.
pub fn run<E, P, W>(
    config: &BenchConfig,
    command: &[String],
    executor: &mut E,
    cancel: &CancellationToken,
    progress: &mut ProgressBar<P>,
    out: &mut W,
) -> Result<Status>
where
    E: CommandExecutor + ?Sized,
    P: Write,
    W: Write + ?Sized,
{
    config.validate()?;
    let command_line = command.join(" ");
    let outcome = runner::run_benchmark(executor, &command_line, config.runs, cancel, progress)?;

    let status = if outcome.interrupted {
        Status::Interrupted
    } else {
        Status::Completed
    };
    if outcome.interrupted && (!config.report_partial || outcome.completed == 0) {
        info!(completed = outcome.completed, "discarding interrupted run");
        return Ok(status);
    }

    if let Some(path) = &config.output {
        persist::save_file(path, &outcome.results)?;
    }

    let text = match config.format {
        OutputFormat::Machine => persist::to_csv_string(&outcome.results)?,
        OutputFormat::Human => report::render_summary(&stats::summarize(&outcome.results)?),
        OutputFormat::Json => report::render_json(&RunReport {
            command: command_line,
            completed_runs: outcome.completed,
            interrupted: outcome.interrupted,
            labels: stats::summarize(&outcome.results)?,
        })?,
    };
    emit(out, &text)?;
    Ok(status)
}

/// Summarize each stored result file in turn
pub fn show<W: Write + ?Sized>(
    config: &BenchConfig,
    files: &[impl AsRef<Path>],
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<Status> {
    let mut reports = Vec::new();
    for file in files {
        if cancel.is_cancelled() {
            return Ok(Status::Interrupted);
        }
        let path = file.as_ref();
        let labels = stats::summarize(&persist::load_file(path)?)?;
        match config.report_format() {
            OutputFormat::Json => reports.push(FileReport {
                file: path.display().to_string(),
                labels,
            }),
            OutputFormat::Machine | OutputFormat::Human => {
                emit(
                    out,
                    &format!("{}:\n{}", path.display(), report::render_summary(&labels)),
                )?;
            }
        }
    }
    if config.report_format() == OutputFormat::Json {
        emit(out, &report::render_json(&reports)?)?;
    }
    Ok(Status::Completed)
}

/// Compare every stored result file with the one after it
pub fn compare<W: Write + ?Sized>(
    config: &BenchConfig,
    files: &[impl AsRef<Path>],
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<Status> {
    if files.len() < 2 {
        return Err(BenchError::InvalidConfig {
            field: "files".to_string(),
            message: "'compare' requires at least 2 files".to_string(),
        });
    }

    let mut reports = Vec::new();
    let mut previous: Option<ResultSet> = None;
    for pair in files.windows(2) {
        if cancel.is_cancelled() {
            return Ok(Status::Interrupted);
        }
        let (before_path, after_path) = (pair[0].as_ref(), pair[1].as_ref());
        let baseline = match previous.take() {
            Some(results) => results,
            None => persist::load_file(before_path)?,
        };
        let candidate = persist::load_file(after_path)?;
        debug!(
            baseline = %before_path.display(),
            candidate = %after_path.display(),
            "comparing result files"
        );
        let labels = stats::compare(&baseline, &candidate)?;

        match config.report_format() {
            OutputFormat::Json => reports.push(ComparisonReport {
                baseline: before_path.display().to_string(),
                candidate: after_path.display().to_string(),
                labels,
            }),
            OutputFormat::Machine | OutputFormat::Human => {
                emit(
                    out,
                    &format!(
                        "Comparing {} -> {}:\n{}",
                        before_path.display(),
                        after_path.display(),
                        report::render_deltas(&labels)
                    ),
                )?;
            }
        }
        previous = Some(candidate);
    }
    if config.report_format() == OutputFormat::Json {
        emit(out, &report::render_json(&reports)?)?;
    }
    Ok(Status::Completed)
}

/// Print the usage followed by a description of the workflow
pub fn doc<W: Write + ?Sized>(out: &mut W) -> Result<()> {
    let help = Cli::command().render_help();
    emit(out, &format!("{}\n{}\n", help, DOC_TEXT))
}
