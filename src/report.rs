//! Human and JSON rendering of summaries and comparisons
//!
//! Human lines are right-aligned on the longest label:
//!
//! ```text
//!     enqueue: mean  120.3 | stdev    4.1 | min   114 | max   128
//! dequeue_all: mean   80.0 | stdev    0.0 | min    80 | max    80
//! ```
//!
//! The raw machine form lives in [`crate::persist`], since it is the same
//! format that `show` and `compare` read back.

use crate::error::Result;
use crate::stats::{LabelDelta, LabelSummary};
use serde::Serialize;

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|l| l.chars().count()).max().unwrap_or(0)
}

/// One aligned summary line
pub fn format_summary_line(entry: &LabelSummary, width: usize) -> String {
    let s = &entry.summary;
    format!(
        "{:>width$}: mean {:6.1} | stdev {:6.1} | min {:5} | max {:5}",
        entry.label,
        s.mean,
        s.stdev,
        s.min,
        s.max,
        width = width
    )
}

/// Aligned summary table, one line per label
pub fn render_summary(entries: &[LabelSummary]) -> String {
    let width = label_width(entries.iter().map(|e| e.label.as_str()));
    let mut output = String::new();
    for entry in entries {
        output.push_str(&format_summary_line(entry, width));
        output.push('\n');
    }
    output
}

/// `+50.0% (20.0 -> 30.0)`, with the parenthesised values left-aligned in 18 columns
pub fn format_change(pct: f64, before: f64, after: f64) -> String {
    let values = format!("({:.1} -> {:.1})", before, after);
    format!("{:+6.1}% {:<18}", pct, values)
}

/// One aligned comparison line
pub fn format_delta_line(entry: &LabelDelta, width: usize) -> String {
    let d = &entry.delta;
    format!(
        "{:>width$}: mean {}\tstdev {}",
        entry.label,
        format_change(d.mean_pct, d.mean_before, d.mean_after),
        format_change(d.stdev_pct, d.stdev_before, d.stdev_after),
        width = width
    )
}

/// Aligned comparison table, one line per baseline label
pub fn render_deltas(entries: &[LabelDelta]) -> String {
    let width = label_width(entries.iter().map(|e| e.label.as_str()));
    let mut output = String::new();
    for entry in entries {
        output.push_str(&format_delta_line(entry, width));
        output.push('\n');
    }
    output
}

/// Summary of a `run` invocation
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub command: String,
    pub completed_runs: usize,
    pub interrupted: bool,
    pub labels: Vec<LabelSummary>,
}

/// Summary of one stored result file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub labels: Vec<LabelSummary>,
}

/// Comparison of two stored result files
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub baseline: String,
    pub candidate: String,
    pub labels: Vec<LabelDelta>,
}

/// Pretty JSON with a trailing newline
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}
