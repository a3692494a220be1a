//! Descriptive statistics and baseline/candidate comparison
//!
//! Both entry points are pure functions over materialized [`ResultSet`]s:
//! [`summarize`] reduces each label to a [`Summary`], [`compare`] pairs the
//! summaries of two sets into a [`Delta`] per baseline label.

use crate::error::{BenchError, Result};
use crate::result_set::ResultSet;
use serde::Serialize;

/// Mean, population standard deviation, min and max of one label
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    /// Population standard deviation (divisor N)
    pub stdev: f64,
    pub min: i64,
    pub max: i64,
}

impl Summary {
    /// Summarize `samples`, or `None` when there is nothing to summarize
    pub fn of(samples: &[i64]) -> Option<Self> {
        let min = *samples.iter().min()?;
        let max = *samples.iter().max()?;
        let (mean, variance) =
            exact_moments(samples, min).unwrap_or_else(|| approximate_moments(samples, min));

        Some(Self {
            mean,
            stdev: variance.sqrt(),
            min,
            max,
        })
    }
}

/// Distance of `x` above `min`; always fits in 64 bits
fn offset(x: i64, min: i64) -> u128 {
    (i128::from(x) - i128::from(min)) as u128
}

/// Mean and population variance from integer sums over `x - min`.
///
/// `n * sum(d^2) - sum(d)^2` is computed exactly, so the variance is zero if
/// and only if every sample is equal. The mean is split into an integer part
/// and a remainder before converting, which keeps it correctly rounded below
/// 2^53 and within one ulp above. Returns `None` on u128 overflow.
fn exact_moments(samples: &[i64], min: i64) -> Option<(f64, f64)> {
    let n = u128::try_from(samples.len()).ok()?;
    let mut sum: u128 = 0;
    let mut sum_sq: u128 = 0;
    for &x in samples {
        let d = offset(x, min);
        sum = sum.checked_add(d)?;
        sum_sq = sum_sq.checked_add(d.checked_mul(d)?)?;
    }
    let numerator = n.checked_mul(sum_sq)?.checked_sub(sum.checked_mul(sum)?)?;

    let whole = i128::from(min) + (sum / n) as i128;
    let mean = whole as f64 + (sum % n) as f64 / n as f64;
    let variance = numerator as f64 / (n as f64 * n as f64);
    Some((mean, variance))
}

/// Two-pass floating point fallback over `x - min`, for spreads too wide for
/// [`exact_moments`]. The minimum maps to 0.0 and some sample lies above it,
/// so the variance stays positive.
fn approximate_moments(samples: &[i64], min: i64) -> (f64, f64) {
    let n = samples.len() as f64;
    let shifted_mean = samples
        .iter()
        .map(|&x| offset(x, min) as f64)
        .sum::<f64>()
        / n;
    let variance = samples
        .iter()
        .map(|&x| (offset(x, min) as f64 - shifted_mean).powi(2))
        .sum::<f64>()
        / n;
    (min as f64 + shifted_mean, variance)
}

/// Percentage change from `before` to `after`; a zero baseline reports 0.
pub fn pct_change(before: f64, after: f64) -> f64 {
    if before == 0.0 {
        0.0
    } else {
        (after - before) / before * 100.0
    }
}

/// Relative drift of mean and stdev between two summaries
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Delta {
    pub mean_pct: f64,
    pub mean_before: f64,
    pub mean_after: f64,
    pub stdev_pct: f64,
    pub stdev_before: f64,
    pub stdev_after: f64,
}

impl Delta {
    /// Compare a baseline summary with a candidate summary
    pub fn between(before: &Summary, after: &Summary) -> Self {
        Self {
            mean_pct: pct_change(before.mean, after.mean),
            mean_before: before.mean,
            mean_after: after.mean,
            stdev_pct: pct_change(before.stdev, after.stdev),
            stdev_before: before.stdev,
            stdev_after: after.stdev,
        }
    }
}

/// Summary of one label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSummary {
    pub label: String,
    #[serde(flatten)]
    pub summary: Summary,
}

/// Delta of one label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelDelta {
    pub label: String,
    #[serde(flatten)]
    pub delta: Delta,
}

fn summary_of(label: &str, samples: &[i64]) -> Result<Summary> {
    Summary::of(samples).ok_or_else(|| BenchError::EmptyInput {
        label: label.to_string(),
    })
}

/// Summarize every label of `results`, in label order
pub fn summarize(results: &ResultSet) -> Result<Vec<LabelSummary>> {
    results
        .iter()
        .map(|(label, samples)| -> Result<LabelSummary> {
            Ok(LabelSummary {
                label: label.to_string(),
                summary: summary_of(label, samples)?,
            })
        })
        .collect()
}

/// Compare `candidate` against `baseline`.
///
/// Only baseline labels are reported, in baseline order. Each of them must
/// also exist in the candidate.
pub fn compare(baseline: &ResultSet, candidate: &ResultSet) -> Result<Vec<LabelDelta>> {
    baseline
        .iter()
        .map(|(label, before)| -> Result<LabelDelta> {
            let after = candidate.samples(label)?;
            let delta = Delta::between(&summary_of(label, before)?, &summary_of(label, after)?);
            Ok(LabelDelta {
                label: label.to_string(),
                delta,
            })
        })
        .collect()
}
