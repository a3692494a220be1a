//! Per-label sample aggregation
//!
//! A [`ResultSet`] groups the integer measurements emitted by repeated runs of
//! a benchmarked command. Live runs grow it one value at a time with
//! [`ResultSet::append`]; persisted files rebuild it in one shot with
//! [`ResultSet::load`], where a repeated label replaces the earlier row.

use crate::error::{BenchError, Result};
use std::collections::HashMap;

/// Mapping from label to its samples, in run order.
///
/// Labels keep their first-insertion order so that reports list them the way
/// the benchmarked command printed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    /// Labels in first-insertion order
    order: Vec<String>,
    /// Map from label to samples
    samples: HashMap<String, Vec<i64>>,
}

fn parse_value(label: &str, value: &str) -> Result<i64> {
    value.trim().parse::<i64>().map_err(|source| BenchError::Parse {
        label: label.to_string(),
        value: value.to_string(),
        source,
    })
}

impl ResultSet {
    /// Create an empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `value` and append it to the samples of `label`.
    ///
    /// The set is left untouched when `value` is not an integer.
    pub fn append(&mut self, label: &str, value: &str) -> Result<()> {
        let parsed = parse_value(label, value)?;
        self.push(label, parsed);
        Ok(())
    }

    /// Append an already parsed sample to `label`
    pub fn push(&mut self, label: &str, value: i64) {
        match self.samples.get_mut(label) {
            Some(values) => values.push(value),
            None => {
                self.order.push(label.to_string());
                self.samples.insert(label.to_string(), vec![value]);
            }
        }
    }

    /// Append one `label,value` line of benchmark output.
    pub fn append_line(&mut self, line: &str) -> Result<()> {
        let trimmed = line.trim();
        let mut fields = trimmed.split(',');
        match (fields.next(), fields.next(), fields.next()) {
            (Some(label), Some(value), None) if !label.is_empty() => self.append(label, value),
            _ => Err(BenchError::MalformedLine {
                line: trimmed.to_string(),
            }),
        }
    }

    /// Build a result set from persisted rows, one label per row.
    ///
    /// Every field must parse or nothing is returned. A label seen twice keeps
    /// its first position but takes the samples of the last row.
    pub fn load<I, L, V, S>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (L, V)>,
        L: AsRef<str>,
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for (label, values) in rows {
            let label = label.as_ref();
            let parsed = values
                .into_iter()
                .map(|v| parse_value(label, v.as_ref()))
                .collect::<Result<Vec<i64>>>()?;
            set.replace(label, parsed);
        }
        Ok(set)
    }

    fn replace(&mut self, label: &str, values: Vec<i64>) {
        if self.samples.insert(label.to_string(), values).is_none() {
            self.order.push(label.to_string());
        }
    }

    /// Labels in first-insertion order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Samples recorded for `label`
    pub fn samples(&self, label: &str) -> Result<&[i64]> {
        self.samples
            .get(label)
            .map(Vec::as_slice)
            .ok_or_else(|| BenchError::KeyNotFound {
                label: label.to_string(),
            })
    }

    /// Iterate `(label, samples)` pairs in label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[i64])> {
        self.order
            .iter()
            .filter_map(|label| Some((label.as_str(), self.samples.get(label)?.as_slice())))
    }

    /// Check whether `label` has been recorded
    pub fn contains(&self, label: &str) -> bool {
        self.samples.contains_key(label)
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no label has been recorded
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Longest sample sequence, i.e. the number of runs observed
    pub fn runs(&self) -> usize {
        self.samples.values().map(Vec::len).max().unwrap_or(0)
    }
}
