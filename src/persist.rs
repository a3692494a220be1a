//! Persisted result files
//!
//! One row per label, no header: `label,v0,v1,...` with one column per run.
//! This is both the raw output of `mbench run` and the input of `show` and
//! `compare`.

use crate::error::{BenchError, Result};
use crate::result_set::ResultSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Decode a result set from persisted rows
pub fn read_results<R: Read>(reader: R) -> Result<ResultSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut fields = record.iter();
        let Some(label) = fields.next() else {
            continue;
        };
        let values: Vec<String> = fields.map(str::to_string).collect();
        rows.push((label.to_string(), values));
    }

    ResultSet::load(rows)
}

/// Encode `results` as persisted rows
pub fn write_results<W: Write>(results: &ResultSet, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);

    for (label, samples) in results.iter() {
        let mut row = Vec::with_capacity(samples.len() + 1);
        row.push(label.to_string());
        row.extend(samples.iter().map(i64::to_string));
        wtr.write_record(&row)?;
    }

    wtr.flush()
        .map_err(|e| BenchError::io("flushing result rows", e))
}

/// Encode `results` as a string of persisted rows
pub fn to_csv_string(results: &ResultSet) -> Result<String> {
    let mut buf = Vec::new();
    write_results(results, &mut buf)?;
    // Labels come from `&str` and samples are integers, so the bytes are UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Load a result set from a file
pub fn load_file(path: &Path) -> Result<ResultSet> {
    let file = File::open(path)
        .map_err(|e| BenchError::io(format!("opening {}", path.display()), e))?;
    let results = read_results(file)?;
    debug!(
        path = %path.display(),
        labels = results.len(),
        runs = results.runs(),
        "loaded result file"
    );
    Ok(results)
}

/// Write a result set to a file, replacing any previous content
pub fn save_file(path: &Path, results: &ResultSet) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| BenchError::io(format!("creating {}", path.display()), e))?;
    write_results(results, file)?;
    debug!(path = %path.display(), labels = results.len(), "saved result file");
    Ok(())
}
