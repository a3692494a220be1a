//! mbench - microbenchmark batch runner and result comparison
//!
//! This library runs a benchmark command repeatedly, groups its
//! `label,value` output into per-label sample sets, and computes summaries
//! and relative drift between stored result sets.

pub mod cancel;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod persist;
pub mod progress;
pub mod report;
pub mod result_set;
pub mod runner;
pub mod stats;

pub use error::{BenchError, Result};
pub use result_set::ResultSet;
pub use stats::{compare, summarize, Delta, Summary};
