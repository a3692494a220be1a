//! Single-line progress bar for the run loop
//!
//! Renders `[#####.....] j/N` and rewinds with `\r`, so stdout stays free for
//! the machine-readable result rows.

use std::io::{self, Sink, Stderr, Write};

/// Number of cells in the bar
pub const DEFAULT_WIDTH: usize = 60;

/// Progress bar over a fixed number of runs
#[derive(Debug)]
pub struct ProgressBar<W: Write> {
    out: W,
    total: usize,
    width: usize,
}

impl ProgressBar<Stderr> {
    /// Progress bar drawn on stderr
    pub fn stderr(total: usize) -> Self {
        Self::new(io::stderr(), total)
    }
}

impl ProgressBar<Sink> {
    /// Progress bar that draws nothing
    pub fn hidden(total: usize) -> Self {
        Self::new(io::sink(), total)
    }
}

impl<W: Write> ProgressBar<W> {
    /// Progress bar drawn on `out`
    pub fn new(out: W, total: usize) -> Self {
        Self {
            out,
            total,
            width: DEFAULT_WIDTH,
        }
    }

    /// Override the bar width
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    fn filled(&self, done: usize) -> usize {
        if self.total == 0 {
            return self.width;
        }
        (self.width * done.min(self.total)) / self.total
    }

    /// Text of the bar after `done` runs, without the trailing `\r`
    pub fn render(&self, done: usize) -> String {
        let filled = self.filled(done);
        format!(
            "[{}{}] {}/{}",
            "#".repeat(filled),
            ".".repeat(self.width - filled),
            done,
            self.total
        )
    }

    /// Redraw the bar after `done` runs.
    ///
    /// Write errors are ignored; a broken terminal must not abort a run.
    pub fn update(&mut self, done: usize) {
        let line = self.render(done);
        let _ = write!(self.out, "{}\r", line);
        let _ = self.out.flush();
    }

    /// Move past the bar
    pub fn finish(&mut self) {
        let _ = writeln!(self.out, "\r");
        let _ = self.out.flush();
    }
}
