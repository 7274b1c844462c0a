//! Human-readable trace lines for a switch session.
//!
//! Lines look like `<name> << <sent>`, `<name> !! <patterns>` and
//! `<name> >> <observed>`. They go to standard error unless another writer
//! is injected.

use std::io::{self, Write};

use crate::channel::PatternSet;

/// Trace writer bound to one switch's display name.
pub struct Tracer {
    name: String,
    verbose: bool,
    out: Box<dyn Write + Send>,
}

impl Tracer {
    /// Tracer writing to standard error.
    pub fn stderr(name: impl Into<String>, verbose: bool) -> Self {
        Self::new(name, verbose, Box::new(io::stderr()))
    }

    /// Tracer writing to `out`.
    pub fn new(name: impl Into<String>, verbose: bool, out: Box<dyn Write + Send>) -> Self {
        Self {
            name: name.into(),
            verbose,
            out,
        }
    }

    /// Write one line, regardless of verbosity.
    pub fn log(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
    }

    /// A line is about to be sent.
    pub fn sent(&mut self, text: &str) {
        if self.verbose {
            let line = format!("{} << {}", self.name, text);
            self.log(&line);
        }
    }

    /// About to wait for `patterns`.
    pub fn waiting(&mut self, patterns: &PatternSet) {
        if self.verbose {
            let line = format!("{} !! {}", self.name, patterns);
            self.log(&line);
        }
    }

    /// Output consumed by an expect, one trace line per output line.
    pub fn observed(&mut self, output: &str) {
        if !self.verbose {
            return;
        }
        for line in output.split('\n') {
            let line = format!("{} >> {}", self.name, line.strip_suffix('\r').unwrap_or(line));
            self.log(&line);
        }
    }

    /// Display name used as the line prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether verbose lines are written.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Turn verbose lines on or off.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }
}
