//! JSON report output.

use super::Reporter;
use crate::types::RunReport;
use std::io::{self, Write};

/// Outputs the run report as pretty-printed JSON.
pub struct JsonReporter<W> {
    w: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(w: W) -> Self {
        Self { w }
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, report: &RunReport) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.w, report)?;
        writeln!(self.w)
    }
}
