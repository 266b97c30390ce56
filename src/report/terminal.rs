//! Colorized terminal report output.

use super::{format_duration, format_value, provider_of, Reporter};
use crate::types::{ModelRun, RunReport, TestResult};
use crate::util::truncate;
use colored::Colorize;
use std::io::{self, Write};

const HORIZONTAL_RULE: &str = "──────────────────────────────────────────────────";

/// Outputs results to the terminal with colors and tables.
pub struct TerminalReporter<W> {
    w: W,
}

impl<W: Write> TerminalReporter<W> {
    pub fn new(w: W) -> Self {
        Self { w }
    }

    fn print_model_summary(&mut self, model_run: &ModelRun) -> io::Result<()> {
        writeln!(self.w, "{}", format!("Model: {}", model_run.model).cyan())?;
        writeln!(self.w, "{HORIZONTAL_RULE}")?;

        let provider = provider_of(&model_run.results);
        if !provider.is_empty() {
            writeln!(self.w, "Provider: {provider}")?;
        }

        let m = &model_run.metrics;
        write!(self.w, "Results:  ")?;
        write!(self.w, "{}", format!("{} passed", m.passed).green())?;
        write!(self.w, " / ")?;
        if m.failed > 0 {
            write!(self.w, "{}", format!("{} failed", m.failed).red())?;
        } else {
            write!(self.w, "{} failed", m.failed)?;
        }
        if m.errors > 0 {
            write!(self.w, " / {}", format!("{} errors", m.errors).yellow())?;
        }
        writeln!(self.w, " ({} accuracy)", accuracy_colored(m.accuracy))?;

        writeln!(
            self.w,
            "Tokens:   {} in / {} out",
            m.total_tokens_in, m.total_tokens_out
        )?;
        writeln!(
            self.w,
            "Latency:  P50={}  P95={}  P99={}",
            format_duration(m.latency_p50),
            format_duration(m.latency_p95),
            format_duration(m.latency_p99)
        )?;
        writeln!(
            self.w,
            "Duration: {} ({:.1} tok/s)",
            format_duration(m.total_duration),
            m.throughput
        )?;
        writeln!(self.w)
    }

    fn print_results_table(&mut self, results: &[TestResult]) -> io::Result<()> {
        writeln!(
            self.w,
            "{:<40}  {:<7}  {:>10}  {}",
            "Test", "Status", "Latency", "Tokens"
        )?;
        writeln!(self.w, "{}", "-".repeat(70))?;

        for result in results {
            let status = if result.error.is_some() {
                format!("{:<7}", "⚠ ERROR").yellow()
            } else if result.passed {
                format!("{:<7}", "✓ PASS").green()
            } else {
                format!("{:<7}", "✗ FAIL").red()
            };

            writeln!(
                self.w,
                "{:<40}  {}  {:>10}  {}/{}",
                truncate(&result.test_name, 40),
                status,
                format_duration(result.latency),
                result.tokens_in,
                result.tokens_out
            )?;
        }

        writeln!(self.w)
    }

    fn print_failure_details(&mut self, results: &[TestResult]) -> io::Result<()> {
        if results.iter().all(|r| r.passed && r.error.is_none()) {
            return Ok(());
        }

        writeln!(self.w, "Failure Details:")?;
        writeln!(self.w, "{HORIZONTAL_RULE}")?;

        for result in results {
            if let Some(error) = &result.error {
                writeln!(self.w, "{}", format!("⚠ {}", result.test_name).yellow())?;
                writeln!(self.w, "  Error: {error}")?;
                writeln!(self.w)?;
            } else if !result.passed {
                writeln!(self.w, "{}", format!("✗ {}", result.test_name).red())?;
                for diff in &result.diffs {
                    writeln!(self.w, "  • {}", diff.path)?;
                    writeln!(
                        self.w,
                        "    Expected: {}",
                        format_value(diff.expected.as_ref())
                    )?;
                    writeln!(
                        self.w,
                        "    Actual:   {}",
                        format_value(diff.actual.as_ref())
                    )?;
                }
                writeln!(self.w)?;
            }
        }

        Ok(())
    }

    fn print_comparison_table(&mut self, models: &[ModelRun]) -> io::Result<()> {
        writeln!(self.w, "{}", "Model Comparison".bold())?;
        writeln!(self.w, "{HORIZONTAL_RULE}")?;

        writeln!(
            self.w,
            "{:<30}  {:<14}  {:>8}  {:>11}  {:>7}  {:>8}",
            "Model", "Provider", "Accuracy", "P50 Latency", "Tok/s", "Tokens"
        )?;
        writeln!(self.w, "{}", "-".repeat(90))?;

        for model_run in models {
            let m = &model_run.metrics;
            writeln!(
                self.w,
                "{:<30}  {:<14}  {:>7.1}%  {:>11}  {:>7.1}  {:>8}",
                truncate(&m.model, 30),
                truncate(provider_of(&model_run.results), 14),
                m.accuracy,
                format_duration(m.latency_p50),
                m.throughput,
                m.total_tokens_in + m.total_tokens_out
            )?;
        }

        Ok(())
    }
}

impl<W: Write> Reporter for TerminalReporter<W> {
    fn report(&mut self, report: &RunReport) -> io::Result<()> {
        writeln!(self.w)?;
        writeln!(self.w, "{}", "Verdict Test Report".bold())?;
        writeln!(self.w, "{HORIZONTAL_RULE}")?;
        writeln!(self.w, "Timestamp: {}", report.timestamp.to_rfc3339())?;
        writeln!(self.w, "Test File: {}", report.test_file)?;
        writeln!(self.w, "Schema:    {}", report.schema)?;
        writeln!(self.w)?;

        for model_run in &report.models {
            self.print_model_summary(model_run)?;
            self.print_results_table(&model_run.results)?;
            self.print_failure_details(&model_run.results)?;
        }

        if report.models.len() > 1 {
            self.print_comparison_table(&report.models)?;
        }

        Ok(())
    }
}

fn accuracy_colored(accuracy: f64) -> colored::ColoredString {
    let text = format!("{accuracy:.1}%");
    if accuracy >= 90.0 {
        text.green()
    } else if accuracy >= 70.0 {
        text.yellow()
    } else {
        text.red()
    }
}
