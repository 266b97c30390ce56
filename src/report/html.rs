//! Self-contained HTML report output.

use super::{format_duration, provider_of, Reporter};
use crate::types::{ModelRun, RunReport, TestResult};
use chrono::Utc;
use std::io::{self, Write};

/// Outputs the run report as a single HTML document.
pub struct HtmlReporter<W> {
    w: W,
}

impl<W: Write> HtmlReporter<W> {
    pub fn new(w: W) -> Self {
        Self { w }
    }

    fn write_model(&mut self, model_run: &ModelRun) -> io::Result<()> {
        let m = &model_run.metrics;
        writeln!(self.w, "<section class=\"model\">")?;
        writeln!(self.w, "<h2>{}</h2>", escape(&model_run.model))?;

        let provider = provider_of(&model_run.results);
        if !provider.is_empty() {
            writeln!(self.w, "<p class=\"provider\">Provider: {}</p>", escape(provider))?;
        }

        writeln!(self.w, "<div class=\"cards\">")?;
        writeln!(
            self.w,
            "<div class=\"card {}\"><span class=\"num\">{:.1}%</span> accuracy</div>",
            accuracy_class(m.accuracy),
            m.accuracy
        )?;
        writeln!(
            self.w,
            "<div class=\"card\"><span class=\"num\">{} / {} / {}</span> passed / failed / errors</div>",
            m.passed, m.failed, m.errors
        )?;
        writeln!(
            self.w,
            "<div class=\"card\"><span class=\"num\">{} / {}</span> tokens in / out</div>",
            m.total_tokens_in, m.total_tokens_out
        )?;
        writeln!(
            self.w,
            "<div class=\"card\"><span class=\"num\">{}</span> P50 (P95 {}, P99 {})</div>",
            format_duration(m.latency_p50),
            format_duration(m.latency_p95),
            format_duration(m.latency_p99)
        )?;
        writeln!(
            self.w,
            "<div class=\"card\"><span class=\"num\">{:.1} tok/s</span> over {}</div>",
            m.throughput,
            format_duration(m.total_duration)
        )?;
        writeln!(self.w, "</div>")?;

        writeln!(
            self.w,
            "<table><thead><tr><th>Test</th><th>Status</th><th>Latency</th><th>Tokens</th></tr></thead><tbody>"
        )?;
        for result in &model_run.results {
            let (class, label) = status_of(result);
            writeln!(
                self.w,
                "<tr><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}/{}</td></tr>",
                escape(&result.test_name),
                class,
                label,
                format_duration(result.latency),
                result.tokens_in,
                result.tokens_out
            )?;
        }
        writeln!(self.w, "</tbody></table>")?;

        self.write_failures(&model_run.results)?;
        writeln!(self.w, "</section>")
    }

    fn write_failures(&mut self, results: &[TestResult]) -> io::Result<()> {
        if results.iter().all(|r| r.passed && r.error.is_none()) {
            return Ok(());
        }

        writeln!(self.w, "<h3>Failure Details</h3>")?;
        for result in results {
            if let Some(error) = &result.error {
                writeln!(
                    self.w,
                    "<details class=\"error\"><summary>{}</summary><pre>{}</pre></details>",
                    escape(&result.test_name),
                    escape(error)
                )?;
            } else if !result.passed {
                writeln!(
                    self.w,
                    "<details class=\"failure\"><summary>{}</summary>",
                    escape(&result.test_name)
                )?;
                writeln!(self.w, "<ul>")?;
                for diff in &result.diffs {
                    let expected = diff
                        .expected
                        .as_ref()
                        .map_or("<missing>".to_string(), |v| pretty(v));
                    let actual = diff
                        .actual
                        .as_ref()
                        .map_or("<missing>".to_string(), |v| pretty(v));
                    writeln!(
                        self.w,
                        "<li><code>{}</code><pre>Expected: {}\nActual:   {}</pre></li>",
                        escape(&diff.path),
                        escape(&expected),
                        escape(&actual)
                    )?;
                }
                writeln!(self.w, "</ul></details>")?;
            }
        }
        Ok(())
    }
}

impl<W: Write> Reporter for HtmlReporter<W> {
    fn report(&mut self, report: &RunReport) -> io::Result<()> {
        writeln!(self.w, "<!DOCTYPE html>")?;
        writeln!(self.w, "<html lang=\"en\"><head><meta charset=\"utf-8\">")?;
        writeln!(self.w, "<title>Verdict Test Report</title>")?;
        writeln!(self.w, "<style>{STYLE}</style>")?;
        writeln!(self.w, "</head><body>")?;

        writeln!(self.w, "<h1>Verdict Test Report</h1>")?;
        writeln!(self.w, "<dl class=\"meta\">")?;
        writeln!(
            self.w,
            "<dt>Run at</dt><dd>{}</dd>",
            report.timestamp.to_rfc3339()
        )?;
        writeln!(self.w, "<dt>Prompt</dt><dd>{}</dd>", escape(&report.prompt))?;
        writeln!(self.w, "<dt>Schema</dt><dd>{}</dd>", escape(&report.schema))?;
        writeln!(
            self.w,
            "<dt>Test file</dt><dd>{}</dd>",
            escape(&report.test_file)
        )?;
        writeln!(self.w, "</dl>")?;

        for model_run in &report.models {
            self.write_model(model_run)?;
        }

        writeln!(
            self.w,
            "<footer>Generated {}</footer>",
            Utc::now().to_rfc3339()
        )?;
        writeln!(self.w, "</body></html>")
    }
}

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:2rem auto;max-width:60rem;color:#222}\
h1{border-bottom:2px solid #ddd;padding-bottom:.5rem}\
dl.meta dt{font-weight:bold}dl.meta dd{margin:0 0 .5rem 0}\
section.model{margin-top:2rem}\
.cards{display:flex;flex-wrap:wrap;gap:.75rem;margin:1rem 0}\
.card{border:1px solid #ddd;border-radius:6px;padding:.75rem 1rem}\
.card .num{display:block;font-size:1.3rem;font-weight:bold}\
.card.success .num{color:#1a7f37}.card.warning .num{color:#9a6700}.card.error .num{color:#cf222e}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ddd;padding:.4rem .6rem;text-align:left}\
td.pass{color:#1a7f37}td.fail{color:#cf222e}td.err{color:#9a6700}\
details{margin:.5rem 0}summary{cursor:pointer;font-weight:bold}\
details.failure summary{color:#cf222e}details.error summary{color:#9a6700}\
pre{background:#f6f8fa;padding:.5rem;border-radius:4px;overflow-x:auto}\
footer{margin-top:2rem;color:#888;font-size:.85rem}";

fn status_of(result: &TestResult) -> (&'static str, &'static str) {
    if result.error.is_some() {
        ("err", "ERROR")
    } else if result.passed {
        ("pass", "PASS")
    } else {
        ("fail", "FAIL")
    }
}

fn accuracy_class(accuracy: f64) -> &'static str {
    if accuracy >= 90.0 {
        "success"
    } else if accuracy >= 70.0 {
        "warning"
    } else {
        "error"
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
