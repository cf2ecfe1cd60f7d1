// src/output/report.rs
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::Local;
use serde::Serialize;

use crate::engine::{CredentialPair, RunReport, RunSummary};
use crate::probe::ProbeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Txt,
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ReportFormat::Txt => "txt",
            ReportFormat::Json => "json",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report io: {0}")]
    Io(#[from] std::io::Error),
    #[error("report serialization: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct Report<'a> {
    timestamp: String,
    target: &'a str,
    module: String,
    summary: &'a RunSummary,
    credentials: &'a [CredentialPair],
}

/// Write the run report to `path` in the requested format.
pub fn generate(
    path: &Path,
    format: ReportFormat,
    target: &str,
    module: ProbeKind,
    report: &RunReport,
) -> Result<(), ReportError> {
    let report = Report {
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        target,
        module: module.to_string(),
        summary: &report.summary,
        credentials: &report.results,
    };

    let content = match format {
        ReportFormat::Json => serde_json::to_string_pretty(&report)?,
        ReportFormat::Txt => render_text(&report),
    };
    fs::write(path, content)?;
    Ok(())
}

fn render_text(report: &Report<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "demi-rs run report - {}", report.timestamp);
    let _ = writeln!(out, "target: {} ({})", report.target, report.module);
    let _ = writeln!(out);
    let _ = writeln!(out, "attempts:      {}", report.summary.attempts);
    let _ = writeln!(out, "successes:     {}", report.summary.successes);
    let _ = writeln!(out, "failures:      {}", report.summary.failures);
    let _ = writeln!(out, "inconclusive:  {}", report.summary.inconclusive);
    let _ = writeln!(out, "errors:        {}", report.summary.errors);
    let _ = writeln!(out, "duration:      {:.2}s", report.summary.duration_secs);
    let _ = writeln!(out, "rate:          {:.2} attempts/s", report.summary.attempts_per_sec);
    if !report.credentials.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "valid credentials:");
        for pair in report.credentials {
            let _ = writeln!(out, "  {}", pair);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RunSummary;

    fn sample_report() -> RunReport {
        RunReport {
            summary: RunSummary {
                attempts: 6,
                successes: 1,
                failures: 4,
                inconclusive: 0,
                errors: 1,
                duration_secs: 1.5,
                attempts_per_sec: 4.0,
            },
            results: vec![CredentialPair::new("root", "toor")],
        }
    }

    #[test]
    fn json_report_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        generate(&path, ReportFormat::Json, "10.0.0.1", ProbeKind::Ssh, &sample_report()).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["target"], "10.0.0.1");
        assert_eq!(parsed["module"], "ssh");
        assert_eq!(parsed["summary"]["attempts"], 6);
        assert_eq!(parsed["credentials"][0]["username"], "root");
    }

    #[test]
    fn text_report_lists_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        generate(&path, ReportFormat::Txt, "10.0.0.1", ProbeKind::Ftp, &sample_report()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("target: 10.0.0.1 (ftp)"));
        assert!(text.contains("attempts:      6"));
        assert!(text.contains("  root:toor"));
    }
}
