//! Output rendering for check results.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use tfbreak_core::model::{Finding, Outcome, Summary};
use tfbreak_core::{CheckResult, Result, Severity};

/// `--format`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn visible(result: &CheckResult, show_ignored: bool) -> impl Iterator<Item = &Finding> {
    result
        .findings
        .iter()
        .filter(move |f| show_ignored || !f.ignored)
}

/// Plain-text report.
pub struct TextReport<'a> {
    pub result: &'a CheckResult,
    pub show_ignored: bool,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        writeln!(f, "tfbreak: {} -> {}", result.old_path, result.new_path)?;
        writeln!(f)?;

        for finding in visible(result, self.show_ignored) {
            let label = if finding.ignored {
                "IGNORED".to_string()
            } else {
                finding.severity.to_string()
            };
            write!(f, "{:<8} {} {}", label, finding.rule_id, finding.rule_name)?;
            if let Some(location) = finding.primary_location() {
                write!(f, " {}", location)?;
            }
            writeln!(f)?;
            writeln!(f, "  {}", finding.message)?;
            if let Some(detail) = &finding.detail {
                writeln!(f, "  {}", detail)?;
            }
            if let Some(reason) = finding.ignore_reason.as_ref().filter(|_| finding.ignored) {
                writeln!(f, "  ignored: {}", reason)?;
            }
            if let Some(remediation) = &finding.remediation {
                writeln!(f, "  remediation: {}", remediation)?;
            }
            writeln!(f)?;
        }

        let summary = result.summary();
        writeln!(
            f,
            "Summary: {} breaking, {} risky, {} info, {} ignored",
            summary.breaking, summary.risky, summary.info, summary.ignored
        )?;
        writeln!(f, "Result: {} (fail-on {})", result.outcome, result.fail_on)
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    old_path: &'a str,
    new_path: &'a str,
    fail_on: Severity,
    outcome: Outcome,
    summary: Summary,
    findings: Vec<&'a Finding>,
}

/// Pretty-printed JSON report.
///
/// # Errors
///
/// Returns `Serialization` if encoding fails.
pub fn json(result: &CheckResult, show_ignored: bool) -> Result<String> {
    let report = JsonReport {
        old_path: &result.old_path,
        new_path: &result.new_path,
        fail_on: result.fail_on,
        outcome: result.outcome,
        summary: result.summary(),
        findings: visible(result, show_ignored).collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
