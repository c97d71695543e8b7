use crate::model::finding::Finding;
use crate::model::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall verdict of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Pass,
    Fail,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Pass => "PASS",
            Outcome::Fail => "FAIL",
        })
    }
}

/// Aggregate counts derived from a result's findings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub breaking: usize,
    pub risky: usize,
    pub info: usize,
    pub ignored: usize,
    pub total: usize,
}

/// Findings for one old/new comparison plus the derived outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub old_path: String,
    pub new_path: String,
    pub fail_on: Severity,
    pub findings: Vec<Finding>,
    pub outcome: Outcome,
}

impl CheckResult {
    pub fn new(old_path: impl Into<String>, new_path: impl Into<String>, fail_on: Severity) -> Self {
        Self {
            old_path: old_path.into(),
            new_path: new_path.into(),
            fail_on,
            findings: Vec::new(),
            outcome: Outcome::Pass,
        }
    }

    /// Re-derive the outcome from the current findings.
    ///
    /// FAIL iff some non-ignored finding is at least `fail_on`. Idempotent.
    pub fn compute(&mut self) {
        let failing = self
            .findings
            .iter()
            .any(|f| !f.ignored && f.severity.at_least(self.fail_on));
        self.outcome = if failing { Outcome::Fail } else { Outcome::Pass };
    }

    /// Append findings from another source (plugins) and recompute.
    pub fn merge_findings(&mut self, findings: Vec<Finding>) {
        self.findings.extend(findings);
        self.compute();
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for finding in &self.findings {
            summary.total += 1;
            if finding.ignored {
                summary.ignored += 1;
                continue;
            }
            match finding.severity {
                Severity::Breaking => summary.breaking += 1,
                Severity::Risky => summary.risky += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary
    }

    /// Findings that were not suppressed
    pub fn active_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.ignored)
    }

    pub fn is_pass(&self) -> bool {
        self.outcome == Outcome::Pass
    }
}
