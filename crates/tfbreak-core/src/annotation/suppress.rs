//! Phase 2 of the pipeline: apply annotations to a phase-1 result.

use super::blocks::{AnnotationIndex, BlockIndex};
use super::governance::{GovernanceConfig, GovernanceViolation};
use super::matcher::find_match;
use crate::model::{CheckResult, Finding};
use crate::{log_op_end, log_op_start};
use chrono::NaiveDate;
use std::time::Instant;

/// What the suppression pass does with one finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressionDecision {
    /// No annotation applies
    Keep,
    /// An accepted annotation applies
    Ignore { reason: String },
    /// An annotation applies but governance refused it
    Reject { violation: GovernanceViolation },
}

/// Matches findings against annotations under a governance policy.
#[derive(Debug, Clone)]
pub struct Suppressor {
    annotations: AnnotationIndex,
    blocks: BlockIndex,
    governance: GovernanceConfig,
    today: NaiveDate,
}

impl Suppressor {
    pub fn new(
        annotations: AnnotationIndex,
        blocks: BlockIndex,
        governance: GovernanceConfig,
        today: NaiveDate,
    ) -> Self {
        Self {
            annotations,
            blocks,
            governance,
            today,
        }
    }

    pub fn decide(&self, finding: &Finding) -> SuppressionDecision {
        if finding.ignored {
            return SuppressionDecision::Keep;
        }
        let Some(annotation) = find_match(finding, &self.annotations, &self.blocks) else {
            return SuppressionDecision::Keep;
        };
        match self.governance.check(&annotation, self.today) {
            Ok(()) => {
                let reason = annotation
                    .reason
                    .clone()
                    .or_else(|| annotation.ticket.clone())
                    .unwrap_or_else(|| {
                        format!(
                            "suppressed by annotation at {}:{}",
                            annotation.file, annotation.line
                        )
                    });
                SuppressionDecision::Ignore { reason }
            }
            Err(violation) => SuppressionDecision::Reject { violation },
        }
    }

    /// Return a new result with every decision applied and the outcome recomputed.
    pub fn apply(&self, result: CheckResult) -> CheckResult {
        let start = Instant::now();
        log_op_start!("suppress", finding_count = result.findings.len());

        let CheckResult {
            old_path,
            new_path,
            fail_on,
            findings,
            ..
        } = result;
        let mut ignored = 0usize;
        let mut rejected = 0usize;
        let findings = findings
            .into_iter()
            .map(|finding| match self.decide(&finding) {
                SuppressionDecision::Keep => finding,
                SuppressionDecision::Ignore { reason } => {
                    ignored += 1;
                    finding.into_ignored(reason)
                }
                SuppressionDecision::Reject { violation } => {
                    rejected += 1;
                    tracing::debug!(
                        rule_id = %finding.rule_id,
                        file = %violation.annotation.file,
                        line = violation.annotation.line,
                        "annotation rejected"
                    );
                    finding.with_appended_detail(&format!(
                        "annotation rejected: {}",
                        violation.message
                    ))
                }
            })
            .collect();

        let mut next = CheckResult::new(old_path, new_path, fail_on);
        next.findings = findings;
        next.compute();

        log_op_end!(
            "suppress",
            duration_ms = start.elapsed().as_millis() as u64,
            ignored_count = ignored,
            rejected_count = rejected
        );
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, AnnotationScope, RuleTarget};
    use crate::model::{FileRange, Outcome, Severity};

    fn suppressor(annotation: Annotation, governance: GovernanceConfig) -> Suppressor {
        let mut index = AnnotationIndex::new();
        index.insert("main.tf", vec![annotation]);
        Suppressor::new(
            index,
            BlockIndex::new(),
            governance,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        )
    }

    fn annotation() -> Annotation {
        Annotation {
            scope: AnnotationScope::Block,
            target: RuleTarget::All,
            reason: None,
            ticket: Some("OPS-7".to_string()),
            expires: None,
            file: "main.tf".to_string(),
            line: 9,
            governs_line: None,
        }
    }

    fn failing_result() -> CheckResult {
        let mut result = CheckResult::new("old", "new", Severity::Breaking);
        result.merge_findings(vec![Finding::new(
            "BC001",
            "required-input-added",
            Severity::Breaking,
            "New required variable",
        )
        .with_new_location(Some(FileRange::new("main.tf", 10)))]);
        result
    }

    #[test]
    fn test_ignore_uses_ticket_when_no_reason() {
        let s = suppressor(annotation(), GovernanceConfig::default());
        let result = s.apply(failing_result());
        assert!(result.findings[0].ignored);
        assert_eq!(result.findings[0].ignore_reason.as_deref(), Some("OPS-7"));
        assert_eq!(result.outcome, Outcome::Pass);
    }

    #[test]
    fn test_rejected_annotation_keeps_finding_visible() {
        let governance = GovernanceConfig {
            require_reason: true,
            ..GovernanceConfig::default()
        };
        let s = suppressor(annotation(), governance);
        let result = s.apply(failing_result());
        assert!(!result.findings[0].ignored);
        assert!(result.findings[0]
            .detail
            .as_deref()
            .is_some_and(|d| d.starts_with("annotation rejected: ")));
        assert_eq!(result.outcome, Outcome::Fail);
    }

    #[test]
    fn test_generic_reason() {
        let mut ann = annotation();
        ann.ticket = None;
        let s = suppressor(ann, GovernanceConfig::default());
        match s.decide(&failing_result().findings[0]) {
            SuppressionDecision::Ignore { reason } => {
                assert_eq!(reason, "suppressed by annotation at main.tf:9")
            }
            other => panic!("expected ignore, got {:?}", other),
        }
    }
}
