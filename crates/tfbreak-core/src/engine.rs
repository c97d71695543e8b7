//! Evaluation engine.
//!
//! Runs every enabled rule over an old/new snapshot pair in ascending rule-ID
//! order and aggregates the findings into a [`CheckResult`].

use crate::model::{CheckResult, Severity, Snapshot};
use crate::rules::RuleRegistry;
use crate::{log_op_end, log_op_start};
use std::time::Instant;

/// Options for [`Engine::check_with_options`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Copy each rule's remediation text onto its findings
    pub include_remediation: bool,
}

/// Phase 1 of the pipeline: snapshots in, unsuppressed result out.
#[derive(Debug)]
pub struct Engine {
    registry: RuleRegistry,
}

impl Engine {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RuleRegistry {
        &mut self.registry
    }

    pub fn check(
        &self,
        old_dir: &str,
        new_dir: &str,
        old: &Snapshot,
        new: &Snapshot,
        fail_on: Severity,
    ) -> CheckResult {
        self.check_with_options(old_dir, new_dir, old, new, fail_on, &CheckOptions::default())
    }

    pub fn check_with_options(
        &self,
        old_dir: &str,
        new_dir: &str,
        old: &Snapshot,
        new: &Snapshot,
        fail_on: Severity,
        options: &CheckOptions,
    ) -> CheckResult {
        let start = Instant::now();
        log_op_start!("check", old_path = old_dir, new_path = new_dir);

        let mut result = CheckResult::new(old_dir, new_dir, fail_on);
        let mut rule_count = 0usize;
        for (rule, config) in self.registry.enabled_rules() {
            rule_count += 1;
            let remediation = options
                .include_remediation
                .then(|| rule.documentation().map(|d| d.remediation.to_string()))
                .flatten();
            let findings = rule.evaluate(old, new);
            tracing::debug!(
                rule_id = rule.id(),
                finding_count = findings.len(),
                "rule evaluated"
            );
            result.findings.extend(findings.into_iter().map(|mut f| {
                f.severity = config.severity;
                if f.remediation.is_none() {
                    f.remediation = remediation.clone();
                }
                f
            }));
        }
        result.compute();

        log_op_end!(
            "check",
            duration_ms = start.elapsed().as_millis() as u64,
            rule_count = rule_count,
            finding_count = result.findings.len(),
            outcome = %result.outcome
        );
        result
    }
}
