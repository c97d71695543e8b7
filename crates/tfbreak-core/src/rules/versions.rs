//! Core and provider version requirements.

use super::{finding, Rule, RuleDoc};
use crate::model::{Finding, Severity, Snapshot};
use crate::version_req::{classify_change, ConstraintChange};

fn describe(change: ConstraintChange) -> &'static str {
    match change {
        ConstraintChange::Added => "added",
        ConstraintChange::Tightened => "tightened",
    }
}

/// BC200
pub struct TerraformVersionConstrained;

impl Rule for TerraformVersionConstrained {
    fn id(&self) -> &'static str {
        "BC200"
    }

    fn name(&self) -> &'static str {
        "terraform-version-constrained"
    }

    fn default_severity(&self) -> Severity {
        Severity::Breaking
    }

    fn description(&self) -> &'static str {
        "The required Terraform version was added or narrowed"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        let old_req = old.required_core_version.as_deref();
        let new_req = new.required_core_version.as_deref();
        let Some(change) = classify_change(old_req, new_req) else {
            return Vec::new();
        };
        let mut f = finding(
            self,
            format!(
                "Terraform version requirement {}: \"{}\"",
                describe(change),
                new_req.unwrap_or_default()
            ),
        )
        .with_metadata("change", describe(change))
        .with_metadata("new_constraint", new_req.unwrap_or_default());
        if let Some(old_req) = old_req {
            f = f.with_metadata("old_constraint", old_req);
        }
        vec![f]
    }

    fn documentation(&self) -> Option<RuleDoc> {
        Some(RuleDoc {
            summary: "Callers running a Terraform version outside the new range can \
                      no longer use the module.",
            example_old: "terraform {\n  required_version = \">= 1.0\"\n}",
            example_new: "terraform {\n  required_version = \">= 1.5\"\n}",
            remediation: "Only raise the minimum Terraform version in a major release.",
        })
    }
}

/// BC201
pub struct ProviderVersionConstrained;

impl Rule for ProviderVersionConstrained {
    fn id(&self) -> &'static str {
        "BC201"
    }

    fn name(&self) -> &'static str {
        "provider-version-constrained"
    }

    fn default_severity(&self) -> Severity {
        Severity::Breaking
    }

    fn description(&self) -> &'static str {
        "A provider version requirement was added or narrowed"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (provider, requirement) in &new.required_providers {
            let old_req = old
                .required_providers
                .get(provider)
                .and_then(|r| r.version.as_deref());
            let new_req = requirement.version.as_deref();
            let Some(change) = classify_change(old_req, new_req) else {
                continue;
            };
            let mut f = finding(
                self,
                format!(
                    "Provider \"{}\" version requirement {}: \"{}\"",
                    provider,
                    describe(change),
                    new_req.unwrap_or_default()
                ),
            )
            .with_metadata("provider", provider)
            .with_metadata("change", describe(change))
            .with_metadata("new_constraint", new_req.unwrap_or_default());
            if let Some(old_req) = old_req {
                f = f.with_metadata("old_constraint", old_req);
            }
            findings.push(f);
        }
        findings
    }
}
