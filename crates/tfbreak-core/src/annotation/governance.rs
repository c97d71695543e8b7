//! Policy over which suppressions are acceptable.

use super::{Annotation, RuleTarget};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Governance policy. Rule lists hold resolved rule IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    pub enabled: bool,
    pub require_reason: bool,
    pub allow_rule_ids: Vec<String>,
    pub deny_rule_ids: Vec<String>,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            require_reason: false,
            allow_rule_ids: Vec::new(),
            deny_rule_ids: Vec::new(),
        }
    }
}

/// An annotation the policy refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernanceViolation {
    pub annotation: Annotation,
    pub message: String,
}

impl fmt::Display for GovernanceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}:{})",
            self.message, self.annotation.file, self.annotation.line
        )
    }
}

impl GovernanceConfig {
    /// Check one annotation against the policy. The first violation wins.
    ///
    /// # Errors
    ///
    /// Returns the violation when the annotation is expired, lacks a required
    /// reason, names a rule outside the allow list, or names a denied rule
    /// (targeting all rules counts as naming every denied rule).
    pub fn check(
        &self,
        annotation: &Annotation,
        today: NaiveDate,
    ) -> Result<(), GovernanceViolation> {
        if !self.enabled {
            return Ok(());
        }
        let violation = |message: String| GovernanceViolation {
            annotation: annotation.clone(),
            message,
        };

        if let Some(expires) = annotation.expires.filter(|_| annotation.is_expired(today)) {
            return Err(violation(format!("annotation expired on {}", expires)));
        }

        let has_reason = annotation
            .reason
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty());
        if self.require_reason && !has_reason {
            return Err(violation("annotation requires a reason".to_string()));
        }

        let explicit = annotation.target.explicit_ids();
        if !self.allow_rule_ids.is_empty() {
            if let Some(id) = explicit.iter().find(|id| !self.allow_rule_ids.contains(id)) {
                return Err(violation(format!(
                    "rule {} is not in the allowed suppression list",
                    id
                )));
            }
        }

        if !self.deny_rule_ids.is_empty() {
            if let Some(id) = explicit.iter().find(|id| self.deny_rule_ids.contains(id)) {
                return Err(violation(format!("rule {} may not be suppressed", id)));
            }
            if annotation.target == RuleTarget::All {
                return Err(violation(
                    "suppressing all rules is not allowed while rules are denied".to_string(),
                ));
            }
        }

        Ok(())
    }
}
