use crate::model::severity::Severity;
use crate::model::snapshot::FileRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One classified change, produced by a rule or a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub rule_name: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_location: Option<FileRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_location: Option<FileRange>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_reason: Option<String>,
}

impl Finding {
    pub fn new(
        rule_id: impl Into<String>,
        rule_name: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            rule_name: rule_name.into(),
            severity,
            message: message.into(),
            detail: None,
            old_location: None,
            new_location: None,
            metadata: BTreeMap::new(),
            remediation: None,
            ignored: false,
            ignore_reason: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_old_location(mut self, location: Option<FileRange>) -> Self {
        self.old_location = location;
        self
    }

    pub fn with_new_location(mut self, location: Option<FileRange>) -> Self {
        self.new_location = location;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Location used to bind annotations: new side first, then old.
    pub fn primary_location(&self) -> Option<&FileRange> {
        self.new_location.as_ref().or(self.old_location.as_ref())
    }

    /// Copy of this finding marked as suppressed.
    pub fn into_ignored(mut self, reason: impl Into<String>) -> Self {
        self.ignored = true;
        self.ignore_reason = Some(reason.into());
        self
    }

    /// Copy of this finding with `note` appended to its detail on a new line.
    pub fn with_appended_detail(mut self, note: &str) -> Self {
        self.detail = Some(match self.detail.take() {
            Some(existing) if !existing.is_empty() => format!("{}\n{}", existing, note),
            _ => note.to_string(),
        });
        self
    }
}
