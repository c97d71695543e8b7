//! Rules over `output` blocks.

use super::rename::{pair_renames, RenameDetection, RenamePair};
use super::{finding, Rule, RuleDoc};
use crate::model::{Finding, Severity, Snapshot};
use std::collections::BTreeSet;

fn output_renames(old: &Snapshot, new: &Snapshot, renames: &RenameDetection) -> Vec<RenamePair> {
    if !renames.enabled {
        return Vec::new();
    }
    let removed = old
        .outputs
        .keys()
        .filter(|k| !new.outputs.contains_key(*k))
        .map(String::as_str);
    let added = new
        .outputs
        .keys()
        .filter(|k| !old.outputs.contains_key(*k))
        .map(String::as_str);
    pair_renames(removed, added, renames.similarity_threshold)
}

/// BC009
pub struct OutputRemoved {
    renames: RenameDetection,
}

impl OutputRemoved {
    pub fn new(renames: RenameDetection) -> Self {
        Self { renames }
    }
}

impl Rule for OutputRemoved {
    fn id(&self) -> &'static str {
        "BC009"
    }

    fn name(&self) -> &'static str {
        "output-removed"
    }

    fn default_severity(&self) -> Severity {
        Severity::Breaking
    }

    fn description(&self) -> &'static str {
        "An output was removed"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        let renamed: BTreeSet<String> = output_renames(old, new, &self.renames)
            .into_iter()
            .map(|p| p.old_name)
            .collect();
        old.outputs
            .iter()
            .filter(|(name, _)| !new.outputs.contains_key(*name) && !renamed.contains(*name))
            .map(|(name, o)| {
                finding(self, format!("Output \"{}\" was removed", name))
                    .with_old_location(o.location.clone())
            })
            .collect()
    }

    fn documentation(&self) -> Option<RuleDoc> {
        Some(RuleDoc {
            summary: "Callers referencing `module.<name>.<output>` fail to plan.",
            example_old: "output \"vpc_id\" {\n  value = aws_vpc.main.id\n}",
            example_new: "# output removed",
            remediation: "Keep the output, or publish the removal in a major version.",
        })
    }
}

/// BC010
pub struct OutputRenamed {
    renames: RenameDetection,
}

impl OutputRenamed {
    pub fn new(renames: RenameDetection) -> Self {
        Self { renames }
    }
}

impl Rule for OutputRenamed {
    fn id(&self) -> &'static str {
        "BC010"
    }

    fn name(&self) -> &'static str {
        "output-renamed"
    }

    fn default_severity(&self) -> Severity {
        Severity::Breaking
    }

    fn description(&self) -> &'static str {
        "An output appears to have been renamed"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        output_renames(old, new, &self.renames)
            .into_iter()
            .map(|pair| {
                finding(
                    self,
                    format!(
                        "Output \"{}\" appears to be renamed to \"{}\"",
                        pair.old_name, pair.new_name
                    ),
                )
                .with_old_location(old.outputs.get(&pair.old_name).and_then(|o| o.location.clone()))
                .with_new_location(new.outputs.get(&pair.new_name).and_then(|o| o.location.clone()))
                .with_metadata("old_name", &pair.old_name)
                .with_metadata("new_name", &pair.new_name)
                .with_metadata("similarity", format!("{:.2}", pair.similarity))
            })
            .collect()
    }
}

/// RC008
pub struct OutputSensitiveChanged;

impl Rule for OutputSensitiveChanged {
    fn id(&self) -> &'static str {
        "RC008"
    }

    fn name(&self) -> &'static str {
        "output-sensitive-changed"
    }

    fn default_severity(&self) -> Severity {
        Severity::Risky
    }

    fn description(&self) -> &'static str {
        "An output's sensitive flag changed"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        old.outputs
            .values()
            .filter_map(|o| new.outputs.get(&o.name).map(|n| (o, n)))
            .filter(|(o, n)| o.sensitive != n.sensitive)
            .map(|(o, n)| {
                finding(
                    self,
                    format!(
                        "Output \"{}\" sensitive changed from {} to {}",
                        o.name, o.sensitive, n.sensitive
                    ),
                )
                .with_old_location(o.location.clone())
                .with_new_location(n.location.clone())
            })
            .collect()
    }

    fn documentation(&self) -> Option<RuleDoc> {
        Some(RuleDoc {
            summary: "Marking an output sensitive forces every caller that re-exports \
                      it to mark their own output sensitive too.",
            example_old: "output \"password\" {\n  value = random_password.db.result\n}",
            example_new: "output \"password\" {\n  value     = random_password.db.result\n  sensitive = true\n}",
            remediation: "Announce the change so callers can mark dependent outputs sensitive.",
        })
    }
}
