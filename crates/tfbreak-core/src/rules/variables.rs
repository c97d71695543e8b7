//! Rules over `variable` blocks.

use super::rename::{pair_renames, RenameDetection, RenamePair};
use super::{finding, Rule, RuleDoc};
use crate::model::{Finding, Severity, Snapshot, VariableSignature};
use crate::type_expr::{is_unconstrained, types_differ};
use std::collections::BTreeSet;

/// Variables present in both snapshots
fn common<'a>(
    old: &'a Snapshot,
    new: &'a Snapshot,
) -> impl Iterator<Item = (&'a VariableSignature, &'a VariableSignature)> {
    old.variables
        .iter()
        .filter_map(|(name, o)| new.variables.get(name).map(|n| (o, n)))
}

/// Pair removed variables with added optional ones.
fn variable_renames(old: &Snapshot, new: &Snapshot, renames: &RenameDetection) -> Vec<RenamePair> {
    if !renames.enabled {
        return Vec::new();
    }
    let removed = old
        .variables
        .keys()
        .filter(|k| !new.variables.contains_key(*k))
        .map(String::as_str);
    let added = new
        .variables
        .iter()
        .filter(|(k, v)| !old.variables.contains_key(*k) && !v.is_required())
        .map(|(k, _)| k.as_str());
    pair_renames(removed, added, renames.similarity_threshold)
}

fn describe_nullable(value: Option<bool>) -> &'static str {
    match value {
        None => "unset",
        Some(true) => "true",
        Some(false) => "false",
    }
}

/// BC001
pub struct RequiredInputAdded;

impl Rule for RequiredInputAdded {
    fn id(&self) -> &'static str {
        "BC001"
    }

    fn name(&self) -> &'static str {
        "required-input-added"
    }

    fn default_severity(&self) -> Severity {
        Severity::Breaking
    }

    fn description(&self) -> &'static str {
        "A new variable without a usable default was added"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        new.variables
            .iter()
            .filter(|(name, v)| !old.variables.contains_key(*name) && v.is_required())
            .map(|(name, v)| {
                finding(
                    self,
                    format!("New required variable \"{}\" has no default", name),
                )
                .with_new_location(v.location.clone())
            })
            .collect()
    }

    fn documentation(&self) -> Option<RuleDoc> {
        Some(RuleDoc {
            summary: "Every existing caller of the module must now pass a value for the new \
                      variable, otherwise planning fails.",
            example_old: "# no variable \"region\"",
            example_new: "variable \"region\" {\n  type = string\n}",
            remediation: "Give the new variable a default value, or document the new \
                          required input in the release notes and bump the major version.",
        })
    }
}

/// BC002
pub struct InputRemoved {
    renames: RenameDetection,
}

impl InputRemoved {
    pub fn new(renames: RenameDetection) -> Self {
        Self { renames }
    }
}

impl Rule for InputRemoved {
    fn id(&self) -> &'static str {
        "BC002"
    }

    fn name(&self) -> &'static str {
        "input-removed"
    }

    fn default_severity(&self) -> Severity {
        Severity::Breaking
    }

    fn description(&self) -> &'static str {
        "A variable was removed"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        let renamed: BTreeSet<String> = variable_renames(old, new, &self.renames)
            .into_iter()
            .map(|p| p.old_name)
            .collect();
        old.variables
            .iter()
            .filter(|(name, _)| !new.variables.contains_key(*name) && !renamed.contains(*name))
            .map(|(name, v)| {
                finding(self, format!("Variable \"{}\" was removed", name))
                    .with_old_location(v.location.clone())
            })
            .collect()
    }

    fn documentation(&self) -> Option<RuleDoc> {
        Some(RuleDoc {
            summary: "Callers that still pass the removed variable fail with an \
                      unsupported argument error.",
            example_old: "variable \"instance_count\" {\n  type = number\n}",
            example_new: "# variable removed",
            remediation: "Keep the variable and mark it deprecated in its description \
                          until the next major version.",
        })
    }
}

/// BC003
pub struct InputRenamed {
    renames: RenameDetection,
}

impl InputRenamed {
    pub fn new(renames: RenameDetection) -> Self {
        Self { renames }
    }
}

impl Rule for InputRenamed {
    fn id(&self) -> &'static str {
        "BC003"
    }

    fn name(&self) -> &'static str {
        "input-renamed"
    }

    fn default_severity(&self) -> Severity {
        Severity::Breaking
    }

    fn description(&self) -> &'static str {
        "A variable appears to have been renamed"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        variable_renames(old, new, &self.renames)
            .into_iter()
            .map(|pair| {
                finding(
                    self,
                    format!(
                        "Variable \"{}\" appears to be renamed to \"{}\"",
                        pair.old_name, pair.new_name
                    ),
                )
                .with_old_location(
                    old.variables
                        .get(&pair.old_name)
                        .and_then(|v| v.location.clone()),
                )
                .with_new_location(
                    new.variables
                        .get(&pair.new_name)
                        .and_then(|v| v.location.clone()),
                )
                .with_metadata("old_name", &pair.old_name)
                .with_metadata("new_name", &pair.new_name)
                .with_metadata("similarity", format!("{:.2}", pair.similarity))
            })
            .collect()
    }

    fn documentation(&self) -> Option<RuleDoc> {
        Some(RuleDoc {
            summary: "Callers passing the old variable name fail; the value they \
                      relied on is silently replaced by the new variable's default.",
            example_old: "variable \"subnet_id\" {}",
            example_new: "variable \"subnet_ids\" {\n  default = []\n}",
            remediation: "Keep the old variable as a deprecated alias and coalesce it \
                          with the new one.",
        })
    }
}

/// BC004
pub struct InputTypeChanged;

impl Rule for InputTypeChanged {
    fn id(&self) -> &'static str {
        "BC004"
    }

    fn name(&self) -> &'static str {
        "input-type-changed"
    }

    fn default_severity(&self) -> Severity {
        Severity::Breaking
    }

    fn description(&self) -> &'static str {
        "A variable's declared type changed"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        common(old, new)
            .filter(|(o, n)| {
                !is_unconstrained(&o.type_expr) && types_differ(&o.type_expr, &n.type_expr)
            })
            .map(|(o, n)| {
                finding(
                    self,
                    format!(
                        "Variable \"{}\" type changed from \"{}\" to \"{}\"",
                        o.name,
                        o.type_expr.trim(),
                        n.type_expr.trim()
                    ),
                )
                .with_old_location(o.location.clone())
                .with_new_location(n.location.clone())
                .with_metadata("old_type", o.type_expr.trim())
                .with_metadata("new_type", n.type_expr.trim())
            })
            .collect()
    }

    fn documentation(&self) -> Option<RuleDoc> {
        Some(RuleDoc {
            summary: "Values valid under the old type may be rejected or converted \
                      differently under the new one. Going from an untyped or `any` \
                      variable to a specific type is not reported.",
            example_old: "variable \"ports\" {\n  type = list(number)\n}",
            example_new: "variable \"ports\" {\n  type = list(string)\n}",
            remediation: "Introduce a new variable with the new type and deprecate \
                          the old one.",
        })
    }
}

/// BC005
pub struct InputDefaultRemoved;

impl Rule for InputDefaultRemoved {
    fn id(&self) -> &'static str {
        "BC005"
    }

    fn name(&self) -> &'static str {
        "input-default-removed"
    }

    fn default_severity(&self) -> Severity {
        Severity::Breaking
    }

    fn description(&self) -> &'static str {
        "A variable lost its default and became required"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        common(old, new)
            .filter(|(o, n)| o.has_default() && !o.is_required() && n.is_required())
            .map(|(o, n)| {
                finding(
                    self,
                    format!("Variable \"{}\" default was removed", o.name),
                )
                .with_old_location(o.location.clone())
                .with_new_location(n.location.clone())
            })
            .collect()
    }

    fn documentation(&self) -> Option<RuleDoc> {
        Some(RuleDoc {
            summary: "Callers that relied on the default must now pass a value.",
            example_old: "variable \"size\" {\n  default = 10\n}",
            example_new: "variable \"size\" {}",
            remediation: "Restore the default value.",
        })
    }
}

/// RC006
pub struct InputNullableChanged;

impl Rule for InputNullableChanged {
    fn id(&self) -> &'static str {
        "RC006"
    }

    fn name(&self) -> &'static str {
        "input-nullable-changed"
    }

    fn default_severity(&self) -> Severity {
        Severity::Risky
    }

    fn description(&self) -> &'static str {
        "A variable's nullable setting changed"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        common(old, new)
            .filter(|(o, n)| o.nullable != n.nullable)
            .map(|(o, n)| {
                finding(
                    self,
                    format!(
                        "Variable \"{}\" nullable changed from {} to {}",
                        o.name,
                        describe_nullable(o.nullable),
                        describe_nullable(n.nullable)
                    ),
                )
                .with_new_location(n.location.clone())
            })
            .collect()
    }
}

/// RC007
pub struct InputSensitiveChanged;

impl Rule for InputSensitiveChanged {
    fn id(&self) -> &'static str {
        "RC007"
    }

    fn name(&self) -> &'static str {
        "input-sensitive-changed"
    }

    fn default_severity(&self) -> Severity {
        Severity::Risky
    }

    fn description(&self) -> &'static str {
        "A variable's sensitive flag changed"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        common(old, new)
            .filter(|(o, n)| o.sensitive != n.sensitive)
            .map(|(o, n)| {
                finding(
                    self,
                    format!(
                        "Variable \"{}\" sensitive changed from {} to {}",
                        o.name, o.sensitive, n.sensitive
                    ),
                )
                .with_old_location(o.location.clone())
                .with_new_location(n.location.clone())
            })
            .collect()
    }
}

/// RC011
pub struct ValidationAdded;

impl Rule for ValidationAdded {
    fn id(&self) -> &'static str {
        "RC011"
    }

    fn name(&self) -> &'static str {
        "validation-added"
    }

    fn default_severity(&self) -> Severity {
        Severity::Risky
    }

    fn description(&self) -> &'static str {
        "A validation block was added to a variable"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (o, n) in common(old, new) {
            for fingerprint in n.validations.iter().filter(|f| !o.validations.contains(f)) {
                findings.push(
                    finding(
                        self,
                        format!("Variable \"{}\" has a new validation rule", n.name),
                    )
                    .with_new_location(n.location.clone())
                    .with_metadata("fingerprint", fingerprint),
                );
            }
        }
        findings
    }

    fn documentation(&self) -> Option<RuleDoc> {
        Some(RuleDoc {
            summary: "Values that passed before may now be rejected at plan time.",
            example_old: "variable \"env\" {}",
            example_new: "variable \"env\" {\n  validation {\n    condition = contains([\"dev\", \"prod\"], var.env)\n    error_message = \"bad env\"\n  }\n}",
            remediation: "Check that every known caller passes values the new \
                          validation accepts.",
        })
    }
}

/// RC012
pub struct ValidationRemoved;

impl Rule for ValidationRemoved {
    fn id(&self) -> &'static str {
        "RC012"
    }

    fn name(&self) -> &'static str {
        "validation-removed"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn description(&self) -> &'static str {
        "A validation block was removed from a variable"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (o, n) in common(old, new) {
            for fingerprint in o.validations.iter().filter(|f| !n.validations.contains(f)) {
                findings.push(
                    finding(
                        self,
                        format!("Variable \"{}\" lost a validation rule", o.name),
                    )
                    .with_old_location(o.location.clone())
                    .with_new_location(n.location.clone())
                    .with_metadata("fingerprint", fingerprint),
                );
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileRange;
    use serde_json::json;

    fn var(name: &str) -> VariableSignature {
        let mut v = VariableSignature::new(name);
        v.location = Some(FileRange::new("variables.tf", 1));
        v
    }

    fn with(vars: Vec<VariableSignature>) -> Snapshot {
        let mut snap = Snapshot::new();
        for v in vars {
            snap.variables.insert(v.name.clone(), v);
        }
        snap
    }

    #[test]
    fn test_presence_follows_map_key() {
        let old = with(vec![var("region")]);
        let mut new = Snapshot::new();
        new.variables.insert("region".to_string(), var("aws_region"));

        assert!(RequiredInputAdded.evaluate(&old, &new).is_empty());
        assert!(InputRemoved::new(RenameDetection::default())
            .evaluate(&old, &new)
            .is_empty());

        let mut renamed_key = Snapshot::new();
        renamed_key.variables.insert("zone".to_string(), var("region"));
        let removed = InputRemoved::new(RenameDetection::default()).evaluate(&old, &renamed_key);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].message, "Variable \"region\" was removed");
    }

    #[test]
    fn test_optional_input_added_is_not_reported() {
        let mut optional = var("tags");
        optional.default = Some(json!({}));
        let findings = RequiredInputAdded.evaluate(&Snapshot::new(), &with(vec![optional]));
        assert!(findings.is_empty());
    }

    #[test]
    fn test_null_default_non_nullable_counts_as_required() {
        let mut v = var("name");
        v.default = Some(serde_json::Value::Null);
        v.nullable = Some(false);
        let findings = RequiredInputAdded.evaluate(&Snapshot::new(), &with(vec![v]));
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_removed_skips_renamed_only_when_enabled() {
        let old = with(vec![var("instance_count")]);
        let mut renamed = var("instance_counts");
        renamed.default = Some(json!(1));
        let new = with(vec![renamed]);

        let off = InputRemoved::new(RenameDetection::default());
        assert_eq!(off.evaluate(&old, &new).len(), 1);

        let on = InputRemoved::new(RenameDetection::enabled(0.85));
        assert!(on.evaluate(&old, &new).is_empty());
        let findings = InputRenamed::new(RenameDetection::enabled(0.85)).evaluate(&old, &new);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].metadata["new_name"], "instance_counts");
    }

    #[test]
    fn test_default_removed() {
        let mut o = var("size");
        o.default = Some(json!(10));
        let findings = InputDefaultRemoved.evaluate(&with(vec![o]), &with(vec![var("size")]));
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_type_change_from_any_is_exempt() {
        let mut o = var("x");
        o.type_expr = "any".to_string();
        let mut n = var("x");
        n.type_expr = "string".to_string();
        assert!(InputTypeChanged
            .evaluate(&with(vec![o]), &with(vec![n.clone()]))
            .is_empty());

        let mut o = var("x");
        o.type_expr = "number".to_string();
        assert_eq!(
            InputTypeChanged.evaluate(&with(vec![o]), &with(vec![n])).len(),
            1
        );
    }

    #[test]
    fn test_validation_fingerprints() {
        let mut o = var("env");
        o.validations = vec!["a".to_string(), "b".to_string()];
        let mut n = var("env");
        n.validations = vec!["b".to_string(), "c".to_string(), "d".to_string()];
        let old = with(vec![o]);
        let new = with(vec![n]);
        assert_eq!(ValidationAdded.evaluate(&old, &new).len(), 2);
        assert_eq!(ValidationRemoved.evaluate(&old, &new).len(), 1);
    }

    #[test]
    fn test_nullable_tri_state() {
        let o = var("x");
        let mut n = var("x");
        n.nullable = Some(true);
        let findings = InputNullableChanged.evaluate(&with(vec![o]), &with(vec![n]));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("unset to true"));
    }
}
