//! Rule catalog.
//!
//! Each rule compares an old and a new [`Snapshot`] and reports [`Finding`]s.
//! Rules are pure: no error channel, no side effects. The [`registry`] holds
//! the catalog and the per-rule enable/severity state.

pub mod modules;
pub mod moved;
pub mod outputs;
pub mod registry;
pub mod rename;
pub mod variables;
pub mod versions;

use crate::model::{Finding, Severity, Snapshot};

pub use registry::{RuleConfig, RuleRegistry, RuleRegistryBuilder};
pub use rename::RenameDetection;

/// Long-form documentation shown by `tfbreak explain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDoc {
    pub summary: &'static str,
    pub example_old: &'static str,
    pub example_new: &'static str,
    pub remediation: &'static str,
}

/// A compatibility rule.
pub trait Rule: Send + Sync {
    /// Stable identifier such as `BC001`
    fn id(&self) -> &'static str;

    /// Kebab-case name such as `required-input-added`
    fn name(&self) -> &'static str;

    fn default_severity(&self) -> Severity;

    fn description(&self) -> &'static str;

    /// Compare two snapshots. Findings carry the default severity; the engine
    /// replaces it with the effective one.
    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding>;

    fn documentation(&self) -> Option<RuleDoc> {
        None
    }
}

/// Start a finding attributed to `rule`.
pub(crate) fn finding(rule: &dyn Rule, message: impl Into<String>) -> Finding {
    Finding::new(rule.id(), rule.name(), rule.default_severity(), message)
}

/// Every built-in rule, in ID order.
pub fn builtin_rules(renames: &RenameDetection) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(variables::RequiredInputAdded),
        Box::new(variables::InputRemoved::new(*renames)),
        Box::new(variables::InputRenamed::new(*renames)),
        Box::new(variables::InputTypeChanged),
        Box::new(variables::InputDefaultRemoved),
        Box::new(outputs::OutputRemoved::new(*renames)),
        Box::new(outputs::OutputRenamed::new(*renames)),
        Box::new(moved::ResourceRemovedNoMoved),
        Box::new(moved::ModuleRemovedNoMoved),
        Box::new(moved::InvalidMovedBlock),
        Box::new(moved::ConflictingMoved),
        Box::new(versions::TerraformVersionConstrained),
        Box::new(versions::ProviderVersionConstrained),
        Box::new(variables::InputNullableChanged),
        Box::new(variables::InputSensitiveChanged),
        Box::new(outputs::OutputSensitiveChanged),
        Box::new(variables::ValidationAdded),
        Box::new(variables::ValidationRemoved),
        Box::new(modules::ModuleSourceChanged),
        Box::new(modules::ModuleVersionChanged),
    ]
}

/// Registry holding every built-in rule with default state.
///
/// # Errors
///
/// Returns `DuplicateRule` if two built-in rules share an ID or name.
pub fn default_registry(renames: &RenameDetection) -> crate::errors::Result<RuleRegistry> {
    builtin_rules(renames)
        .into_iter()
        .fold(RuleRegistry::builder(), RuleRegistryBuilder::rule)
        .build()
}
