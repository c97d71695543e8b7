//! Nested module call changes.

use super::{finding, Rule};
use crate::model::{Finding, ModuleCallSignature, Severity, Snapshot};

fn common<'a>(
    old: &'a Snapshot,
    new: &'a Snapshot,
) -> impl Iterator<Item = (&'a ModuleCallSignature, &'a ModuleCallSignature)> {
    old.module_calls
        .iter()
        .filter_map(|(name, o)| new.module_calls.get(name).map(|n| (o, n)))
}

fn version(m: &ModuleCallSignature) -> String {
    m.version
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// RC300
pub struct ModuleSourceChanged;

impl Rule for ModuleSourceChanged {
    fn id(&self) -> &'static str {
        "RC300"
    }

    fn name(&self) -> &'static str {
        "module-source-changed"
    }

    fn default_severity(&self) -> Severity {
        Severity::Risky
    }

    fn description(&self) -> &'static str {
        "A nested module call now uses a different source"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        common(old, new)
            .filter(|(o, n)| o.source.trim() != n.source.trim())
            .map(|(o, n)| {
                finding(
                    self,
                    format!(
                        "Module \"{}\" source changed from \"{}\" to \"{}\"",
                        o.name, o.source, n.source
                    ),
                )
                .with_old_location(o.location.clone())
                .with_new_location(n.location.clone())
                .with_metadata("old_source", &o.source)
                .with_metadata("new_source", &n.source)
            })
            .collect()
    }
}

/// RC301
pub struct ModuleVersionChanged;

impl Rule for ModuleVersionChanged {
    fn id(&self) -> &'static str {
        "RC301"
    }

    fn name(&self) -> &'static str {
        "module-version-changed"
    }

    fn default_severity(&self) -> Severity {
        Severity::Risky
    }

    fn description(&self) -> &'static str {
        "A nested module call now requests a different version"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        common(old, new)
            .filter(|(o, n)| version(o) != version(n))
            .map(|(o, n)| {
                finding(
                    self,
                    format!(
                        "Module \"{}\" version changed from \"{}\" to \"{}\"",
                        o.name,
                        version(o),
                        version(n)
                    ),
                )
                .with_old_location(o.location.clone())
                .with_new_location(n.location.clone())
                .with_metadata("old_version", version(o))
                .with_metadata("new_version", version(n))
            })
            .collect()
    }
}
