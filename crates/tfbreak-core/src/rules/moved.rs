//! Resource and module removal, and `moved` block validity.
//!
//! A removed address is a rename, not a removal, when the new snapshot's moved
//! blocks lead from it to a declared address. Dangling moved blocks belong to
//! BC102; BC103 only looks at blocks whose target resolves, so a single block
//! never produces both findings.

use super::{finding, Rule, RuleDoc};
use crate::model::{Finding, MovedBlock, Severity, Snapshot};
use std::collections::BTreeMap;

/// Final address a moved block's `to` leads to through further moved blocks.
fn resolved_target(new: &Snapshot, block: &MovedBlock) -> String {
    new.follow_moved(&block.to)
        .unwrap_or_else(|| block.to.clone())
}

fn resolves(new: &Snapshot, block: &MovedBlock) -> bool {
    new.declares_address(&resolved_target(new, block))
}

/// BC100
pub struct ResourceRemovedNoMoved;

impl Rule for ResourceRemovedNoMoved {
    fn id(&self) -> &'static str {
        "BC100"
    }

    fn name(&self) -> &'static str {
        "resource-removed-no-moved"
    }

    fn default_severity(&self) -> Severity {
        Severity::Breaking
    }

    fn description(&self) -> &'static str {
        "A resource was removed without a moved block"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        old.resources
            .values()
            .filter(|r| !new.resources.contains_key(&r.address))
            .filter(|r| !new.is_moved_to_declared(&r.address))
            .map(|r| {
                finding(
                    self,
                    format!(
                        "Resource \"{}\" was removed without a moved block",
                        r.address
                    ),
                )
                .with_old_location(r.location.clone())
                .with_metadata("address", &r.address)
            })
            .collect()
    }

    fn documentation(&self) -> Option<RuleDoc> {
        Some(RuleDoc {
            summary: "Applying the new version destroys the resource in every \
                      caller's state. If it was renamed, a moved block preserves it.",
            example_old: "resource \"aws_s3_bucket\" \"logs\" {}",
            example_new: "resource \"aws_s3_bucket\" \"log_bucket\" {}",
            remediation: "Add `moved { from = aws_s3_bucket.logs  to = aws_s3_bucket.log_bucket }`.",
        })
    }
}

/// BC101
pub struct ModuleRemovedNoMoved;

impl Rule for ModuleRemovedNoMoved {
    fn id(&self) -> &'static str {
        "BC101"
    }

    fn name(&self) -> &'static str {
        "module-removed-no-moved"
    }

    fn default_severity(&self) -> Severity {
        Severity::Breaking
    }

    fn description(&self) -> &'static str {
        "A module call was removed without a moved block"
    }

    fn evaluate(&self, old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        old.module_calls
            .iter()
            .filter(|(name, _)| !new.module_calls.contains_key(*name))
            .map(|(_, m)| m)
            .filter(|m| !new.is_moved_to_declared(&m.address))
            .map(|m| {
                finding(
                    self,
                    format!(
                        "Module call \"{}\" was removed without a moved block",
                        m.address
                    ),
                )
                .with_old_location(m.location.clone())
                .with_metadata("address", &m.address)
            })
            .collect()
    }

    fn documentation(&self) -> Option<RuleDoc> {
        Some(RuleDoc {
            summary: "Every resource inside the removed module call is destroyed.",
            example_old: "module \"network\" {\n  source = \"./network\"\n}",
            example_new: "module \"net\" {\n  source = \"./network\"\n}",
            remediation: "Add `moved { from = module.network  to = module.net }`.",
        })
    }
}

/// BC102
pub struct InvalidMovedBlock;

impl Rule for InvalidMovedBlock {
    fn id(&self) -> &'static str {
        "BC102"
    }

    fn name(&self) -> &'static str {
        "invalid-moved-block"
    }

    fn default_severity(&self) -> Severity {
        Severity::Breaking
    }

    fn description(&self) -> &'static str {
        "A moved block points at an address that does not exist"
    }

    fn evaluate(&self, _old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        new.moved_blocks
            .iter()
            .filter(|b| !resolves(new, b))
            .map(|b| {
                finding(
                    self,
                    format!(
                        "Moved block target \"{}\" does not exist (from \"{}\")",
                        b.to, b.from
                    ),
                )
                .with_new_location(b.location.clone())
                .with_metadata("from", &b.from)
                .with_metadata("to", &b.to)
            })
            .collect()
    }
}

/// BC103
pub struct ConflictingMoved;

impl Rule for ConflictingMoved {
    fn id(&self) -> &'static str {
        "BC103"
    }

    fn name(&self) -> &'static str {
        "conflicting-moved"
    }

    fn default_severity(&self) -> Severity {
        Severity::Breaking
    }

    fn description(&self) -> &'static str {
        "Several moved blocks target the same address"
    }

    fn evaluate(&self, _old: &Snapshot, new: &Snapshot) -> Vec<Finding> {
        let mut by_target: BTreeMap<&str, Vec<&MovedBlock>> = BTreeMap::new();
        for block in new.moved_blocks.iter().filter(|b| resolves(new, b)) {
            by_target.entry(block.to.as_str()).or_default().push(block);
        }
        by_target
            .into_iter()
            .filter(|(_, blocks)| blocks.len() > 1)
            .map(|(to, blocks)| {
                let sources: Vec<&str> = blocks.iter().map(|b| b.from.as_str()).collect();
                finding(
                    self,
                    format!(
                        "{} moved blocks target \"{}\"",
                        blocks.len(),
                        to
                    ),
                )
                .with_detail(format!("sources: {}", sources.join(", ")))
                .with_new_location(blocks[0].location.clone())
                .with_metadata("to", to)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModuleCallSignature, ResourceSignature};

    fn resources(addrs: &[(&str, &str)]) -> Snapshot {
        let mut snap = Snapshot::new();
        for (ty, name) in addrs {
            let r = ResourceSignature::new(*ty, *name);
            snap.resources.insert(r.address.clone(), r);
        }
        snap
    }

    #[test]
    fn test_moved_chain_resolves_removal() {
        let old = resources(&[("aws_instance", "a")]);
        let mut new = resources(&[("aws_instance", "c")]);
        new.moved_blocks.push(MovedBlock::new("aws_instance.a", "aws_instance.b"));
        new.moved_blocks.push(MovedBlock::new("aws_instance.b", "aws_instance.c"));
        assert!(ResourceRemovedNoMoved.evaluate(&old, &new).is_empty());
        assert!(InvalidMovedBlock.evaluate(&old, &new).is_empty());
    }

    #[test]
    fn test_dangling_moved_is_invalid_not_conflicting() {
        let old = resources(&[("aws_instance", "a"), ("aws_instance", "b")]);
        let mut new = Snapshot::new();
        new.moved_blocks.push(MovedBlock::new("aws_instance.a", "aws_instance.x"));
        new.moved_blocks.push(MovedBlock::new("aws_instance.b", "aws_instance.x"));

        assert_eq!(InvalidMovedBlock.evaluate(&old, &new).len(), 2);
        assert!(ConflictingMoved.evaluate(&old, &new).is_empty());
        assert_eq!(ResourceRemovedNoMoved.evaluate(&old, &new).len(), 2);
    }

    #[test]
    fn test_conflicting_targets() {
        let old = resources(&[("aws_instance", "a"), ("aws_instance", "b")]);
        let mut new = resources(&[("aws_instance", "x")]);
        new.moved_blocks.push(MovedBlock::new("aws_instance.a", "aws_instance.x"));
        new.moved_blocks.push(MovedBlock::new("aws_instance.b", "aws_instance.x"));

        let findings = ConflictingMoved.evaluate(&old, &new);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].metadata["to"], "aws_instance.x");
        assert!(InvalidMovedBlock.evaluate(&old, &new).is_empty());
    }

    #[test]
    fn test_module_moved() {
        let mut old = Snapshot::new();
        old.module_calls
            .insert("network".to_string(), ModuleCallSignature::new("network", "./net"));
        let mut new = Snapshot::new();
        new.module_calls
            .insert("net".to_string(), ModuleCallSignature::new("net", "./net"));
        assert_eq!(ModuleRemovedNoMoved.evaluate(&old, &new).len(), 1);

        new.moved_blocks.push(MovedBlock::new("module.network", "module.net"));
        assert!(ModuleRemovedNoMoved.evaluate(&old, &new).is_empty());
    }
}
