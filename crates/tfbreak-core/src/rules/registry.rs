//! Rule registry.
//!
//! Rules are addressed by ID (`BC001`) or kebab-case name
//! (`required-input-added`). Runtime state per rule is an enabled flag and an
//! optional severity override. Rules are never removed once registered.

use super::Rule;
use crate::errors::{Result, TfbreakError};
use crate::model::Severity;
use std::collections::BTreeMap;

/// Runtime configuration of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleConfig {
    pub enabled: bool,
    pub severity: Severity,
}

/// Builder collecting rule instances before validation.
#[derive(Default)]
pub struct RuleRegistryBuilder {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistryBuilder {
    pub fn rule(mut self, rule: Box<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// # Errors
    ///
    /// Returns `DuplicateRule` when two rules share an ID or a name.
    pub fn build(self) -> Result<RuleRegistry> {
        let mut rules = BTreeMap::new();
        let mut names = BTreeMap::new();
        let mut configs = BTreeMap::new();
        for rule in self.rules {
            let id = rule.id();
            let name = rule.name();
            if rules.contains_key(id) {
                return Err(TfbreakError::DuplicateRule {
                    rule: id.to_string(),
                });
            }
            if names.contains_key(name) {
                return Err(TfbreakError::DuplicateRule {
                    rule: name.to_string(),
                });
            }
            names.insert(name.to_string(), id.to_string());
            configs.insert(
                id.to_string(),
                RuleConfig {
                    enabled: true,
                    severity: rule.default_severity(),
                },
            );
            rules.insert(id.to_string(), rule);
        }
        Ok(RuleRegistry {
            rules,
            names,
            configs,
        })
    }
}

/// Catalog of rules keyed by ID, iterated in ascending ID order.
pub struct RuleRegistry {
    rules: BTreeMap<String, Box<dyn Rule>>,
    names: BTreeMap<String, String>,
    configs: BTreeMap<String, RuleConfig>,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("configs", &self.configs)
            .finish()
    }
}

impl RuleRegistry {
    pub fn builder() -> RuleRegistryBuilder {
        RuleRegistryBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&dyn Rule> {
        self.rules.get(id).map(|r| r.as_ref())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&dyn Rule> {
        self.names.get(name).and_then(|id| self.get(id))
    }

    /// Resolve an ID or a name to the rule ID.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRule` when neither form matches.
    pub fn resolve(&self, id_or_name: &str) -> Result<&str> {
        if let Some((id, _)) = self.rules.get_key_value(id_or_name) {
            return Ok(id.as_str());
        }
        self.names
            .get(id_or_name)
            .map(String::as_str)
            .ok_or_else(|| TfbreakError::UnknownRule {
                rule: id_or_name.to_string(),
            })
    }

    fn config_mut(&mut self, id: &str) -> Result<&mut RuleConfig> {
        self.configs
            .get_mut(id)
            .ok_or_else(|| TfbreakError::UnknownRule {
                rule: id.to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns `UnknownRule` for an unregistered ID.
    pub fn enable_rule(&mut self, id: &str) -> Result<()> {
        self.config_mut(id)?.enabled = true;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `UnknownRule` for an unregistered ID.
    pub fn disable_rule(&mut self, id: &str) -> Result<()> {
        self.config_mut(id)?.enabled = false;
        Ok(())
    }

    pub fn disable_all_rules(&mut self) {
        for config in self.configs.values_mut() {
            config.enabled = false;
        }
    }

    /// Effective configuration of a rule.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRule` for an unregistered ID.
    pub fn get_config(&self, id: &str) -> Result<RuleConfig> {
        self.configs
            .get(id)
            .copied()
            .ok_or_else(|| TfbreakError::UnknownRule {
                rule: id.to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns `UnknownRule` for an unregistered ID.
    pub fn set_config(&mut self, id: &str, config: RuleConfig) -> Result<()> {
        *self.config_mut(id)? = config;
        Ok(())
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.configs.get(id).is_some_and(|c| c.enabled)
    }

    /// Name → ID map used to resolve annotation rule tokens.
    pub fn name_to_id_map(&self) -> BTreeMap<String, String> {
        self.names.clone()
    }

    /// Every registered rule in ascending ID order.
    pub fn all_rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.values().map(|r| r.as_ref())
    }

    /// Enabled rules with their effective configuration, in ascending ID order.
    pub fn enabled_rules(&self) -> impl Iterator<Item = (&dyn Rule, RuleConfig)> {
        self.rules.iter().filter_map(|(id, rule)| {
            self.configs
                .get(id)
                .filter(|c| c.enabled)
                .map(|c| (rule.as_ref(), *c))
        })
    }
}
