//! `tfbreak.toml` configuration.
//!
//! Resolution order (highest priority first):
//! 1. CLI flags (applied via [`Config::apply_cli_overrides`])
//! 2. Config file (`--config`, else `tfbreak.toml` in the working directory)
//! 3. Compiled defaults
//!
//! Rule lists accept IDs or names. Every error here is fatal.

use crate::annotation::GovernanceConfig;
use crate::errors::{Result, TfbreakError};
use crate::model::Severity;
use crate::rules::{RenameDetection, RuleConfig, RuleRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Only supported config schema version
pub const CONFIG_VERSION: u32 = 1;

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "tfbreak.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub fail_on: String,
    pub rules: RulesConfig,
    pub rename_detection: RenameDetection,
    pub annotations: AnnotationsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            fail_on: Severity::Breaking.to_string(),
            rules: RulesConfig::default(),
            rename_detection: RenameDetection::default(),
            annotations: AnnotationsConfig::default(),
        }
    }
}

/// `[rules]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub disable: Vec<String>,
    pub enable: Vec<String>,
    /// Keyed by rule ID or name
    pub overrides: BTreeMap<String, RuleOverride>,
}

/// `[rules.overrides."<rule>"]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleOverride {
    pub severity: Option<String>,
    pub enabled: Option<bool>,
}

/// `[annotations]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationsConfig {
    /// When false the suppression pass is skipped entirely
    pub enabled: bool,
    pub governance: GovernanceConfig,
}

impl Default for AnnotationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            governance: GovernanceConfig::default(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub fail_on: Option<Severity>,
    pub detect_renames: Option<bool>,
    pub similarity_threshold: Option<f64>,
}

impl Config {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` for malformed TOML and any validation error.
    pub fn from_toml(text: &str) -> Result<Self> {
        Self::parse_named("<string>", text)
    }

    /// Read, parse and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `ConfigParse` for malformed
    /// TOML, and any validation error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| TfbreakError::io(path, e))?;
        Self::parse_named(&path.display().to_string(), &text)
    }

    fn parse_named(origin: &str, text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|e| TfbreakError::ConfigParse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `UnsupportedConfigVersion`, `InvalidSeverity` or `InvalidThreshold`.
    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            return Err(TfbreakError::UnsupportedConfigVersion {
                version: self.version,
            });
        }
        self.fail_on_severity()?;
        for rule_override in self.rules.overrides.values() {
            if let Some(severity) = &rule_override.severity {
                severity.parse::<Severity>()?;
            }
        }
        self.rename_detection.validate()
    }

    /// # Errors
    ///
    /// Returns `InvalidSeverity` when `fail_on` is not a canonical name.
    pub fn fail_on_severity(&self) -> Result<Severity> {
        self.fail_on.parse()
    }

    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(fail_on) = cli.fail_on {
            self.fail_on = fail_on.to_string();
        }
        if let Some(enabled) = cli.detect_renames {
            self.rename_detection.enabled = enabled;
        }
        if let Some(threshold) = cli.similarity_threshold {
            self.rename_detection.similarity_threshold = threshold;
        }
    }

    /// Apply `[rules]` to a registry: disables, then enables, then overrides.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRule` for any rule the registry does not know and
    /// `InvalidSeverity` for a bad override severity.
    pub fn apply_to(&self, registry: &mut RuleRegistry) -> Result<()> {
        for rule in &self.rules.disable {
            let id = registry.resolve(rule)?.to_string();
            registry.disable_rule(&id)?;
        }
        for rule in &self.rules.enable {
            let id = registry.resolve(rule)?.to_string();
            registry.enable_rule(&id)?;
        }
        for (rule, rule_override) in &self.rules.overrides {
            let id = registry.resolve(rule)?.to_string();
            let current = registry.get_config(&id)?;
            let severity = match &rule_override.severity {
                Some(s) => s.parse()?,
                None => current.severity,
            };
            registry.set_config(
                &id,
                RuleConfig {
                    enabled: rule_override.enabled.unwrap_or(current.enabled),
                    severity,
                },
            )?;
        }
        Ok(())
    }

    /// Governance policy with rule names resolved to IDs.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRule` for an allow or deny entry the registry does not know.
    pub fn governance(&self, registry: &RuleRegistry) -> Result<GovernanceConfig> {
        let resolve = |rules: &[String]| -> Result<Vec<String>> {
            rules
                .iter()
                .map(|r| registry.resolve(r).map(str::to_string))
                .collect()
        };
        let governance = &self.annotations.governance;
        Ok(GovernanceConfig {
            enabled: governance.enabled,
            require_reason: governance.require_reason,
            allow_rule_ids: resolve(&governance.allow_rule_ids)?,
            deny_rule_ids: resolve(&governance.deny_rule_ids)?,
        })
    }
}
