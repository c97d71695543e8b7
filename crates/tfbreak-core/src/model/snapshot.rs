//! Structural signature of one module version.
//!
//! A [`Snapshot`] is produced by a loader and consumed read-only by the rules.
//! Every collection is a `BTreeMap` so traversal order is deterministic.

use crate::errors::{Result, TfbreakError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// A position in a source file. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileRange {
    pub filename: String,
    pub line: usize,
}

impl FileRange {
    pub fn new(filename: impl Into<String>, line: usize) -> Self {
        Self {
            filename: filename.into(),
            line,
        }
    }
}

impl fmt::Display for FileRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.line)
    }
}

/// One `variable` block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VariableSignature {
    pub name: String,
    /// Declared type expression; empty when untyped
    #[serde(rename = "type", default)]
    pub type_expr: String,
    /// `None` when no default is declared, `Some(Value::Null)` for `default = null`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub default: Option<Value>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Ordered fingerprints of the `validation` blocks
    #[serde(default)]
    pub validations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<FileRange>,
}

/// Keeps an explicit JSON `null` as `Some(Value::Null)` instead of collapsing it to `None`.
fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl VariableSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// A caller must supply a value for this variable.
    ///
    /// True when no default exists, or when the default is `null` on a
    /// variable declared `nullable = false`.
    pub fn is_required(&self) -> bool {
        match &self.default {
            None => true,
            Some(Value::Null) => self.nullable == Some(false),
            Some(_) => false,
        }
    }
}

/// One `output` block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputSignature {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<FileRange>,
}

impl OutputSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One managed `resource` block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceSignature {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    /// `type.name`
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<FileRange>,
}

impl ResourceSignature {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        let resource_type = resource_type.into();
        let name = name.into();
        let address = format!("{}.{}", resource_type, name);
        Self {
            resource_type,
            name,
            address,
            location: None,
        }
    }
}

/// One nested `module` call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleCallSignature {
    pub name: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// `module.name`
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<FileRange>,
}

impl ModuleCallSignature {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let name = name.into();
        let address = format!("module.{}", name);
        Self {
            name,
            source: source.into(),
            version: None,
            address,
            location: None,
        }
    }
}

/// A `moved { from = ..., to = ... }` block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MovedBlock {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<FileRange>,
}

impl MovedBlock {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            location: None,
        }
    }
}

/// Entry of `required_providers`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProviderRequirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Structural representation of one module version.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub variables: BTreeMap<String, VariableSignature>,
    #[serde(default)]
    pub outputs: BTreeMap<String, OutputSignature>,
    /// Keyed by `type.name`
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceSignature>,
    #[serde(default)]
    pub module_calls: BTreeMap<String, ModuleCallSignature>,
    #[serde(default)]
    pub moved_blocks: Vec<MovedBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_core_version: Option<String>,
    #[serde(default)]
    pub required_providers: BTreeMap<String, ProviderRequirement>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSnapshot` tagged with `origin` when the text is not a
    /// valid snapshot document.
    pub fn from_json(origin: &str, text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| TfbreakError::InvalidSnapshot {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Read and decode a snapshot JSON file.
    ///
    /// # Errors
    ///
    /// Returns `Io` when the file cannot be read and `InvalidSnapshot` when it
    /// cannot be decoded.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| TfbreakError::io(path, e))?;
        Self::from_json(&path.display().to_string(), &text)
    }

    /// Whether `address` names a declared resource (`type.name`) or module call (`module.name`).
    pub fn declares_address(&self, address: &str) -> bool {
        if self.resources.contains_key(address) {
            return true;
        }
        address
            .strip_prefix("module.")
            .is_some_and(|name| self.module_calls.contains_key(name))
    }

    /// Follow moved blocks starting at `address` and return the final target.
    ///
    /// Returns `None` when no moved block starts at `address`. Cycles stop at
    /// the first revisited address.
    pub fn follow_moved(&self, address: &str) -> Option<String> {
        let mut current = address.to_string();
        let mut visited = vec![current.clone()];
        let mut moved_any = false;
        while let Some(block) = self.moved_blocks.iter().find(|m| m.from == current) {
            moved_any = true;
            if visited.contains(&block.to) {
                break;
            }
            current = block.to.clone();
            visited.push(current.clone());
        }
        moved_any.then_some(current)
    }

    /// Whether a removed `address` is accounted for by a chain of moved blocks
    /// ending at an address declared in this snapshot.
    pub fn is_moved_to_declared(&self, address: &str) -> bool {
        self.follow_moved(address)
            .is_some_and(|target| target != address && self.declares_address(&target))
    }
}
