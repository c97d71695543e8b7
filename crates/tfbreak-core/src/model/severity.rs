//! Finding severity.

use crate::errors::TfbreakError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed, ordered severity scale: `INFO < RISKY < BREAKING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Risky,
    Breaking,
}

impl Severity {
    /// All severities in ascending order
    pub const ALL: [Severity; 3] = [Severity::Info, Severity::Risky, Severity::Breaking];

    /// Canonical uppercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Risky => "RISKY",
            Severity::Breaking => "BREAKING",
        }
    }

    /// Threshold comparison: true when `self` is `other` or more severe.
    pub fn at_least(&self, other: Severity) -> bool {
        *self >= other
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = TfbreakError;

    /// Parses the canonical uppercase names only.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSeverity` for any other string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INFO" => Ok(Severity::Info),
            "RISKY" => Ok(Severity::Risky),
            "BREAKING" => Ok(Severity::Breaking),
            other => Err(TfbreakError::InvalidSeverity {
                value: other.to_string(),
            }),
        }
    }
}
