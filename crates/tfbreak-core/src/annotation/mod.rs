//! In-source suppression annotations.
//!
//! Authors silence a finding with a comment next to the offending block:
//!
//! ```hcl
//! # tfbreak:ignore required-input-added # callers were migrated in OPS-12
//! variable "region" {
//!   type = string
//! }
//! ```
//!
//! The pipeline is: [`lexer`] extracts comments and block extents, [`parser`]
//! turns comments into [`Annotation`]s, [`loader`] does this for a whole
//! module directory, [`matcher`] binds annotations to findings, [`governance`]
//! accepts or rejects each binding, and [`suppress`] applies the decisions to
//! a [`CheckResult`](crate::model::CheckResult).

pub mod blocks;
pub mod governance;
pub mod lexer;
pub mod loader;
pub mod matcher;
pub mod parser;
pub mod suppress;

pub use blocks::{AnnotationIndex, BlockIndex};
pub use governance::{GovernanceConfig, GovernanceViolation};
pub use loader::load_annotations;
pub use matcher::find_match;
pub use parser::AnnotationParser;
pub use suppress::{SuppressionDecision, Suppressor};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether an annotation covers the next block or the whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationScope {
    Block,
    File,
}

/// Rules an annotation suppresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleTarget {
    All,
    /// Resolved rule IDs; an empty list matches nothing
    Rules(Vec<String>),
}

impl RuleTarget {
    pub fn matches(&self, rule_id: &str) -> bool {
        match self {
            RuleTarget::All => true,
            RuleTarget::Rules(ids) => ids.iter().any(|id| id == rule_id),
        }
    }

    /// Explicitly listed rule IDs (empty for `All`).
    pub fn explicit_ids(&self) -> &[String] {
        match self {
            RuleTarget::All => &[],
            RuleTarget::Rules(ids) => ids,
        }
    }
}

/// A parsed `tfbreak:ignore` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub scope: AnnotationScope,
    pub target: RuleTarget,
    pub reason: Option<String>,
    pub ticket: Option<String>,
    pub expires: Option<NaiveDate>,
    pub file: String,
    pub line: usize,
    /// Start line of the block this annotation was bound to; set by the matcher
    pub governs_line: Option<usize>,
}

impl Annotation {
    /// Expired iff `today` is after the expiration date.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires.is_some_and(|date| today > date)
    }
}
