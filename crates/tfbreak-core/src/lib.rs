//! tfbreak core - breaking-change detection for Terraform modules
//!
//! This crate provides the policy evaluation engine:
//! - Snapshot model of a module version's structural signature
//! - Rule registry and the built-in compatibility rules
//! - Evaluation engine producing classified findings
//! - In-source suppression annotations with governance
//! - `tfbreak.toml` configuration
//!
//! Checking is a two-phase pipeline. [`Engine::check`] turns two snapshots into
//! a [`CheckResult`]; [`annotation::Suppressor::apply`] returns a new result
//! with accepted annotations applied.

pub mod annotation;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod rules;
pub mod similarity;
pub mod type_expr;
pub mod version_req;

// Used by the logging macros
#[doc(hidden)]
pub use tracing;
pub use tfbreak_core_types as core_types;

// Re-export commonly used types
pub use config::Config;
pub use engine::{CheckOptions, Engine};
pub use errors::{ExError, ExErrorKind, Result, TfbreakError};
pub use model::{CheckResult, Finding, Outcome, Severity, Snapshot};
pub use rules::{default_registry, RenameDetection, Rule, RuleRegistry};
