//! Data model: snapshots in, findings and results out.

pub mod finding;
pub mod result;
pub mod severity;
pub mod snapshot;

pub use finding::Finding;
pub use result::{CheckResult, Outcome, Summary};
pub use severity::Severity;
pub use snapshot::{
    FileRange, ModuleCallSignature, MovedBlock, OutputSignature, ProviderRequirement,
    ResourceSignature, Snapshot, VariableSignature,
};
