use chrono::NaiveDate;
use serde_json::Value;
use tfbreak_core::model::{
    FileRange, ModuleCallSignature, MovedBlock, OutputSignature, ResourceSignature, Snapshot,
    VariableSignature,
};
use tfbreak_core::rules::{default_registry, RenameDetection, RuleRegistry};
use tfbreak_core::Engine;

/// Fluent builder for test snapshots
#[allow(dead_code)]
#[derive(Default)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

#[allow(dead_code)]
impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variable without a default (required)
    pub fn required_var(mut self, name: &str, file: &str, line: usize) -> Self {
        let mut var = VariableSignature::new(name);
        var.location = Some(FileRange::new(file, line));
        self.snapshot.variables.insert(name.to_string(), var);
        self
    }

    /// Variable with a default (optional)
    pub fn optional_var(mut self, name: &str, default: Value, file: &str, line: usize) -> Self {
        let mut var = VariableSignature::new(name);
        var.default = Some(default);
        var.location = Some(FileRange::new(file, line));
        self.snapshot.variables.insert(name.to_string(), var);
        self
    }

    pub fn typed_var(mut self, name: &str, type_expr: &str, file: &str, line: usize) -> Self {
        let mut var = VariableSignature::new(name);
        var.type_expr = type_expr.to_string();
        var.default = Some(Value::Null);
        var.location = Some(FileRange::new(file, line));
        self.snapshot.variables.insert(name.to_string(), var);
        self
    }

    pub fn output(mut self, name: &str, file: &str, line: usize) -> Self {
        let mut output = OutputSignature::new(name);
        output.location = Some(FileRange::new(file, line));
        self.snapshot.outputs.insert(name.to_string(), output);
        self
    }

    pub fn resource(mut self, resource_type: &str, name: &str, file: &str, line: usize) -> Self {
        let mut resource = ResourceSignature::new(resource_type, name);
        resource.location = Some(FileRange::new(file, line));
        self.snapshot
            .resources
            .insert(resource.address.clone(), resource);
        self
    }

    pub fn module(mut self, name: &str, source: &str) -> Self {
        self.snapshot
            .module_calls
            .insert(name.to_string(), ModuleCallSignature::new(name, source));
        self
    }

    pub fn moved(mut self, from: &str, to: &str, file: &str, line: usize) -> Self {
        let mut block = MovedBlock::new(from, to);
        block.location = Some(FileRange::new(file, line));
        self.snapshot.moved_blocks.push(block);
        self
    }

    pub fn core_version(mut self, constraint: &str) -> Self {
        self.snapshot.required_core_version = Some(constraint.to_string());
        self
    }

    pub fn build(self) -> Snapshot {
        self.snapshot
    }
}

/// Registry with every built-in rule and rename detection off
#[allow(dead_code)]
pub fn registry() -> RuleRegistry {
    default_registry(&RenameDetection::default()).unwrap()
}

#[allow(dead_code)]
pub fn engine() -> Engine {
    Engine::new(registry())
}

#[allow(dead_code)]
pub fn engine_with_renames(threshold: f64) -> Engine {
    Engine::new(default_registry(&RenameDetection::enabled(threshold)).unwrap())
}

/// Fixed "today" for governance checks
#[allow(dead_code)]
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
}
