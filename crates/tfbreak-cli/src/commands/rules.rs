//! Rules command
//!
//! Usage: tfbreak rules [--config <FILE>] [--format text|json]

use crate::render::OutputFormat;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tfbreak_core::{default_registry, Config, Result, Severity};

#[derive(Debug, Args)]
pub struct RulesArgs {
    /// Show the state after applying this config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct RuleEntry {
    id: &'static str,
    name: &'static str,
    severity: Severity,
    default_severity: Severity,
    enabled: bool,
    description: &'static str,
}

/// Execute rules command
pub fn execute(args: RulesArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let mut registry = default_registry(&config.rename_detection)?;
    config.apply_to(&mut registry)?;

    let mut entries = Vec::with_capacity(registry.len());
    for rule in registry.all_rules() {
        let state = registry.get_config(rule.id())?;
        entries.push(RuleEntry {
            id: rule.id(),
            name: rule.name(),
            severity: state.severity,
            default_severity: rule.default_severity(),
            enabled: state.enabled,
            description: rule.description(),
        });
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            for entry in &entries {
                let disabled = if entry.enabled { "" } else { " (disabled)" };
                println!(
                    "{}  {:<8}  {:<30}  {}{}",
                    entry.id, entry.severity, entry.name, entry.description, disabled
                );
            }
        }
    }
    Ok(())
}
