//! Check command
//!
//! Usage: tfbreak check --old <SNAPSHOT> --new <SNAPSHOT> [--new-dir <DIR>] [options]

use crate::render::{self, OutputFormat, TextReport};
use clap::Args;
use std::path::{Path, PathBuf};
use tfbreak_core::annotation::{load_annotations, AnnotationParser, Suppressor};
use tfbreak_core::config::{CliOverrides, CONFIG_FILE_NAME};
use tfbreak_core::{
    default_registry, CheckOptions, Config, Engine, Finding, Result, Severity, Snapshot,
    TfbreakError,
};

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Snapshot JSON of the old module version
    #[arg(long)]
    pub old: PathBuf,

    /// Snapshot JSON of the new module version
    #[arg(long)]
    pub new: PathBuf,

    /// Directory of the old module version (report label only)
    #[arg(long)]
    pub old_dir: Option<PathBuf>,

    /// Directory of the new module version; its `.tf` files are scanned for
    /// `tfbreak:ignore` annotations
    #[arg(long)]
    pub new_dir: Option<PathBuf>,

    /// Config file (default: ./tfbreak.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Lowest severity that fails the check
    #[arg(long)]
    pub fail_on: Option<Severity>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Attach each rule's remediation text to its findings
    #[arg(long)]
    pub include_remediation: bool,

    /// Report similar removed/added names as renames
    #[arg(long)]
    pub detect_renames: bool,

    /// Minimum similarity (0.0 to 1.0) for rename detection
    #[arg(long)]
    pub similarity_threshold: Option<f64>,

    /// JSON array of extra findings to merge before suppression
    #[arg(long)]
    pub plugin_findings: Option<PathBuf>,

    /// Include suppressed findings in the report
    #[arg(long)]
    pub show_ignored: bool,
}

/// Execute check command. Returns whether the check passed.
pub fn execute(args: CheckArgs) -> Result<bool> {
    let mut config = load_config(args.config.as_deref())?;
    config.apply_cli_overrides(&CliOverrides {
        fail_on: args.fail_on,
        detect_renames: args.detect_renames.then_some(true),
        similarity_threshold: args.similarity_threshold,
    });
    config.validate()?;
    let fail_on = config.fail_on_severity()?;

    let mut registry = default_registry(&config.rename_detection)?;
    config.apply_to(&mut registry)?;
    let governance = config.governance(&registry)?;
    let parser = AnnotationParser::new(registry.name_to_id_map());

    let old = Snapshot::load(&args.old)?;
    let new = Snapshot::load(&args.new)?;

    let engine = Engine::new(registry);
    let options = CheckOptions {
        include_remediation: args.include_remediation,
    };
    let mut result = engine.check_with_options(
        &label(args.old_dir.as_deref(), &args.old),
        &label(args.new_dir.as_deref(), &args.new),
        &old,
        &new,
        fail_on,
        &options,
    );

    if let Some(path) = &args.plugin_findings {
        result.merge_findings(load_plugin_findings(path)?);
    }

    match (&args.new_dir, config.annotations.enabled) {
        (Some(dir), true) => {
            let (annotations, blocks) = load_annotations(dir, &parser)?;
            let today = chrono::Local::now().date_naive();
            result = Suppressor::new(annotations, blocks, governance, today).apply(result);
        }
        (None, true) => {
            tracing::debug!("no --new-dir given, skipping annotation pass");
        }
        (_, false) => {
            tracing::debug!("annotations disabled by config");
        }
    }

    match args.format {
        OutputFormat::Text => print!(
            "{}",
            TextReport {
                result: &result,
                show_ignored: args.show_ignored,
            }
        ),
        OutputFormat::Json => println!("{}", render::json(&result, args.show_ignored)?),
    }

    Ok(result.is_pass())
}

/// Explicit `--config`, else `tfbreak.toml` in the working directory, else defaults.
fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path);
    }
    let implicit = Path::new(CONFIG_FILE_NAME);
    if implicit.is_file() {
        Config::load(implicit)
    } else {
        Ok(Config::default())
    }
}

fn load_plugin_findings(path: &Path) -> Result<Vec<Finding>> {
    let text = std::fs::read_to_string(path).map_err(|e| TfbreakError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| TfbreakError::InvalidSnapshot {
        path: path.display().to_string(),
        message: format!("plugin findings: {}", e),
    })
}

fn label(dir: Option<&Path>, snapshot: &Path) -> String {
    dir.unwrap_or(snapshot).display().to_string()
}
