#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{engine, registry, today, SnapshotBuilder};
use std::path::Path;
use tempfile::TempDir;
use tfbreak_core::annotation::{
    load_annotations, AnnotationParser, GovernanceConfig, SuppressionDecision, Suppressor,
};
use tfbreak_core::model::{Outcome, Severity};
use tfbreak_core::CheckResult;

fn module_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in files {
        std::fs::write(dir.path().join(name), body).unwrap();
    }
    dir
}

fn suppressor(dir: &Path, governance: GovernanceConfig) -> Suppressor {
    let parser = AnnotationParser::new(registry().name_to_id_map());
    let (annotations, blocks) = load_annotations(dir, &parser).unwrap();
    Suppressor::new(annotations, blocks, governance, today())
}

/// New required input `region` declared at `line` of variables.tf.
fn region_added(line: usize) -> CheckResult {
    let old = SnapshotBuilder::new().build();
    let new = SnapshotBuilder::new()
        .required_var("region", "variables.tf", line)
        .build();
    engine().check("v1", "v2", &old, &new, Severity::Breaking)
}

#[test]
fn test_annotation_flips_fail_to_pass() {
    let dir = module_dir(&[(
        "variables.tf",
        "# tfbreak:ignore required-input-added # announced for 2.0\nvariable \"region\" {\n  type = string\n}\n",
    )]);
    let result = region_added(2);
    assert_eq!(result.outcome, Outcome::Fail);

    let suppressed = suppressor(dir.path(), GovernanceConfig::default()).apply(result);

    assert_eq!(suppressed.outcome, Outcome::Pass);
    assert!(suppressed.findings[0].ignored);
    assert_eq!(
        suppressed.findings[0].ignore_reason.as_deref(),
        Some("announced for 2.0")
    );
    assert_eq!(suppressed.summary().ignored, 1);
}

#[test]
fn test_annotation_above_block_covers_lines_inside_it() {
    let dir = module_dir(&[(
        "variables.tf",
        "// tfbreak:ignore BC001 ticket=\"NET-7\"\nvariable \"region\" {\n  type = string\n}\n",
    )]);

    let suppressed = suppressor(dir.path(), GovernanceConfig::default()).apply(region_added(3));

    assert!(suppressed.findings[0].ignored);
    assert_eq!(suppressed.findings[0].ignore_reason.as_deref(), Some("NET-7"));
}

#[test]
fn test_misspelled_rule_name_suppresses_nothing() {
    let dir = module_dir(&[(
        "variables.tf",
        "# tfbreak:ignore required-input-addd\nvariable \"region\" {}\n",
    )]);

    let suppressed = suppressor(dir.path(), GovernanceConfig::default()).apply(region_added(2));

    assert_eq!(suppressed.outcome, Outcome::Fail);
    assert!(!suppressed.findings[0].ignored);
}

#[test]
fn test_annotation_in_other_file_does_not_apply() {
    let dir = module_dir(&[
        ("main.tf", "# tfbreak:ignore-file all\n"),
        ("variables.tf", "variable \"region\" {}\n"),
    ]);

    let suppressed = suppressor(dir.path(), GovernanceConfig::default()).apply(region_added(1));
    assert_eq!(suppressed.outcome, Outcome::Fail);
}

#[test]
fn test_file_scoped_annotation_default_reason() {
    let dir = module_dir(&[(
        "variables.tf",
        "# tfbreak:ignore-file\n\nvariable \"region\" {}\n",
    )]);

    let suppressed = suppressor(dir.path(), GovernanceConfig::default()).apply(region_added(3));

    assert_eq!(
        suppressed.findings[0].ignore_reason.as_deref(),
        Some("suppressed by annotation at variables.tf:1")
    );
}

#[test]
fn test_denied_rule_annotation_is_rejected() {
    let dir = module_dir(&[(
        "variables.tf",
        "# tfbreak:ignore BC001 # trust me\nvariable \"region\" {}\n",
    )]);
    let governance = GovernanceConfig {
        deny_rule_ids: vec!["BC001".to_string()],
        ..GovernanceConfig::default()
    };
    let suppressor = suppressor(dir.path(), governance);
    let result = region_added(2);

    assert!(matches!(
        suppressor.decide(&result.findings[0]),
        SuppressionDecision::Reject { .. }
    ));
    let suppressed = suppressor.apply(result);
    assert_eq!(suppressed.outcome, Outcome::Fail);
    assert!(suppressed.findings[0]
        .detail
        .as_deref()
        .unwrap()
        .contains("annotation rejected: rule BC001 may not be suppressed"));
}

#[test]
fn test_expired_annotation_is_rejected() {
    let dir = module_dir(&[(
        "variables.tf",
        "# tfbreak:ignore BC001 expires=\"2026-01-31\" # temporary\nvariable \"region\" {}\n",
    )]);

    let suppressed = suppressor(dir.path(), GovernanceConfig::default()).apply(region_added(2));

    assert_eq!(suppressed.outcome, Outcome::Fail);
    assert!(suppressed.findings[0]
        .detail
        .as_deref()
        .unwrap()
        .contains("expired"));
}

#[test]
fn test_disabled_governance_accepts_everything() {
    let dir = module_dir(&[(
        "variables.tf",
        "# tfbreak:ignore all expires=\"2020-01-01\"\nvariable \"region\" {}\n",
    )]);
    let governance = GovernanceConfig {
        enabled: false,
        require_reason: true,
        deny_rule_ids: vec!["BC001".to_string()],
        ..GovernanceConfig::default()
    };

    let suppressed = suppressor(dir.path(), governance).apply(region_added(2));
    assert_eq!(suppressed.outcome, Outcome::Pass);
}

#[test]
fn test_suppression_is_idempotent() {
    let dir = module_dir(&[(
        "variables.tf",
        "# tfbreak:ignore BC001\nvariable \"region\" {}\n",
    )]);
    let suppressor = suppressor(dir.path(), GovernanceConfig::default());

    let once = suppressor.apply(region_added(2));
    let twice = suppressor.apply(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn test_non_tf_files_are_ignored_and_bad_source_fails() {
    let dir = module_dir(&[
        ("notes.md", "# tfbreak:ignore-file all\n"),
        ("variables.tf", "variable \"region\" {}\n"),
    ]);
    let parser = AnnotationParser::new(registry().name_to_id_map());
    let (annotations, _) = load_annotations(dir.path(), &parser).unwrap();
    assert!(annotations.is_empty());

    std::fs::write(dir.path().join("broken.tf"), "variable \"x\" {\n").unwrap();
    assert!(load_annotations(dir.path(), &parser).is_err());
}
