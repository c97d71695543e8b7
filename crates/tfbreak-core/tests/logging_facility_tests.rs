#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{engine, registry, SnapshotBuilder};
use tfbreak_core::annotation::{load_annotations, AnnotationParser};
use tfbreak_core::errors::TfbreakError;
use tfbreak_core::logging_facility::test_capture::init_test_capture;
use tfbreak_core::model::Severity;
use tfbreak_core::{log_op_end, log_op_error, log_op_start};
use tfbreak_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, rule_count = 3);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[0].field("rule_count"), Some("3"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42, finding_count = 0);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[0].field("duration_ms"), Some("42"));
    assert_eq!(events[0].field("finding_count"), Some("0"));
}

#[test]
fn test_log_op_error_carries_stable_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = TfbreakError::InvalidThreshold { value: 2.0 };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(events[0].field("err.code"), Some("ERR_INVALID_THRESHOLD"));
    assert_eq!(events[0].field("err.kind"), Some("InvalidThreshold"));
}

#[test]
fn test_check_emits_start_and_end() {
    let capture = init_test_capture();
    let old = SnapshotBuilder::new()
        .output("endpoint", "outputs.tf", 1)
        .build();
    let new = SnapshotBuilder::new().build();

    engine().check(
        "logging-check-old",
        "logging-check-new",
        &old,
        &new,
        Severity::Breaking,
    );

    let events = capture.events_for_op("check");
    assert!(events.iter().any(|e| e.event.as_deref() == Some(EVENT_START)
        && e.field("old_path") == Some("logging-check-old")));
    let end = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END))
        .expect("check end event");
    assert_eq!(end.field("finding_count"), Some("1"));
}

#[test]
fn test_annotation_load_failure_is_logged_with_source_code() {
    let capture = init_test_capture();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("main.tf"), "resource \"a\" \"b\" {\n").unwrap();
    let parser = AnnotationParser::new(registry().name_to_id_map());

    let err = load_annotations(dir.path(), &parser).unwrap_err();
    assert!(matches!(err, TfbreakError::SourceStructure { .. }));

    let found = capture.count_events(|e| {
        e.op.as_deref() == Some("load_annotations")
            && e.event.as_deref() == Some(EVENT_END_ERROR)
            && e.field("err.code") == Some("ERR_INVALID_SOURCE")
    });
    assert!(found >= 1);
}
