#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chrono::{Duration, NaiveDate};
use common::today;
use proptest::prelude::*;
use tfbreak_core::annotation::{Annotation, AnnotationScope, GovernanceConfig, RuleTarget};

fn annotation(target: RuleTarget, reason: Option<&str>, expires: Option<NaiveDate>) -> Annotation {
    Annotation {
        scope: AnnotationScope::Block,
        target,
        reason: reason.map(str::to_string),
        ticket: None,
        expires,
        file: "main.tf".to_string(),
        line: 7,
        governs_line: Some(8),
    }
}

fn rule_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::sample::select(vec!["BC001", "BC002", "BC100", "RC300"]).prop_map(str::to_string),
        0..3,
    )
}

#[test]
fn test_expiry_day_itself_is_still_valid() {
    let policy = GovernanceConfig::default();
    let on_the_day = annotation(RuleTarget::All, None, Some(today()));
    assert!(policy.check(&on_the_day, today()).is_ok());

    let yesterday = annotation(RuleTarget::All, None, Some(today() - Duration::days(1)));
    let violation = policy.check(&yesterday, today()).unwrap_err();
    assert!(violation.message.contains("expired"));
    assert_eq!(violation.to_string(), format!("{} (main.tf:7)", violation.message));
}

#[test]
fn test_blank_reason_does_not_satisfy_requirement() {
    let policy = GovernanceConfig {
        require_reason: true,
        ..GovernanceConfig::default()
    };
    let blank = annotation(RuleTarget::All, Some("   "), None);
    assert!(policy.check(&blank, today()).is_err());

    let given = annotation(RuleTarget::All, Some("tracked in OPS-1"), None);
    assert!(policy.check(&given, today()).is_ok());
}

#[test]
fn test_allow_list_only_constrains_explicit_rules() {
    let policy = GovernanceConfig {
        allow_rule_ids: vec!["BC001".to_string()],
        ..GovernanceConfig::default()
    };
    assert!(policy
        .check(&annotation(RuleTarget::Rules(vec!["BC001".to_string()]), None, None), today())
        .is_ok());
    assert!(policy
        .check(&annotation(RuleTarget::Rules(vec!["BC002".to_string()]), None, None), today())
        .is_err());
    assert!(policy
        .check(&annotation(RuleTarget::All, None, None), today())
        .is_ok());
}

proptest! {
    #[test]
    fn prop_expired_always_rejected_when_enabled(
        days_past in 1i64..2000,
        require_reason in any::<bool>(),
        allow in rule_ids(),
        deny in rule_ids(),
        targets in rule_ids(),
    ) {
        let policy = GovernanceConfig {
            enabled: true,
            require_reason,
            allow_rule_ids: allow,
            deny_rule_ids: deny,
        };
        let ann = annotation(
            RuleTarget::Rules(targets),
            Some("reason"),
            Some(today() - Duration::days(days_past)),
        );
        let violation = policy.check(&ann, today()).unwrap_err();
        prop_assert!(violation.message.contains("expired"));
    }

    #[test]
    fn prop_deny_list_rejects_ignore_all(deny in rule_ids()) {
        prop_assume!(!deny.is_empty());
        let policy = GovernanceConfig {
            deny_rule_ids: deny,
            ..GovernanceConfig::default()
        };
        let ann = annotation(RuleTarget::All, Some("reason"), None);
        prop_assert!(policy.check(&ann, today()).is_err());
    }

    #[test]
    fn prop_disabled_policy_accepts_everything(
        days_past in -30i64..30,
        deny in rule_ids(),
    ) {
        let policy = GovernanceConfig {
            enabled: false,
            require_reason: true,
            allow_rule_ids: vec!["BC001".to_string()],
            deny_rule_ids: deny,
        };
        let ann = annotation(RuleTarget::All, None, Some(today() - Duration::days(days_past)));
        prop_assert!(policy.check(&ann, today()).is_ok());
    }
}
