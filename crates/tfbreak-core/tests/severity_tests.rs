#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use tfbreak_core::model::Severity;

fn severity() -> impl Strategy<Value = Severity> {
    prop::sample::select(Severity::ALL.to_vec())
}

#[test]
fn test_canonical_order() {
    assert!(Severity::Info < Severity::Risky);
    assert!(Severity::Risky < Severity::Breaking);
    assert!(Severity::Breaking.at_least(Severity::Info));
    assert!(!Severity::Info.at_least(Severity::Risky));
}

#[test]
fn test_display_round_trips_through_parse() {
    for severity in Severity::ALL {
        assert_eq!(severity.to_string().parse::<Severity>().unwrap(), severity);
    }
}

proptest! {
    #[test]
    fn prop_at_least_is_reflexive(s in severity()) {
        prop_assert!(s.at_least(s));
    }

    #[test]
    fn prop_at_least_is_antisymmetric(a in severity(), b in severity()) {
        if a.at_least(b) && b.at_least(a) {
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn prop_at_least_is_total(a in severity(), b in severity()) {
        prop_assert!(a.at_least(b) || b.at_least(a));
    }

    #[test]
    fn prop_non_canonical_strings_rejected(s in "[A-Za-z]{0,10}") {
        prop_assume!(!["INFO", "RISKY", "BREAKING"].contains(&s.as_str()));
        prop_assert!(s.parse::<Severity>().is_err());
    }
}
