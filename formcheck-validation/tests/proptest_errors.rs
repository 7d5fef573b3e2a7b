//! Property-based tests for the failure collection and the predicates.
//!
//! Covers the per-field invariants of `Errors` under arbitrary sequences of
//! additions and merges, and panic safety of the string predicates.

use formcheck_validation::*;
use proptest::prelude::*;

fn kind_strategy() -> impl Strategy<Value = FailureKind> {
    proptest::sample::select(FailureKind::ALL.to_vec())
}

fn failure_strategy() -> impl Strategy<Value = Failure> {
    (kind_strategy(), proptest::option::of(-1000.0f64..1000.0)).prop_map(|(kind, arg)| {
        let failure = Failure::new(kind);
        match arg {
            Some(n) if kind != FailureKind::Required => failure.with_arg(Arg::Number(n)),
            _ => failure,
        }
    })
}

fn additions() -> impl Strategy<Value = Vec<(String, Failure)>> {
    proptest::collection::vec(
        (prop_oneof![Just("a"), Just("b"), Just("c")].prop_map(String::from), failure_strategy()),
        0..40,
    )
}

fn build(additions: &[(String, Failure)]) -> Errors {
    let mut errors = Errors::new();
    for (field, failure) in additions {
        errors.add(field.clone(), failure.clone());
    }
    errors
}

fn assert_invariants(errors: &Errors) {
    for (field, failures) in errors.iter() {
        assert!(!failures.is_empty(), "{field} has an empty list");

        let mut seen: Vec<FailureKind> = failures.iter().map(|f| f.kind).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), failures.len(), "{field} repeats a kind");

        if failures.iter().any(Failure::is_required) {
            assert_eq!(failures, &[Failure::required()], "{field} mixes required");
        }
    }
}

proptest! {
    #[test]
    fn add_keeps_invariants(adds in additions()) {
        assert_invariants(&build(&adds));
    }

    #[test]
    fn adding_twice_is_idempotent(adds in additions()) {
        let once = build(&adds);
        let mut twice = once.clone();
        for (field, failure) in &adds {
            twice.add(field.clone(), failure.clone());
        }
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn required_absorbs_later_failures(
        before in proptest::collection::vec(failure_strategy(), 0..10),
        after in proptest::collection::vec(failure_strategy(), 0..10),
    ) {
        let mut errors = Errors::new();
        errors.extend("f", before);
        errors.add("f", Failure::required());
        errors.extend("f", after);
        prop_assert_eq!(errors.get("f").unwrap(), &[Failure::required()][..]);
    }

    #[test]
    fn merge_keeps_invariants(left in additions(), right in additions()) {
        let mut merged = build(&left);
        merged.merge(build(&right));
        assert_invariants(&merged);

        let sequential: Vec<_> = left.iter().chain(right.iter()).cloned().collect();
        prop_assert_eq!(merged, build(&sequential));
    }

    #[test]
    fn predicates_never_panic(value in ".{0,64}") {
        let _ = Alpha.validate(&value);
        let _ = Email.validate(&value);
        let _ = Integer.validate(&value);
        let _ = Number.validate(&value);
        let _ = Latitude.validate(&value);
        let _ = Phone.validate(&value);
        let _ = is_url(&value);
    }

    #[test]
    fn range_bounds_are_inclusive(lo in -1000i32..1000, width in 0i32..1000) {
        let hi = lo + width;
        let range = InRange { min: lo as f64, max: hi as f64 };

        prop_assert!(range.validate(&lo.to_string()).is_ok());
        prop_assert!(range.validate(&hi.to_string()).is_ok());
        prop_assert_eq!(
            range.validate(&(lo - 1).to_string()),
            Err(Failure::new(FailureKind::Min).with_arg(Arg::Number(lo as f64)))
        );
        prop_assert_eq!(
            range.validate(&(hi + 1).to_string()),
            Err(Failure::new(FailureKind::Max).with_arg(Arg::Number(hi as f64)))
        );
    }

    #[test]
    fn rule_parser_never_panics(spec in "[a-z:,0-9 ]{0,40}") {
        let _ = RuleParser::new().parse(&spec);
    }
}
