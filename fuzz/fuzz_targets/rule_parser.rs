//! Fuzz target for textual rule declarations.
//!
//! Tests parsing of declarations like `required,range:3:5` and applies
//! whatever parses to an arbitrary value.

#![no_main]

use arbitrary::Arbitrary;
use formcheck_validation::{Checker, Form, RuleParser};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzRules {
    /// Raw declaration
    spec: String,
    /// Submitted value
    value: String,
}

fuzz_target!(|data: FuzzRules| {
    let parser = RuleParser::new();

    let Ok(rules) = parser.parse(&data.spec) else {
        return;
    };
    assert!(!rules.is_empty());

    let Ok(checker) = Checker::from_rule_strings([("field", data.spec.as_str())], &parser) else {
        panic!("declaration parsed once but not twice: {:?}", data.spec);
    };

    // Lookups are not configured, so checking never fails
    let errors = checker
        .check(&Form::new().with_value("field", data.value))
        .expect("check without a store");

    for (_, failures) in errors.iter() {
        let mut kinds: Vec<_> = failures.iter().map(|f| f.kind).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), failures.len());
    }
});
