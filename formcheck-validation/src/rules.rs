// Validation rules builder

use crate::{
    CheckError, Context, Errors, Failure, Form, Input, Rule, RuleError, RuleParser, rule_fn,
};
use formcheck_log::{debug, trace};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Ordered rules for one field.
#[derive(Clone)]
pub struct FieldRules {
    field: String,
    rules: Vec<Arc<dyn Rule>>,
}

impl FieldRules {
    /// Create new validation rules for a field
    pub fn for_field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rules: Vec::new(),
        }
    }

    /// Append a rule. Rules run in the order they are added.
    #[allow(clippy::should_implement_trait)]
    pub fn add<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Append an already shared rule.
    pub fn add_shared(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append a closure rule, see [`rule_fn`].
    pub fn add_fn<F>(self, name: &'static str, check: F) -> Self
    where
        F: Fn(Input<'_>, &Context<'_>) -> Vec<Failure> + Send + Sync + 'static,
    {
        self.add(rule_fn(name, check))
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// Whether a missing field must be reported.
    pub fn is_required(&self) -> bool {
        self.rules.iter().any(|rule| rule.is_required())
    }
}

impl fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.rules.iter().map(|rule| rule.name()).collect();
        f.debug_struct("FieldRules")
            .field("field", &self.field)
            .field("rules", &names)
            .finish()
    }
}

/// Immutable declaration of the rules of every field.
///
/// Each [`Checker::check`] call builds its own [`Errors`], so one checker
/// can serve concurrent requests.
///
/// # Examples
///
/// ```
/// use formcheck_validation::{Checker, Email, FieldRules, Form, InRange, Required};
///
/// let checker = Checker::new()
///     .field(FieldRules::for_field("email").add(Required).add(Email))
///     .field(FieldRules::for_field("stars").add(Required).add(InRange { min: 3.0, max: 5.0 }));
///
/// let form = Form::new().with_value("stars", "2");
/// let errors = checker.check(&form).unwrap();
///
/// assert_eq!(errors.first("email").unwrap().to_string(), "required");
/// assert_eq!(errors.first("stars").unwrap().to_string(), "min:3");
/// ```
#[derive(Clone, Default)]
pub struct Checker {
    fields: BTreeMap<String, Vec<Arc<dyn Rule>>>,
}

impl Checker {
    /// Create a new validation builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rules for a field. Rules of a field declared twice are appended.
    pub fn field(mut self, rules: FieldRules) -> Self {
        self.fields
            .entry(rules.field)
            .or_default()
            .extend(rules.rules);
        self
    }

    /// Build a checker from textual rules such as `("stars", "required,range:3:5")`.
    pub fn from_rule_strings<I, K, V>(rules: I, parser: &RuleParser) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        rules.into_iter().try_fold(Self::new(), |checker, (field, spec)| {
            Ok(checker.field(parser.field_rules(field, spec.as_ref())?))
        })
    }

    /// Rules of `field`, in evaluation order.
    pub fn rules(&self, field: &str) -> Option<&[Arc<dyn Rule>]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Apply every rule of every declared field to the submitted data.
    ///
    /// Fields that were not submitted are skipped, or reported as
    /// `required` when one of their rules demands it. Undeclared fields
    /// are ignored. `Err` means a collaborator failed, not that the data
    /// is invalid.
    pub fn check(&self, form: &Form) -> Result<Errors, CheckError> {
        let mut errors = Errors::new();

        for (field, rules) in &self.fields {
            check_field(field, rules, form, &mut errors)?;
        }

        debug!(
            target: "formcheck::checker",
            "checked {} fields, {} failed",
            self.fields.len(),
            errors.len()
        );
        Ok(errors)
    }
}

fn check_field(
    field: &str,
    rules: &[Arc<dyn Rule>],
    form: &Form,
    errors: &mut Errors,
) -> Result<(), CheckError> {
    if !form.contains(field) {
        if rules.iter().any(|rule| rule.is_required()) {
            debug!(target: "formcheck::checker", "field {} is missing", field);
            errors.add(field, Failure::required());
        } else {
            trace!(target: "formcheck::checker", "field {} not submitted, skipping", field);
        }
        return Ok(());
    }

    let inputs = form
        .values(field)
        .iter()
        .map(|value| Input::Value(value))
        .chain(form.files(field).iter().map(Input::File));

    for input in inputs {
        for rule in rules {
            let failures = rule.check(input, &Context::new(field, form, errors))?;
            if !failures.is_empty() {
                trace!(
                    target: "formcheck::checker",
                    "rule {} failed for field {}",
                    rule.name(),
                    field
                );
            }
            errors.extend(field, failures);
        }
    }

    Ok(())
}

impl fmt::Debug for Checker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (field, rules) in &self.fields {
            let names: Vec<&str> = rules.iter().map(|rule| rule.name()).collect();
            map.entry(field, &names);
        }
        map.finish()
    }
}
