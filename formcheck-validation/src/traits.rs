// Rule traits

use crate::{CheckError, Errors, Failure, FileHandle, Form};
use std::fmt;

/// One submitted item a rule is applied to.
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    Value(&'a str),
    File(&'a FileHandle),
}

impl<'a> Input<'a> {
    pub fn as_value(&self) -> Option<&'a str> {
        match self {
            Input::Value(value) => Some(value),
            Input::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&'a FileHandle> {
        match self {
            Input::Value(_) => None,
            Input::File(file) => Some(file),
        }
    }
}

/// What a rule may see besides its own input: the field being checked,
/// the whole form, and the failures recorded so far in this run.
pub struct Context<'a> {
    field: &'a str,
    form: &'a Form,
    errors: &'a Errors,
}

impl<'a> Context<'a> {
    pub fn new(field: &'a str, form: &'a Form, errors: &'a Errors) -> Self {
        Self {
            field,
            form,
            errors,
        }
    }

    pub fn field(&self) -> &'a str {
        self.field
    }

    pub fn form(&self) -> &'a Form {
        self.form
    }

    /// Whether the current field already failed a rule in this run.
    pub fn field_has_failures(&self) -> bool {
        self.errors.has(self.field)
    }
}

/// A named check applied to every value and every file of a field.
///
/// Rules that only understand text ignore files and the other way round,
/// returning no failures for inputs they do not apply to.
pub trait Rule: Send + Sync {
    /// Short identifier, matching the textual rule name where one exists.
    fn name(&self) -> &'static str;

    /// Whether a missing field should be reported as `required`.
    fn is_required(&self) -> bool {
        false
    }

    fn check(&self, input: Input<'_>, ctx: &Context<'_>) -> Result<Vec<Failure>, CheckError>;
}

impl fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule({})", self.name())
    }
}

/// Rule backed by a closure; see [`rule_fn`].
pub struct RuleFn<F> {
    name: &'static str,
    check: F,
}

/// Build a rule from a closure.
///
/// ```
/// use formcheck_validation::{rule_fn, Failure, FailureKind, Input};
///
/// let no_spaces = rule_fn("nospaces", |input, _ctx| match input {
///     Input::Value(v) if v.contains(' ') => vec![Failure::new(FailureKind::NotAlpha)],
///     _ => Vec::new(),
/// });
/// # let _ = no_spaces;
/// ```
pub fn rule_fn<F>(name: &'static str, check: F) -> RuleFn<F>
where
    F: Fn(Input<'_>, &Context<'_>) -> Vec<Failure> + Send + Sync,
{
    RuleFn { name, check }
}

impl<F> Rule for RuleFn<F>
where
    F: Fn(Input<'_>, &Context<'_>) -> Vec<Failure> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn check(&self, input: Input<'_>, ctx: &Context<'_>) -> Result<Vec<Failure>, CheckError> {
        Ok((self.check)(input, ctx))
    }
}

/// Implements [`Rule`] for a value predicate with a
/// `validate(&self, &str) -> Result<(), Failure>` method. Files pass.
macro_rules! value_rule {
    ($ty:ty, $name:literal) => {
        impl $crate::Rule for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn check(
                &self,
                input: $crate::Input<'_>,
                _ctx: &$crate::Context<'_>,
            ) -> Result<Vec<$crate::Failure>, $crate::CheckError> {
                Ok(match input {
                    $crate::Input::Value(value) => self.validate(value).err().into_iter().collect(),
                    $crate::Input::File(_) => Vec::new(),
                })
            }
        }
    };
}

pub(crate) use value_rule;
