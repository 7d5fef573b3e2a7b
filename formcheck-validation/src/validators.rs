// Built-in validators

use crate::traits::value_rule;
use crate::{Arg, CheckError, Context, Failure, FailureKind, Input, Rule};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]{2,63}$").unwrap());

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9(). ]{9,20}$").unwrap());

/// Parse a signed decimal or scientific literal. Spellings such as `inf`
/// or `NaN` and values that overflow to infinity are rejected.
pub fn parse_number(value: &str) -> Option<f64> {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }

    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn number(value: &str) -> Result<f64, Failure> {
    parse_number(value).ok_or_else(|| Failure::new(FailureKind::NotNumber))
}

fn bound_failure(kind: FailureKind, bound: Arg) -> Failure {
    Failure::new(kind).with_arg(bound)
}

// Presence

/// Fails when the field has no non-empty value and no file.
///
/// Whitespace counts as a value. Used on its own, [`Required::validate`]
/// only looks at a single string.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Required {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        if value.is_empty() {
            Err(Failure::required())
        } else {
            Ok(())
        }
    }
}

impl Rule for Required {
    fn name(&self) -> &'static str {
        "required"
    }

    fn is_required(&self) -> bool {
        true
    }

    fn check(&self, _input: Input<'_>, ctx: &Context<'_>) -> Result<Vec<Failure>, CheckError> {
        if ctx.form().is_present(ctx.field()) {
            Ok(Vec::new())
        } else {
            Ok(vec![Failure::required()])
        }
    }
}

// String shape validators

/// Only ASCII letters. The empty string passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alpha;

impl Alpha {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        if value.bytes().all(|b| b.is_ascii_alphabetic()) {
            Ok(())
        } else {
            Err(Failure::new(FailureKind::NotAlpha))
        }
    }
}

/// Loose email shape: `local@domain.tld` with a 2 to 63 character tld.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl Email {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        if EMAIL_REGEX.is_match(value) {
            Ok(())
        } else {
            Err(Failure::new(FailureKind::NotEmail))
        }
    }
}

/// Base-10 signed 64-bit integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Integer;

impl Integer {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        if value != "." && value.parse::<i64>().is_ok() {
            Ok(())
        } else {
            Err(Failure::new(FailureKind::NotInteger))
        }
    }
}

/// Signed decimal or scientific literal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Number;

impl Number {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        number(value).map(|_| ())
    }
}

/// Number in `[-90, 90]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latitude;

impl Latitude {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        let n = number(value)?;
        if (-90.0..=90.0).contains(&n) {
            Ok(())
        } else {
            Err(Failure::new(FailureKind::NotLatitude))
        }
    }
}

/// Number in `[-180, 180]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Longitude;

impl Longitude {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        let n = number(value)?;
        if (-180.0..=180.0).contains(&n) {
            Ok(())
        } else {
            Err(Failure::new(FailureKind::NotLongitude))
        }
    }
}

/// 9 to 20 digits, parentheses, dots or spaces, optionally after a `+`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Phone;

impl Phone {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        if PHONE_REGEX.is_match(value) {
            Ok(())
        } else {
            Err(Failure::new(FailureKind::NotPhone))
        }
    }
}

/// Web address heuristic, see [`crate::is_url`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Url;

impl Url {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        if crate::url::is_url(value) {
            Ok(())
        } else {
            Err(Failure::new(FailureKind::NotUrl))
        }
    }
}

// Number validators

/// Validates minimum value
#[derive(Debug, Clone, Copy)]
pub struct Min(pub f64);

impl Min {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        if number(value)? < self.0 {
            Err(bound_failure(FailureKind::Min, Arg::Number(self.0)))
        } else {
            Ok(())
        }
    }
}

/// Validates maximum value
#[derive(Debug, Clone, Copy)]
pub struct Max(pub f64);

impl Max {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        if number(value)? > self.0 {
            Err(bound_failure(FailureKind::Max, Arg::Number(self.0)))
        } else {
            Ok(())
        }
    }
}

/// Inclusive numeric range. The lower bound is checked first.
#[derive(Debug, Clone, Copy)]
pub struct InRange {
    pub min: f64,
    pub max: f64,
}

impl InRange {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        Min(self.min).validate(value)?;
        Max(self.max).validate(value)
    }
}

// Length validators, in bytes

/// Validates minimum string length
#[derive(Debug, Clone, Copy)]
pub struct MinLength(pub usize);

impl MinLength {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        if value.len() < self.0 {
            Err(bound_failure(FailureKind::MinLen, Arg::Count(self.0 as u64)))
        } else {
            Ok(())
        }
    }
}

/// Validates maximum string length
#[derive(Debug, Clone, Copy)]
pub struct MaxLength(pub usize);

impl MaxLength {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        if value.len() > self.0 {
            Err(bound_failure(FailureKind::MaxLen, Arg::Count(self.0 as u64)))
        } else {
            Ok(())
        }
    }
}

/// Inclusive length range. The lower bound is checked first.
#[derive(Debug, Clone, Copy)]
pub struct LengthRange {
    pub min: usize,
    pub max: usize,
}

impl LengthRange {
    pub fn validate(&self, value: &str) -> Result<(), Failure> {
        MinLength(self.min).validate(value)?;
        MaxLength(self.max).validate(value)
    }
}

// Relational validators

/// The field's values must equal those of every listed field.
#[derive(Debug, Clone)]
pub struct Same {
    fields: Vec<String>,
}

impl Same {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Compare `own` against each listed field's values. A missing field
    /// never matches.
    pub fn validate<'a>(
        &self,
        own: &[String],
        lookup: impl Fn(&str) -> Option<&'a [String]>,
    ) -> Result<(), Failure> {
        let matches = self
            .fields
            .iter()
            .all(|other| lookup(other).is_some_and(|values| values == own));

        if matches {
            Ok(())
        } else {
            Err(Failure::new(FailureKind::NotSame).with_arg(Arg::List(self.fields.clone())))
        }
    }
}

impl Rule for Same {
    fn name(&self) -> &'static str {
        "same"
    }

    fn check(&self, input: Input<'_>, ctx: &Context<'_>) -> Result<Vec<Failure>, CheckError> {
        if input.as_file().is_some() {
            return Ok(Vec::new());
        }

        let form = ctx.form();
        Ok(self
            .validate(form.values(ctx.field()), |name| form.get(name))
            .err()
            .into_iter()
            .collect())
    }
}

value_rule!(Alpha, "alpha");
value_rule!(Email, "email");
value_rule!(Integer, "integer");
value_rule!(Number, "number");
value_rule!(Latitude, "latitude");
value_rule!(Longitude, "longitude");
value_rule!(Phone, "phone");
value_rule!(Url, "url");
value_rule!(Min, "min");
value_rule!(Max, "max");
value_rule!(InRange, "range");
value_rule!(MinLength, "minlen");
value_rule!(MaxLength, "maxlen");
value_rule!(LengthRange, "rangelen");

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(result: Result<(), Failure>) -> Option<FailureKind> {
        result.err().map(|f| f.kind)
    }

    #[test]
    fn test_required() {
        assert!(Required.validate("x").is_ok());
        assert!(Required.validate(" ").is_ok());
        assert_eq!(kind(Required.validate("")), Some(FailureKind::Required));
    }

    #[test]
    fn test_alpha() {
        assert!(Alpha.validate("abcXYZ").is_ok());
        assert!(Alpha.validate("").is_ok());
        assert_eq!(kind(Alpha.validate("abc1")), Some(FailureKind::NotAlpha));
        assert_eq!(kind(Alpha.validate("héllo")), Some(FailureKind::NotAlpha));
    }

    #[test]
    fn test_email() {
        assert!(Email.validate("a@a.aa").is_ok());
        assert!(Email.validate("first.last@sub.example.org").is_ok());
        assert_eq!(kind(Email.validate("a@a")), Some(FailureKind::NotEmail));
        assert_eq!(kind(Email.validate("a@a.a")), Some(FailureKind::NotEmail));
        assert_eq!(kind(Email.validate("@a.aa")), Some(FailureKind::NotEmail));
        assert_eq!(kind(Email.validate("a@@a.aa")), Some(FailureKind::NotEmail));
    }

    #[test]
    fn test_integer() {
        for ok in ["0", "42", "-7", "+7", "9223372036854775807"] {
            assert!(Integer.validate(ok).is_ok(), "{ok}");
        }
        for bad in [".", "", "1.5", " 1", "1 ", "1e3", "9223372036854775808"] {
            assert_eq!(kind(Integer.validate(bad)), Some(FailureKind::NotInteger), "{bad}");
        }
    }

    #[test]
    fn test_number() {
        for ok in ["0", "-1.5", "+2", ".5", "5.", "1e3", "-2.5E-3"] {
            assert!(Number.validate(ok).is_ok(), "{ok}");
        }
        for bad in ["", ".", "abc", "inf", "-inf", "NaN", "1e999", " 1", "1,5"] {
            assert_eq!(kind(Number.validate(bad)), Some(FailureKind::NotNumber), "{bad}");
        }
    }

    #[test]
    fn test_latitude_bounds() {
        assert!(Latitude.validate("90").is_ok());
        assert!(Latitude.validate("-90").is_ok());
        assert_eq!(kind(Latitude.validate("90.1")), Some(FailureKind::NotLatitude));
        assert_eq!(kind(Latitude.validate("north")), Some(FailureKind::NotNumber));
    }

    #[test]
    fn test_longitude_bounds() {
        assert!(Longitude.validate("180").is_ok());
        assert!(Longitude.validate("-180").is_ok());
        assert!(Longitude.validate("120").is_ok());
        assert_eq!(kind(Longitude.validate("180.5")), Some(FailureKind::NotLongitude));
        assert_eq!(kind(Longitude.validate("")), Some(FailureKind::NotNumber));
    }

    #[test]
    fn test_phone() {
        assert!(Phone.validate("0012345678901").is_ok());
        assert!(Phone.validate("+1 (555) 123.4567").is_ok());
        assert_eq!(kind(Phone.validate("00123")), Some(FailureKind::NotPhone));
        assert_eq!(kind(Phone.validate("0012-345-678")), Some(FailureKind::NotPhone));
        assert_eq!(kind(Phone.validate("123456789012345678901")), Some(FailureKind::NotPhone));
    }

    #[test]
    fn test_min_max() {
        assert!(Min(3.0).validate("3").is_ok());
        assert_eq!(
            Min(3.0).validate("2"),
            Err(Failure::new(FailureKind::Min).with_arg(Arg::Number(3.0)))
        );
        assert!(Max(5.0).validate("5").is_ok());
        assert_eq!(
            Max(5.0).validate("5.01"),
            Err(Failure::new(FailureKind::Max).with_arg(Arg::Number(5.0)))
        );
        assert_eq!(kind(Max(5.0).validate("five")), Some(FailureKind::NotNumber));
    }

    #[test]
    fn test_range_inclusive() {
        let range = InRange { min: 3.0, max: 5.0 };
        assert!(range.validate("3").is_ok());
        assert!(range.validate("5").is_ok());
        assert_eq!(
            range.validate("2"),
            Err(Failure::new(FailureKind::Min).with_arg(Arg::Number(3.0)))
        );
        assert_eq!(
            range.validate("6"),
            Err(Failure::new(FailureKind::Max).with_arg(Arg::Number(5.0)))
        );
    }

    #[test]
    fn test_misconfigured_range_reports_min() {
        let range = InRange { min: 5.0, max: 3.0 };
        assert_eq!(kind(range.validate("4")), Some(FailureKind::Min));
    }

    #[test]
    fn test_lengths_count_bytes() {
        assert!(MinLength(2).validate("ab").is_ok());
        assert_eq!(
            MinLength(2).validate("a"),
            Err(Failure::new(FailureKind::MinLen).with_arg(Arg::Count(2)))
        );
        assert_eq!(kind(MaxLength(2).validate("é!")), Some(FailureKind::MaxLen));

        let range = LengthRange { min: 1, max: 3 };
        assert!(range.validate("abc").is_ok());
        assert_eq!(kind(range.validate("")), Some(FailureKind::MinLen));
        assert_eq!(kind(range.validate("abcd")), Some(FailureKind::MaxLen));
    }

    #[test]
    fn test_same() {
        let x = vec!["x".to_string()];
        let y = vec!["y".to_string()];
        let same = Same::new(["a", "b"]);

        assert!(same.validate(&x, |_| Some(x.as_slice())).is_ok());
        assert_eq!(
            same.validate(&x, |name| {
                if name == "a" {
                    Some(x.as_slice())
                } else {
                    Some(y.as_slice())
                }
            }),
            Err(Failure::new(FailureKind::NotSame)
                .with_arg(Arg::List(vec!["a".into(), "b".into()])))
        );
        assert_eq!(kind(same.validate(&x, |_| None)), Some(FailureKind::NotSame));
    }
}
