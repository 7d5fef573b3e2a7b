// Validation errors

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Identifier of a failed check.
///
/// The serialized names are stable and double as message keys for
/// localized rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    NotAlpha,
    NotEmail,
    NotInteger,
    NotNumber,
    NotPhone,
    NotLatitude,
    NotLongitude,
    #[serde(rename = "notURL")]
    NotUrl,
    Min,
    Max,
    MinLen,
    MaxLen,
    MinFileSize,
    MaxFileSize,
    BadFileType,
    NotImage,
    NotSame,
    NotUnique,
    /// Missing value; absorbs every other failure of its field
    Required,
}

impl FailureKind {
    pub const ALL: [FailureKind; 19] = [
        FailureKind::NotAlpha,
        FailureKind::NotEmail,
        FailureKind::NotInteger,
        FailureKind::NotNumber,
        FailureKind::NotPhone,
        FailureKind::NotLatitude,
        FailureKind::NotLongitude,
        FailureKind::NotUrl,
        FailureKind::Min,
        FailureKind::Max,
        FailureKind::MinLen,
        FailureKind::MaxLen,
        FailureKind::MinFileSize,
        FailureKind::MaxFileSize,
        FailureKind::BadFileType,
        FailureKind::NotImage,
        FailureKind::NotSame,
        FailureKind::NotUnique,
        FailureKind::Required,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NotAlpha => "notAlpha",
            FailureKind::NotEmail => "notEmail",
            FailureKind::NotInteger => "notInteger",
            FailureKind::NotNumber => "notNumber",
            FailureKind::NotPhone => "notPhone",
            FailureKind::NotLatitude => "notLatitude",
            FailureKind::NotLongitude => "notLongitude",
            FailureKind::NotUrl => "notURL",
            FailureKind::Min => "min",
            FailureKind::Max => "max",
            FailureKind::MinLen => "minLen",
            FailureKind::MaxLen => "maxLen",
            FailureKind::MinFileSize => "minFileSize",
            FailureKind::MaxFileSize => "maxFileSize",
            FailureKind::BadFileType => "badFileType",
            FailureKind::NotImage => "notImage",
            FailureKind::NotSame => "notSame",
            FailureKind::NotUnique => "notUnique",
            FailureKind::Required => "required",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument attached to a failure, used when formatting messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Arg {
    /// Numeric bound
    Number(f64),
    /// Length or byte-size bound
    Count(u64),
    Text(String),
    /// Allowed file types, compared field names
    List(Vec<String>),
    /// Message key translated before interpolation
    Message(String),
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Number(n) => write_number(f, *n),
            Arg::Count(n) => write!(f, "{}", n),
            Arg::Text(s) | Arg::Message(s) => f.write_str(s),
            Arg::List(items) => f.write_str(&items.join(",")),
        }
    }
}

/// Shortest form of `n`, in exponent notation when the decimal exponent is
/// at least 21 or below -6 (`1e21`, `1.5e-7`).
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if !n.is_finite() || n == 0.0 {
        return write!(f, "{}", n);
    }

    let scientific = format!("{:e}", n);
    let exponent = scientific
        .rsplit_once('e')
        .and_then(|(_, exp)| exp.parse::<i32>().ok())
        .unwrap_or(0);

    if (-6..21).contains(&exponent) {
        write!(f, "{}", n)
    } else {
        f.write_str(&scientific)
    }
}

/// One rule violation: what failed and the parameters it failed against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Arg>,
}

impl Failure {
    pub fn new(kind: FailureKind) -> Self {
        Self {
            kind,
            args: Vec::new(),
        }
    }

    pub fn required() -> Self {
        Self::new(FailureKind::Required)
    }

    /// Append an argument.
    pub fn with_arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn is_required(&self) -> bool {
        self.kind == FailureKind::Required
    }
}

/// Compact form: `kind`, or `kind:arg,arg` when arguments are present.
impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        for (i, arg) in self.args.iter().enumerate() {
            f.write_str(if i == 0 { ":" } else { "," })?;
            write!(f, "{}", arg)?;
        }
        Ok(())
    }
}

impl From<FailureKind> for Failure {
    fn from(kind: FailureKind) -> Self {
        Self::new(kind)
    }
}

/// Failures of one check run, keyed by field name.
///
/// Two rules hold for every field:
///
/// - a kind appears at most once; later failures of the same kind are dropped
/// - a `required` failure is always alone: adding it replaces the field's
///   failures, and nothing can be added after it
///
/// A field is present only while it has at least one failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Errors {
    fields: BTreeMap<String, Vec<Failure>>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn add(&mut self, field: impl Into<String>, failure: Failure) {
        let failures = self.fields.entry(field.into()).or_default();

        if failure.is_required() {
            failures.clear();
            failures.push(failure);
            return;
        }

        if failures
            .iter()
            .any(|f| f.kind == failure.kind || f.is_required())
        {
            return;
        }

        failures.push(failure);
    }

    /// Record several failures for `field`, in order.
    pub fn extend(&mut self, field: &str, failures: impl IntoIterator<Item = Failure>) {
        for failure in failures {
            self.add(field, failure);
        }
    }

    /// Add every failure of `other`, keeping both invariants.
    pub fn merge(&mut self, other: Errors) {
        for (field, failures) in other.fields {
            self.extend(&field, failures);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }

    /// Number of fields with failures.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[Failure]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn first(&self, field: &str) -> Option<&Failure> {
        self.fields.get(field).and_then(|failures| failures.first())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Failure])> {
        self.fields
            .iter()
            .map(|(field, failures)| (field.as_str(), failures.as_slice()))
    }

    /// Compact strings per field, e.g. `{"stars": ["min:3"]}`.
    pub fn to_strings(&self) -> BTreeMap<String, Vec<String>> {
        self.iter()
            .map(|(field, failures)| {
                (
                    field.to_string(),
                    failures.iter().map(Failure::to_string).collect(),
                )
            })
            .collect()
    }

    /// Structured export nested under `"errors"`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "errors": self })
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = (&'a String, &'a Vec<Failure>);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Vec<Failure>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, failures) in &self.fields {
            let rendered: Vec<String> = failures.iter().map(Failure::to_string).collect();
            writeln!(f, "{}: {}", field, rendered.join(", "))?;
        }
        Ok(())
    }
}

/// Malformed rule configuration, reported while a checker is being built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("empty rule in {0:?}")]
    EmptyRule(String),

    #[error("unknown rule {0:?}")]
    UnknownRule(String),

    #[error("rule {rule:?} expects {expected} argument(s), got {found}")]
    ArgumentCount {
        rule: String,
        expected: &'static str,
        found: usize,
    },

    #[error("rule {rule:?}: argument {arg:?} is not a valid number")]
    InvalidNumber { rule: String, arg: String },

    #[error("rule {0:?} needs a uniqueness store")]
    MissingStore(String),
}

/// Failure of a collaborator during a check run.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The uniqueness store could not answer; the result would be unreliable.
    #[error("uniqueness lookup for field {field:?} failed: {source}")]
    Lookup {
        field: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
