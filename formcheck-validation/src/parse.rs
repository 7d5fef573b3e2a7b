//! Textual rule declarations.
//!
//! A declaration is a comma-separated list of rules, each optionally
//! followed by `:`-separated arguments:
//!
//! ```text
//! required,email,unique:users:email:$1
//! required,range:3:5
//! filetype:image/png:image/gif,maxfilesize:1048576
//! ```
//!
//! Every mistake is reported when the declaration is parsed, never while
//! checking data.

use crate::file::{FileSizeRange, FileType, Image, MaxFileSize, MinFileSize};
use crate::unique::{Unique, UniqueStore};
use crate::validators::*;
use crate::{FieldRules, Rule, RuleError};
use std::str::FromStr;
use std::sync::Arc;

/// Turns rule declarations into [`Rule`] values.
#[derive(Clone, Default)]
pub struct RuleParser {
    store: Option<Arc<dyn UniqueStore>>,
}

impl RuleParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store consulted by `unique` rules.
    pub fn with_store(mut self, store: Arc<dyn UniqueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Parse a comma-separated declaration.
    ///
    /// ```
    /// use formcheck_validation::RuleParser;
    ///
    /// let rules = RuleParser::new().parse("required, minlen:3").unwrap();
    /// assert_eq!(rules.len(), 2);
    /// assert!(RuleParser::new().parse("required,,email").is_err());
    /// ```
    pub fn parse(&self, spec: &str) -> Result<Vec<Arc<dyn Rule>>, RuleError> {
        spec.split(',')
            .map(|rule| {
                let rule = rule.trim();
                if rule.is_empty() {
                    Err(RuleError::EmptyRule(spec.to_string()))
                } else {
                    self.parse_rule(rule)
                }
            })
            .collect()
    }

    /// Parse a declaration into the rules of `field`.
    pub fn field_rules(
        &self,
        field: impl Into<String>,
        spec: &str,
    ) -> Result<FieldRules, RuleError> {
        Ok(self
            .parse(spec)?
            .into_iter()
            .fold(FieldRules::for_field(field), FieldRules::add_shared))
    }

    /// Parse a single rule such as `range:3:5`.
    pub fn parse_rule(&self, rule: &str) -> Result<Arc<dyn Rule>, RuleError> {
        let mut parts = rule.split(':').map(str::trim);
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        let args = Args { rule: name, args };

        let rule: Arc<dyn Rule> = match name {
            "required" => args.none(Required)?,
            "alpha" => args.none(Alpha)?,
            "email" => args.none(Email)?,
            "integer" => args.none(Integer)?,
            "number" => args.none(Number)?,
            "latitude" => args.none(Latitude)?,
            "longitude" => args.none(Longitude)?,
            "phone" => args.none(Phone)?,
            "url" => args.none(Url)?,
            "image" => args.none(Image)?,
            "min" => Arc::new(Min(args.number()?)),
            "max" => Arc::new(Max(args.number()?)),
            "range" => {
                let (min, max) = args.numbers()?;
                Arc::new(InRange { min, max })
            }
            "minlen" => Arc::new(MinLength(args.count()?)),
            "maxlen" => Arc::new(MaxLength(args.count()?)),
            "rangelen" => {
                let (min, max) = args.counts()?;
                Arc::new(LengthRange { min, max })
            }
            "minfilesize" => Arc::new(MinFileSize(args.count()?)),
            "maxfilesize" => Arc::new(MaxFileSize(args.count()?)),
            "rangefilesize" => {
                let (min, max) = args.counts()?;
                Arc::new(FileSizeRange { min, max })
            }
            "filetype" => Arc::new(FileType::new(args.at_least_one()?)),
            "same" => Arc::new(Same::new(args.at_least_one()?)),
            "unique" => {
                let [table, column, placeholder] = args.exactly::<3>("3")?;
                let store = self
                    .store
                    .clone()
                    .ok_or_else(|| RuleError::MissingStore(name.to_string()))?;
                Arc::new(Unique::new(store, table, column, placeholder))
            }
            "" => return Err(RuleError::EmptyRule(rule.to_string())),
            other => return Err(RuleError::UnknownRule(other.to_string())),
        };

        Ok(rule)
    }
}

/// Arguments of one rule.
struct Args<'a> {
    rule: &'a str,
    args: Vec<&'a str>,
}

impl<'a> Args<'a> {
    fn count_error(&self, expected: &'static str) -> RuleError {
        RuleError::ArgumentCount {
            rule: self.rule.to_string(),
            expected,
            found: self.args.len(),
        }
    }

    fn none<R: Rule + 'static>(&self, rule: R) -> Result<Arc<dyn Rule>, RuleError> {
        if self.args.is_empty() {
            Ok(Arc::new(rule))
        } else {
            Err(self.count_error("0"))
        }
    }

    fn exactly<const N: usize>(&self, expected: &'static str) -> Result<[&'a str; N], RuleError> {
        <[&str; N]>::try_from(self.args.as_slice()).map_err(|_| self.count_error(expected))
    }

    fn at_least_one(&self) -> Result<Vec<&'a str>, RuleError> {
        if self.args.is_empty() || self.args.iter().any(|arg| arg.is_empty()) {
            Err(self.count_error("1 or more"))
        } else {
            Ok(self.args.clone())
        }
    }

    fn parse_number(&self, arg: &str) -> Result<f64, RuleError> {
        parse_number(arg).ok_or_else(|| self.invalid(arg))
    }

    fn parse_count<T: FromStr>(&self, arg: &str) -> Result<T, RuleError> {
        arg.parse().map_err(|_| self.invalid(arg))
    }

    fn invalid(&self, arg: &str) -> RuleError {
        RuleError::InvalidNumber {
            rule: self.rule.to_string(),
            arg: arg.to_string(),
        }
    }

    fn number(&self) -> Result<f64, RuleError> {
        let [arg] = self.exactly::<1>("1")?;
        self.parse_number(arg)
    }

    fn numbers(&self) -> Result<(f64, f64), RuleError> {
        let [min, max] = self.exactly::<2>("2")?;
        Ok((self.parse_number(min)?, self.parse_number(max)?))
    }

    fn count<T: FromStr>(&self) -> Result<T, RuleError> {
        let [arg] = self.exactly::<1>("1")?;
        self.parse_count(arg)
    }

    fn counts<T: FromStr>(&self) -> Result<(T, T), RuleError> {
        let [min, max] = self.exactly::<2>("2")?;
        Ok((self.parse_count(min)?, self.parse_count(max)?))
    }
}
