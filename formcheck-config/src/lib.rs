// Checker definitions loaded from configuration files

pub mod error;
pub mod loader;

pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};

use formcheck_log::info;
use formcheck_validation::{Checker, RuleParser};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Textual rule declarations keyed by field name.
///
/// JSON:
///
/// ```json
/// { "fields": { "email": "required,email", "stars": "range:3:5" } }
/// ```
///
/// TOML:
///
/// ```toml
/// [fields]
/// email = "required,email"
/// stars = "range:3:5"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckerConfig {
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the declaration of `field`.
    pub fn with_field(mut self, field: impl Into<String>, rules: impl Into<String>) -> Self {
        self.fields.insert(field.into(), rules.into());
        self
    }

    /// Load from a `.json` or `.toml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ConfigLoader::auto(path)?.load_file(path)
    }

    /// Combine with another configuration. Declarations from `other` win.
    pub fn merge(&mut self, other: CheckerConfig) {
        self.fields.extend(other.fields);
    }

    /// Parse every declaration into a [`Checker`].
    pub fn build(&self, parser: &RuleParser) -> Result<Checker> {
        let checker = self
            .fields
            .iter()
            .try_fold(Checker::new(), |checker, (field, spec)| {
                parser
                    .field_rules(field.as_str(), spec)
                    .map(|rules| checker.field(rules))
                    .map_err(|source| ConfigError::Rule {
                        field: field.clone(),
                        source,
                    })
            })?;

        info!(
            target: "formcheck::config",
            "built checker for {} fields",
            self.fields.len()
        );
        Ok(checker)
    }
}

/// Load `path` and build its checker in one step.
pub fn load_checker(path: impl AsRef<Path>, parser: &RuleParser) -> Result<Checker> {
    CheckerConfig::from_file(path)?.build(parser)
}
