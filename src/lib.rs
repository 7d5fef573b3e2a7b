// formcheck - declarative validation of submitted form data
//
// Field values and uploaded files are checked against ordered rules,
// producing per-field failures that can be rendered in any locale.

// Re-export the validation engine
pub use formcheck_validation::*;

// Logging macros and level control
pub use formcheck_log as log;

// Re-export optional crates
#[cfg(feature = "i18n")]
pub use formcheck_i18n as i18n;

#[cfg(feature = "config")]
pub use formcheck_config as config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Arg, CheckError, Checker, Errors, Failure, FailureKind, FieldRules, FileHandle, Form,
        Rule, RuleParser,
    };

    #[cfg(feature = "i18n")]
    pub use crate::Translator;
    #[cfg(feature = "i18n")]
    pub use formcheck_i18n::{I18n, Locale, MessageBundle};

    #[cfg(feature = "config")]
    pub use formcheck_config::{CheckerConfig, ConfigError};
}
