//! Declarative validation of submitted form data.
//!
//! A [`Checker`] maps field names to ordered [`Rule`]s and applies each rule
//! to every value and every uploaded file of its field. The outcome is an
//! [`Errors`] collection, empty when the data is valid.
//!
//! Two rules shape the outcome:
//!
//! - a failure kind is reported at most once per field
//! - a missing field reported as `required` carries no other failure
//!
//! # Examples
//!
//! ## Typed rules
//!
//! ```
//! use formcheck_validation::{Checker, Email, FieldRules, Form, InRange, Phone, Required};
//!
//! let checker = Checker::new()
//!     .field(FieldRules::for_field("email").add(Required).add(Email))
//!     .field(FieldRules::for_field("phone").add(Phone))
//!     .field(FieldRules::for_field("stars").add(Required).add(InRange { min: 3.0, max: 5.0 }));
//!
//! let form = Form::new()
//!     .with_value("phone", "0012345678901")
//!     .with_value("stars", "2");
//!
//! let errors = checker.check(&form).unwrap();
//! assert_eq!(errors.to_strings()["email"], ["required"]);
//! assert_eq!(errors.to_strings()["stars"], ["min:3"]);
//! assert!(!errors.has("phone"));
//! ```
//!
//! ## Textual rules
//!
//! ```
//! use formcheck_validation::{Checker, Form, RuleParser};
//!
//! let checker = Checker::from_rule_strings(
//!     [("name", "required,alpha"), ("site", "url")],
//!     &RuleParser::new(),
//! )
//! .unwrap();
//!
//! let form = Form::from_urlencoded(b"name=Ada&site=ex%20ample.com").unwrap();
//! let errors = checker.check(&form).unwrap();
//! assert_eq!(errors.first("site").unwrap().to_string(), "notURL");
//! ```
//!
//! ## Single predicates
//!
//! ```
//! use formcheck_validation::{Email, Max, MinLength};
//!
//! assert!(Email.validate("a@a.aa").is_ok());
//! assert!(Max(10.0).validate("11").is_err());
//! assert!(MinLength(3).validate("ab").is_err());
//! ```

mod errors;
mod file;
mod form;
mod parse;
#[cfg(feature = "i18n")]
mod render;
mod rules;
mod traits;
mod unique;
mod url;
mod validators;

pub use errors::*;
pub use file::{
    FileHandle, FileSizeRange, FileType, IMAGE_TYPES, Image, MaxFileSize, MinFileSize, SNIFF_LEN,
    Source, detect_content_type,
};
pub use form::{Form, FormError};
pub use parse::RuleParser;
#[cfg(feature = "i18n")]
pub use render::{Translator, default_template};
pub use rules::*;
pub use traits::{Context, Input, Rule, RuleFn, rule_fn};
pub use unique::{MemoryStore, StoreError, Unique, UniqueQuery, UniqueStore};
pub use url::is_url;
pub use validators::*;
