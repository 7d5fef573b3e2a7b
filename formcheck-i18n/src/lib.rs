//! Message catalogs for rendering formcheck failures in other languages.
//!
//! - **Locales**: parse BCP 47 tags and derive their fallback chain
//! - **Bundles**: per-locale templates loaded from JSON or built in code
//! - **Lookup**: locale → language → fallback locale → default locale
//!
//! # Quick Start
//!
//! ```rust
//! use formcheck_i18n::{I18n, Locale, MessageBundle};
//!
//! let i18n = I18n::new().with_default_locale(Locale::en());
//! i18n.add_bundle(
//!     &Locale::fr(),
//!     MessageBundle::new().with("required", "Ce champ est obligatoire."),
//! );
//!
//! let fr_ca: Locale = "fr-CA".parse().unwrap();
//! assert_eq!(i18n.t("required", &fr_ca), "Ce champ est obligatoire.");
//! ```

mod error;
mod locale;
mod messages;

pub use error::I18nError;
pub use locale::Locale;
pub use messages::{I18n, MessageBundle, Messages};

/// Result type for i18n operations
pub type Result<T> = std::result::Result<T, I18nError>;
