//! Human-readable failure messages.
//!
//! Templates are looked up by failure kind (`min`, `notEmail`, ...) in the
//! bundles of a [`formcheck_i18n::I18n`] catalog, with built-in English
//! templates as the last resort. A message for one field can be replaced
//! through the key `custom.<field>.<kind>`.
//!
//! Templates refer to failure arguments by position: `{0}`, `{1}`, ...

use crate::{Arg, Errors, Failure, FailureKind};
use formcheck_i18n::{I18n, Locale, MessageBundle};
use std::collections::BTreeMap;

/// Built-in English template for `kind`.
pub fn default_template(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::NotAlpha => "Only letters are allowed.",
        FailureKind::NotEmail => "This is not a valid email address.",
        FailureKind::NotInteger => "This is not a whole number.",
        FailureKind::NotNumber => "This is not a number.",
        FailureKind::NotPhone => "This is not a valid phone number.",
        FailureKind::NotLatitude => "This is not a valid latitude.",
        FailureKind::NotLongitude => "This is not a valid longitude.",
        FailureKind::NotUrl => "This is not a valid URL.",
        FailureKind::Min => "The value must be at least {0}.",
        FailureKind::Max => "The value must be at most {0}.",
        FailureKind::MinLen => "Use at least {0} characters.",
        FailureKind::MaxLen => "Use at most {0} characters.",
        FailureKind::MinFileSize => "The file must be at least {0} bytes.",
        FailureKind::MaxFileSize => "The file must be at most {0} bytes.",
        FailureKind::BadFileType => "The file type must be one of: {0}.",
        FailureKind::NotImage => "The file must be a GIF, JPEG or PNG image.",
        FailureKind::NotSame => "The value must match {0}.",
        FailureKind::NotUnique => "This value is already taken.",
        FailureKind::Required => "This field is required.",
    }
}

/// Renders failures for a locale.
///
/// # Examples
///
/// ```
/// use formcheck_i18n::{Locale, MessageBundle};
/// use formcheck_validation::{Arg, Failure, FailureKind, Translator};
///
/// let translator = Translator::new();
/// translator.add_bundle(&Locale::fr(), MessageBundle::new().with("min", "Au moins {0}."));
///
/// let failure = Failure::new(FailureKind::Min).with_arg(Arg::Number(3.0));
/// assert_eq!(translator.render("stars", &failure, &Locale::fr()), "Au moins 3.");
/// assert_eq!(
///     translator.render("stars", &failure, &Locale::de()),
///     "The value must be at least 3."
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Translator {
    i18n: I18n,
}

impl Translator {
    /// Translator with only the built-in English templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing catalog, e.g. one loaded with
    /// [`I18n::load_from_dir`].
    pub fn with_i18n(i18n: I18n) -> Self {
        Self { i18n }
    }

    pub fn i18n(&self) -> &I18n {
        &self.i18n
    }

    pub fn add_bundle(&self, locale: &Locale, bundle: MessageBundle) {
        self.i18n.add_bundle(locale, bundle);
    }

    /// Replace the message of `kind` for one field.
    pub fn override_message(
        &self,
        locale: &Locale,
        field: &str,
        kind: FailureKind,
        template: impl Into<String>,
    ) {
        self.i18n.add_bundle(
            locale,
            MessageBundle::new().with(override_key(field, kind), template),
        );
    }

    /// Message for one failure of `field`.
    pub fn render(&self, field: &str, failure: &Failure, locale: &Locale) -> String {
        let custom = override_key(field, failure.kind);
        let template = self
            .i18n
            .lookup_any(&[custom.as_str(), failure.kind.as_str()], locale)
            .unwrap_or_else(|| default_template(failure.kind).to_string());

        let args: Vec<String> = failure
            .args
            .iter()
            .map(|arg| self.render_arg(arg, locale))
            .collect();

        interpolate(&template, &args)
    }

    /// Messages for every failure, keyed by field.
    pub fn render_all(&self, errors: &Errors, locale: &Locale) -> BTreeMap<String, Vec<String>> {
        errors
            .iter()
            .map(|(field, failures)| {
                let messages = failures
                    .iter()
                    .map(|failure| self.render(field, failure, locale))
                    .collect();
                (field.to_string(), messages)
            })
            .collect()
    }

    fn render_arg(&self, arg: &Arg, locale: &Locale) -> String {
        match arg {
            Arg::List(items) => items
                .iter()
                .map(|item| self.i18n.lookup(item, locale).unwrap_or_else(|| item.clone()))
                .collect::<Vec<_>>()
                .join(", "),
            Arg::Message(key) => self.i18n.t(key, locale),
            other => other.to_string(),
        }
    }
}

fn override_key(field: &str, kind: FailureKind) -> String {
    format!("custom.{}.{}", field, kind.as_str())
}

/// Replace `{0}`, `{1}`, ... with `args`. Unknown positions are left as is.
fn interpolate(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let replaced = after.find('}').and_then(|end| {
            let arg = after[..end].parse::<usize>().ok().and_then(|i| args.get(i))?;
            Some((arg, end))
        });

        match replaced {
            Some((arg, end)) => {
                out.push_str(arg);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min3() -> Failure {
        Failure::new(FailureKind::Min).with_arg(Arg::Number(3.0))
    }

    #[test]
    fn test_every_kind_has_a_template() {
        for kind in FailureKind::ALL {
            assert!(!default_template(kind).is_empty());
        }
    }

    #[test]
    fn test_default_templates() {
        let translator = Translator::new();
        let en = Locale::en();

        assert_eq!(translator.render("stars", &min3(), &en), "The value must be at least 3.");
        assert_eq!(
            translator.render("email", &Failure::required(), &en),
            "This field is required."
        );
    }

    #[test]
    fn test_list_arguments_are_joined() {
        let failure = Failure::new(FailureKind::BadFileType)
            .with_arg(Arg::List(vec!["image/png".into(), "image/gif".into()]));

        assert_eq!(
            Translator::new().render("avatar", &failure, &Locale::en()),
            "The file type must be one of: image/png, image/gif."
        );
    }

    #[test]
    fn test_locale_fallback() {
        let translator = Translator::new();
        translator.add_bundle(
            &Locale::fr(),
            MessageBundle::new().with("min", "La valeur doit être au moins {0}."),
        );

        let fr_ca = Locale::parse("fr-CA").unwrap();
        assert_eq!(
            translator.render("stars", &min3(), &fr_ca),
            "La valeur doit être au moins 3."
        );
        assert_eq!(
            translator.render("stars", &min3(), &Locale::de()),
            "The value must be at least 3."
        );
    }

    #[test]
    fn test_bundle_templates_are_positional() {
        let translator = Translator::new();
        translator.add_bundle(
            &Locale::fr(),
            MessageBundle::new()
                .with("min", "Au moins {0}.")
                .with("max", "Au plus {max}."),
        );

        let max5 = Failure::new(FailureKind::Max).with_arg(Arg::Number(5.0));
        assert_eq!(translator.render("stars", &min3(), &Locale::fr()), "Au moins 3.");
        assert_eq!(translator.render("stars", &max5, &Locale::fr()), "Au plus {max}.");
    }

    #[test]
    fn test_override_for_field() {
        let translator = Translator::new();
        translator.override_message(&Locale::en(), "stars", FailureKind::Min, "Give us {0} stars.");

        assert_eq!(translator.render("stars", &min3(), &Locale::en()), "Give us 3 stars.");
        assert_eq!(
            translator.render("rating", &min3(), &Locale::en()),
            "The value must be at least 3."
        );
    }

    #[test]
    fn test_translatable_arguments() {
        let translator = Translator::new();
        translator.add_bundle(
            &Locale::fr(),
            MessageBundle::new()
                .with("notSame", "Doit correspondre à {0}.")
                .with("field.password", "mot de passe"),
        );

        let failure = Failure::new(FailureKind::NotSame)
            .with_arg(Arg::Message("field.password".into()));
        assert_eq!(
            translator.render("confirm", &failure, &Locale::fr()),
            "Doit correspondre à mot de passe."
        );

        let listed = Failure::new(FailureKind::NotSame)
            .with_arg(Arg::List(vec!["field.password".into(), "other".into()]));
        assert_eq!(
            translator.render("confirm", &listed, &Locale::fr()),
            "Doit correspondre à mot de passe, other."
        );
    }

    #[test]
    fn test_render_all() {
        let mut errors = Errors::new();
        errors.add("stars", min3());
        errors.add("email", Failure::required());

        let rendered = Translator::new().render_all(&errors, &Locale::en());
        assert_eq!(rendered["email"], ["This field is required."]);
        assert_eq!(rendered["stars"], ["The value must be at least 3."]);
    }

    #[test]
    fn test_interpolate() {
        let args = vec!["a".to_string(), "b".to_string()];
        assert_eq!(interpolate("{1}-{0}", &args), "b-a");
        assert_eq!(interpolate("{2} {x} {", &args), "{2} {x} {");
        assert_eq!(interpolate("no args", &[]), "no args");
    }
}
