//! Submitted form data: text values and uploaded files per field.

use crate::FileHandle;
use std::collections::HashMap;
use thiserror::Error;

/// Errors building a [`Form`] from a request body.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("failed to parse form data: {0}")]
    Decode(#[from] serde_urlencoded::de::Error),
}

/// Values and files submitted for each field.
///
/// A field may carry several values (`tag=a&tag=b`) and several files.
#[derive(Debug, Default)]
pub struct Form {
    values: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<FileHandle>>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` body, keeping repeated
    /// keys as multiple values.
    pub fn from_urlencoded(body: &[u8]) -> Result<Self, FormError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
        Ok(pairs.into_iter().collect())
    }

    /// Builder form of [`Form::add_value`].
    pub fn with_value(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_value(field, value);
        self
    }

    /// Builder form of [`Form::add_file`].
    pub fn with_file(mut self, field: impl Into<String>, file: FileHandle) -> Self {
        self.add_file(field, file);
        self
    }

    pub fn add_value(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values
            .entry(field.into())
            .or_default()
            .push(value.into());
    }

    pub fn add_file(&mut self, field: impl Into<String>, file: FileHandle) {
        self.files.entry(field.into()).or_default().push(file);
    }

    /// Values of `field`, `None` when it was not submitted as text.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.values.get(field).map(Vec::as_slice)
    }

    /// Values of `field`, empty when it was not submitted.
    pub fn values(&self, field: &str) -> &[String] {
        self.get(field).unwrap_or_default()
    }

    /// First value of `field`.
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values(field).first().map(String::as_str)
    }

    pub fn files(&self, field: &str) -> &[FileHandle] {
        self.files.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether any value or file was submitted for `field`, empty or not.
    pub fn contains(&self, field: &str) -> bool {
        !self.values(field).is_empty() || !self.files(field).is_empty()
    }

    /// Whether `field` has a non-empty value or a file.
    pub fn is_present(&self, field: &str) -> bool {
        self.values(field).iter().any(|v| !v.is_empty()) || !self.files(field).is_empty()
    }

    /// Names of all submitted fields.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        let mut names: Vec<&str> = self
            .values
            .keys()
            .chain(self.files.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names.into_iter()
    }

    /// Combine two sources, e.g. query string and multipart body. Values
    /// and files of both are kept.
    pub fn merge(&mut self, other: Form) {
        for (field, values) in other.values {
            self.values.entry(field).or_default().extend(values);
        }
        for (field, files) in other.files {
            self.files.entry(field).or_default().extend(files);
        }
    }
}

impl From<HashMap<String, Vec<String>>> for Form {
    fn from(values: HashMap<String, Vec<String>>) -> Self {
        Self {
            values,
            files: HashMap::new(),
        }
    }
}

/// One value per field.
impl From<HashMap<String, String>> for Form {
    fn from(values: HashMap<String, String>) -> Self {
        values.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Form
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Form::new();
        for (field, value) in iter {
            form.add_value(field, value);
        }
        form
    }
}
