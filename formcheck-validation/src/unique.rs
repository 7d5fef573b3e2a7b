// Uniqueness against a backing store

use crate::{CheckError, Context, Failure, FailureKind, Input, Rule};
use formcheck_log::{debug, error};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Error reported by a [`UniqueStore`].
pub type StoreError = Box<dyn StdError + Send + Sync>;

/// Where a value must not already exist. The strings are passed through
/// to the store untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueQuery {
    pub table: String,
    pub column: String,
    /// Bind parameter marker of the store's SQL dialect, e.g. `?` or `$1`
    pub placeholder: String,
}

impl UniqueQuery {
    /// `SELECT COUNT(*) FROM <table> WHERE <column> = <placeholder>`
    pub fn sql(&self) -> String {
        format!(
            "SELECT COUNT(*) FROM {} WHERE {} = {}",
            self.table, self.column, self.placeholder
        )
    }
}

/// Counts rows matching a value.
///
/// Implementations usually run [`UniqueQuery::sql`] with `value` bound to
/// the placeholder. A failed lookup must be an `Err`, never a zero count.
pub trait UniqueStore: Send + Sync {
    fn count(&self, query: &UniqueQuery, value: &str) -> Result<u64, StoreError>;
}

/// Value must not exist in the store yet.
///
/// Not consulted once the field has another failure.
#[derive(Clone)]
pub struct Unique {
    store: Arc<dyn UniqueStore>,
    query: UniqueQuery,
}

impl Unique {
    pub fn new(
        store: Arc<dyn UniqueStore>,
        table: impl Into<String>,
        column: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            store,
            query: UniqueQuery {
                table: table.into(),
                column: column.into(),
                placeholder: placeholder.into(),
            },
        }
    }

    pub fn query(&self) -> &UniqueQuery {
        &self.query
    }
}

impl fmt::Debug for Unique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unique")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

impl Rule for Unique {
    fn name(&self) -> &'static str {
        "unique"
    }

    fn check(&self, input: Input<'_>, ctx: &Context<'_>) -> Result<Vec<Failure>, CheckError> {
        let Some(value) = input.as_value() else {
            return Ok(Vec::new());
        };

        if ctx.field_has_failures() {
            debug!(
                target: "formcheck::unique",
                "skipping lookup in {}.{} for field {}: field already failed",
                self.query.table,
                self.query.column,
                ctx.field()
            );
            return Ok(Vec::new());
        }

        match self.store.count(&self.query, value) {
            Ok(0) => Ok(Vec::new()),
            Ok(_) => Ok(vec![Failure::new(FailureKind::NotUnique)]),
            Err(source) => {
                error!(
                    target: "formcheck::unique",
                    "lookup in {}.{} for field {} failed: {}",
                    self.query.table,
                    self.query.column,
                    ctx.field(),
                    source
                );
                Err(CheckError::Lookup {
                    field: ctx.field().to_string(),
                    source,
                })
            }
        }
    }
}

/// In-memory [`UniqueStore`] keyed by table and column.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<(String, String), HashSet<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, table: &str, column: &str, value: impl Into<String>) {
        self.rows
            .write()
            .entry((table.to_string(), column.to_string()))
            .or_default()
            .insert(value.into());
    }

    /// Builder form of [`MemoryStore::insert`].
    pub fn with(self, table: &str, column: &str, value: impl Into<String>) -> Self {
        self.insert(table, column, value);
        self
    }
}

impl UniqueStore for MemoryStore {
    fn count(&self, query: &UniqueQuery, value: &str) -> Result<u64, StoreError> {
        let rows = self.rows.read();
        let found = rows
            .get(&(query.table.clone(), query.column.clone()))
            .is_some_and(|values| values.contains(value));
        Ok(u64::from(found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Errors, Form};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        calls: AtomicUsize,
        result: fn() -> Result<u64, StoreError>,
    }

    impl UniqueStore for CountingStore {
        fn count(&self, _query: &UniqueQuery, _value: &str) -> Result<u64, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn counting(result: fn() -> Result<u64, StoreError>) -> Arc<CountingStore> {
        Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
            result,
        })
    }

    #[test]
    fn test_sql() {
        let query = UniqueQuery {
            table: "users".into(),
            column: "email".into(),
            placeholder: "$1".into(),
        };
        assert_eq!(query.sql(), "SELECT COUNT(*) FROM users WHERE email = $1");
    }

    #[test]
    fn test_memory_store() {
        let store = Arc::new(MemoryStore::new().with("users", "email", "taken@example.com"));
        let rule = Unique::new(store, "users", "email", "?");
        let form = Form::new();
        let errors = Errors::new();
        let ctx = Context::new("email", &form, &errors);

        assert_eq!(
            rule.check(Input::Value("taken@example.com"), &ctx).unwrap(),
            vec![Failure::new(FailureKind::NotUnique)]
        );
        assert!(rule.check(Input::Value("free@example.com"), &ctx).unwrap().is_empty());
    }

    #[test]
    fn test_skipped_when_field_already_failed() {
        let store = counting(|| Ok(1));
        let rule = Unique::new(store.clone(), "users", "email", "?");
        let form = Form::new();
        let mut errors = Errors::new();
        errors.add("email", Failure::new(FailureKind::NotEmail));

        let failures = rule
            .check(Input::Value("x"), &Context::new("email", &form, &errors))
            .unwrap();
        assert!(failures.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_lookup_failure_is_an_error() {
        let store = counting(|| Err("connection refused".into()));
        let rule = Unique::new(store, "users", "email", "?");
        let form = Form::new();
        let errors = Errors::new();

        let err = rule
            .check(Input::Value("x"), &Context::new("email", &form, &errors))
            .unwrap_err();
        assert!(matches!(err, CheckError::Lookup { ref field, .. } if field == "email"));
        assert!(err.to_string().contains("connection refused"));
    }
}
