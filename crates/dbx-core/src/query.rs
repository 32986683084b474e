//! The execution collaborator.
//!
//! The engine never opens connections. Catalog introspection and schema
//! sessions go through a [`Query`] implementation supplied by the caller,
//! and decode result rows with [`FromRow`].

use crate::error::{DbxError, Result};
use crate::value::SqlValue;

/// One result row: column names and values in select order.
///
/// Lookups by name are case-insensitive, since catalogs disagree on the
/// case of their column names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    /// Creates a row from name/value pairs.
    #[must_use]
    pub const fn new(columns: Vec<(String, SqlValue)>) -> Self {
        Self { columns }
    }

    /// Returns the value of `name`, if the column exists.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Returns the first column's value.
    #[must_use]
    pub fn first(&self) -> Option<&SqlValue> {
        self.columns.first().map(|(_, value)| value)
    }

    /// Iterates over name/value pairs.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the non-NULL text of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::InvalidValue`] when the column is missing or NULL.
    pub fn text(&self, name: &str) -> Result<String> {
        self.opt_text(name)
            .ok_or_else(|| DbxError::InvalidValue(format!("missing column '{name}'")))
    }

    /// Returns the text of `name`, or `None` when missing or NULL.
    #[must_use]
    pub fn opt_text(&self, name: &str) -> Option<String> {
        self.get(name).and_then(SqlValue::as_text)
    }

    /// Returns the integer value of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::InvalidValue`] when the column is missing, NULL
    /// or not numeric.
    pub fn int(&self, name: &str) -> Result<i64> {
        self.opt_int(name)
            .ok_or_else(|| DbxError::InvalidValue(format!("column '{name}' is not an integer")))
    }

    /// Returns the integer value of `name`, or `None`.
    #[must_use]
    pub fn opt_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(SqlValue::as_i64)
    }

    /// Returns the boolean value of `name`, or `None`.
    #[must_use]
    pub fn opt_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(SqlValue::as_bool)
    }
}

/// Decodes one result row, keyed by catalog column names.
pub trait FromRow: Sized {
    /// Decodes `row`.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::InvalidValue`] when a required column is absent
    /// or has the wrong shape.
    fn from_row(row: &Row) -> Result<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(row.clone())
    }
}

impl FromRow for i64 {
    fn from_row(row: &Row) -> Result<Self> {
        row.first()
            .and_then(SqlValue::as_i64)
            .ok_or_else(|| DbxError::InvalidValue(String::from("expected an integer column")))
    }
}

impl FromRow for String {
    fn from_row(row: &Row) -> Result<Self> {
        row.first()
            .and_then(SqlValue::as_text)
            .ok_or_else(|| DbxError::InvalidValue(String::from("expected a text column")))
    }
}

/// Executes SQL on behalf of the engine.
pub trait Query {
    /// Runs a statement that returns no rows; returns the affected count.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::Query`] when the driver fails.
    fn execute(&self, sql: &str, args: &[SqlValue]) -> Result<u64>;

    /// Runs a query and returns every row.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::Query`] when the driver fails.
    fn query(&self, sql: &str, args: &[SqlValue]) -> Result<Vec<Row>>;
}

/// Typed loading on top of [`Query`].
pub trait QueryExt: Query {
    /// Runs a query and decodes every row; returns the row count and the
    /// decoded rows.
    ///
    /// # Errors
    ///
    /// Returns the driver error or the first decode error.
    fn query_and_load<T: FromRow>(&self, sql: &str, args: &[SqlValue]) -> Result<(usize, Vec<T>)> {
        let rows = self.query(sql, args)?;
        let loaded = rows.iter().map(T::from_row).collect::<Result<Vec<T>>>()?;
        Ok((loaded.len(), loaded))
    }
}

impl<Q: Query + ?Sized> QueryExt for Q {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Canned {
        rows: Vec<Row>,
        seen: RefCell<Vec<String>>,
    }

    impl Query for Canned {
        fn execute(&self, sql: &str, _args: &[SqlValue]) -> Result<u64> {
            self.seen.borrow_mut().push(String::from(sql));
            Ok(0)
        }

        fn query(&self, sql: &str, _args: &[SqlValue]) -> Result<Vec<Row>> {
            self.seen.borrow_mut().push(String::from(sql));
            Ok(self.rows.clone())
        }
    }

    fn row() -> Row {
        Row::new(vec![
            (String::from("COLUMN_NAME"), SqlValue::Text(String::from("id"))),
            (String::from("position"), SqlValue::Text(String::from("3"))),
            (String::from("nullable"), SqlValue::Text(String::from("YES"))),
            (String::from("comment"), SqlValue::Null),
        ])
    }

    #[test]
    fn test_row_lookup_is_case_insensitive() {
        let row = row();
        assert_eq!(row.text("column_name").unwrap(), "id");
        assert_eq!(row.int("POSITION").unwrap(), 3);
        assert_eq!(row.opt_bool("nullable"), Some(true));
        assert_eq!(row.opt_text("comment"), None);
        assert!(row.text("missing").is_err());
    }

    #[test]
    fn test_query_and_load_counts_rows() {
        let query = Canned {
            rows: vec![row(), row()],
            seen: RefCell::new(Vec::new()),
        };
        let (count, names): (usize, Vec<String>) =
            query.query_and_load("select 1", &[]).unwrap();
        assert_eq!(count, 2);
        assert_eq!(names, vec!["id", "id"]);
        assert_eq!(query.seen.borrow().as_slice(), ["select 1"]);
    }

    #[test]
    fn test_query_and_load_through_trait_object() {
        let query = Canned {
            rows: vec![Row::new(vec![(String::from("count(*)"), SqlValue::Int(4))])],
            seen: RefCell::new(Vec::new()),
        };
        let query: &dyn Query = &query;
        let (_, counts): (usize, Vec<i64>) = query.query_and_load("select count(*)", &[]).unwrap();
        assert_eq!(counts, vec![4]);
    }
}
