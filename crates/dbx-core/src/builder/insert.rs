//! INSERT statement builder.

use crate::buffer::{Buffer, Builder};
use crate::dialect::Dialect;
use crate::error::{DbxError, Result};
use crate::util::join_idents;
use crate::value::SqlValue;

/// An INSERT statement with one or more value rows.
#[derive(Clone)]
pub struct Insert<'d> {
    dialect: &'d dyn Dialect,
    table: String,
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
    returning: Vec<String>,
}

impl<'d> Insert<'d> {
    /// Creates an empty INSERT bound to `dialect`.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            table: String::new(),
            columns: Vec::new(),
            rows: Vec::new(),
            returning: Vec::new(),
        }
    }

    /// Sets the target table.
    #[must_use]
    pub fn into_table(mut self, table: &str) -> Self {
        self.table = String::from(table);
        self
    }

    /// Appends target columns.
    #[must_use]
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns.extend(cols.iter().map(|c| String::from(*c)));
        self
    }

    /// Appends a row of values, one per column.
    #[must_use]
    pub fn values(mut self, row: Vec<SqlValue>) -> Self {
        self.rows.push(row);
        self
    }

    /// Requests the given columns back from the inserted rows.
    #[must_use]
    pub fn returning(mut self, cols: &[&str]) -> Self {
        self.returning.extend(cols.iter().map(|c| String::from(*c)));
        self
    }

    /// Compiles with the bound dialect.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::TableNotSpecified`], [`DbxError::ColumnNotSpecified`],
    /// [`DbxError::PlaceholderCount`] for a row whose width differs from the
    /// column count, or [`DbxError::UnsupportedFeature`] for RETURNING on a
    /// dialect without it.
    pub fn to_sql(&self) -> Result<(String, Vec<SqlValue>)> {
        crate::buffer::to_sql(self.dialect, self)
    }

    /// Compiles with every argument inlined. For logging only.
    ///
    /// # Errors
    ///
    /// Same as [`Insert::to_sql`].
    pub fn to_raw_sql(&self) -> Result<String> {
        crate::buffer::to_raw_sql(self.dialect, self)
    }
}

impl Builder for Insert<'_> {
    fn build(&self, dialect: &dyn Dialect, buf: &mut Buffer) -> Result<()> {
        if self.table.is_empty() {
            return Err(DbxError::TableNotSpecified);
        }
        if self.columns.is_empty() {
            return Err(DbxError::ColumnNotSpecified);
        }
        if self.rows.is_empty() {
            return Err(DbxError::PlaceholderCount {
                expected: self.columns.len(),
                actual: 0,
            });
        }

        buf.write("INSERT INTO ");
        buf.write(&dialect.quote_ident(&self.table));
        buf.write(" (");
        buf.write(&join_idents(dialect, &self.columns, ", "));
        buf.write(") VALUES ");

        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(DbxError::PlaceholderCount {
                    expected: self.columns.len(),
                    actual: row.len(),
                });
            }
            if i > 0 {
                buf.write(", ");
            }
            buf.write("(");
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    buf.write(", ");
                }
                buf.bind(value.clone());
            }
            buf.write(")");
        }

        if !self.returning.is_empty() {
            if !dialect.supports_returning() {
                return Err(DbxError::UnsupportedFeature(format!(
                    "RETURNING on {}",
                    dialect.name()
                )));
            }
            buf.write(" RETURNING ");
            buf.write(&join_idents(dialect, &self.returning, ", "));
        }
        Ok(())
    }
}
