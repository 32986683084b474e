//! DELETE statement builder.

use super::{build_order_limit, ConditionList};
use crate::buffer::{Buffer, Builder};
use crate::condition::{Condition, Conjunction};
use crate::dialect::Dialect;
use crate::error::{DbxError, Result};
use crate::value::SqlValue;

/// A DELETE statement.
#[derive(Clone)]
pub struct Delete<'d> {
    dialect: &'d dyn Dialect,
    table: String,
    where_cond: ConditionList,
    order_by: Vec<String>,
    limit: Option<u64>,
}

impl<'d> Delete<'d> {
    /// Creates a DELETE from `table` bound to `dialect`.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect, table: &str) -> Self {
        Self {
            dialect,
            table: String::from(table),
            where_cond: ConditionList::default(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Appends a WHERE entry joined with AND.
    #[must_use]
    pub fn and_where(mut self, cond: impl Into<Condition>) -> Self {
        self.where_cond.push(Conjunction::And, cond.into());
        self
    }

    /// Appends a WHERE entry joined with OR.
    #[must_use]
    pub fn or_where(mut self, cond: impl Into<Condition>) -> Self {
        self.where_cond.push(Conjunction::Or, cond.into());
        self
    }

    /// Appends a WHERE expression with arguments, joined with AND.
    #[must_use]
    pub fn and_where_expr(self, sql: &str, args: Vec<SqlValue>) -> Self {
        self.and_where(Condition::expr(sql, args))
    }

    /// Appends a WHERE expression with arguments, joined with OR.
    #[must_use]
    pub fn or_where_expr(self, sql: &str, args: Vec<SqlValue>) -> Self {
        self.or_where(Condition::expr(sql, args))
    }

    /// Appends ORDER BY expressions.
    #[must_use]
    pub fn order_by(mut self, cols: &[&str]) -> Self {
        self.order_by.extend(cols.iter().map(|c| String::from(*c)));
        self
    }

    /// Sets LIMIT.
    #[must_use]
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Compiles with the bound dialect.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::TableNotSpecified`] for an empty table name, or
    /// the first condition compile error.
    pub fn to_sql(&self) -> Result<(String, Vec<SqlValue>)> {
        crate::buffer::to_sql(self.dialect, self)
    }

    /// Compiles with every argument inlined. For logging only.
    ///
    /// # Errors
    ///
    /// Same as [`Delete::to_sql`].
    pub fn to_raw_sql(&self) -> Result<String> {
        crate::buffer::to_raw_sql(self.dialect, self)
    }
}

impl Builder for Delete<'_> {
    fn build(&self, dialect: &dyn Dialect, buf: &mut Buffer) -> Result<()> {
        if self.table.is_empty() {
            return Err(DbxError::TableNotSpecified);
        }
        buf.write("DELETE FROM ");
        buf.write(&dialect.quote_ident(&self.table));
        self.where_cond.build(" WHERE ", dialect, buf)?;
        build_order_limit(buf, &self.order_by, self.limit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{in_list, lt};
    use crate::dialect::{Postgres, Sqlite};

    #[test]
    fn test_delete_all() {
        let (sql, args) = Delete::new(&Sqlite, "logs").to_sql().unwrap();
        assert_eq!(sql, "DELETE FROM \"logs\"");
        assert!(args.is_empty());
    }

    #[test]
    fn test_delete_where() {
        let (sql, args) = Delete::new(&Postgres, "logs")
            .and_where(lt("age", 30))
            .or_where(in_list("level", vec!["debug", "trace"]))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "DELETE FROM \"logs\" WHERE (\"age\" < $1) OR (\"level\" IN ($2,$3))"
        );
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_delete_requires_table() {
        let err = Delete::new(&Sqlite, "").to_sql().unwrap_err();
        assert!(matches!(err, DbxError::TableNotSpecified));
    }
}
