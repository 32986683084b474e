//! UPDATE statement builder.

use super::{build_order_limit, ConditionList};
use crate::buffer::{Buffer, Builder};
use crate::condition::{Condition, Conjunction};
use crate::dialect::Dialect;
use crate::error::{DbxError, Result};
use crate::value::{SqlValue, ToSqlValue};

#[derive(Debug, Clone, PartialEq)]
enum Assignment {
    Value(String, SqlValue),
    Expr(String, Condition),
}

/// An UPDATE statement.
#[derive(Clone)]
pub struct Update<'d> {
    dialect: &'d dyn Dialect,
    table: String,
    assignments: Vec<Assignment>,
    where_cond: ConditionList,
    order_by: Vec<String>,
    limit: Option<u64>,
}

impl<'d> Update<'d> {
    /// Creates an UPDATE of `table` bound to `dialect`.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect, table: &str) -> Self {
        Self {
            dialect,
            table: String::from(table),
            assignments: Vec::new(),
            where_cond: ConditionList::default(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Appends `column = ?` bound to `value`.
    #[must_use]
    pub fn set<T: ToSqlValue>(mut self, column: &str, value: T) -> Self {
        self.assignments
            .push(Assignment::Value(String::from(column), value.to_sql_value()));
        self
    }

    /// Appends `column = <sql>` where `sql` may carry placeholders.
    #[must_use]
    pub fn set_expr(mut self, column: &str, sql: &str, args: Vec<SqlValue>) -> Self {
        self.assignments.push(Assignment::Expr(
            String::from(column),
            Condition::expr(sql, args),
        ));
        self
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
    /// Returns [`DbxError::TableNotSpecified`] for an empty table name,
    /// [`DbxError::ColumnNotSpecified`] when nothing is set, or the first
    /// assignment or condition compile error.
    pub fn to_sql(&self) -> Result<(String, Vec<SqlValue>)> {
        crate::buffer::to_sql(self.dialect, self)
    }

    /// Compiles with every argument inlined. For logging only.
    ///
    /// # Errors
    ///
    /// Same as [`Update::to_sql`].
    pub fn to_raw_sql(&self) -> Result<String> {
        crate::buffer::to_raw_sql(self.dialect, self)
    }
}

impl Builder for Update<'_> {
    fn build(&self, dialect: &dyn Dialect, buf: &mut Buffer) -> Result<()> {
        if self.table.is_empty() {
            return Err(DbxError::TableNotSpecified);
        }
        if self.assignments.is_empty() {
            return Err(DbxError::ColumnNotSpecified);
        }
        buf.write("UPDATE ");
        buf.write(&dialect.quote_ident(&self.table));
        buf.write(" SET ");
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                buf.write(", ");
            }
            match assignment {
                Assignment::Value(column, value) => {
                    buf.write(&dialect.quote_ident(column));
                    buf.write(" = ");
                    buf.bind(value.clone());
                }
                Assignment::Expr(column, expr) => {
                    buf.write(&dialect.quote_ident(column));
                    buf.write(" = ");
                    expr.build(dialect, buf)?;
                }
            }
        }
        self.where_cond.build(" WHERE ", dialect, buf)?;
        build_order_limit(buf, &self.order_by, self.limit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::eq;
    use crate::dialect::{MySql, Postgres};
    use crate::sql_args;

    #[test]
    fn test_update_set_where() {
        let (sql, args) = Update::new(&Postgres, "users")
            .set("name", "bob")
            .set_expr("visits", "visits + ?", sql_args![1])
            .and_where(eq("id", 7))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE \"users\" SET \"name\" = $1, \"visits\" = visits + $2 WHERE \"id\" = $3"
        );
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_update_order_limit() {
        let sql = Update::new(&MySql, "jobs")
            .set("done", true)
            .and_where("done = 0")
            .order_by(&["id"])
            .limit(5)
            .to_raw_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE `jobs` SET `done` = 1 WHERE done = 0 ORDER BY id LIMIT 5"
        );
    }

    #[test]
    fn test_update_requires_table() {
        let err = Update::new(&MySql, "").set("a", 1).to_sql().unwrap_err();
        assert!(matches!(err, DbxError::TableNotSpecified));
    }

    #[test]
    fn test_update_requires_assignment() {
        let err = Update::new(&Postgres, "users")
            .and_where(eq("id", 7))
            .to_sql()
            .unwrap_err();
        assert!(matches!(err, DbxError::ColumnNotSpecified));
    }
}
