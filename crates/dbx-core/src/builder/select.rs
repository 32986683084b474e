//! SELECT statement builder.

use super::{build_order_limit, ConditionList};
use crate::buffer::{Buffer, Builder};
use crate::condition::{Condition, Conjunction};
use crate::dialect::Dialect;
use crate::error::{DbxError, Result};
use crate::value::SqlValue;

/// Join flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `RIGHT JOIN`
    Right,
    /// `FULL JOIN`
    Full,
}

impl JoinKind {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Inner => " INNER JOIN ",
            Self::Left => " LEFT JOIN ",
            Self::Right => " RIGHT JOIN ",
            Self::Full => " FULL JOIN ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Join {
    kind: JoinKind,
    table: String,
    on: Condition,
}

/// A SELECT statement.
#[derive(Clone)]
pub struct Select<'d> {
    dialect: &'d dyn Dialect,
    distinct: bool,
    columns: Vec<String>,
    table: String,
    joins: Vec<Join>,
    where_cond: ConditionList,
    group_by: Vec<String>,
    having_cond: ConditionList,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<'d> Select<'d> {
    /// Creates an empty SELECT bound to `dialect`.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            distinct: false,
            columns: Vec::new(),
            table: String::new(),
            joins: Vec::new(),
            where_cond: ConditionList::default(),
            group_by: Vec::new(),
            having_cond: ConditionList::default(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Appends result columns. Column text is written as given.
    #[must_use]
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns.extend(cols.iter().map(|c| String::from(*c)));
        self
    }

    /// Sets the source table.
    #[must_use]
    pub fn from(mut self, table: &str) -> Self {
        self.table = String::from(table);
        self
    }

    /// Sets DISTINCT.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds a join of the given kind.
    #[must_use]
    pub fn join(mut self, kind: JoinKind, table: &str, on: impl Into<Condition>) -> Self {
        self.joins.push(Join {
            kind,
            table: String::from(table),
            on: on.into(),
        });
        self
    }

    /// Adds an INNER JOIN.
    #[must_use]
    pub fn inner_join(self, table: &str, on: impl Into<Condition>) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    /// Adds a LEFT JOIN.
    #[must_use]
    pub fn left_join(self, table: &str, on: impl Into<Condition>) -> Self {
        self.join(JoinKind::Left, table, on)
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

    /// Appends GROUP BY expressions.
    #[must_use]
    pub fn group_by(mut self, cols: &[&str]) -> Self {
        self.group_by.extend(cols.iter().map(|c| String::from(*c)));
        self
    }

    /// Appends a HAVING entry joined with AND.
    #[must_use]
    pub fn and_having(mut self, cond: impl Into<Condition>) -> Self {
        self.having_cond.push(Conjunction::And, cond.into());
        self
    }

    /// Appends a HAVING entry joined with OR.
    #[must_use]
    pub fn or_having(mut self, cond: impl Into<Condition>) -> Self {
        self.having_cond.push(Conjunction::Or, cond.into());
        self
    }

    /// Appends a HAVING expression with arguments, joined with AND.
    #[must_use]
    pub fn and_having_expr(self, sql: &str, args: Vec<SqlValue>) -> Self {
        self.and_having(Condition::expr(sql, args))
    }

    /// Appends a HAVING expression with arguments, joined with OR.
    #[must_use]
    pub fn or_having_expr(self, sql: &str, args: Vec<SqlValue>) -> Self {
        self.or_having(Condition::expr(sql, args))
    }

    /// Appends ORDER BY expressions.
    #[must_use]
    pub fn order_by(mut self, cols: &[&str]) -> Self {
        self.order_by.extend(cols.iter().map(|c| String::from(*c)));
        self
    }

    /// Appends descending ORDER BY expressions.
    #[must_use]
    pub fn order_by_desc(mut self, cols: &[&str]) -> Self {
        self.order_by.extend(cols.iter().map(|c| format!("{c} DESC")));
        self
    }

    /// Sets LIMIT.
    #[must_use]
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets OFFSET.
    #[must_use]
    pub const fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Compiles with the bound dialect.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::TableNotSpecified`] without a FROM table, or the
    /// first condition compile error.
    pub fn to_sql(&self) -> Result<(String, Vec<SqlValue>)> {
        crate::buffer::to_sql(self.dialect, self)
    }

    /// Compiles with every argument inlined. For logging only.
    ///
    /// # Errors
    ///
    /// Same as [`Select::to_sql`].
    pub fn to_raw_sql(&self) -> Result<String> {
        crate::buffer::to_raw_sql(self.dialect, self)
    }
}

impl Builder for Select<'_> {
    fn build(&self, dialect: &dyn Dialect, buf: &mut Buffer) -> Result<()> {
        if self.table.is_empty() {
            return Err(DbxError::TableNotSpecified);
        }
        buf.write("SELECT ");
        if self.distinct {
            buf.write("DISTINCT ");
        }
        if self.columns.is_empty() {
            buf.write("*");
        } else {
            buf.write(&self.columns.join(", "));
        }
        buf.write(" FROM ");
        buf.write(&dialect.quote_ident(&self.table));

        for join in &self.joins {
            buf.write(join.kind.keyword());
            buf.write(&dialect.quote_ident(&join.table));
            buf.write(" ON ");
            join.on.build(dialect, buf)?;
        }

        self.where_cond.build(" WHERE ", dialect, buf)?;

        if !self.group_by.is_empty() {
            buf.write(" GROUP BY ");
            buf.write(&self.group_by.join(", "));
        }

        self.having_cond.build(" HAVING ", dialect, buf)?;

        build_order_limit(buf, &self.order_by, self.limit);
        if let Some(n) = self.offset {
            buf.write(&format!(" OFFSET {n}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{eq, gt, or};
    use crate::dialect::{MySql, Postgres, Sqlite};
    use crate::sql_args;

    #[test]
    fn test_simple_select() {
        let (sql, args) = Select::new(&Sqlite)
            .columns(&["id", "name"])
            .from("users")
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT id, name FROM \"users\"");
        assert!(args.is_empty());
    }

    #[test]
    fn test_select_all_distinct() {
        let (sql, _) = Select::new(&MySql).distinct().from("t").to_sql().unwrap();
        assert_eq!(sql, "SELECT DISTINCT * FROM `t`");
    }

    #[test]
    fn test_and_where_then_or_where() {
        let (sql, args) = Select::new(&Sqlite)
            .from("t")
            .and_where_expr("a = ?", sql_args![1])
            .or_where_expr("b = ?", sql_args![2])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT * FROM \"t\" WHERE (a = ?) OR (b = ?)");
        assert_eq!(args, sql_args![1, 2]);
    }

    #[test]
    fn test_single_where_not_wrapped() {
        let (sql, _) = Select::new(&Sqlite)
            .from("t")
            .and_where("a = 1")
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT * FROM \"t\" WHERE a = 1");
    }

    #[test]
    fn test_later_or_does_not_rewrite_earlier_and() {
        let (sql, _) = Select::new(&Sqlite)
            .from("t")
            .and_where("a")
            .and_where("b")
            .or_where("c")
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT * FROM \"t\" WHERE (a) AND (b) OR (c)");
    }

    #[test]
    fn test_having_goes_to_having() {
        let (sql, args) = Select::new(&Postgres)
            .columns(&["dept", "count(*)"])
            .from("emp")
            .and_where(eq("active", true))
            .group_by(&["dept"])
            .and_having_expr("count(*) > ?", sql_args![5])
            .or_having("count(*) = 0")
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT dept, count(*) FROM \"emp\" WHERE \"active\" = $1 \
             GROUP BY dept HAVING (count(*) > $2) OR (count(*) = 0)"
        );
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_full_clause_order() {
        let (sql, args) = Select::new(&Postgres)
            .columns(&["u.id"])
            .from("users")
            .left_join("orders", "orders.user_id = users.id")
            .and_where(or([gt("age", 18), eq("vip", true)]))
            .order_by_desc(&["u.id"])
            .limit(10)
            .offset(20)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT u.id FROM \"users\" LEFT JOIN \"orders\" ON orders.user_id = users.id \
             WHERE (\"age\" > $1) OR (\"vip\" = $2) ORDER BY u.id DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_missing_table() {
        let err = Select::new(&Sqlite).columns(&["a"]).to_sql().unwrap_err();
        assert!(matches!(err, DbxError::TableNotSpecified));
    }

    #[test]
    fn test_placeholder_mismatch_surfaces() {
        let err = Select::new(&Sqlite)
            .from("t")
            .and_where_expr("a = ? AND b = ?", sql_args![1])
            .to_sql()
            .unwrap_err();
        assert!(matches!(err, DbxError::PlaceholderCount { .. }));
    }

    #[test]
    fn test_raw_sql() {
        let sql = Select::new(&MySql)
            .from("users")
            .and_where(eq("name", "O'Brien"))
            .to_raw_sql()
            .unwrap();
        assert_eq!(sql, "SELECT * FROM `users` WHERE `name` = 'O''Brien'");
    }
}
