//! Boolean predicate trees.
//!
//! Conditions never infer operator precedence. A group joins its children
//! left to right using each child's own [`Conjunction`] tag, and wraps
//! every child in parentheses as soon as it has more than one.
//!
//! ```
//! use dbx_core::condition::{eq, gt, or};
//! use dbx_core::dialect::Sqlite;
//! use dbx_core::buffer::to_sql;
//!
//! let cond = or([eq("a", 1), gt("b", 2)]);
//! let (sql, args) = to_sql(&Sqlite, &cond).unwrap();
//! assert_eq!(sql, "(\"a\" = ?) OR (\"b\" > ?)");
//! assert_eq!(args.len(), 2);
//! ```

use crate::buffer::{Buffer, Builder};
use crate::dialect::Dialect;
use crate::error::{DbxError, Result};
use crate::value::{SqlValue, ToSqlValue};

/// How a node is joined to its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Conjunction {
    /// `AND`
    #[default]
    And,
    /// `OR`
    Or,
}

impl Conjunction {
    /// Returns the separator written before a node with this tag.
    #[must_use]
    pub const fn separator(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// A predicate node.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Literal SQL with `?` placeholders and their arguments.
    Expr {
        /// SQL text.
        sql: String,
        /// One argument per `?`.
        args: Vec<SqlValue>,
    },
    /// A quoted column followed by SQL text with `?` placeholders.
    Column {
        /// Column name, quoted by the dialect at compile time.
        column: String,
        /// Operator text following the column, e.g. ` = ?`.
        tail: String,
        /// One argument per `?` in `tail`.
        args: Vec<SqlValue>,
    },
    /// Child nodes, each tagged with the conjunction joining it to its
    /// predecessor. The first child's tag is ignored.
    Group(Vec<(Conjunction, Condition)>),
}

impl Condition {
    /// Creates a condition from SQL text and arguments.
    #[must_use]
    pub fn expr(sql: impl Into<String>, args: Vec<SqlValue>) -> Self {
        Self::Expr {
            sql: sql.into(),
            args,
        }
    }

    /// Creates a condition from SQL text without arguments.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::expr(sql, Vec::new())
    }

    /// Wraps this node as a single-child group tagged with `conjunction`.
    #[must_use]
    pub fn tagged(self, conjunction: Conjunction) -> (Conjunction, Self) {
        (conjunction, Self::Group(vec![(Conjunction::And, self)]))
    }

    /// Joins `self AND other`.
    #[must_use]
    pub fn and(self, other: impl Into<Self>) -> Self {
        Self::Group(vec![
            (Conjunction::And, self),
            (Conjunction::And, other.into()),
        ])
    }

    /// Joins `self OR other`.
    #[must_use]
    pub fn or(self, other: impl Into<Self>) -> Self {
        Self::Group(vec![
            (Conjunction::And, self),
            (Conjunction::Or, other.into()),
        ])
    }
}

impl From<&str> for Condition {
    fn from(sql: &str) -> Self {
        Self::raw(sql)
    }
}

impl From<String> for Condition {
    fn from(sql: String) -> Self {
        Self::raw(sql)
    }
}

impl<S: Into<String>> From<(S, Vec<SqlValue>)> for Condition {
    fn from((sql, args): (S, Vec<SqlValue>)) -> Self {
        Self::expr(sql, args)
    }
}

impl Builder for Condition {
    fn build(&self, dialect: &dyn Dialect, buf: &mut Buffer) -> Result<()> {
        match self {
            Self::Expr { sql, args } => write_placeholders(buf, sql, args),
            Self::Column { column, tail, args } => {
                buf.write(&dialect.quote_ident(column));
                write_placeholders(buf, tail, args)
            }
            Self::Group(children) => compile_conditions(dialect, buf, children),
        }
    }
}

/// Writes a list of tagged nodes.
///
/// Node `i > 0` is preceded by its own tag's separator; with more than one
/// node each node is parenthesized.
///
/// # Errors
///
/// Returns the first compile error of any node.
pub fn compile_conditions(
    dialect: &dyn Dialect,
    buf: &mut Buffer,
    nodes: &[(Conjunction, Condition)],
) -> Result<()> {
    let wrap = nodes.len() > 1;
    for (i, (conjunction, node)) in nodes.iter().enumerate() {
        if i > 0 {
            buf.write(conjunction.separator());
        }
        if wrap {
            buf.write("(");
        }
        node.build(dialect, buf)?;
        if wrap {
            buf.write(")");
        }
    }
    Ok(())
}

/// Byte offsets of the `?` markers outside quoted literals and identifiers.
fn placeholder_offsets(sql: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut quote = None;
    for (i, c) in sql.char_indices() {
        match (quote, c) {
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '?') => offsets.push(i),
            (Some(open), _) if open == c => quote = None,
            _ => {}
        }
    }
    offsets
}

fn write_placeholders(buf: &mut Buffer, sql: &str, args: &[SqlValue]) -> Result<()> {
    let offsets = placeholder_offsets(sql);
    if offsets.len() != args.len() {
        return Err(DbxError::PlaceholderCount {
            expected: offsets.len(),
            actual: args.len(),
        });
    }
    let mut start = 0;
    for (offset, value) in offsets.into_iter().zip(args) {
        buf.write(&sql[start..offset]);
        buf.bind(value.clone());
        start = offset + 1;
    }
    buf.write(&sql[start..]);
    Ok(())
}

fn column(column: &str, tail: impl Into<String>, args: Vec<SqlValue>) -> Condition {
    Condition::Column {
        column: String::from(column),
        tail: tail.into(),
        args,
    }
}

/// Joins all conditions with `AND`.
#[must_use]
pub fn and(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::Group(
        conditions
            .into_iter()
            .map(|c| (Conjunction::And, c))
            .collect(),
    )
}

/// Joins all conditions with `OR`.
#[must_use]
pub fn or(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::Group(
        conditions
            .into_iter()
            .map(|c| (Conjunction::Or, c))
            .collect(),
    )
}

/// `column = value`, or `column IS NULL` for a NULL value.
#[must_use]
pub fn eq<T: ToSqlValue>(col: &str, value: T) -> Condition {
    match value.to_sql_value() {
        SqlValue::Null => is_null(col),
        value => column(col, " = ?", vec![value]),
    }
}

/// `column != value`, or `column IS NOT NULL` for a NULL value.
#[must_use]
pub fn neq<T: ToSqlValue>(col: &str, value: T) -> Condition {
    match value.to_sql_value() {
        SqlValue::Null => is_not_null(col),
        value => column(col, " != ?", vec![value]),
    }
}

/// `column > value`.
#[must_use]
pub fn gt<T: ToSqlValue>(col: &str, value: T) -> Condition {
    column(col, " > ?", vec![value.to_sql_value()])
}

/// `column >= value`.
#[must_use]
pub fn gte<T: ToSqlValue>(col: &str, value: T) -> Condition {
    column(col, " >= ?", vec![value.to_sql_value()])
}

/// `column < value`.
#[must_use]
pub fn lt<T: ToSqlValue>(col: &str, value: T) -> Condition {
    column(col, " < ?", vec![value.to_sql_value()])
}

/// `column <= value`.
#[must_use]
pub fn lte<T: ToSqlValue>(col: &str, value: T) -> Condition {
    column(col, " <= ?", vec![value.to_sql_value()])
}

/// `column LIKE pattern`.
#[must_use]
pub fn like<T: ToSqlValue>(col: &str, pattern: T) -> Condition {
    column(col, " LIKE ?", vec![pattern.to_sql_value()])
}

/// `column NOT LIKE pattern`.
#[must_use]
pub fn not_like<T: ToSqlValue>(col: &str, pattern: T) -> Condition {
    column(col, " NOT LIKE ?", vec![pattern.to_sql_value()])
}

/// `column IN (...)`. An empty list never matches.
#[must_use]
pub fn in_list<T: ToSqlValue>(col: &str, values: Vec<T>) -> Condition {
    if values.is_empty() {
        return Condition::raw("1 = 0");
    }
    let args: Vec<SqlValue> = values.into_iter().map(ToSqlValue::to_sql_value).collect();
    let tail = format!(" IN ({})", vec!["?"; args.len()].join(","));
    column(col, tail, args)
}

/// `column NOT IN (...)`. An empty list always matches.
#[must_use]
pub fn not_in_list<T: ToSqlValue>(col: &str, values: Vec<T>) -> Condition {
    if values.is_empty() {
        return Condition::raw("1 = 1");
    }
    let args: Vec<SqlValue> = values.into_iter().map(ToSqlValue::to_sql_value).collect();
    let tail = format!(" NOT IN ({})", vec!["?"; args.len()].join(","));
    column(col, tail, args)
}

/// `column IS NULL`.
#[must_use]
pub fn is_null(col: &str) -> Condition {
    column(col, " IS NULL", Vec::new())
}

/// `column IS NOT NULL`.
#[must_use]
pub fn is_not_null(col: &str) -> Condition {
    column(col, " IS NOT NULL", Vec::new())
}
