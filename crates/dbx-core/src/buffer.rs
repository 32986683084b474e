//! SQL text accumulation and placeholder interpolation.
//!
//! A [`Buffer`] records SQL text and bound values in emission order. The
//! same recording renders two ways:
//!
//! - [`Buffer::render`] produces driver-ready text with dialect
//!   placeholders and the argument list;
//! - [`Buffer::render_literal`] inlines every argument as a dialect literal,
//!   for logs and diagnostics only.

use crate::dialect::Dialect;
use crate::error::Result;
use crate::value::SqlValue;

#[derive(Debug, Clone, PartialEq)]
enum Fragment {
    Text(String),
    Arg(SqlValue),
}

/// Accumulates SQL fragments and their bound arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buffer {
    fragments: Vec<Fragment>,
    args: usize,
}

impl Buffer {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fragments: Vec::new(),
            args: 0,
        }
    }

    /// Appends SQL text.
    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.fragments.last_mut() {
            Some(Fragment::Text(last)) => last.push_str(text),
            _ => self.fragments.push(Fragment::Text(String::from(text))),
        }
    }

    /// Appends a placeholder bound to `value`.
    pub fn bind(&mut self, value: SqlValue) {
        self.fragments.push(Fragment::Arg(value));
        self.args += 1;
    }

    /// Number of bound arguments so far.
    #[must_use]
    pub const fn arg_count(&self) -> usize {
        self.args
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Renders parameterized SQL and its arguments.
    ///
    /// Placeholders are numbered by their zero-based argument index, so the
    /// PostgreSQL dialect yields `$1, $2, ...` in emission order.
    #[must_use]
    pub fn render(&self, dialect: &dyn Dialect) -> (String, Vec<SqlValue>) {
        let mut sql = String::new();
        let mut args = Vec::with_capacity(self.args);
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text(text) => sql.push_str(text),
                Fragment::Arg(value) => {
                    sql.push_str(&dialect.placeholder(args.len()));
                    args.push(value.clone());
                }
            }
        }
        (sql, args)
    }

    /// Renders SQL with every argument inlined as a literal.
    ///
    /// Never send the result to a driver when the arguments are untrusted.
    #[must_use]
    pub fn render_literal(&self, dialect: &dyn Dialect) -> String {
        let mut sql = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text(text) => sql.push_str(text),
                Fragment::Arg(value) => sql.push_str(&dialect.encode_value(value)),
            }
        }
        sql
    }
}

/// Anything that can compile itself into a [`Buffer`].
pub trait Builder {
    /// Writes this value's SQL and arguments into `buf`.
    ///
    /// # Errors
    ///
    /// Returns an error when the value cannot be expressed, for example a
    /// condition whose placeholder count differs from its arguments.
    fn build(&self, dialect: &dyn Dialect, buf: &mut Buffer) -> Result<()>;
}

/// Compiles a builder into parameterized SQL and its arguments.
///
/// # Errors
///
/// Propagates the builder's compile error; no partial SQL is returned.
pub fn to_sql(dialect: &dyn Dialect, builder: &dyn Builder) -> Result<(String, Vec<SqlValue>)> {
    let mut buf = Buffer::new();
    builder.build(dialect, &mut buf)?;
    Ok(buf.render(dialect))
}

/// Compiles a builder into SQL with all arguments inlined.
///
/// # Errors
///
/// Propagates the builder's compile error; no partial SQL is returned.
pub fn to_raw_sql(dialect: &dyn Dialect, builder: &dyn Builder) -> Result<String> {
    let mut buf = Buffer::new();
    builder.build(dialect, &mut buf)?;
    Ok(buf.render_literal(dialect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySql, Postgres, Sqlite};

    fn sample() -> Buffer {
        let mut buf = Buffer::new();
        buf.write("SELECT * FROM t WHERE a = ");
        buf.bind(SqlValue::Int(1));
        buf.write(" AND b = ");
        buf.bind(SqlValue::Text(String::from("it's")));
        buf
    }

    #[test]
    fn test_render_question_marks() {
        let (sql, args) = sample().render(&Sqlite);
        assert_eq!(sql, "SELECT * FROM t WHERE a = ? AND b = ?");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_render_positional() {
        let (sql, args) = sample().render(&Postgres);
        assert_eq!(sql, "SELECT * FROM t WHERE a = $1 AND b = $2");
        assert_eq!(args[0], SqlValue::Int(1));
    }

    #[test]
    fn test_render_literal_escapes_quotes() {
        let sql = sample().render_literal(&MySql);
        assert_eq!(sql, "SELECT * FROM t WHERE a = 1 AND b = 'it''s'");
    }

    #[test]
    fn test_render_literal_bytes_and_null() {
        let mut buf = Buffer::new();
        buf.write("VALUES (");
        buf.bind(SqlValue::Blob(vec![0xAB]));
        buf.write(", ");
        buf.bind(SqlValue::Null);
        buf.write(")");
        assert_eq!(buf.render_literal(&Postgres), r"VALUES (E'\\xab', NULL)");
        assert_eq!(buf.render_literal(&Sqlite), "VALUES (X'ab', NULL)");
    }

    #[test]
    fn test_adjacent_writes_merge() {
        let mut buf = Buffer::new();
        buf.write("a");
        buf.write("");
        buf.write("b");
        assert_eq!(buf.fragments.len(), 1);
        assert!(!buf.is_empty());
        assert_eq!(buf.arg_count(), 0);
    }
}
