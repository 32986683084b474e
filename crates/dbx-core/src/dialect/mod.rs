//! Query-level SQL dialects.
//!
//! A dialect knows how a back-end quotes identifiers, spells literals and
//! numbers its placeholders. The schema-level behavior of the same
//! back-ends lives in [`crate::grammar`], implemented on the same types.

mod mysql;
mod postgres;
mod sqlite;

use chrono::NaiveDateTime;

pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

use crate::value::SqlValue;

/// Timestamp layout shared by all three back-ends.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the driver name used to open connections.
    fn driver_name(&self) -> &'static str {
        self.name()
    }

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quotes an identifier, one segment per dot-separated part.
    ///
    /// `db.table` becomes `"db"."table"`.
    fn quote_ident(&self, ident: &str) -> String {
        let quote = self.identifier_quote();
        let doubled = format!("{quote}{quote}");
        let mut out = String::with_capacity(ident.len() + 2);
        for (i, part) in ident.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push(quote);
            out.push_str(&part.replace(quote, &doubled));
            out.push(quote);
        }
        out
    }

    /// Encodes a string literal.
    fn encode_string(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    /// Encodes a boolean literal.
    fn encode_bool(&self, b: bool) -> String {
        String::from(if b { "1" } else { "0" })
    }

    /// Encodes a timestamp literal.
    fn encode_time(&self, t: &NaiveDateTime) -> String {
        self.encode_string(&t.format(TIME_FORMAT).to_string())
    }

    /// Encodes a byte-string literal.
    fn encode_bytes(&self, b: &[u8]) -> String;

    /// Returns the placeholder for the zero-based argument index `n`.
    fn placeholder(&self, _n: usize) -> String {
        String::from("?")
    }

    /// Returns whether the dialect supports a RETURNING clause.
    fn supports_returning(&self) -> bool {
        false
    }

    /// Encodes any bound value as an inline literal.
    fn encode_value(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => String::from("NULL"),
            SqlValue::Bool(b) => self.encode_bool(*b),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Text(s) => self.encode_string(s),
            SqlValue::Blob(b) => self.encode_bytes(b),
            SqlValue::Time(t) => self.encode_time(t),
        }
    }
}

/// Lower-case hex without separators.
pub(crate) fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

/// Returns the dialect registered under `name`.
///
/// Accepts the dialect names and the driver names (`postgresql`, `pg`,
/// `sqlite3` are aliases).
#[must_use]
pub fn by_name(name: &str) -> Option<&'static dyn crate::grammar::SchemaDialect> {
    match name.to_ascii_lowercase().as_str() {
        "mysql" | "mariadb" => Some(&MySql),
        "postgres" | "postgresql" | "pg" => Some(&Postgres),
        "sqlite" | "sqlite3" => Some(&Sqlite),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_splits_segments() {
        assert_eq!(Postgres.quote_ident("db.table"), "\"db\".\"table\"");
        assert_eq!(Sqlite.quote_ident("a.b.c"), "\"a\".\"b\".\"c\"");
        assert_eq!(MySql.quote_ident("db.table"), "`db`.`table`");
    }

    #[test]
    fn test_quote_ident_escapes_quote_char() {
        assert_eq!(Postgres.quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x00, 0xAB, 0x10]), "00ab10");
        assert_eq!(hex(&[]), "");
    }

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("PostgreSQL").map(|d| d.name()), Some("postgres"));
        assert_eq!(by_name("sqlite3").map(|d| d.name()), Some("sqlite"));
        assert_eq!(by_name("mysql").map(|d| d.name()), Some("mysql"));
        assert!(by_name("oracle").is_none());
    }
}
