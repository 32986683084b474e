//! MySQL dialect.

use super::{hex, Dialect};

/// MySQL (and MariaDB) dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySql;

impl MySql {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn encode_string(&self, s: &str) -> String {
        // backslash is an escape character unless NO_BACKSLASH_ESCAPES is set
        let mut out = String::with_capacity(s.len() + 2);
        out.push('\'');
        for ch in s.chars() {
            match ch {
                '\'' => out.push_str("''"),
                '\\' => out.push_str("\\\\"),
                '\0' => out.push_str("\\0"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\x1a' => out.push_str("\\Z"),
                _ => out.push(ch),
            }
        }
        out.push('\'');
        out
    }

    fn encode_bytes(&self, b: &[u8]) -> String {
        if b.is_empty() {
            return String::from("X''");
        }
        format!("0x{}", hex(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_dialect() {
        let dialect = MySql::new();
        assert_eq!(dialect.name(), "mysql");
        assert_eq!(dialect.driver_name(), "mysql");
        assert_eq!(dialect.identifier_quote(), '`');
        assert_eq!(dialect.placeholder(3), "?");
        assert!(!dialect.supports_returning());
    }

    #[test]
    fn test_mysql_encode_string() {
        assert_eq!(MySql.encode_string("it's"), "'it''s'");
        assert_eq!(MySql.encode_string("a\\b"), "'a\\\\b'");
        assert_eq!(MySql.encode_string("line\n"), "'line\\n'");
    }

    #[test]
    fn test_mysql_encode_bool_and_bytes() {
        assert_eq!(MySql.encode_bool(true), "1");
        assert_eq!(MySql.encode_bool(false), "0");
        assert_eq!(MySql.encode_bytes(&[0xAB, 0x01]), "0xab01");
        assert_eq!(MySql.encode_bytes(&[]), "X''");
    }
}
