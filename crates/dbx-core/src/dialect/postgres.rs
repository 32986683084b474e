//! PostgreSQL dialect.

use super::{hex, Dialect};

/// PostgreSQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct Postgres;

impl Postgres {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn encode_bool(&self, b: bool) -> String {
        String::from(if b { "TRUE" } else { "FALSE" })
    }

    fn encode_bytes(&self, b: &[u8]) -> String {
        format!("E'\\\\x{}'", hex(b))
    }

    fn placeholder(&self, n: usize) -> String {
        format!("${}", n + 1)
    }

    fn supports_returning(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_dialect() {
        let dialect = Postgres::new();
        assert_eq!(dialect.name(), "postgres");
        assert_eq!(dialect.identifier_quote(), '"');
        assert!(dialect.supports_returning());
    }

    #[test]
    fn test_postgres_placeholders_are_one_based() {
        assert_eq!(Postgres.placeholder(0), "$1");
        assert_eq!(Postgres.placeholder(9), "$10");
    }

    #[test]
    fn test_postgres_encode_bytes() {
        assert_eq!(Postgres.encode_bytes(&[0xAB]), r"E'\\xab'");
    }

    #[test]
    fn test_postgres_encode_literals() {
        assert_eq!(Postgres.encode_bool(true), "TRUE");
        assert_eq!(Postgres.encode_string("O'Brien"), "'O''Brien'");
    }
}
