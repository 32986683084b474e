//! SQLite dialect.

use super::{hex, Dialect};

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sqlite;

impl Sqlite {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn encode_bytes(&self, b: &[u8]) -> String {
        format!("X'{}'", hex(b))
    }

    fn supports_returning(&self) -> bool {
        true // SQLite 3.35.0+
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_sqlite_dialect() {
        let dialect = Sqlite::new();
        assert_eq!(dialect.name(), "sqlite");
        assert_eq!(dialect.driver_name(), "sqlite");
        assert_eq!(dialect.identifier_quote(), '"');
        assert_eq!(dialect.placeholder(5), "?");
    }

    #[test]
    fn test_sqlite_encode_literals() {
        assert_eq!(Sqlite.encode_bool(true), "1");
        assert_eq!(Sqlite.encode_bytes(&[0xDE, 0xAD]), "X'dead'");
        let t = NaiveDate::from_ymd_opt(2020, 2, 29)
            .unwrap()
            .and_hms_opt(23, 59, 1)
            .unwrap();
        assert_eq!(Sqlite.encode_time(&t), "'2020-02-29 23:59:01.000000'");
    }
}
