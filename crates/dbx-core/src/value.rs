//! Bound argument values.
//!
//! Values travel next to the SQL text as positional arguments. They are
//! only inlined into the text by [`crate::buffer::Buffer::render_literal`],
//! which asks the active dialect to encode them.

use chrono::NaiveDateTime;

/// A value bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Timestamp without time zone.
    Time(NaiveDateTime),
}

impl SqlValue {
    /// Returns `true` for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as text when it has a natural textual form.
    ///
    /// Numbers and booleans are formatted, blobs are decoded as UTF-8 when
    /// valid. NULL returns `None`.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Text(s) => Some(s.clone()),
            Self::Blob(b) => String::from_utf8(b.clone()).ok(),
            Self::Time(t) => Some(t.format("%Y-%m-%d %H:%M:%S%.6f").to_string()),
        }
    }

    /// Returns the value as an integer, parsing text if needed.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Bool(b) => Some(i64::from(*b)),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(f) => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the value as a boolean.
    ///
    /// Integers are true when non-zero; text accepts the spellings used by
    /// the three catalogs (`t`, `true`, `yes`, `1` and their negations).
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(n) => Some(*n != 0),
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "t" | "true" | "yes" | "y" | "1" => Some(true),
                "f" | "false" | "no" | "n" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for &String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Time(self)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

/// Converts a list of values in one go.
///
/// ```
/// use dbx_core::{sql_args, SqlValue};
///
/// let args = sql_args![1, "a", None::<i32>];
/// assert_eq!(args, vec![SqlValue::Int(1), SqlValue::Text("a".into()), SqlValue::Null]);
/// ```
#[macro_export]
macro_rules! sql_args {
    () => { ::std::vec::Vec::<$crate::SqlValue>::new() };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::ToSqlValue::to_sql_value($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(true.to_sql_value(), SqlValue::Bool(true));
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!(2.5_f64.to_sql_value(), SqlValue::Float(2.5));
        assert_eq!(
            "hello".to_sql_value(),
            SqlValue::Text(String::from("hello"))
        );
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some(42_i32).to_sql_value(), SqlValue::Int(42));
        assert_eq!(vec![0xAB_u8].to_sql_value(), SqlValue::Blob(vec![0xAB]));
    }

    #[test]
    fn test_time_conversion() {
        let t = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_micro_opt(3, 4, 5, 6)
            .unwrap();
        assert_eq!(t.to_sql_value(), SqlValue::Time(t));
        assert_eq!(
            SqlValue::Time(t).as_text().as_deref(),
            Some("2024-01-02 03:04:05.000006")
        );
    }

    #[test]
    fn test_as_i64_parses_text() {
        assert_eq!(SqlValue::Text(String::from(" 12 ")).as_i64(), Some(12));
        assert_eq!(SqlValue::Null.as_i64(), None);
    }

    #[test]
    fn test_as_bool_catalog_spellings() {
        assert_eq!(SqlValue::Text(String::from("YES")).as_bool(), Some(true));
        assert_eq!(SqlValue::Text(String::from("f")).as_bool(), Some(false));
        assert_eq!(SqlValue::Int(0).as_bool(), Some(false));
        assert_eq!(SqlValue::Text(String::from("maybe")).as_bool(), None);
    }

    #[test]
    fn test_sql_args_macro() {
        let args = crate::sql_args![1, "x"];
        assert_eq!(args, vec![SqlValue::Int(1), SqlValue::Text(String::from("x"))]);
        assert!(crate::sql_args![].is_empty());
    }
}
