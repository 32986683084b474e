//! Small helpers shared by the DDL compilers.

use crate::dialect::Dialect;

/// Quotes each identifier with the dialect's rules.
#[must_use]
pub fn quote_idents<S: AsRef<str>>(dialect: &dyn Dialect, idents: &[S]) -> Vec<String> {
    idents
        .iter()
        .map(|ident| dialect.quote_ident(ident.as_ref()))
        .collect()
}

/// Quotes each identifier and joins them with `sep`.
#[must_use]
pub fn join_idents<S: AsRef<str>>(dialect: &dyn Dialect, idents: &[S], sep: &str) -> String {
    quote_idents(dialect, idents).join(sep)
}

/// Wraps each value in single quotes, doubling embedded quotes.
#[must_use]
pub fn quote_strings<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .map(|v| format!("'{}'", v.as_ref().replace('\'', "''")))
        .collect()
}

/// Backslash-escapes `'`, `"`, `\` and NUL.
#[must_use]
pub fn addslashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\'' | '"' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            '\0' => out.push_str("\\0"),
            _ => out.push(ch),
        }
    }
    out
}

/// Splits a comma-separated list, trimming whitespace and the given quote
/// characters from each item. Empty items are dropped.
#[must_use]
pub fn split_list(list: &str, quotes: &[char]) -> Vec<String> {
    list.split(',')
        .map(|item| item.trim().trim_matches(quotes).to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySql, Postgres};

    #[test]
    fn test_quote_idents() {
        assert_eq!(
            quote_idents(&MySql, &["a", "b.c"]),
            vec!["`a`", "`b`.`c`"]
        );
        assert_eq!(join_idents(&Postgres, &["a", "b"], ", "), "\"a\", \"b\"");
    }

    #[test]
    fn test_quote_strings() {
        assert_eq!(quote_strings(&["a", "it's"]), vec!["'a'", "'it''s'"]);
    }

    #[test]
    fn test_addslashes() {
        assert_eq!(addslashes(r#"it's "q" \ "#), r#"it\'s \"q\" \\ "#);
        assert_eq!(addslashes("a\0b"), "a\\0b");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("'a', 'b' ,''", &['\'']), vec!["a", "b"]);
    }
}
