//! Shared helpers for dbx-core integration tests.

#![allow(dead_code)]

use std::cell::RefCell;

use dbx_core::{Query, Result, Row, SqlValue};

/// A catalog fake: answers each query with the rows of the first needle the
/// SQL contains, and records every statement it sees.
#[derive(Default)]
pub struct FakeCatalog {
    answers: Vec<(&'static str, Vec<Row>)>,
    seen: RefCell<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, needle: &'static str, rows: Vec<Row>) -> Self {
        self.answers.push((needle, rows));
        self
    }

    pub fn statements(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }

    /// Statements run through `execute`, ignoring catalog reads.
    pub fn executed(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|sql| !sql.starts_with("select"))
            .collect()
    }
}

impl Query for FakeCatalog {
    fn execute(&self, sql: &str, _args: &[SqlValue]) -> Result<u64> {
        self.seen.borrow_mut().push(String::from(sql));
        Ok(0)
    }

    fn query(&self, sql: &str, _args: &[SqlValue]) -> Result<Vec<Row>> {
        self.seen.borrow_mut().push(String::from(sql));
        Ok(self
            .answers
            .iter()
            .find(|(needle, _)| sql.contains(needle))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }
}

/// Builds a row from `(name, value)` pairs.
pub fn row(pairs: &[(&str, SqlValue)]) -> Row {
    Row::new(
        pairs
            .iter()
            .map(|(name, value)| (String::from(*name), value.clone()))
            .collect(),
    )
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(String::from(s))
}
