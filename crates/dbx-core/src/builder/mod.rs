//! SQL statement builders.
//!
//! Every statement is bound to the dialect it was created for and compiles
//! its clauses in a fixed canonical order. WHERE and HAVING entries keep
//! the conjunction they were appended with, so a later `or_where` never
//! changes how earlier entries are joined.
//!
//! # Example
//!
//! ```rust
//! use dbx_core::builder::Select;
//! use dbx_core::dialect::Postgres;
//! use dbx_core::sql_args;
//!
//! let (sql, args) = Select::new(&Postgres)
//!     .columns(&["id", "name"])
//!     .from("users")
//!     .and_where_expr("active = ?", sql_args![true])
//!     .to_sql()
//!     .unwrap();
//!
//! assert_eq!(sql, "SELECT id, name FROM \"users\" WHERE active = $1");
//! assert_eq!(args.len(), 1);
//! ```

mod delete;
mod insert;
mod select;
mod update;

pub use delete::Delete;
pub use insert::Insert;
pub use select::{JoinKind, Select};
pub use update::Update;

use crate::buffer::Buffer;
use crate::condition::{compile_conditions, Conjunction, Condition};
use crate::dialect::Dialect;
use crate::error::Result;

/// Ordered, pre-tagged condition list used for WHERE and HAVING.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ConditionList(Vec<(Conjunction, Condition)>);

impl ConditionList {
    pub(crate) fn push(&mut self, conjunction: Conjunction, condition: Condition) {
        self.0.push(condition.tagged(conjunction));
    }

    /// Writes `keyword` followed by the list, or nothing when empty.
    pub(crate) fn build(&self, keyword: &str, dialect: &dyn Dialect, buf: &mut Buffer) -> Result<()> {
        if self.0.is_empty() {
            return Ok(());
        }
        buf.write(keyword);
        compile_conditions(dialect, buf, &self.0)
    }
}

/// Writes ` ORDER BY ...` and ` LIMIT n` when set.
pub(crate) fn build_order_limit(buf: &mut Buffer, order_by: &[String], limit: Option<u64>) {
    if !order_by.is_empty() {
        buf.write(" ORDER BY ");
        buf.write(&order_by.join(", "));
    }
    if let Some(n) = limit {
        buf.write(&format!(" LIMIT {n}"));
    }
}
