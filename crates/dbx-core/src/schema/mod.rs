//! Abstract table definitions.
//!
//! A [`Table`] is either declared (every column and command is new) or
//! loaded from the catalog (columns carry a snapshot, and changes are
//! detected with [`ColumnDiff`]). Dialects in [`crate::grammar`] turn a
//! table into DDL.

mod column;
mod command;
mod constraints;
mod data_type;
mod diff;
mod index;
mod table;

pub use column::{Column, ColumnOption, DefaultValue};
pub use command::Command;
pub use constraints::{
    group_rows, Check, ConstraintGroup, ConstraintKind, ConstraintRow, ForeignKey, PrimaryKey,
    TableConstraints, Unique,
};
pub use data_type::DataType;
pub use diff::{ColumnChange, ColumnDiff};
pub use index::{Index, IndexOption, IndexType};
pub use table::{Table, DEFAULT_STRING_LENGTH};
