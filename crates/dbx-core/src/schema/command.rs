//! Deferred DDL intents.
//!
//! A table accumulates [`Command`]s while it is declared or mutated. Each
//! command carries only the data it needs and is rendered later, once a
//! schema dialect is known, by [`Command::compile`].

use super::index::Index;
use super::table::Table;
use crate::error::Result;
use crate::grammar::DdlCompiler;

/// One pending DDL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `CREATE TABLE` with every declared column.
    CreateTable,
    /// Add the named column.
    AddColumn(String),
    /// Alter the named column to its current definition.
    ModifyColumn(String),
    /// Drop columns.
    DropColumns(Vec<String>),
    /// Rename the table.
    RenameTable(String),
    /// Drop a table.
    DropTable(String),
    /// Drop a table if it exists.
    DropTableIfExists(String),
    /// Add a primary key over the columns.
    AddPrimaryKey(Vec<String>),
    /// Drop the primary key.
    DropPrimaryKey,
    /// Create an index.
    AddIndex(Index),
    /// Drop an index.
    DropIndex(String),
    /// Drop a unique index or constraint.
    DropUnique(String),
    /// Drop a spatial index.
    DropSpatialIndex(String),
    /// Drop a foreign key.
    DropForeign(String),
    /// Rename an index.
    RenameIndex {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
}

impl Command {
    /// Renders the command for `table` with `dialect`.
    ///
    /// # Errors
    ///
    /// Propagates the dialect's compile error, for example an unsupported
    /// feature or a column that does not exist.
    pub fn compile<D: DdlCompiler + ?Sized>(&self, table: &Table, dialect: &D) -> Result<String> {
        match self {
            Self::CreateTable => dialect.compile_create(table),
            Self::AddColumn(name) => dialect.compile_add_column(table, name),
            Self::ModifyColumn(name) => dialect.compile_modify_column(table, name),
            Self::DropColumns(names) => dialect.compile_drop_column(table, names),
            Self::RenameTable(to) => dialect.compile_rename_table(table, to),
            Self::DropTable(name) => dialect.compile_drop(name),
            Self::DropTableIfExists(name) => dialect.compile_drop_if_exists(name),
            Self::AddPrimaryKey(columns) => dialect.compile_primary_key(table, columns),
            Self::DropPrimaryKey => dialect.compile_drop_primary_key(table),
            Self::AddIndex(index) => dialect.compile_index(table, index),
            Self::DropIndex(name) => dialect.compile_drop_index(table, name),
            Self::DropUnique(name) => dialect.compile_drop_unique(table, name),
            Self::DropSpatialIndex(name) => dialect.compile_drop_spatial_index(table, name),
            Self::DropForeign(name) => dialect.compile_drop_foreign(table, name),
            Self::RenameIndex { from, to } => dialect.compile_rename_index(table, from, to),
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CreateTable => "create_table",
            Self::AddColumn(_) => "add_column",
            Self::ModifyColumn(_) => "modify_column",
            Self::DropColumns(_) => "drop_columns",
            Self::RenameTable(_) => "rename_table",
            Self::DropTable(_) => "drop_table",
            Self::DropTableIfExists(_) => "drop_table_if_exists",
            Self::AddPrimaryKey(_) => "add_primary_key",
            Self::DropPrimaryKey => "drop_primary_key",
            Self::AddIndex(_) => "add_index",
            Self::DropIndex(_) => "drop_index",
            Self::DropUnique(_) => "drop_unique",
            Self::DropSpatialIndex(_) => "drop_spatial_index",
            Self::DropForeign(_) => "drop_foreign",
            Self::RenameIndex { .. } => "rename_index",
        }
    }
}
