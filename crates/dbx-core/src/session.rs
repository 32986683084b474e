//! Describe-then-apply schema sessions.
//!
//! A [`Session`] pairs a schema dialect with a [`Query`] collaborator. It
//! loads tables from the catalog, hands them to a caller for mutation and
//! executes the resulting commands in order. There is no transaction: a
//! failing statement stops the run and earlier statements stay applied.

use tracing::{debug, info};

use crate::builder::{Delete, Insert, Select, Update};
use crate::dialect::Dialect;
use crate::error::{Result, ResultExt};
use crate::grammar::SchemaDialect;
use crate::query::{Query, QueryExt};
use crate::schema::{Column, Command, Table, TableConstraints};

/// A schema session over one connection.
pub struct Session<'a, Q: Query> {
    dialect: &'a dyn SchemaDialect,
    query: &'a Q,
}

impl<'a, Q: Query> Session<'a, Q> {
    /// Creates a session that compiles with `dialect` and runs SQL through
    /// `query`.
    #[must_use]
    pub const fn new(dialect: &'a dyn SchemaDialect, query: &'a Q) -> Self {
        Self { dialect, query }
    }

    /// The schema dialect.
    #[must_use]
    pub const fn dialect(&self) -> &'a dyn SchemaDialect {
        self.dialect
    }

    fn query_dialect(&self) -> &'a dyn Dialect {
        let dialect: &'a dyn SchemaDialect = self.dialect;
        dialect.as_query_dialect()
    }

    fn run(&self, sql: &str) -> Result<u64> {
        debug!(dialect = self.dialect.name(), sql = %sql, "executing statement");
        self.query.execute(sql, &[])
    }

    /// Compiles and removes every pending command of `table`.
    ///
    /// # Errors
    ///
    /// Returns the first compile error; later commands are left unrendered.
    pub fn compile_commands(&self, table: &mut Table) -> Result<Vec<String>> {
        let commands = table.take_commands();
        let mut statements = Vec::with_capacity(commands.len());
        for command in commands {
            let sql = command
                .compile(table, self.dialect)
                .with_context(|| format!("{} on table '{}'", command.kind(), table.name))?;
            statements.push(sql);
        }
        Ok(statements)
    }

    fn apply(&self, table: &mut Table) -> Result<()> {
        let commands = table.take_commands();
        for command in commands {
            let sql = command
                .compile(table, self.dialect)
                .with_context(|| format!("{} on table '{}'", command.kind(), table.name))?;
            debug!(table = %table.name, command = command.kind(), "applying command");
            self.run(&sql)
                .with_context(|| format!("{} on table '{}'", command.kind(), table.name))?;
        }
        Ok(())
    }

    /// Returns `true` when the table exists.
    ///
    /// # Errors
    ///
    /// Propagates collaborator errors.
    pub fn table_exists(&self, name: &str, schema: Option<&str>) -> Result<bool> {
        let sql = self.dialect.compile_table_exists(name, schema)?;
        let (_, counts): (usize, Vec<i64>) = self.query.query_and_load(&sql, &[])?;
        Ok(counts.first().copied().unwrap_or(0) > 0)
    }

    /// Declares a new table, lets `handler` fill it in and creates it.
    ///
    /// Indexes and other commands the handler appends run after the
    /// `CREATE TABLE`.
    ///
    /// # Errors
    ///
    /// Returns the first compile or execution error.
    pub fn create_table(&self, name: &str, handler: impl FnOnce(&mut Table)) -> Result<Table> {
        info!(table = %name, "creating table");
        let mut table = Table::new(name);
        table.add_command(Command::CreateTable);
        handler(&mut table);
        self.apply(&mut table)?;
        Ok(table)
    }

    /// Loads an existing table, lets `handler` change it and applies the
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::NotFound`](crate::error::DbxError::NotFound) for an unknown table, or the first
    /// compile or execution error.
    pub fn table(&self, name: &str, handler: impl FnOnce(&mut Table)) -> Result<Table> {
        info!(table = %name, "altering table");
        let mut table = self.get_table(name, None)?;
        handler(&mut table);
        self.apply(&mut table)?;
        Ok(table)
    }

    /// Drops a table.
    ///
    /// # Errors
    ///
    /// Propagates collaborator errors.
    pub fn drop(&self, name: &str) -> Result<()> {
        info!(table = %name, "dropping table");
        let sql = self.dialect.compile_drop(name)?;
        self.run(&sql)?;
        Ok(())
    }

    /// Drops a table if it exists.
    ///
    /// # Errors
    ///
    /// Propagates collaborator errors.
    pub fn drop_if_exists(&self, name: &str) -> Result<()> {
        info!(table = %name, "dropping table if it exists");
        let sql = self.dialect.compile_drop_if_exists(name)?;
        self.run(&sql)?;
        Ok(())
    }

    /// Loads a table with its columns.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::NotFound`](crate::error::DbxError::NotFound) for an unknown table.
    pub fn get_table(&self, name: &str, schema: Option<&str>) -> Result<Table> {
        debug!(table = %name, "loading table");
        self.dialect
            .load_table(self.query, name, schema)
            .with_context(|| format!("loading table '{name}'"))
    }

    /// Loads the columns of a table.
    ///
    /// # Errors
    ///
    /// Propagates catalog and type mapping errors.
    pub fn get_columns(&self, name: &str, schema: Option<&str>) -> Result<Vec<Column>> {
        self.dialect
            .load_columns(self.query, name, schema)
            .with_context(|| format!("loading columns of '{name}'"))
    }

    /// Loads the constraints of a table.
    ///
    /// # Errors
    ///
    /// Propagates catalog errors.
    pub fn get_table_constraints(&self, name: &str, schema: Option<&str>) -> Result<TableConstraints> {
        self.dialect
            .load_table_constraints(self.query, name, schema)
            .with_context(|| format!("loading constraints of '{name}'"))
    }

    /// Lists the table names of the given schemas.
    ///
    /// # Errors
    ///
    /// Propagates collaborator errors.
    pub fn get_all_tables(&self, schemas: &[String]) -> Result<Vec<String>> {
        let sql = self.dialect.compile_get_all_tables(schemas)?;
        let (_, names) = self.query.query_and_load(&sql, &[])?;
        Ok(names)
    }

    /// Turns foreign key enforcement on.
    ///
    /// # Errors
    ///
    /// Propagates collaborator errors.
    pub fn enable_foreign_key_constraints(&self) -> Result<()> {
        let sql = self.dialect.compile_enable_foreign_key_constraints()?;
        self.run(&sql)?;
        Ok(())
    }

    /// Turns foreign key enforcement off.
    ///
    /// # Errors
    ///
    /// Propagates collaborator errors.
    pub fn disable_foreign_key_constraints(&self) -> Result<()> {
        let sql = self.dialect.compile_disable_foreign_key_constraints()?;
        self.run(&sql)?;
        Ok(())
    }

    /// Rebuilds the database file.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::UnsupportedFeature`](crate::error::DbxError::UnsupportedFeature) outside SQLite.
    pub fn rebuild(&self) -> Result<()> {
        let sql = self.dialect.compile_rebuild()?;
        self.run(&sql)?;
        Ok(())
    }

    /// A `SELECT` bound to the session dialect.
    #[must_use]
    pub fn select(&self) -> Select<'a> {
        Select::new(self.query_dialect())
    }

    /// An `INSERT` bound to the session dialect.
    #[must_use]
    pub fn insert(&self, table: &str) -> Insert<'a> {
        Insert::new(self.query_dialect()).into_table(table)
    }

    /// An `UPDATE` bound to the session dialect.
    #[must_use]
    pub fn update(&self, table: &str) -> Update<'a> {
        Update::new(self.query_dialect(), table)
    }

    /// A `DELETE` bound to the session dialect.
    #[must_use]
    pub fn delete(&self, table: &str) -> Delete<'a> {
        Delete::new(self.query_dialect(), table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Postgres, Sqlite};
    use crate::error::DbxError;
    use crate::grammar::testing::{row, text, Scripted};
    use crate::schema::ColumnOption;
    use crate::value::SqlValue;

    #[test]
    fn test_create_table_runs_create_before_indexes() {
        let query = Scripted::default();
        let session = Session::new(&Sqlite, &query);
        session
            .create_table("users", |table| {
                table.id("id", []);
                table.string("email", []);
                table.unique(&["email"], []);
            })
            .unwrap();

        let statements = query.statements();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE \"users\"("));
        assert_eq!(
            statements[1],
            "CREATE UNIQUE INDEX \"idx_email\" ON \"users\" (\"email\");"
        );
    }

    #[test]
    fn test_table_applies_changes_to_loaded_table() {
        let query = Scripted::default()
            .answer(
                "sqlite_master",
                vec![row(&[("sql", text("CREATE TABLE \"users\"(\n\t\"id\" integer NOT NULL\n)"))])],
            )
            .answer(
                "TABLE_INFO",
                vec![row(&[
                    ("cid", SqlValue::Int(0)),
                    ("name", text("id")),
                    ("type", text("integer")),
                    ("notnull", SqlValue::Int(1)),
                    ("dflt_value", SqlValue::Null),
                    ("pk", SqlValue::Int(1)),
                ])],
            );
        let session = Session::new(&Sqlite, &query);
        let table = session
            .table("users", |table| {
                table.text("bio", [ColumnOption::AllowNull]);
                table.drop_columns(&["legacy"]);
            })
            .unwrap();

        assert!(table.commands().is_empty());
        let statements = query.statements();
        assert_eq!(
            &statements[2..],
            [
                "ALTER TABLE \"users\" ADD COLUMN \"bio\" text NULL;",
                "ALTER TABLE \"users\" DROP COLUMN \"legacy\";",
            ]
        );
    }

    #[test]
    fn test_table_reports_missing_table() {
        let query = Scripted::default();
        let session = Session::new(&Sqlite, &query);
        let err = session.table("ghost", |_| {}).unwrap_err();
        assert!(matches!(err.root(), DbxError::NotFound(_)));
        assert!(err.to_string().contains("loading table 'ghost'"));
    }

    #[test]
    fn test_failing_command_stops_the_run() {
        let query = Scripted::default();
        let session = Session::new(&Sqlite, &query);
        let err = session
            .create_table("t", |table| {
                table.int("a", []);
                table.spatial_index(&["a"], []);
                table.index(&["a"], []);
            })
            .unwrap_err();
        assert!(matches!(err.root(), DbxError::UnsupportedFeature(_)));
        assert_eq!(query.statements().len(), 1);
    }

    #[test]
    fn test_table_exists_reads_count() {
        let query = Scripted::default().answer("sqlite_master", vec![row(&[("count(*)", SqlValue::Int(1))])]);
        assert!(Session::new(&Sqlite, &query).table_exists("users", None).unwrap());
        assert!(!Session::new(&Sqlite, &Scripted::default())
            .table_exists("users", None)
            .unwrap());
    }

    #[test]
    fn test_compile_commands_without_executing() {
        let query = Scripted::default();
        let session = Session::new(&Postgres, &query);
        let mut table = Table::new("users");
        table.rename("people");
        table.drop_index("idx_a");
        let statements = session.compile_commands(&mut table).unwrap();
        assert_eq!(
            statements,
            [
                "ALTER TABLE \"users\" RENAME TO \"people\";",
                "DROP INDEX \"idx_a\";",
            ]
        );
        assert!(query.statements().is_empty());
        assert!(table.commands().is_empty());
    }

    #[test]
    fn test_statement_builders_use_session_dialect() {
        let query = Scripted::default();
        let session = Session::new(&Postgres, &query);
        let (sql, _) = session.delete("users").to_sql().unwrap();
        assert_eq!(sql, "DELETE FROM \"users\"");
    }
}
