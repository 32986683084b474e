//! SQLite schema grammar and `sqlite_master` / PRAGMA introspection.
//!
//! SQLite cannot alter columns, keys or foreign keys after creation; those
//! commands fail with [`DbxError::UnsupportedFeature`].

use std::collections::HashMap;

use regex::Regex;

use super::{find_column, parse_catalog_default, strip_type_args, DdlCompiler, Introspector, TypeMapping};
use crate::dialect::{Dialect, Sqlite};
use crate::error::{DbxError, Result, ResultExt};
use crate::query::{FromRow, Query, QueryExt, Row};
use crate::schema::{
    Column, ConstraintKind, ConstraintRow, DataType, Index, IndexType, PrimaryKey, Table,
    TableConstraints, Unique,
};
use crate::util::{join_idents, split_list};
use crate::value::ToSqlValue;

/// The enum check emitted by [`TypeMapping::type_enum`], as stored in
/// `sqlite_master.sql`.
const ENUM_CHECK: &str = r#"check \("(\w+)" in \((.*)\)\)"#;

/// One row of `PRAGMA TABLE_INFO`.
#[derive(Debug, Clone)]
struct PragmaColumn {
    cid: i64,
    name: String,
    data_type: String,
    not_null: bool,
    default: Option<String>,
    pk: i64,
}

impl FromRow for PragmaColumn {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            cid: row.int("cid")?,
            name: row.text("name")?,
            data_type: row.opt_text("type").unwrap_or_default(),
            not_null: row.opt_bool("notnull").unwrap_or(false),
            default: row.opt_text("dflt_value"),
            pk: row.opt_int("pk").unwrap_or_default(),
        })
    }
}

/// One row of `PRAGMA INDEX_LIST`. Old SQLite versions omit `origin`.
#[derive(Debug, Clone)]
struct IndexListEntry {
    name: String,
    unique: bool,
    origin: Option<String>,
}

impl FromRow for IndexListEntry {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            name: row.text("name")?,
            unique: row.opt_bool("unique").unwrap_or(false),
            origin: row.opt_text("origin").filter(|o| !o.is_empty()),
        })
    }
}

/// One row of `PRAGMA INDEX_INFO`.
#[derive(Debug, Clone)]
struct IndexColumn {
    cid: i64,
    name: String,
}

impl FromRow for IndexColumn {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            cid: row.opt_int("cid").unwrap_or(-1),
            name: row.opt_text("name").unwrap_or_default(),
        })
    }
}

/// One row of `PRAGMA FOREIGN_KEY_LIST`, as a generic constraint row.
/// SQLite does not name foreign keys; each gets `fk_<id>`.
struct ForeignKeyRow(ConstraintRow);

impl FromRow for ForeignKeyRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self(ConstraintRow {
            name: format!("fk_{}", row.int("id")?),
            column_name: row.text("from")?,
            constraint_type: String::from("FOREIGN KEY"),
            foreign_table_schema: None,
            foreign_table_name: row.opt_text("table"),
            foreign_column_name: row.opt_text("to"),
            on_update: row.opt_text("on_update"),
            on_delete: row.opt_text("on_delete"),
            check_expr: None,
        }))
    }
}

impl Sqlite {
    fn column_definition(&self, column: &Column, inline_key: bool) -> Result<String> {
        let mut out = format!(
            "{} {}{}",
            self.quote_ident(&column.name),
            self.column_type(column)?,
            self.column_modifiers(column)
        );
        if inline_key {
            out.push_str(" PRIMARY KEY AUTOINCREMENT");
        }
        Ok(out)
    }

    /// The auto-increment integer column that carries the table's whole
    /// primary key inline, if any.
    fn inline_key_column<'t>(table: &'t Table, primary_key: &[String]) -> Option<&'t str> {
        table
            .columns
            .iter()
            .filter(|column| column.is_auto_increment_integer())
            .find(|column| match primary_key {
                [] => true,
                [only] => *only == column.name,
                _ => false,
            })
            .map(|column| column.name.as_str())
    }

    fn table_info(&self, query: &dyn Query, table: &str) -> Result<Vec<PragmaColumn>> {
        let sql = format!("PRAGMA TABLE_INFO ({})", self.quote_ident(table));
        let (_, columns) = query.query_and_load(&sql, &[])?;
        Ok(columns)
    }

    /// Column definition lines of a stored `CREATE TABLE`, keyed by column
    /// name.
    fn definition_lines(create_sql: &str) -> HashMap<String, String> {
        create_sql
            .lines()
            .map(|line| line.trim_matches(|c: char| c == ' ' || c == ',' || c == '\t'))
            .filter_map(|line| {
                let rest = line.strip_prefix('"')?;
                let end = rest.find('"')?;
                Some((String::from(&rest[..end]), String::from(line)))
            })
            .collect()
    }

    fn column_from_info(&self, info: &PragmaColumn, definition: Option<&str>) -> Result<Column> {
        let mut column = Column::new(info.name.clone(), self.catalog_type(&info.data_type)?);
        column.added = false;
        column.nullable = !info.not_null;

        if let Some(raw) = &info.default {
            let (default, use_current) = parse_catalog_default(raw);
            column.default = default;
            column.use_current = use_current;
        }

        if info.pk > 0 {
            column.primary_key = true;
            column.auto_increment =
                definition.is_some_and(|line| line.contains("PRIMARY KEY AUTOINCREMENT"));
        }

        if let Some(line) = definition {
            let pattern = Regex::new(ENUM_CHECK).map_err(|e| DbxError::InvalidValue(e.to_string()))?;
            if let Some(caps) = pattern.captures(line) {
                if caps[1] == column.name {
                    column.data_type = DataType::Enum;
                    column.allowed_values = split_list(&caps[2], &['\'']);
                }
            }
        }

        column.store();
        Ok(column)
    }
}

impl TypeMapping for Sqlite {
    fn type_char(&self, _column: &Column) -> Result<String> {
        Ok(String::from("varchar"))
    }

    fn type_string(&self, _column: &Column) -> Result<String> {
        Ok(String::from("varchar"))
    }

    fn type_tiny_int(&self, _column: &Column) -> Result<String> {
        Ok(String::from("integer"))
    }

    fn type_small_int(&self, _column: &Column) -> Result<String> {
        Ok(String::from("integer"))
    }

    fn type_big_int(&self, _column: &Column) -> Result<String> {
        Ok(String::from("integer"))
    }

    fn type_tiny_blob(&self, _column: &Column) -> Result<String> {
        Ok(String::from("blob"))
    }

    fn type_medium_blob(&self, _column: &Column) -> Result<String> {
        Ok(String::from("blob"))
    }

    fn type_long_blob(&self, _column: &Column) -> Result<String> {
        Ok(String::from("blob"))
    }

    fn type_float(&self, _column: &Column) -> Result<String> {
        Ok(String::from("float"))
    }

    fn type_double(&self, _column: &Column) -> Result<String> {
        Ok(String::from("float"))
    }

    fn type_decimal(&self, _column: &Column) -> Result<String> {
        Ok(String::from("numeric"))
    }

    fn type_enum(&self, column: &Column) -> Result<String> {
        Ok(format!(
            "varchar check ({} in ({}))",
            self.quote_ident(&column.name),
            self.quote_values(&column.allowed_values)
        ))
    }

    fn type_json(&self, _column: &Column) -> Result<String> {
        Ok(String::from("text"))
    }

    fn type_jsonb(&self, _column: &Column) -> Result<String> {
        Ok(String::from("text"))
    }

    fn type_date_time(&self, _column: &Column) -> Result<String> {
        Ok(String::from("datetime"))
    }

    fn type_time(&self, _column: &Column) -> Result<String> {
        Ok(String::from("time"))
    }

    fn type_timestamp(&self, _column: &Column) -> Result<String> {
        Ok(String::from("datetime"))
    }

    fn type_uuid(&self, _column: &Column) -> Result<String> {
        Ok(String::from("varchar"))
    }

    fn type_ip_address(&self, _column: &Column) -> Result<String> {
        Ok(String::from("varchar"))
    }

    fn type_mac_address(&self, _column: &Column) -> Result<String> {
        Ok(String::from("varchar"))
    }

    fn column_modifiers(&self, column: &Column) -> String {
        let mut out = String::from(if column.nullable { " NULL" } else { " NOT NULL" });
        let temporal = matches!(
            column.data_type,
            DataType::DateTime | DataType::DateTimeTz | DataType::Timestamp | DataType::TimestampTz
        );
        if column.use_current && temporal {
            out.push_str(" DEFAULT CURRENT_TIMESTAMP");
        } else if let Some(value) = &column.default {
            out.push_str(" DEFAULT ");
            out.push_str(&self.default_literal(value));
        }
        out
    }
}

impl DdlCompiler for Sqlite {
    fn compile_create(&self, table: &Table) -> Result<String> {
        let mut out = String::from(if table.temporary {
            "CREATE TEMPORARY TABLE "
        } else {
            "CREATE TABLE "
        });
        out.push_str(&self.wrap_table(table));
        out.push_str("(\n");

        // AUTOINCREMENT is only valid on the INTEGER PRIMARY KEY itself.
        let primary_key = table.primary_key();
        let inline_key = Self::inline_key_column(table, &primary_key);
        let append_primary_key = !primary_key.is_empty() && inline_key.is_none();

        let count = table.columns.len();
        for (i, column) in table.columns.iter().enumerate() {
            out.push('\t');
            let inline = inline_key == Some(column.name.as_str());
            out.push_str(&self.column_definition(column, inline)?);
            if i + 1 < count || append_primary_key {
                out.push(',');
            }
            out.push('\n');
        }
        if append_primary_key {
            out.push_str(&format!(
                "\tPRIMARY KEY ({})\n",
                join_idents(self, &primary_key, ", ")
            ));
        }
        out.push_str(");");
        Ok(out)
    }

    fn compile_modify_columns(&self, _table: &Table) -> Result<String> {
        Err(self.unsupported("modifying columns"))
    }

    fn compile_modify_column(&self, _table: &Table, _column: &str) -> Result<String> {
        Err(self.unsupported("modifying columns"))
    }

    fn compile_add_columns(&self, table: &Table) -> Result<String> {
        let statements = table
            .added_columns()
            .into_iter()
            .map(|column| self.compile_add_column(table, &column.name))
            .collect::<Result<Vec<_>>>()?;
        Ok(statements.join("\n"))
    }

    fn compile_add_column(&self, table: &Table, column: &str) -> Result<String> {
        let column = find_column(table, column)?;
        Ok(format!(
            "ALTER TABLE {} ADD COLUMN {};",
            self.wrap_table(table),
            self.column_definition(column, column.is_auto_increment_integer())?
        ))
    }

    fn compile_primary_key(&self, _table: &Table, _columns: &[String]) -> Result<String> {
        Err(self.unsupported("adding a primary key"))
    }

    fn compile_drop_primary_key(&self, _table: &Table) -> Result<String> {
        Err(self.unsupported("dropping a primary key"))
    }

    fn compile_index(&self, table: &Table, index: &Index) -> Result<String> {
        let create = match index.index_type {
            IndexType::Normal => "CREATE INDEX",
            IndexType::Unique => "CREATE UNIQUE INDEX",
            other => {
                return Err(self.unsupported(&format!(
                    "{} indexes",
                    other.as_str().to_ascii_lowercase()
                )));
            }
        };
        Ok(format!(
            "{create} {} ON {} ({});",
            self.wrap_index(table, &index.name),
            self.quote_ident(&table.full_name()),
            join_idents(self, &index.columns, ",")
        ))
    }

    fn compile_drop_spatial_index(&self, _table: &Table, _name: &str) -> Result<String> {
        Err(self.unsupported("spatial indexes"))
    }

    fn compile_drop_foreign(&self, _table: &Table, _name: &str) -> Result<String> {
        Err(self.unsupported("dropping foreign keys"))
    }

    fn compile_drop_column(&self, table: &Table, columns: &[String]) -> Result<String> {
        let table = self.wrap_table(table);
        Ok(columns
            .iter()
            .map(|column| format!("ALTER TABLE {table} DROP COLUMN {};", self.quote_ident(column)))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn compile_rename_index(&self, _table: &Table, _from: &str, _to: &str) -> Result<String> {
        Err(self.unsupported("renaming indexes"))
    }

    fn compile_drop_all_tables(&self, tables: &[String]) -> Result<String> {
        Ok(self.delete_from_master("'table', 'index', 'trigger'", tables))
    }

    fn compile_drop_all_views(&self, views: &[String]) -> Result<String> {
        Ok(self.delete_from_master("'view'", views))
    }

    fn compile_get_all_tables(&self, _schemas: &[String]) -> Result<String> {
        Ok(String::from(
            "select name from sqlite_master where type = 'table' and name not like 'sqlite_%'",
        ))
    }

    fn compile_get_all_views(&self, _schemas: &[String]) -> Result<String> {
        Ok(String::from(
            "select name from sqlite_master where type = 'view' and name not like 'sqlite_%'",
        ))
    }

    fn compile_rebuild(&self) -> Result<String> {
        Ok(String::from("vacuum"))
    }

    fn compile_enable_foreign_key_constraints(&self) -> Result<String> {
        Ok(String::from("PRAGMA foreign_keys = ON;"))
    }

    fn compile_disable_foreign_key_constraints(&self) -> Result<String> {
        Ok(String::from("PRAGMA foreign_keys = OFF;"))
    }

    fn as_query_dialect(&self) -> &dyn Dialect {
        self
    }
}

impl Sqlite {
    fn delete_from_master(&self, types: &str, names: &[String]) -> String {
        let mut out = format!("delete from sqlite_master where type in ({types})");
        if !names.is_empty() {
            out.push_str(&format!(" and name in ({})", join_idents(self, names, ",")));
        }
        out.push(';');
        out
    }
}

impl Introspector for Sqlite {
    fn compile_table_exists(&self, table: &str, _schema: Option<&str>) -> Result<String> {
        Ok(format!(
            "select count(*) from sqlite_master where type = 'table' and name = {}",
            self.quote_string(table)
        ))
    }

    fn compile_column_listing(&self, table: &str, _schema: Option<&str>) -> Result<String> {
        Ok(format!("PRAGMA TABLE_INFO ({})", self.quote_ident(table)))
    }

    fn catalog_type(&self, name: &str) -> Result<DataType> {
        let lower = name.trim().to_ascii_lowercase();
        if lower == "tinyint(1)" {
            return Ok(DataType::Boolean);
        }
        match strip_type_args(&lower) {
            "numeric" => Ok(DataType::Decimal),
            "real" => Ok(DataType::Double),
            "character" | "nchar" => Ok(DataType::Char),
            "nvarchar" | "varying character" => Ok(DataType::String),
            "" | "clob" => Ok(DataType::Text),
            other => DataType::from_catalog(other),
        }
    }

    fn load_columns(&self, query: &dyn Query, table: &str, _schema: Option<&str>) -> Result<Vec<Column>> {
        let (count, create_sql): (usize, Vec<String>) = query
            .query_and_load(
                "select sql from sqlite_master where type = ? and tbl_name = ?",
                &["table".to_sql_value(), table.to_sql_value()],
            )
            .with_context(|| format!("reading the definition of table '{table}'"))?;
        if count == 0 {
            return Err(DbxError::NotFound(format!("table '{table}'")));
        }
        let definitions = create_sql
            .first()
            .map(|sql| Self::definition_lines(sql))
            .unwrap_or_default();

        self.table_info(query, table)?
            .iter()
            .map(|info| {
                self.column_from_info(info, definitions.get(&info.name).map(String::as_str))
            })
            .collect()
    }

    fn load_table(&self, query: &dyn Query, table: &str, schema: Option<&str>) -> Result<Table> {
        let mut loaded = Table::loaded(table);
        loaded.columns = self.load_columns(query, table, schema)?;
        Ok(loaded)
    }

    fn load_table_constraints(
        &self,
        query: &dyn Query,
        table: &str,
        _schema: Option<&str>,
    ) -> Result<TableConstraints> {
        let mut constraints = TableConstraints::default();
        let sql = format!("PRAGMA INDEX_LIST ({})", self.quote_string(table));
        let (_, indexes): (usize, Vec<IndexListEntry>) = query
            .query_and_load(&sql, &[])
            .with_context(|| format!("listing indexes of table '{table}'"))?;

        let needs_columns = indexes.iter().any(|index| index.origin.is_none());
        let mut columns = if needs_columns {
            Some(self.table_info(query, table)?)
        } else {
            None
        };

        for index in indexes {
            let sql = format!("PRAGMA INDEX_INFO ({})", self.quote_string(&index.name));
            let (_, parts): (usize, Vec<IndexColumn>) = query.query_and_load(&sql, &[])?;

            let origin = index.origin.unwrap_or_else(|| {
                let first_is_key = parts.first().is_some_and(|part| {
                    columns
                        .iter()
                        .flatten()
                        .any(|column| column.cid == part.cid && column.pk > 0)
                });
                if first_is_key {
                    String::from("pk")
                } else if index.unique && index.name.starts_with("sqlite_") {
                    String::from("u")
                } else {
                    String::from("c")
                }
            });

            let names = parts.into_iter().map(|part| part.name).collect();
            // A CREATE UNIQUE INDEX has origin "c".
            if origin == "pk" {
                constraints.primary_key = Some(PrimaryKey {
                    name: index.name,
                    columns: names,
                });
            } else if origin == "u" || (origin == "c" && index.unique) {
                constraints.uniques.push(Unique {
                    name: index.name,
                    columns: names,
                });
            }
        }

        // INTEGER PRIMARY KEY is the rowid and has no index.
        if constraints.primary_key.is_none() {
            let columns = match columns.take() {
                Some(columns) => columns,
                None => self.table_info(query, table)?,
            };
            let mut keyed: Vec<&PragmaColumn> = columns.iter().filter(|c| c.pk > 0).collect();
            keyed.sort_by_key(|c| c.pk);
            if !keyed.is_empty() {
                constraints.primary_key = Some(PrimaryKey {
                    name: String::new(),
                    columns: keyed.into_iter().map(|c| c.name.clone()).collect(),
                });
            }
        }

        let sql = format!("PRAGMA FOREIGN_KEY_LIST ({})", self.quote_ident(table));
        let (_, keys): (usize, Vec<ForeignKeyRow>) = query
            .query_and_load(&sql, &[])
            .with_context(|| format!("listing foreign keys of table '{table}'"))?;
        let rows = keys.into_iter().map(|ForeignKeyRow(row)| row).collect();
        constraints.foreign_keys = TableConstraints::from_rows(rows, ConstraintKind::parse).foreign_keys;

        Ok(constraints)
    }
}
