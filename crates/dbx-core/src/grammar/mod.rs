//! Schema-level dialect behavior.
//!
//! The schema side of a back-end is split by concern:
//!
//! - [`TypeMapping`] turns abstract column types and attributes into DDL
//!   fragments.
//! - [`DdlCompiler`] renders whole statements for a [`Table`].
//! - [`Introspector`] reads a table back from the database catalog through
//!   a [`Query`] collaborator.
//!
//! Defaults on each trait cover the behavior shared by two of the three
//! back-ends; each back-end overrides the rest. [`SchemaDialect`] bundles
//! the three for use as a trait object.

mod mysql;
mod postgres;
mod sqlite;

pub use crate::dialect::{MySql, Postgres, Sqlite};

use crate::dialect::Dialect;
use crate::error::{DbxError, Result};
use crate::query::Query;
use crate::schema::{Column, DataType, DefaultValue, Index, Table, TableConstraints};
use crate::util::join_idents;

/// Maps abstract types and column attributes to DDL fragments.
///
/// Every `type_*` method fails with [`DbxError::UnsupportedDataType`] when
/// the back-end has no mapping.
#[allow(clippy::missing_errors_doc)]
pub trait TypeMapping: Dialect {
    /// `char(n)`
    fn type_char(&self, column: &Column) -> Result<String> {
        Ok(format!("char({})", column.length))
    }

    /// `varchar(n)`
    fn type_string(&self, column: &Column) -> Result<String> {
        Ok(format!("varchar({})", column.length))
    }

    /// Text.
    fn type_text(&self, _column: &Column) -> Result<String> {
        Ok(String::from("text"))
    }

    /// Medium text.
    fn type_medium_text(&self, _column: &Column) -> Result<String> {
        Ok(String::from("text"))
    }

    /// Long text.
    fn type_long_text(&self, _column: &Column) -> Result<String> {
        Ok(String::from("text"))
    }

    /// 1-byte integer.
    fn type_tiny_int(&self, column: &Column) -> Result<String>;

    /// 2-byte integer.
    fn type_small_int(&self, _column: &Column) -> Result<String> {
        Ok(String::from("smallint"))
    }

    /// 3-byte integer.
    fn type_medium_int(&self, _column: &Column) -> Result<String> {
        Ok(String::from("integer"))
    }

    /// 4-byte integer.
    fn type_int(&self, _column: &Column) -> Result<String> {
        Ok(String::from("integer"))
    }

    /// 8-byte integer.
    fn type_big_int(&self, _column: &Column) -> Result<String> {
        Ok(String::from("bigint"))
    }

    /// Tiny blob.
    fn type_tiny_blob(&self, column: &Column) -> Result<String>;

    /// Blob.
    fn type_blob(&self, _column: &Column) -> Result<String> {
        Ok(String::from("blob"))
    }

    /// Medium blob.
    fn type_medium_blob(&self, column: &Column) -> Result<String>;

    /// Long blob.
    fn type_long_blob(&self, column: &Column) -> Result<String>;

    /// Float.
    fn type_float(&self, column: &Column) -> Result<String>;

    /// Double.
    fn type_double(&self, column: &Column) -> Result<String>;

    /// `decimal(p, s)`
    fn type_decimal(&self, column: &Column) -> Result<String> {
        Ok(format!("decimal({}, {})", column.precision, column.scale))
    }

    /// Boolean.
    fn type_boolean(&self, _column: &Column) -> Result<String> {
        Ok(String::from("tinyint(1)"))
    }

    /// Enumeration over the allowed values.
    fn type_enum(&self, column: &Column) -> Result<String>;

    /// Set over the allowed values.
    fn type_set(&self, _column: &Column) -> Result<String> {
        Err(DbxError::UnsupportedDataType(String::from("set")))
    }

    /// JSON.
    fn type_json(&self, _column: &Column) -> Result<String> {
        Ok(String::from("json"))
    }

    /// Binary JSON.
    fn type_jsonb(&self, column: &Column) -> Result<String>;

    /// Date.
    fn type_date(&self, _column: &Column) -> Result<String> {
        Ok(String::from("date"))
    }

    /// Date-time.
    fn type_date_time(&self, column: &Column) -> Result<String>;

    /// Date-time with time zone.
    fn type_date_time_tz(&self, column: &Column) -> Result<String> {
        self.type_date_time(column)
    }

    /// Time.
    fn type_time(&self, column: &Column) -> Result<String>;

    /// Time with time zone.
    fn type_time_tz(&self, column: &Column) -> Result<String> {
        self.type_time(column)
    }

    /// Timestamp.
    fn type_timestamp(&self, column: &Column) -> Result<String>;

    /// Timestamp with time zone.
    fn type_timestamp_tz(&self, column: &Column) -> Result<String> {
        self.type_timestamp(column)
    }

    /// Year.
    fn type_year(&self, column: &Column) -> Result<String> {
        self.type_int(column)
    }

    /// Binary.
    fn type_binary(&self, _column: &Column) -> Result<String> {
        Ok(String::from("blob"))
    }

    /// UUID.
    fn type_uuid(&self, column: &Column) -> Result<String>;

    /// IP address.
    fn type_ip_address(&self, column: &Column) -> Result<String>;

    /// MAC address.
    fn type_mac_address(&self, column: &Column) -> Result<String>;

    /// Renders a spatial type from its lower-case name.
    fn type_spatial(&self, name: &str, _column: &Column) -> Result<String> {
        Ok(String::from(name))
    }

    /// Geometry.
    fn type_geometry(&self, column: &Column) -> Result<String> {
        self.type_spatial("geometry", column)
    }

    /// Point.
    fn type_point(&self, column: &Column) -> Result<String> {
        self.type_spatial("point", column)
    }

    /// Line string.
    fn type_line_string(&self, column: &Column) -> Result<String> {
        self.type_spatial("linestring", column)
    }

    /// Polygon.
    fn type_polygon(&self, column: &Column) -> Result<String> {
        self.type_spatial("polygon", column)
    }

    /// Geometry collection.
    fn type_geometry_collection(&self, column: &Column) -> Result<String> {
        self.type_spatial("geometrycollection", column)
    }

    /// Multi point.
    fn type_multi_point(&self, column: &Column) -> Result<String> {
        self.type_spatial("multipoint", column)
    }

    /// Multi line string.
    fn type_multi_line_string(&self, column: &Column) -> Result<String> {
        self.type_spatial("multilinestring", column)
    }

    /// Multi polygon.
    fn type_multi_polygon(&self, column: &Column) -> Result<String> {
        self.type_spatial("multipolygon", column)
    }

    /// Renders the type of `column`.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::UnsupportedDataType`] when the back-end has no
    /// mapping for the column's type.
    fn column_type(&self, column: &Column) -> Result<String> {
        match column.data_type {
            DataType::Char => self.type_char(column),
            DataType::String => self.type_string(column),
            DataType::Text => self.type_text(column),
            DataType::MediumText => self.type_medium_text(column),
            DataType::LongText => self.type_long_text(column),
            DataType::TinyInt => self.type_tiny_int(column),
            DataType::SmallInt => self.type_small_int(column),
            DataType::MediumInt => self.type_medium_int(column),
            DataType::Int => self.type_int(column),
            DataType::BigInt => self.type_big_int(column),
            DataType::TinyBlob => self.type_tiny_blob(column),
            DataType::Blob => self.type_blob(column),
            DataType::MediumBlob => self.type_medium_blob(column),
            DataType::LongBlob => self.type_long_blob(column),
            DataType::Float => self.type_float(column),
            DataType::Double => self.type_double(column),
            DataType::Decimal => self.type_decimal(column),
            DataType::Boolean => self.type_boolean(column),
            DataType::Enum => self.type_enum(column),
            DataType::Set => self.type_set(column),
            DataType::Json => self.type_json(column),
            DataType::Jsonb => self.type_jsonb(column),
            DataType::Date => self.type_date(column),
            DataType::DateTime => self.type_date_time(column),
            DataType::DateTimeTz => self.type_date_time_tz(column),
            DataType::Time => self.type_time(column),
            DataType::TimeTz => self.type_time_tz(column),
            DataType::Timestamp => self.type_timestamp(column),
            DataType::TimestampTz => self.type_timestamp_tz(column),
            DataType::Year => self.type_year(column),
            DataType::Binary => self.type_binary(column),
            DataType::Uuid => self.type_uuid(column),
            DataType::IpAddress => self.type_ip_address(column),
            DataType::MacAddress => self.type_mac_address(column),
            DataType::Geometry => self.type_geometry(column),
            DataType::Point => self.type_point(column),
            DataType::LineString => self.type_line_string(column),
            DataType::Polygon => self.type_polygon(column),
            DataType::GeometryCollection => self.type_geometry_collection(column),
            DataType::MultiPoint => self.type_multi_point(column),
            DataType::MultiLineString => self.type_multi_line_string(column),
            DataType::MultiPolygon => self.type_multi_polygon(column),
            DataType::MultiPolygonZ => Err(DbxError::UnsupportedDataType(String::from(
                DataType::MultiPolygonZ.as_str(),
            ))),
        }
    }

    /// Renders the attribute suffix of a column definition, starting with a
    /// space when non-empty.
    fn column_modifiers(&self, column: &Column) -> String;

    /// Quotes a string literal for DDL text.
    fn quote_string(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    /// Renders a default value.
    fn default_literal(&self, value: &DefaultValue) -> String {
        match value {
            DefaultValue::Expression(sql) => sql.clone(),
            other => other
                .literal_text()
                .map_or_else(|| String::from("NULL"), |text| self.quote_string(&text)),
        }
    }

    /// Quotes each value and joins them with `,`.
    fn quote_values(&self, values: &[String]) -> String {
        values
            .iter()
            .map(|value| self.quote_string(value))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Renders DDL statements for a table.
pub trait DdlCompiler: TypeMapping {
    /// Quoted `schema.prefixname` of the table.
    fn wrap_table(&self, table: &Table) -> String {
        let mut out = String::new();
        if let Some(schema) = &table.schema {
            out.push_str(&self.quote_ident(schema));
            out.push('.');
        }
        out.push_str(&self.quote_ident(&table.full_name()));
        out
    }

    /// Quoted index name, qualified by the table's schema.
    fn wrap_index(&self, table: &Table, name: &str) -> String {
        match &table.schema {
            Some(schema) => format!("{}.{}", self.quote_ident(schema), self.quote_ident(name)),
            None => self.quote_ident(name),
        }
    }

    /// `CREATE TABLE` with every column.
    ///
    /// # Errors
    ///
    /// Returns the first column type error.
    fn compile_create(&self, table: &Table) -> Result<String>;

    /// Alters every changed column.
    ///
    /// # Errors
    ///
    /// Returns a type error or [`DbxError::UnsupportedFeature`].
    fn compile_modify_columns(&self, table: &Table) -> Result<String>;

    /// Alters one column to its current definition.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::NotFound`] for an unknown column.
    fn compile_modify_column(&self, table: &Table, column: &str) -> Result<String>;

    /// Adds every declared column.
    ///
    /// # Errors
    ///
    /// Returns the first column type error.
    fn compile_add_columns(&self, table: &Table) -> Result<String>;

    /// Adds one column.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::NotFound`] for an unknown column.
    fn compile_add_column(&self, table: &Table, column: &str) -> Result<String>;

    /// Adds a primary key.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::UnsupportedFeature`] where keys cannot be added
    /// after creation.
    fn compile_primary_key(&self, table: &Table, columns: &[String]) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ADD PRIMARY KEY ({});",
            self.wrap_table(table),
            join_idents(self.as_query_dialect(), columns, ",")
        ))
    }

    /// Drops the primary key.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::UnsupportedFeature`] where unsupported.
    fn compile_drop_primary_key(&self, table: &Table) -> Result<String> {
        Ok(format!("ALTER TABLE {} DROP PRIMARY KEY;", self.wrap_table(table)))
    }

    /// Creates an index.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::UnsupportedFeature`] for index kinds the
    /// back-end lacks.
    fn compile_index(&self, table: &Table, index: &Index) -> Result<String>;

    /// Drops an index.
    ///
    /// # Errors
    ///
    /// Never fails by default.
    fn compile_drop_index(&self, table: &Table, name: &str) -> Result<String> {
        Ok(format!("DROP INDEX {};", self.wrap_index(table, name)))
    }

    /// Drops a unique index.
    ///
    /// # Errors
    ///
    /// Never fails by default.
    fn compile_drop_unique(&self, table: &Table, name: &str) -> Result<String> {
        self.compile_drop_index(table, name)
    }

    /// Drops a spatial index.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::UnsupportedFeature`] where unsupported.
    fn compile_drop_spatial_index(&self, table: &Table, name: &str) -> Result<String> {
        self.compile_drop_index(table, name)
    }

    /// Drops a foreign key.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::UnsupportedFeature`] where unsupported.
    fn compile_drop_foreign(&self, table: &Table, name: &str) -> Result<String>;

    /// `DROP TABLE`
    ///
    /// # Errors
    ///
    /// Never fails by default.
    fn compile_drop(&self, name: &str) -> Result<String> {
        Ok(format!("DROP TABLE {};", self.quote_ident(name)))
    }

    /// `DROP TABLE IF EXISTS`
    ///
    /// # Errors
    ///
    /// Never fails by default.
    fn compile_drop_if_exists(&self, name: &str) -> Result<String> {
        Ok(format!("DROP TABLE IF EXISTS {};", self.quote_ident(name)))
    }

    /// Drops columns.
    ///
    /// # Errors
    ///
    /// Never fails by default.
    fn compile_drop_column(&self, table: &Table, columns: &[String]) -> Result<String> {
        let table_name = self.wrap_table(table);
        if let [column] = columns {
            return Ok(format!(
                "ALTER TABLE {table_name} DROP COLUMN {};",
                self.quote_ident(column)
            ));
        }
        let drops: Vec<String> = columns
            .iter()
            .map(|column| format!("\tDROP COLUMN {}", self.quote_ident(column)))
            .collect();
        Ok(format!("ALTER TABLE {table_name} \n{};", drops.join(",\n")))
    }

    /// Renames the table.
    ///
    /// # Errors
    ///
    /// Never fails by default.
    fn compile_rename_table(&self, table: &Table, to: &str) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} RENAME TO {};",
            self.wrap_table(table),
            self.quote_ident(to)
        ))
    }

    /// Renames an index.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::UnsupportedFeature`] where unsupported.
    fn compile_rename_index(&self, table: &Table, from: &str, to: &str) -> Result<String>;

    /// Drops the named tables.
    ///
    /// # Errors
    ///
    /// Never fails in the built-in back-ends.
    fn compile_drop_all_tables(&self, tables: &[String]) -> Result<String>;

    /// Drops the named views.
    ///
    /// # Errors
    ///
    /// Never fails in the built-in back-ends.
    fn compile_drop_all_views(&self, views: &[String]) -> Result<String>;

    /// Drops the named user-defined types.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::UnsupportedFeature`] by default.
    fn compile_drop_all_types(&self, _types: &[String]) -> Result<String> {
        Err(self.unsupported("drop all types"))
    }

    /// Lists the tables of the given schemas.
    ///
    /// # Errors
    ///
    /// Never fails in the built-in back-ends.
    fn compile_get_all_tables(&self, schemas: &[String]) -> Result<String>;

    /// Lists the views of the given schemas.
    ///
    /// # Errors
    ///
    /// Never fails in the built-in back-ends.
    fn compile_get_all_views(&self, schemas: &[String]) -> Result<String>;

    /// Lists the user-defined types.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::UnsupportedFeature`] by default.
    fn compile_get_all_types(&self) -> Result<String> {
        Err(self.unsupported("get all types"))
    }

    /// Rebuilds the database file.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::UnsupportedFeature`] by default.
    fn compile_rebuild(&self) -> Result<String> {
        Err(self.unsupported("rebuild"))
    }

    /// Turns foreign key enforcement on.
    ///
    /// # Errors
    ///
    /// Never fails in the built-in back-ends.
    fn compile_enable_foreign_key_constraints(&self) -> Result<String>;

    /// Turns foreign key enforcement off.
    ///
    /// # Errors
    ///
    /// Never fails in the built-in back-ends.
    fn compile_disable_foreign_key_constraints(&self) -> Result<String>;

    /// Builds an unsupported-feature error naming this back-end.
    fn unsupported(&self, feature: &str) -> DbxError {
        DbxError::UnsupportedFeature(format!("{} does not support {feature}", self.name()))
    }

    /// Returns `self` as a query-level dialect.
    fn as_query_dialect(&self) -> &dyn Dialect;
}

/// Reads tables back from the database catalog.
pub trait Introspector: DdlCompiler {
    /// Query that counts tables named `table`.
    ///
    /// # Errors
    ///
    /// Never fails in the built-in back-ends.
    fn compile_table_exists(&self, table: &str, schema: Option<&str>) -> Result<String>;

    /// Query that lists the column names of `table`.
    ///
    /// # Errors
    ///
    /// Never fails in the built-in back-ends.
    fn compile_column_listing(&self, table: &str, schema: Option<&str>) -> Result<String>;

    /// Maps a catalog type name to an abstract type.
    ///
    /// Back-ends translate their own spellings, then fall back to
    /// [`DataType::from_catalog`].
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::InvalidValue`] for an unknown name.
    fn catalog_type(&self, name: &str) -> Result<DataType> {
        DataType::from_catalog(strip_type_args(name))
    }

    /// Loads the columns of `table`, each with a load-time snapshot.
    ///
    /// # Errors
    ///
    /// Propagates catalog and type mapping errors.
    fn load_columns(&self, query: &dyn Query, table: &str, schema: Option<&str>) -> Result<Vec<Column>>;

    /// Loads `table` and its columns.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::NotFound`] when the table does not exist.
    fn load_table(&self, query: &dyn Query, table: &str, schema: Option<&str>) -> Result<Table>;

    /// Loads the constraints of `table`.
    ///
    /// # Errors
    ///
    /// Propagates catalog errors.
    fn load_table_constraints(
        &self,
        query: &dyn Query,
        table: &str,
        schema: Option<&str>,
    ) -> Result<TableConstraints>;
}

/// A complete schema dialect, usable as a trait object.
pub trait SchemaDialect: Introspector {}

impl<T: Introspector> SchemaDialect for T {}

/// Looks up a column by name.
///
/// # Errors
///
/// Returns [`DbxError::NotFound`].
pub fn find_column<'t>(table: &'t Table, name: &str) -> Result<&'t Column> {
    table
        .column(name)
        .ok_or_else(|| DbxError::NotFound(format!("column '{name}' in table '{}'", table.name)))
}

/// Drops a parenthesized argument list: `varchar(255)` becomes `varchar`.
#[must_use]
pub fn strip_type_args(name: &str) -> &str {
    name.find('(').map_or(name, |pos| &name[..pos]).trim()
}

/// Decodes a catalog default expression.
///
/// Returns the default and whether it means `CURRENT_TIMESTAMP`. A quoted
/// literal, optionally followed by a PostgreSQL cast, becomes a string
/// default; anything else is kept as a raw expression.
#[must_use]
pub fn parse_catalog_default(raw: &str) -> (Option<DefaultValue>, bool) {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return (None, false);
    }
    let upper = raw.to_ascii_uppercase();
    if upper.starts_with("CURRENT_TIMESTAMP") || upper == "NOW()" {
        return (Some(DefaultValue::expr("CURRENT_TIMESTAMP")), true);
    }
    if let Some(rest) = raw.strip_prefix('\'') {
        let end = rest.rfind("'::").or_else(|| rest.rfind('\''));
        if let Some(end) = end {
            return (Some(DefaultValue::String(rest[..end].replace("''", "'"))), false);
        }
    }
    if raw.parse::<f64>().is_ok() {
        return (Some(DefaultValue::String(String::from(raw))), false);
    }
    (Some(DefaultValue::Expression(String::from(raw))), false)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnOption;

    #[test]
    fn test_strip_type_args() {
        assert_eq!(strip_type_args("varchar(255)"), "varchar");
        assert_eq!(strip_type_args("int"), "int");
        assert_eq!(strip_type_args("decimal (10,2)"), "decimal");
    }

    #[test]
    fn test_parse_catalog_default() {
        assert_eq!(parse_catalog_default("NULL"), (None, false));
        assert_eq!(
            parse_catalog_default("CURRENT_TIMESTAMP"),
            (Some(DefaultValue::expr("CURRENT_TIMESTAMP")), true)
        );
        assert_eq!(
            parse_catalog_default("'draft'::character varying"),
            (Some(DefaultValue::from("draft")), false)
        );
        assert_eq!(
            parse_catalog_default("'it''s'"),
            (Some(DefaultValue::from("it's")), false)
        );
        assert_eq!(
            parse_catalog_default("42"),
            (Some(DefaultValue::from("42")), false)
        );
        assert_eq!(
            parse_catalog_default("nextval('seq'::regclass)"),
            (Some(DefaultValue::expr("nextval('seq'::regclass)")), false)
        );
    }

    #[test]
    fn test_multi_polygon_z_is_unsupported_everywhere() {
        let column = Column::new("shape", DataType::MultiPolygonZ);
        let dialects: [&dyn SchemaDialect; 3] = [&MySql, &Postgres, &Sqlite];
        for dialect in dialects {
            assert!(matches!(
                dialect.column_type(&column),
                Err(DbxError::UnsupportedDataType(_))
            ));
        }
    }

    #[test]
    fn test_default_literal_quoting() {
        let value = DefaultValue::from("it's");
        assert_eq!(Postgres.default_literal(&value), "'it''s'");
        assert_eq!(MySql.default_literal(&value), "'it\\'s'");
        assert_eq!(Sqlite.default_literal(&DefaultValue::from(true)), "'1'");
        assert_eq!(Sqlite.default_literal(&DefaultValue::Null), "NULL");
        assert_eq!(
            Sqlite.default_literal(&DefaultValue::expr("CURRENT_TIMESTAMP")),
            "CURRENT_TIMESTAMP"
        );
    }

    #[test]
    fn test_wrap_table_with_schema_and_prefix() {
        let mut table = Table::new("users");
        table.set_schema("app").set_prefix("t_");
        assert_eq!(Postgres.wrap_table(&table), "\"app\".\"t_users\"");
        assert_eq!(MySql.wrap_table(&table), "`app`.`t_users`");
        assert_eq!(Postgres.wrap_index(&table, "idx_a"), "\"app\".\"idx_a\"");
    }

    #[test]
    fn test_find_column() {
        let mut table = Table::new("t");
        table.int("a", [ColumnOption::Nullable(true)]);
        assert!(find_column(&table, "a").unwrap().nullable);
        assert!(matches!(find_column(&table, "b"), Err(DbxError::NotFound(_))));
    }
}
