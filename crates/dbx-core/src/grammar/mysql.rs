//! MySQL schema grammar and `information_schema` introspection.

use super::{find_column, DdlCompiler, Introspector, TypeMapping};
use crate::dialect::{Dialect, MySql};
use crate::error::{DbxError, Result, ResultExt};
use crate::query::{Query, QueryExt, Row};
use crate::schema::{
    Column, ConstraintKind, ConstraintRow, DataType, DefaultValue, Index, IndexType, Table,
    TableConstraints,
};
use crate::util::{addslashes, join_idents, split_list};
use crate::value::{SqlValue, ToSqlValue};

const CONSTRAINTS_SQL: &str = "
SELECT
    kcu.CONSTRAINT_NAME AS name,
    kcu.COLUMN_NAME AS column_name,
    tc.CONSTRAINT_TYPE AS type,
    CASE
        WHEN :schemaName IS NULL AND kcu.REFERENCED_TABLE_SCHEMA = DATABASE() THEN NULL
        ELSE kcu.REFERENCED_TABLE_SCHEMA
    END AS foreign_table_schema,
    kcu.REFERENCED_TABLE_NAME AS foreign_table_name,
    kcu.REFERENCED_COLUMN_NAME AS foreign_column_name,
    rc.UPDATE_RULE AS on_update,
    rc.DELETE_RULE AS on_delete,
    kcu.ORDINAL_POSITION AS position
FROM
    information_schema.KEY_COLUMN_USAGE AS kcu,
    information_schema.REFERENTIAL_CONSTRAINTS AS rc,
    information_schema.TABLE_CONSTRAINTS AS tc
WHERE
    kcu.TABLE_SCHEMA = COALESCE(:schemaName, DATABASE()) AND kcu.CONSTRAINT_SCHEMA = kcu.TABLE_SCHEMA AND kcu.TABLE_NAME = :tableName
    AND rc.CONSTRAINT_SCHEMA = kcu.TABLE_SCHEMA AND rc.TABLE_NAME = :tableName AND rc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
    AND tc.TABLE_SCHEMA = kcu.TABLE_SCHEMA AND tc.TABLE_NAME = :tableName AND tc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME AND tc.CONSTRAINT_TYPE = 'FOREIGN KEY'
UNION
SELECT
    kcu.CONSTRAINT_NAME AS name,
    kcu.COLUMN_NAME AS column_name,
    tc.CONSTRAINT_TYPE AS type,
    NULL AS foreign_table_schema,
    NULL AS foreign_table_name,
    NULL AS foreign_column_name,
    NULL AS on_update,
    NULL AS on_delete,
    kcu.ORDINAL_POSITION AS position
FROM
    information_schema.KEY_COLUMN_USAGE AS kcu,
    information_schema.TABLE_CONSTRAINTS AS tc
WHERE
    kcu.TABLE_SCHEMA = COALESCE(:schemaName, DATABASE()) AND kcu.TABLE_NAME = :tableName
    AND tc.TABLE_SCHEMA = kcu.TABLE_SCHEMA AND tc.TABLE_NAME = :tableName AND tc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME AND tc.CONSTRAINT_TYPE IN ('PRIMARY KEY', 'UNIQUE')
ORDER BY position ASC";

impl MySql {
    fn column_definition(&self, column: &Column) -> Result<String> {
        Ok(format!(
            "{} {}{}",
            self.quote_ident(&column.name),
            self.column_type(column)?,
            self.column_modifiers(column)
        ))
    }

    fn alter_column(&self, column: &Column) -> Result<String> {
        Ok(match column.rename() {
            Some(to) => format!(
                "CHANGE COLUMN {} {} {}{}",
                self.quote_ident(&column.name),
                self.quote_ident(to),
                self.column_type(column)?,
                self.column_modifiers(column)
            ),
            None => format!("MODIFY COLUMN {}", self.column_definition(column)?),
        })
    }

    fn schema_filter(&self, schema: Option<&str>) -> String {
        schema.map_or_else(String::new, |schema| {
            format!(" and table_schema = {}", self.quote_string(schema))
        })
    }

    fn column_from_row(&self, row: &Row) -> Result<Column> {
        let name = row.text("COLUMN_NAME")?;
        let column_type = row.opt_text("COLUMN_TYPE").unwrap_or_default();
        let data_type = if column_type.eq_ignore_ascii_case("tinyint(1)") {
            DataType::Boolean
        } else {
            self.catalog_type(&row.text("DATA_TYPE")?)?
        };

        let mut column = Column::new(name, data_type);
        column.added = false;
        column.nullable = row
            .opt_text("IS_NULLABLE")
            .is_some_and(|v| v.eq_ignore_ascii_case("YES"));
        column.length = catalog_u32(row, "CHARACTER_MAXIMUM_LENGTH");
        column.precision = catalog_u32(row, "NUMERIC_PRECISION");
        column.scale = catalog_u32(row, "NUMERIC_SCALE");

        if let Some(default) = row.opt_text("COLUMN_DEFAULT") {
            if default.to_ascii_uppercase().starts_with("CURRENT_TIMESTAMP") {
                column.default = Some(DefaultValue::expr("CURRENT_TIMESTAMP"));
                column.use_current = true;
            } else if !default.eq_ignore_ascii_case("NULL") {
                column.default = Some(DefaultValue::String(default));
            }
        }
        column.comment = row.opt_text("COLUMN_COMMENT").filter(|c| !c.is_empty());
        column.charset = row.opt_text("CHARACTER_SET_NAME");
        column.collation = row.opt_text("COLLATION_NAME");
        column.primary_key = row.opt_text("COLUMN_KEY").is_some_and(|key| key == "PRI");

        let extra = row.opt_text("EXTRA").unwrap_or_default();
        if extra.contains("auto_increment") {
            column.auto_increment = true;
        } else if extra.to_ascii_uppercase().contains("CURRENT_TIMESTAMP") {
            column.use_current = true;
        }
        column.unsigned = column_type.contains("unsigned");

        if matches!(column.data_type, DataType::Enum | DataType::Set) {
            if let (Some(open), Some(close)) = (column_type.find('('), column_type.rfind(')')) {
                column.allowed_values = split_list(&column_type[open + 1..close], &['\'']);
            }
        }

        column.store();
        Ok(column)
    }
}

fn catalog_u32(row: &Row, name: &str) -> u32 {
    row.opt_int(name)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_default()
}

impl TypeMapping for MySql {
    fn type_medium_text(&self, _column: &Column) -> Result<String> {
        Ok(String::from("mediumtext"))
    }

    fn type_long_text(&self, _column: &Column) -> Result<String> {
        Ok(String::from("longtext"))
    }

    fn type_tiny_int(&self, _column: &Column) -> Result<String> {
        Ok(String::from("tinyint"))
    }

    fn type_medium_int(&self, _column: &Column) -> Result<String> {
        Ok(String::from("mediumint"))
    }

    fn type_int(&self, _column: &Column) -> Result<String> {
        Ok(String::from("int"))
    }

    fn type_tiny_blob(&self, _column: &Column) -> Result<String> {
        Ok(String::from("tinyblob"))
    }

    fn type_medium_blob(&self, _column: &Column) -> Result<String> {
        Ok(String::from("mediumblob"))
    }

    fn type_long_blob(&self, _column: &Column) -> Result<String> {
        Ok(String::from("longblob"))
    }

    fn type_float(&self, column: &Column) -> Result<String> {
        Ok(sized("float", column))
    }

    fn type_double(&self, column: &Column) -> Result<String> {
        Ok(sized("double", column))
    }

    fn type_enum(&self, column: &Column) -> Result<String> {
        Ok(format!("enum({})", self.quote_values(&column.allowed_values)))
    }

    fn type_set(&self, column: &Column) -> Result<String> {
        Ok(format!("set({})", self.quote_values(&column.allowed_values)))
    }

    fn type_jsonb(&self, _column: &Column) -> Result<String> {
        Ok(String::from("json"))
    }

    fn type_date_time(&self, column: &Column) -> Result<String> {
        Ok(with_precision("datetime", column))
    }

    fn type_time(&self, column: &Column) -> Result<String> {
        Ok(with_precision("time", column))
    }

    fn type_timestamp(&self, column: &Column) -> Result<String> {
        let mut out = with_precision("timestamp", column);
        if column.use_current {
            out.push_str(" default ");
            out.push_str(&with_precision("CURRENT_TIMESTAMP", column));
        }
        Ok(out)
    }

    fn type_year(&self, _column: &Column) -> Result<String> {
        Ok(String::from("year"))
    }

    fn type_uuid(&self, _column: &Column) -> Result<String> {
        Ok(String::from("char(36)"))
    }

    fn type_ip_address(&self, _column: &Column) -> Result<String> {
        Ok(String::from("varchar(45)"))
    }

    fn type_mac_address(&self, _column: &Column) -> Result<String> {
        Ok(String::from("varchar(17)"))
    }

    fn column_modifiers(&self, column: &Column) -> String {
        let mut out = String::new();
        if column.unsigned {
            out.push_str(" UNSIGNED");
        }
        if let Some(charset) = &column.charset {
            out.push_str(" CHARACTER SET ");
            out.push_str(charset);
        }
        if let Some(collation) = &column.collation {
            out.push_str(" COLLATE ");
            out.push_str(&self.quote_string(collation));
        }
        if let Some(expr) = &column.virtual_as {
            out.push_str(&format!(" AS ({expr})"));
        }
        if let Some(expr) = &column.stored_as {
            out.push_str(&format!(" AS ({expr}) STORED"));
        }
        if column.virtual_as.is_none() && column.stored_as.is_none() {
            out.push_str(if column.nullable { " NULL" } else { " NOT NULL" });
        } else if !column.nullable {
            out.push_str(" NOT NULL");
        }
        if column.srid > 0 {
            out.push_str(&format!(" SRID {}", column.srid));
        }
        if column.use_current
            && matches!(column.data_type, DataType::DateTime | DataType::DateTimeTz)
        {
            out.push_str(" DEFAULT CURRENT_TIMESTAMP");
        } else if let Some(value) = &column.default {
            out.push_str(" DEFAULT ");
            out.push_str(&self.default_literal(value));
        }
        if column.is_auto_increment_integer() {
            out.push_str(" AUTO_INCREMENT");
        }
        if let Some(comment) = &column.comment {
            out.push_str(&format!(" COMMENT '{}'", addslashes(comment)));
        }
        if let Some(after) = &column.after {
            out.push_str(" AFTER ");
            out.push_str(&self.quote_ident(after));
        }
        if column.first {
            out.push_str(" FIRST");
        }
        out
    }

    fn quote_string(&self, s: &str) -> String {
        format!("'{}'", addslashes(s))
    }
}

fn with_precision(name: &str, column: &Column) -> String {
    if column.precision > 0 {
        format!("{name}({})", column.precision)
    } else {
        String::from(name)
    }
}

fn sized(name: &str, column: &Column) -> String {
    if column.precision > 0 {
        format!("{name}({}, {})", column.precision, column.scale)
    } else {
        String::from(name)
    }
}

impl DdlCompiler for MySql {
    fn compile_create(&self, table: &Table) -> Result<String> {
        let mut out = String::from(if table.temporary {
            "CREATE TEMPORARY TABLE "
        } else {
            "CREATE TABLE "
        });
        out.push_str(&self.wrap_table(table));
        out.push_str("(\n");

        let primary_key = table.primary_key();
        let count = table.columns.len();
        for (i, column) in table.columns.iter().enumerate() {
            out.push('\t');
            out.push_str(&self.column_definition(column)?);
            if i + 1 < count || !primary_key.is_empty() {
                out.push(',');
            }
            out.push('\n');
        }
        if !primary_key.is_empty() {
            out.push_str(&format!(
                "\tPRIMARY KEY ({})\n",
                join_idents(self, &primary_key, ", ")
            ));
        }
        out.push(')');

        if let Some(engine) = &table.engine {
            out.push_str(&format!(" ENGINE={engine}"));
        }
        if let Some(charset) = &table.charset {
            out.push_str(&format!(" CHARSET={charset}"));
        }
        if let Some(collation) = &table.collation {
            out.push_str(&format!(" COLLATE={collation}"));
        }
        if let Some(comment) = &table.comment {
            out.push_str(&format!(" COMMENT={}", self.quote_string(comment)));
        }
        out.push(';');
        Ok(out)
    }

    fn compile_modify_columns(&self, table: &Table) -> Result<String> {
        if table.changed_columns().is_empty() {
            return Ok(String::new());
        }
        let alters = table
            .changed_columns()
            .into_iter()
            .map(|column| self.alter_column(column))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!(
            "ALTER TABLE {} \n{};",
            self.wrap_table(table),
            alters.join(",\n")
        ))
    }

    fn compile_modify_column(&self, table: &Table, column: &str) -> Result<String> {
        let column = find_column(table, column)?;
        Ok(format!(
            "ALTER TABLE {} {};",
            self.wrap_table(table),
            self.alter_column(column)?
        ))
    }

    fn compile_add_columns(&self, table: &Table) -> Result<String> {
        if table.added_columns().is_empty() {
            return Ok(String::new());
        }
        let adds = table
            .added_columns()
            .into_iter()
            .map(|column| Ok(format!("ADD COLUMN {}", self.column_definition(column)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!(
            "ALTER TABLE {} \n{};",
            self.wrap_table(table),
            adds.join(",\n")
        ))
    }

    fn compile_add_column(&self, table: &Table, column: &str) -> Result<String> {
        let column = find_column(table, column)?;
        Ok(format!(
            "ALTER TABLE {} ADD COLUMN {};",
            self.wrap_table(table),
            self.column_definition(column)?
        ))
    }

    fn compile_primary_key(&self, table: &Table, columns: &[String]) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP PRIMARY KEY, ADD PRIMARY KEY ({});",
            self.wrap_table(table),
            join_idents(self, columns, ",")
        ))
    }

    fn compile_index(&self, table: &Table, index: &Index) -> Result<String> {
        let kind = match index.index_type {
            IndexType::Primary => {
                return self.compile_primary_key(table, &index.columns);
            }
            IndexType::Normal => "INDEX",
            IndexType::Unique => "UNIQUE",
            IndexType::Spatial | IndexType::Gist => "SPATIAL INDEX",
            IndexType::FullText => "FULLTEXT INDEX",
            IndexType::Gin => return Err(self.unsupported("gin indexes")),
        };
        let mut out = format!(
            "ALTER TABLE {} ADD {kind} {}",
            self.wrap_table(table),
            self.quote_ident(&index.name)
        );
        if let Some(algorithm) = &index.algorithm {
            out.push_str(" USING ");
            out.push_str(algorithm);
        }
        out.push_str(&format!("({});", join_idents(self, &index.columns, ",")));
        Ok(out)
    }

    fn compile_drop_index(&self, table: &Table, name: &str) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP INDEX {};",
            self.wrap_table(table),
            self.quote_ident(name)
        ))
    }

    fn compile_drop_foreign(&self, table: &Table, name: &str) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP FOREIGN KEY {};",
            self.wrap_table(table),
            self.quote_ident(name)
        ))
    }

    fn compile_rename_table(&self, table: &Table, to: &str) -> Result<String> {
        Ok(format!(
            "RENAME TABLE {} TO {};",
            self.wrap_table(table),
            self.quote_ident(to)
        ))
    }

    fn compile_rename_index(&self, table: &Table, from: &str, to: &str) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} RENAME INDEX {} TO {};",
            self.wrap_table(table),
            self.quote_ident(from),
            self.quote_ident(to)
        ))
    }

    fn compile_drop_all_tables(&self, tables: &[String]) -> Result<String> {
        Ok(format!("DROP TABLE {};", join_idents(self, tables, ",")))
    }

    fn compile_drop_all_views(&self, views: &[String]) -> Result<String> {
        Ok(format!("DROP VIEW {};", join_idents(self, views, ",")))
    }

    fn compile_get_all_tables(&self, _schemas: &[String]) -> Result<String> {
        Ok(String::from("SHOW FULL TABLES WHERE table_type = 'BASE TABLE';"))
    }

    fn compile_get_all_views(&self, _schemas: &[String]) -> Result<String> {
        Ok(String::from("SHOW FULL TABLES WHERE table_type = 'VIEW';"))
    }

    fn compile_enable_foreign_key_constraints(&self) -> Result<String> {
        Ok(String::from("SET FOREIGN_KEY_CHECKS=1;"))
    }

    fn compile_disable_foreign_key_constraints(&self) -> Result<String> {
        Ok(String::from("SET FOREIGN_KEY_CHECKS=0;"))
    }

    fn as_query_dialect(&self) -> &dyn Dialect {
        self
    }
}

impl Introspector for MySql {
    fn catalog_type(&self, name: &str) -> Result<DataType> {
        match name.trim().to_ascii_lowercase().as_str() {
            "tinytext" => Ok(DataType::Text),
            "varbinary" => Ok(DataType::Binary),
            "numeric" => Ok(DataType::Decimal),
            "real" => Ok(DataType::Double),
            "bool" | "bit" => Ok(DataType::Boolean),
            "geomcollection" => Ok(DataType::GeometryCollection),
            other => DataType::from_catalog(super::strip_type_args(other)),
        }
    }

    fn compile_table_exists(&self, table: &str, schema: Option<&str>) -> Result<String> {
        Ok(format!(
            "select count(*) from information_schema.tables where table_name = {}{} and table_type = 'BASE TABLE'",
            self.quote_string(table),
            self.schema_filter(schema)
        ))
    }

    fn compile_column_listing(&self, table: &str, schema: Option<&str>) -> Result<String> {
        Ok(format!(
            "select column_name from information_schema.columns where table_name = {}{}",
            self.quote_string(table),
            self.schema_filter(schema)
        ))
    }

    fn load_columns(&self, query: &dyn Query, table: &str, schema: Option<&str>) -> Result<Vec<Column>> {
        let mut sql = String::from("select * from information_schema.columns where table_name = ?");
        let mut args = vec![table.to_sql_value()];
        if let Some(schema) = schema {
            sql.push_str(" and table_schema = ?");
            args.push(schema.to_sql_value());
        }
        sql.push_str(" order by ORDINAL_POSITION");

        let (_, rows): (usize, Vec<Row>) = query
            .query_and_load(&sql, &args)
            .with_context(|| format!("loading columns of table '{table}'"))?;
        rows.iter().map(|row| self.column_from_row(row)).collect()
    }

    fn load_table(&self, query: &dyn Query, table: &str, schema: Option<&str>) -> Result<Table> {
        let mut sql = String::from("select * from information_schema.tables where table_name = ?");
        let mut args = vec![table.to_sql_value()];
        if let Some(schema) = schema {
            sql.push_str(" and table_schema = ?");
            args.push(schema.to_sql_value());
        }

        let rows = query.query(&sql, &args)?;
        let info = rows
            .first()
            .ok_or_else(|| DbxError::NotFound(format!("table '{table}'")))?;

        let mut loaded = Table::loaded(info.text("TABLE_NAME")?);
        if let Some(schema) = info.opt_text("TABLE_SCHEMA") {
            loaded.set_schema(schema);
        }
        loaded.engine = info.opt_text("ENGINE");
        loaded.collation = info.opt_text("TABLE_COLLATION");
        loaded.options = info.opt_text("CREATE_OPTIONS").filter(|o| !o.is_empty());
        loaded.comment = info.opt_text("TABLE_COMMENT").filter(|c| !c.is_empty());
        loaded.columns = self.load_columns(query, &loaded.name, loaded.schema.as_deref())?;
        Ok(loaded)
    }

    fn load_table_constraints(
        &self,
        query: &dyn Query,
        table: &str,
        schema: Option<&str>,
    ) -> Result<TableConstraints> {
        let schema_literal = schema.map_or_else(|| String::from("NULL"), |s| self.quote_string(s));
        let sql = CONSTRAINTS_SQL
            .replace(":schemaName", &schema_literal)
            .replace(":tableName", "?");
        let args = vec![table.to_sql_value(); 5];

        let (_, rows): (usize, Vec<ConstraintRow>) = query
            .query_and_load(&sql, &args)
            .with_context(|| format!("loading constraints of table '{table}'"))?;
        Ok(TableConstraints::from_rows(rows, ConstraintKind::parse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::testing::{row, text, Scripted};
    use crate::schema::{ColumnOption, IndexOption};

    fn users() -> Table {
        let mut table = Table::new("users");
        table.id("id", []);
        table.string("email", [ColumnOption::Length(120)]);
        table.boolean("active", [ColumnOption::Default(DefaultValue::from(true))]);
        table.set_engine("InnoDB").set_comment("app users");
        table
    }

    #[test]
    fn test_type_map() {
        let column = |data_type, options: Vec<ColumnOption>| Column::new("c", data_type).with(options);
        let cases = [
            (column(DataType::Char, vec![ColumnOption::Length(4)]), "char(4)"),
            (column(DataType::MediumText, vec![]), "mediumtext"),
            (column(DataType::Int, vec![]), "int"),
            (column(DataType::Boolean, vec![]), "tinyint(1)"),
            (column(DataType::Float, vec![]), "float"),
            (
                column(DataType::Double, vec![ColumnOption::Size { precision: 8, scale: 2 }]),
                "double(8, 2)",
            ),
            (column(DataType::Jsonb, vec![]), "json"),
            (column(DataType::DateTime, vec![ColumnOption::Precision(3)]), "datetime(3)"),
            (
                column(DataType::Timestamp, vec![ColumnOption::UseCurrent]),
                "timestamp default CURRENT_TIMESTAMP",
            ),
            (
                column(
                    DataType::Timestamp,
                    vec![ColumnOption::UseCurrent, ColumnOption::Precision(6)],
                ),
                "timestamp(6) default CURRENT_TIMESTAMP(6)",
            ),
            (column(DataType::Year, vec![]), "year"),
            (column(DataType::Uuid, vec![]), "char(36)"),
            (column(DataType::MultiLineString, vec![]), "multilinestring"),
        ];
        for (column, expected) in cases {
            assert_eq!(MySql.column_type(&column).unwrap(), expected);
        }
    }

    #[test]
    fn test_enum_values_are_escaped() {
        let column = Column::new("status", DataType::Enum).with([ColumnOption::AllowedValues(vec![
            String::from("a"),
            String::from("it's"),
        ])]);
        assert_eq!(MySql.column_type(&column).unwrap(), "enum('a','it\\'s')");
    }

    #[test]
    fn test_modifier_order() {
        let column = Column::new("n", DataType::Int).with([
            ColumnOption::Unsigned,
            ColumnOption::Nullable(true),
            ColumnOption::Default(DefaultValue::from(0)),
            ColumnOption::Comment(String::from("a \"count\"")),
            ColumnOption::After(String::from("id")),
        ]);
        assert_eq!(
            MySql.column_modifiers(&column),
            " UNSIGNED NULL DEFAULT '0' COMMENT 'a \\\"count\\\"' AFTER `id`"
        );

        let column = Column::new("total", DataType::Int).with([
            ColumnOption::StoredAs(String::from("a + b")),
            ColumnOption::First,
        ]);
        assert_eq!(
            MySql.column_modifiers(&column),
            " AS (a + b) STORED NOT NULL FIRST"
        );
    }

    #[test]
    fn test_compile_create() {
        let sql = MySql.compile_create(&users()).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE `users`(\n\
             \t`id` int UNSIGNED NOT NULL AUTO_INCREMENT,\n\
             \t`email` varchar(120) NOT NULL,\n\
             \t`active` tinyint(1) NOT NULL DEFAULT '1',\n\
             \tPRIMARY KEY (`id`)\n\
             ) ENGINE=InnoDB COMMENT='app users';"
        );
    }

    #[test]
    fn test_compile_create_propagates_type_error() {
        let mut table = Table::new("shapes");
        table.multi_polygon_z("area", []);
        assert!(matches!(
            MySql.compile_create(&table),
            Err(DbxError::UnsupportedDataType(_))
        ));
    }

    #[test]
    fn test_alter_statements() {
        let mut table = Table::loaded("users");
        table.set_schema("app");
        let mut name = Column::new("name", DataType::String).with([ColumnOption::Length(50)]);
        name.added = false;
        name.store();
        table.columns.push(name);
        table.modify(
            "name",
            [
                ColumnOption::Rename(String::from("full_name")),
                ColumnOption::Length(100),
            ],
        );
        table.string("nick", [ColumnOption::Nullable(true)]);

        assert_eq!(
            MySql.compile_modify_column(&table, "name").unwrap(),
            "ALTER TABLE `app`.`users` CHANGE COLUMN `name` `full_name` varchar(100) NOT NULL;"
        );
        assert_eq!(
            MySql.compile_modify_columns(&table).unwrap(),
            "ALTER TABLE `app`.`users` \nCHANGE COLUMN `name` `full_name` varchar(100) NOT NULL;"
        );
        assert_eq!(
            MySql.compile_add_column(&table, "nick").unwrap(),
            "ALTER TABLE `app`.`users` ADD COLUMN `nick` varchar(255) NULL;"
        );
        assert!(matches!(
            MySql.compile_modify_column(&table, "missing"),
            Err(DbxError::NotFound(_))
        ));
    }

    #[test]
    fn test_bulk_alters_of_nothing_are_empty() {
        let table = Table::loaded("users");
        assert_eq!(MySql.compile_modify_columns(&table).unwrap(), "");
        assert_eq!(MySql.compile_add_columns(&table).unwrap(), "");
    }

    #[test]
    fn test_keys_and_indexes() {
        let table = Table::new("t");
        let columns = vec![String::from("a"), String::from("b")];
        assert_eq!(
            MySql.compile_primary_key(&table, &columns).unwrap(),
            "ALTER TABLE `t` DROP PRIMARY KEY, ADD PRIMARY KEY (`a`,`b`);"
        );
        assert_eq!(
            MySql.compile_drop_primary_key(&table).unwrap(),
            "ALTER TABLE `t` DROP PRIMARY KEY;"
        );
        let index = Index::new(
            IndexType::Unique,
            &["a", "b"],
            [IndexOption::Algorithm(String::from("BTREE"))],
        );
        assert_eq!(
            MySql.compile_index(&table, &index).unwrap(),
            "ALTER TABLE `t` ADD UNIQUE `idx_a_b` USING BTREE(`a`,`b`);"
        );
        let index = Index::new(IndexType::FullText, &["body"], []);
        assert_eq!(
            MySql.compile_index(&table, &index).unwrap(),
            "ALTER TABLE `t` ADD FULLTEXT INDEX `idx_body`(`body`);"
        );
        assert_eq!(
            MySql.compile_drop_foreign(&table, "fk_a").unwrap(),
            "ALTER TABLE `t` DROP FOREIGN KEY `fk_a`;"
        );
        assert_eq!(
            MySql.compile_rename_index(&table, "a", "b").unwrap(),
            "ALTER TABLE `t` RENAME INDEX `a` TO `b`;"
        );
    }

    #[test]
    fn test_drop_and_rename() {
        let table = Table::new("t");
        assert_eq!(MySql.compile_drop("t").unwrap(), "DROP TABLE `t`;");
        assert_eq!(
            MySql.compile_drop_if_exists("t").unwrap(),
            "DROP TABLE IF EXISTS `t`;"
        );
        assert_eq!(
            MySql.compile_drop_column(&table, &[String::from("a")]).unwrap(),
            "ALTER TABLE `t` DROP COLUMN `a`;"
        );
        assert_eq!(
            MySql
                .compile_drop_column(&table, &[String::from("a"), String::from("b")])
                .unwrap(),
            "ALTER TABLE `t` \n\tDROP COLUMN `a`,\n\tDROP COLUMN `b`;"
        );
        assert_eq!(
            MySql.compile_rename_table(&table, "u").unwrap(),
            "RENAME TABLE `t` TO `u`;"
        );
        assert_eq!(
            MySql
                .compile_drop_all_tables(&[String::from("a"), String::from("b")])
                .unwrap(),
            "DROP TABLE `a`,`b`;"
        );
    }

    #[test]
    fn test_unsupported_features() {
        assert!(matches!(
            MySql.compile_drop_all_types(&[]),
            Err(DbxError::UnsupportedFeature(_))
        ));
        assert!(matches!(
            MySql.compile_get_all_types(),
            Err(DbxError::UnsupportedFeature(_))
        ));
        assert!(matches!(MySql.compile_rebuild(), Err(DbxError::UnsupportedFeature(_))));
    }

    #[test]
    fn test_catalog_queries() {
        assert_eq!(
            MySql.compile_table_exists("users", Some("app")).unwrap(),
            "select count(*) from information_schema.tables where table_name = 'users' and table_schema = 'app' and table_type = 'BASE TABLE'"
        );
        assert_eq!(
            MySql.compile_column_listing("users", None).unwrap(),
            "select column_name from information_schema.columns where table_name = 'users'"
        );
    }

    fn column_row(name: &str, data_type: &str, column_type: &str, key: &str, extra: &str) -> Row {
        row(&[
            ("COLUMN_NAME", text(name)),
            ("DATA_TYPE", text(data_type)),
            ("COLUMN_TYPE", text(column_type)),
            ("IS_NULLABLE", text("NO")),
            ("COLUMN_DEFAULT", SqlValue::Null),
            ("COLUMN_KEY", text(key)),
            ("EXTRA", text(extra)),
        ])
    }

    #[test]
    fn test_load_table() {
        let query = Scripted::default()
            .answer(
                "information_schema.tables",
                vec![row(&[
                    ("TABLE_NAME", text("users")),
                    ("TABLE_SCHEMA", text("app")),
                    ("ENGINE", text("InnoDB")),
                    ("TABLE_COMMENT", text("")),
                ])],
            )
            .answer(
                "information_schema.columns",
                vec![
                    column_row("id", "int", "int(10) unsigned", "PRI", "auto_increment"),
                    column_row("active", "tinyint", "tinyint(1)", "", ""),
                    column_row("status", "enum", "enum('draft','published')", "", ""),
                ],
            );

        let table = MySql.load_table(&query, "users", None).unwrap();
        assert!(!table.added);
        assert_eq!(table.schema.as_deref(), Some("app"));
        assert_eq!(table.engine.as_deref(), Some("InnoDB"));
        assert_eq!(table.comment, None);

        let id = table.column("id").unwrap();
        assert!(id.primary_key && id.auto_increment && id.unsigned);
        assert!(!id.added);
        assert!(id.snapshot.is_some());
        assert_eq!(table.column("active").unwrap().data_type, DataType::Boolean);
        assert_eq!(
            table.column("status").unwrap().allowed_values,
            vec!["draft", "published"]
        );
        assert!(table.changed_columns().is_empty());

        let statements = query.statements();
        assert!(statements[1].ends_with("and table_schema = ? order by ORDINAL_POSITION"));
    }

    #[test]
    fn test_load_missing_table() {
        let query = Scripted::default();
        assert!(matches!(
            MySql.load_table(&query, "ghost", None),
            Err(DbxError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_table_constraints() {
        let constraint = |name: &str, column: &str, kind: &str| {
            row(&[
                ("name", text(name)),
                ("column_name", text(column)),
                ("type", text(kind)),
            ])
        };
        let query = Scripted::default().answer(
            "KEY_COLUMN_USAGE",
            vec![
                constraint("PRIMARY", "id", "PRIMARY KEY"),
                constraint("uq_email", "email", "UNIQUE"),
            ],
        );
        let constraints = MySql
            .load_table_constraints(&query, "users", Some("app"))
            .unwrap();
        assert_eq!(constraints.primary_key.unwrap().columns, vec!["id"]);
        assert_eq!(constraints.uniques[0].name, "uq_email");

        let seen = query.seen.borrow();
        let (sql, args) = &seen[0];
        assert!(sql.contains("COALESCE('app', DATABASE())"));
        assert!(!sql.contains(":tableName"));
        assert_eq!(args.len(), 5);
    }

    #[test]
    fn test_load_composite_constraints() {
        let key_part = |name: &str, column: &str, kind: &str, foreign: Option<&str>| {
            let mut pairs = vec![
                ("name", text(name)),
                ("column_name", text(column)),
                ("type", text(kind)),
            ];
            if let Some(foreign) = foreign {
                pairs.extend([
                    ("foreign_table_name", text("accounts")),
                    ("foreign_column_name", text(foreign)),
                    ("on_update", text("CASCADE")),
                    ("on_delete", text("RESTRICT")),
                ]);
            }
            row(&pairs)
        };
        // Rows arrive ordered by key position, interleaving constraints.
        let query = Scripted::default().answer(
            "KEY_COLUMN_USAGE",
            vec![
                key_part("fk_account", "tenant_id", "FOREIGN KEY", Some("tenant_id")),
                key_part("PRIMARY", "tenant_id", "PRIMARY KEY", None),
                key_part("fk_account", "account_id", "FOREIGN KEY", Some("id")),
                key_part("PRIMARY", "user_id", "PRIMARY KEY", None),
            ],
        );
        let constraints = MySql
            .load_table_constraints(&query, "memberships", None)
            .unwrap();

        assert_eq!(
            constraints.primary_key.unwrap().columns,
            vec!["tenant_id", "user_id"]
        );
        assert_eq!(constraints.foreign_keys.len(), 1);
        let key = &constraints.foreign_keys[0];
        assert_eq!(key.columns, vec!["tenant_id", "account_id"]);
        assert_eq!(key.foreign_columns, vec!["tenant_id", "id"]);
        assert_eq!(key.foreign_table, "accounts");
        assert_eq!(key.on_delete, "RESTRICT");

        let sql = &query.statements()[0];
        assert!(sql.contains("COALESCE(NULL, DATABASE())"));
    }
}
