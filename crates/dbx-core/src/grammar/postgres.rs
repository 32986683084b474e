//! PostgreSQL schema grammar and `pg_catalog` introspection.

use regex::Regex;

use super::{find_column, parse_catalog_default, strip_type_args, DdlCompiler, Introspector, TypeMapping};
use crate::dialect::{Dialect, Postgres};
use crate::error::{DbxError, Result, ResultExt};
use crate::query::{Query, QueryExt, Row};
use crate::schema::{
    Column, ConstraintKind, ConstraintRow, DataType, Index, IndexType, Table, TableConstraints,
};
use crate::util::{join_idents, quote_strings, split_list};
use crate::value::SqlValue;

/// Server version from which identity columns exist.
const IDENTITY_SINCE: f64 = 12.0;

const COLUMNS_SQL: &str = "
SELECT
    d.nspname AS table_schema,
    c.relname AS table_name,
    a.attname AS column_name,
    COALESCE(td.typname, tb.typname, t.typname) AS data_type,
    COALESCE(td.typtype, tb.typtype, t.typtype) AS type_type,
    a.attlen AS character_maximum_length,
    pg_catalog.col_description(c.oid, a.attnum) AS column_comment,
    a.atttypmod AS modifier,
    a.attnotnull = false AS is_nullable,
    CAST(pg_get_expr(ad.adbin, ad.adrelid) AS varchar) AS column_default,
    coalesce(pg_get_expr(ad.adbin, ad.adrelid) ~ 'nextval', false) :identity AS is_autoinc,
    pg_get_serial_sequence(quote_ident(d.nspname) || '.' || quote_ident(c.relname), a.attname) AS sequence_name,
    CASE WHEN COALESCE(td.typtype, tb.typtype, t.typtype) = 'e'::char
        THEN array_to_string((SELECT array_agg(enumlabel) FROM pg_enum WHERE enumtypid = COALESCE(td.oid, tb.oid, a.atttypid))::varchar[], ',')
        ELSE NULL
    END AS enum_values,
    CASE atttypid
        WHEN 21 THEN 16
        WHEN 23 THEN 32
        WHEN 20 THEN 64
        WHEN 1700 THEN
            CASE WHEN atttypmod = -1 THEN null ELSE ((atttypmod - 4) >> 16) & 65535 END
        WHEN 700 THEN 24
        WHEN 701 THEN 53
        ELSE null
    END AS numeric_precision,
    CASE
        WHEN atttypid IN (21, 23, 20) THEN 0
        WHEN atttypid IN (1700) THEN
            CASE WHEN atttypmod = -1 THEN null ELSE (atttypmod - 4) & 65535 END
        ELSE null
    END AS numeric_scale,
    CAST(
        information_schema._pg_char_max_length(information_schema._pg_truetypid(a, t), information_schema._pg_truetypmod(a, t))
        AS numeric
    ) AS size,
    a.attnum = any (ctp.conkey) AS is_pkey,
    pg_get_constraintdef(ctc.oid) AS check,
    COALESCE(NULLIF(a.attndims, 0), NULLIF(t.typndims, 0), (t.typcategory='A')::int) AS dimension
FROM
    pg_class c
    LEFT JOIN pg_attribute a ON a.attrelid = c.oid
    LEFT JOIN pg_attrdef ad ON a.attrelid = ad.adrelid AND a.attnum = ad.adnum
    LEFT JOIN pg_type t ON a.atttypid = t.oid
    LEFT JOIN pg_type tb ON (a.attndims > 0 OR t.typcategory='A') AND t.typelem > 0 AND t.typelem = tb.oid OR t.typbasetype > 0 AND t.typbasetype = tb.oid
    LEFT JOIN pg_type td ON t.typndims > 0 AND t.typbasetype > 0 AND tb.typelem = td.oid
    LEFT JOIN pg_namespace d ON d.oid = c.relnamespace
    LEFT JOIN pg_constraint ctp ON ctp.conrelid = c.oid AND ctp.contype = 'p'
    LEFT JOIN pg_constraint ctc ON ctc.conrelid = c.oid AND ctc.contype = 'c' AND a.attnum = any(ctc.conkey)
WHERE
    a.attnum > 0 AND t.typname != '' AND NOT a.attisdropped
    AND c.relname = ";

const CONSTRAINTS_SQL: &str = r#"
SELECT
    "c"."conname" AS "name",
    "a"."attname" AS "column_name",
    "c"."contype" AS "type",
    "ftcns"."nspname" AS "foreign_table_schema",
    "ftc"."relname" AS "foreign_table_name",
    "fa"."attname" AS "foreign_column_name",
    "c"."confupdtype" AS "on_update",
    "c"."confdeltype" AS "on_delete",
    pg_get_constraintdef("c"."oid") AS "check_expr"
FROM "pg_class" AS "tc"
INNER JOIN "pg_namespace" AS "tcns"
    ON "tcns"."oid" = "tc"."relnamespace"
INNER JOIN "pg_constraint" AS "c"
    ON "c"."conrelid" = "tc"."oid"
INNER JOIN LATERAL unnest("c"."conkey", "c"."confkey")
    WITH ORDINALITY AS "k"("attnum", "foreign_attnum", "position") ON TRUE
INNER JOIN "pg_attribute" AS "a"
    ON "a"."attrelid" = "c"."conrelid" AND "a"."attnum" = "k"."attnum"
LEFT JOIN "pg_class" AS "ftc"
    ON "ftc"."oid" = "c"."confrelid"
LEFT JOIN "pg_namespace" AS "ftcns"
    ON "ftcns"."oid" = "ftc"."relnamespace"
LEFT JOIN "pg_attribute" "fa"
    ON "fa"."attrelid" = "c"."confrelid" AND "fa"."attnum" = "k"."foreign_attnum"
WHERE "tc"."relname" = "#;

/// Matches the check constraint generated for enum columns, capturing the
/// column and the array body.
const ENUM_CHECK: &str = r"^CHECK \(\(\((\w+)\)::text = ANY \(\(ARRAY\[(.*)\]\)::text\[\]\)\)\)$";

/// Single-letter constraint type of `pg_constraint.contype`.
fn constraint_kind(code: &str) -> Option<ConstraintKind> {
    match code {
        "p" => Some(ConstraintKind::PrimaryKey),
        "f" => Some(ConstraintKind::ForeignKey),
        "u" => Some(ConstraintKind::Unique),
        "c" => Some(ConstraintKind::Check),
        _ => None,
    }
}

/// Referential action of `pg_constraint.confupdtype` / `confdeltype`.
fn referential_action(code: &str) -> String {
    String::from(match code {
        "a" => "NO ACTION",
        "r" => "RESTRICT",
        "c" => "CASCADE",
        "n" => "SET NULL",
        "d" => "SET DEFAULT",
        _ => "",
    })
}

/// Parses the numeric version out of `select version()` output, for
/// example `PostgreSQL 14.5 on x86_64-pc-linux-gnu`.
fn server_version(banner: &str) -> Result<f64> {
    let token = banner.split(' ').nth(1).unwrap_or_default();
    let numeric: String = token
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    numeric
        .parse()
        .map_err(|_| DbxError::InvalidValue(format!("cannot read server version from '{banner}'")))
}

/// Values of the enum check generated for `column`, or `None` when
/// `check` has another shape or constrains another column.
fn enum_check_values(check: &str, column: &str) -> Result<Option<Vec<String>>> {
    let pattern = Regex::new(ENUM_CHECK).map_err(|e| DbxError::InvalidValue(e.to_string()))?;
    let Some(caps) = pattern.captures(check) else {
        return Ok(None);
    };
    if &caps[1] != column {
        return Ok(None);
    }
    Ok(Some(
        caps[2]
            .split(',')
            .filter_map(|item| {
                let item = item.trim().strip_prefix('\'')?;
                let end = item.rfind("'::").unwrap_or(item.len());
                Some(item[..end].replace("''", "'"))
            })
            .collect(),
    ))
}

impl Postgres {
    /// Serial or identity spelling of an integer type.
    fn generatable(ty: &str, column: &Column) -> String {
        if !column.auto_increment && column.generated_as.is_none() {
            return String::from(ty);
        }
        if column.added {
            if column.auto_increment && column.generated_as.is_none() {
                match ty {
                    "integer" => return String::from("serial"),
                    "bigint" => return String::from("bigserial"),
                    "smallint" => return String::from("smallserial"),
                    _ => {}
                }
            }
        } else {
            match ty {
                "integer" => return String::from("int4"),
                "bigint" => return String::from("int8"),
                "smallint" => return String::from("int2"),
                _ => {}
            }
        }

        let mut out = format!(
            "{ty} generated {} as identity",
            if column.always { "always" } else { "by default" }
        );
        if let Some(expr) = column.generated_as.as_deref().filter(|e| !e.is_empty()) {
            out.push_str(&format!("({expr})"));
        }
        out
    }

    fn default_clause(&self, column: &Column) -> Option<String> {
        let temporal = matches!(
            column.data_type,
            DataType::DateTime | DataType::DateTimeTz | DataType::Timestamp | DataType::TimestampTz
        );
        if column.use_current && temporal {
            return Some(String::from("CURRENT_TIMESTAMP"));
        }
        column.default.as_ref().map(|value| self.default_literal(value))
    }

    fn comment_on_column(&self, table: &Table, column: &str, comment: &str) -> String {
        format!(
            "\nCOMMENT ON COLUMN {}.{} IS {};",
            self.wrap_table(table),
            self.quote_ident(column),
            self.quote_string(comment)
        )
    }

    fn rename_clause(&self, table: &Table, column: &Column) -> String {
        column.rename().map_or_else(String::new, |to| {
            format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {};\n",
                self.wrap_table(table),
                self.quote_ident(&column.name),
                self.quote_ident(to)
            )
        })
    }

    /// `ALTER COLUMN` clauses for the type, nullability and default of
    /// `column`, addressed by its new name.
    fn alter_clauses(&self, column: &Column) -> Result<String> {
        let name = self.quote_ident(column.rename().unwrap_or(&column.name));
        let ty = self.column_type(column)?;
        let nullable = if column.nullable { "DROP NOT NULL" } else { "SET NOT NULL" };
        let default = self
            .default_clause(column)
            .map_or_else(|| String::from("DROP DEFAULT"), |v| format!("SET DEFAULT {v}"));
        Ok(format!(
            "\tALTER COLUMN {name} TYPE {ty} USING {name}::{ty},\n\
             \tALTER COLUMN {name} {nullable},\n\
             \tALTER COLUMN {name} {default}"
        ))
    }

    fn add_clause(&self, column: &Column) -> Result<String> {
        let mut out = format!(
            "ADD COLUMN {} {}",
            self.quote_ident(&column.name),
            self.column_type(column)?
        );
        if !column.nullable {
            out.push_str(" NOT NULL");
        }
        if let Some(default) = self.default_clause(column) {
            out.push_str(" DEFAULT ");
            out.push_str(&default);
        }
        Ok(out)
    }

    fn column_comments<'c>(&self, table: &Table, columns: impl IntoIterator<Item = &'c Column>) -> String {
        columns
            .into_iter()
            .filter_map(|column| {
                column.comment.as_deref().map(|comment| {
                    self.comment_on_column(table, column.rename().unwrap_or(&column.name), comment)
                })
            })
            .collect()
    }

    fn schema_filter(&self, schema: Option<&str>) -> String {
        schema.map_or_else(String::new, |schema| {
            format!(" and table_schema = {}", self.quote_string(schema))
        })
    }

    fn column_from_row(&self, row: &Row) -> Result<Column> {
        let name = row.text("column_name")?;
        let enum_values = row.opt_text("enum_values");
        let data_type = if enum_values.is_some() {
            DataType::Enum
        } else {
            self.catalog_type(&row.text("data_type")?)?
        };

        let mut column = Column::new(name, data_type);
        column.added = false;
        column.nullable = row.opt_bool("is_nullable").unwrap_or(false);
        column.length = catalog_u32(row, "size");
        column.precision = catalog_u32(row, "numeric_precision");
        column.scale = catalog_u32(row, "numeric_scale");

        if let Some(raw) = row.opt_text("column_default") {
            if !raw.starts_with("nextval(") {
                let (default, use_current) = parse_catalog_default(&raw);
                column.default = default;
                column.use_current = use_current;
            }
        }
        column.comment = row.opt_text("column_comment");
        column.primary_key = row.opt_bool("is_pkey").unwrap_or(false);
        column.auto_increment = row.opt_bool("is_autoinc").unwrap_or(false);

        if let Some(values) = enum_values {
            column.allowed_values = split_list(&values, &[]);
        } else if let Some(check) = row.opt_text("check") {
            if let Some(values) = enum_check_values(&check, &column.name)? {
                if !values.is_empty() {
                    column.data_type = DataType::Enum;
                    column.allowed_values = values;
                }
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

fn with_zone(name: &str, column: &Column, zone: &str) -> String {
    if column.precision == 0 {
        String::from(name)
    } else {
        format!("{name}({}) {zone} time zone", column.precision)
    }
}

impl TypeMapping for Postgres {
    fn type_text(&self, _column: &Column) -> Result<String> {
        Ok(String::from("text"))
    }

    fn type_tiny_int(&self, column: &Column) -> Result<String> {
        Ok(Self::generatable("smallint", column))
    }

    fn type_small_int(&self, column: &Column) -> Result<String> {
        Ok(Self::generatable("smallint", column))
    }

    fn type_medium_int(&self, column: &Column) -> Result<String> {
        Ok(Self::generatable("integer", column))
    }

    fn type_int(&self, column: &Column) -> Result<String> {
        Ok(Self::generatable("integer", column))
    }

    fn type_big_int(&self, column: &Column) -> Result<String> {
        Ok(Self::generatable("bigint", column))
    }

    fn type_tiny_blob(&self, _column: &Column) -> Result<String> {
        Ok(String::from("bytea"))
    }

    fn type_blob(&self, _column: &Column) -> Result<String> {
        Ok(String::from("bytea"))
    }

    fn type_medium_blob(&self, _column: &Column) -> Result<String> {
        Ok(String::from("bytea"))
    }

    fn type_long_blob(&self, _column: &Column) -> Result<String> {
        Ok(String::from("bytea"))
    }

    fn type_float(&self, _column: &Column) -> Result<String> {
        Ok(String::from("double precision"))
    }

    fn type_double(&self, _column: &Column) -> Result<String> {
        Ok(String::from("double precision"))
    }

    fn type_boolean(&self, _column: &Column) -> Result<String> {
        Ok(String::from("boolean"))
    }

    fn type_enum(&self, column: &Column) -> Result<String> {
        Ok(format!(
            "varchar(255) check ({} in ({}))",
            self.quote_ident(&column.name),
            self.quote_values(&column.allowed_values)
        ))
    }

    fn type_jsonb(&self, _column: &Column) -> Result<String> {
        Ok(String::from("jsonb"))
    }

    fn type_date_time(&self, column: &Column) -> Result<String> {
        self.type_timestamp(column)
    }

    fn type_date_time_tz(&self, column: &Column) -> Result<String> {
        self.type_timestamp_tz(column)
    }

    fn type_time(&self, column: &Column) -> Result<String> {
        Ok(with_zone("time", column, "without"))
    }

    fn type_time_tz(&self, column: &Column) -> Result<String> {
        Ok(if column.precision == 0 {
            String::from("timetz")
        } else {
            with_zone("time", column, "with")
        })
    }

    fn type_timestamp(&self, column: &Column) -> Result<String> {
        Ok(with_zone("timestamp", column, "without"))
    }

    fn type_timestamp_tz(&self, column: &Column) -> Result<String> {
        Ok(if column.precision == 0 {
            String::from("timestamptz")
        } else {
            with_zone("timestamp", column, "with")
        })
    }

    fn type_year(&self, column: &Column) -> Result<String> {
        self.type_int(column)
    }

    fn type_binary(&self, _column: &Column) -> Result<String> {
        Ok(String::from("bytea"))
    }

    fn type_uuid(&self, _column: &Column) -> Result<String> {
        Ok(String::from("uuid"))
    }

    fn type_ip_address(&self, _column: &Column) -> Result<String> {
        Ok(String::from("inet"))
    }

    fn type_mac_address(&self, _column: &Column) -> Result<String> {
        Ok(String::from("macaddr"))
    }

    fn type_spatial(&self, name: &str, column: &Column) -> Result<String> {
        Ok(column.projection.as_ref().map_or_else(
            || format!("geometry({name})"),
            |projection| format!("geometry({name}, {projection})"),
        ))
    }

    fn column_modifiers(&self, column: &Column) -> String {
        let mut out = String::new();
        if let Some(collation) = &column.collation {
            out.push_str(" COLLATE ");
            out.push_str(&self.quote_string(collation));
        }
        out.push_str(if column.nullable { " NULL" } else { " NOT NULL" });
        if let Some(default) = self.default_clause(column) {
            out.push_str(" DEFAULT ");
            out.push_str(&default);
        }
        if let Some(expr) = &column.virtual_as {
            out.push_str(&format!(" GENERATED ALWAYS AS ({expr})"));
        }
        if let Some(expr) = &column.stored_as {
            out.push_str(&format!(" AS ({expr}) STORED"));
        }
        out
    }
}

impl DdlCompiler for Postgres {
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
            out.push_str(&format!(
                "\t{} {}{}",
                self.quote_ident(&column.name),
                self.column_type(column)?,
                self.column_modifiers(column)
            ));
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
        out.push_str(");");

        if let Some(comment) = &table.comment {
            out.push_str(&format!(
                "\nCOMMENT ON TABLE {} IS {};",
                self.wrap_table(table),
                self.quote_string(comment)
            ));
        }
        for column in &table.columns {
            if let Some(comment) = &column.comment {
                out.push_str(&self.comment_on_column(table, &column.name, comment));
            }
        }
        Ok(out)
    }

    fn compile_modify_columns(&self, table: &Table) -> Result<String> {
        let columns = table.changed_columns();
        if columns.is_empty() {
            return Ok(String::new());
        }
        let renames: String = columns
            .iter()
            .map(|column| self.rename_clause(table, column))
            .collect();
        let alters = columns
            .iter()
            .map(|column| self.alter_clauses(column))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!(
            "{renames}ALTER TABLE {} \n{};{}",
            self.wrap_table(table),
            alters.join(",\n"),
            self.column_comments(table, columns.iter().copied())
        ))
    }

    fn compile_modify_column(&self, table: &Table, column: &str) -> Result<String> {
        let column = find_column(table, column)?;
        Ok(format!(
            "{}ALTER TABLE {} \n{};{}",
            self.rename_clause(table, column),
            self.wrap_table(table),
            self.alter_clauses(column)?,
            self.column_comments(table, [column])
        ))
    }

    fn compile_add_columns(&self, table: &Table) -> Result<String> {
        let columns = table.added_columns();
        if columns.is_empty() {
            return Ok(String::new());
        }
        let adds = columns
            .iter()
            .map(|column| Ok(format!("\t{}", self.add_clause(column)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!(
            "ALTER TABLE {} \n{};{}",
            self.wrap_table(table),
            adds.join(",\n"),
            self.column_comments(table, columns.iter().copied())
        ))
    }

    fn compile_add_column(&self, table: &Table, column: &str) -> Result<String> {
        let column = find_column(table, column)?;
        Ok(format!(
            "ALTER TABLE {} {};{}",
            self.wrap_table(table),
            self.add_clause(column)?,
            self.column_comments(table, [column])
        ))
    }

    fn compile_drop_primary_key(&self, table: &Table) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP CONSTRAINT {};",
            self.wrap_table(table),
            self.quote_ident(&format!("{}_pkey", table.full_name()))
        ))
    }

    fn compile_index(&self, table: &Table, index: &Index) -> Result<String> {
        let columns = join_idents(self, &index.columns, ",");
        let algorithm = match index.index_type {
            IndexType::Primary => return self.compile_primary_key(table, &index.columns),
            IndexType::Unique => {
                return Ok(format!(
                    "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({columns});",
                    self.wrap_table(table),
                    self.quote_ident(&index.name)
                ));
            }
            IndexType::FullText => return Err(self.unsupported("fulltext indexes")),
            IndexType::Spatial | IndexType::Gist => Some("GIST"),
            IndexType::Gin => Some("GIN"),
            IndexType::Normal => index.algorithm.as_deref(),
        };

        let mut out = format!(
            "CREATE INDEX {} ON {}",
            self.quote_ident(&index.name),
            self.wrap_table(table)
        );
        if let Some(algorithm) = algorithm {
            out.push_str(" USING ");
            out.push_str(algorithm);
        }
        out.push_str(&format!("({columns});"));
        Ok(out)
    }

    fn compile_drop_unique(&self, table: &Table, name: &str) -> Result<String> {
        self.compile_drop_foreign(table, name)
    }

    fn compile_drop_foreign(&self, table: &Table, name: &str) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP CONSTRAINT {};",
            self.wrap_table(table),
            self.quote_ident(name)
        ))
    }

    fn compile_rename_index(&self, table: &Table, from: &str, to: &str) -> Result<String> {
        Ok(format!(
            "ALTER INDEX {} RENAME TO {};",
            self.wrap_index(table, from),
            self.quote_ident(to)
        ))
    }

    fn compile_drop_all_tables(&self, tables: &[String]) -> Result<String> {
        Ok(format!("DROP TABLE {} CASCADE;", join_idents(self, tables, ",")))
    }

    fn compile_drop_all_views(&self, views: &[String]) -> Result<String> {
        Ok(format!("DROP VIEW {} CASCADE;", join_idents(self, views, ",")))
    }

    fn compile_drop_all_types(&self, types: &[String]) -> Result<String> {
        Ok(format!("DROP TYPE {} CASCADE;", join_idents(self, types, ",")))
    }

    fn compile_get_all_tables(&self, schemas: &[String]) -> Result<String> {
        Ok(format!(
            "select tablename from pg_catalog.pg_tables where schemaname in ({})",
            schema_list(schemas)
        ))
    }

    fn compile_get_all_views(&self, schemas: &[String]) -> Result<String> {
        Ok(format!(
            "select viewname from pg_catalog.pg_views where schemaname in ({})",
            schema_list(schemas)
        ))
    }

    fn compile_get_all_types(&self) -> Result<String> {
        Ok(String::from(
            "select distinct pg_type.typname from pg_type inner join pg_enum on pg_enum.enumtypid = pg_type.oid",
        ))
    }

    fn compile_enable_foreign_key_constraints(&self) -> Result<String> {
        Ok(String::from("SET CONSTRAINTS ALL IMMEDIATE;"))
    }

    fn compile_disable_foreign_key_constraints(&self) -> Result<String> {
        Ok(String::from("SET CONSTRAINTS ALL DEFERRED;"))
    }

    fn as_query_dialect(&self) -> &dyn Dialect {
        self
    }
}

fn schema_list(schemas: &[String]) -> String {
    if schemas.is_empty() {
        String::from("'public'")
    } else {
        quote_strings(schemas).join(",")
    }
}

impl Introspector for Postgres {
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

    fn catalog_type(&self, name: &str) -> Result<DataType> {
        match strip_type_args(name).to_ascii_lowercase().as_str() {
            "bpchar" | "character" => Ok(DataType::Char),
            "character varying" => Ok(DataType::String),
            "float8" | "double precision" => Ok(DataType::Double),
            "float4" | "real" => Ok(DataType::Float),
            "numeric" => Ok(DataType::Decimal),
            "bool" => Ok(DataType::Boolean),
            "bytea" => Ok(DataType::Blob),
            "inet" => Ok(DataType::IpAddress),
            "macaddr" => Ok(DataType::MacAddress),
            "int2" | "smallserial" => Ok(DataType::SmallInt),
            "serial" => Ok(DataType::Int),
            "bigserial" => Ok(DataType::BigInt),
            "timestamp without time zone" => Ok(DataType::Timestamp),
            "timestamp with time zone" => Ok(DataType::TimestampTz),
            "time without time zone" => Ok(DataType::Time),
            "time with time zone" => Ok(DataType::TimeTz),
            other => DataType::from_catalog(other),
        }
    }

    fn load_columns(&self, query: &dyn Query, table: &str, schema: Option<&str>) -> Result<Vec<Column>> {
        let banner = query
            .query("select version()", &[])
            .with_context(|| "querying the server version")?
            .first()
            .and_then(Row::first)
            .and_then(SqlValue::as_text)
            .unwrap_or_default();
        let identity = if server_version(&banner)? >= IDENTITY_SINCE {
            "OR attidentity != ''"
        } else {
            ""
        };

        let mut sql = COLUMNS_SQL.replace(":identity", identity);
        sql.push_str(&self.quote_string(table));
        if let Some(schema) = schema {
            sql.push_str(" AND d.nspname = ");
            sql.push_str(&self.quote_string(schema));
        }
        sql.push_str(" ORDER BY a.attnum;");

        let (_, rows): (usize, Vec<Row>) = query
            .query_and_load(&sql, &[])
            .with_context(|| format!("loading columns of table '{table}'"))?;
        rows.iter().map(|row| self.column_from_row(row)).collect()
    }

    fn load_table(&self, query: &dyn Query, table: &str, schema: Option<&str>) -> Result<Table> {
        let mut sql = String::from(
            "select ns.nspname as table_schema, c.relname as table_name, \
             cast(obj_description(c.relfilenode,'pg_class') as varchar) as table_comment \
             from pg_class as c left join pg_namespace as ns on c.relnamespace = ns.oid \
             where c.relname = ",
        );
        sql.push_str(&self.quote_string(table));
        if let Some(schema) = schema {
            sql.push_str(" and ns.nspname = ");
            sql.push_str(&self.quote_string(schema));
        }

        let rows = query.query(&sql, &[])?;
        let info = rows
            .first()
            .ok_or_else(|| DbxError::NotFound(format!("table '{table}'")))?;

        let mut loaded = Table::loaded(info.text("table_name")?);
        if let Some(schema) = info.opt_text("table_schema") {
            loaded.set_schema(schema);
        }
        loaded.comment = info.opt_text("table_comment");
        loaded.columns = self.load_columns(query, &loaded.name, loaded.schema.as_deref())?;
        Ok(loaded)
    }

    fn load_table_constraints(
        &self,
        query: &dyn Query,
        table: &str,
        schema: Option<&str>,
    ) -> Result<TableConstraints> {
        let mut sql = String::from(CONSTRAINTS_SQL);
        sql.push_str(&self.quote_string(table));
        if let Some(schema) = schema {
            sql.push_str(r#" AND "tcns"."nspname" = "#);
            sql.push_str(&self.quote_string(schema));
        }
        sql.push_str(r#" ORDER BY "c"."conname" ASC, "k"."position" ASC"#);

        let (_, rows): (usize, Vec<ConstraintRow>) = query
            .query_and_load(&sql, &[])
            .with_context(|| format!("loading constraints of table '{table}'"))?;
        let mut constraints = TableConstraints::from_rows(rows, constraint_kind);
        for key in &mut constraints.foreign_keys {
            key.on_update = referential_action(&key.on_update);
            key.on_delete = referential_action(&key.on_delete);
        }
        Ok(constraints)
    }
}
