//! Table constraints recovered from a catalog.

use crate::error::Result;
use crate::query::{FromRow, Row};

/// Constraint kinds as reported by the catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintKind {
    /// Primary key.
    PrimaryKey,
    /// Foreign key.
    ForeignKey,
    /// Unique constraint.
    Unique,
    /// Check constraint.
    Check,
}

impl ConstraintKind {
    /// Parses the information-schema spelling (`PRIMARY KEY`, ...).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRIMARY KEY" => Some(Self::PrimaryKey),
            "FOREIGN KEY" => Some(Self::ForeignKey),
            "UNIQUE" => Some(Self::Unique),
            "CHECK" => Some(Self::Check),
            _ => None,
        }
    }
}

/// One catalog row: one column of one constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstraintRow {
    /// Constraint name.
    pub name: String,
    /// Local column.
    pub column_name: String,
    /// Raw constraint type as returned by the catalog.
    pub constraint_type: String,
    /// Referenced schema.
    pub foreign_table_schema: Option<String>,
    /// Referenced table.
    pub foreign_table_name: Option<String>,
    /// Referenced column.
    pub foreign_column_name: Option<String>,
    /// `ON UPDATE` action.
    pub on_update: Option<String>,
    /// `ON DELETE` action.
    pub on_delete: Option<String>,
    /// Check expression.
    pub check_expr: Option<String>,
}

impl FromRow for ConstraintRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            name: row.text("name")?,
            column_name: row.text("column_name")?,
            constraint_type: row.text("type")?,
            foreign_table_schema: row.opt_text("foreign_table_schema"),
            foreign_table_name: row.opt_text("foreign_table_name"),
            foreign_column_name: row.opt_text("foreign_column_name"),
            on_update: row.opt_text("on_update"),
            on_delete: row.opt_text("on_delete"),
            check_expr: row.opt_text("check_expr"),
        })
    }
}

/// Primary key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrimaryKey {
    /// Constraint name, when the catalog reports one.
    pub name: String,
    /// Key columns, in key order.
    pub columns: Vec<String>,
}

/// Foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,
    /// Local columns.
    pub columns: Vec<String>,
    /// Referenced schema, empty for the current one.
    pub foreign_schema: String,
    /// Referenced table.
    pub foreign_table: String,
    /// Referenced columns, paired with `columns`.
    pub foreign_columns: Vec<String>,
    /// `ON UPDATE` action.
    pub on_update: String,
    /// `ON DELETE` action.
    pub on_delete: String,
}

/// Unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unique {
    /// Constraint name.
    pub name: String,
    /// Constrained columns.
    pub columns: Vec<String>,
}

/// Check constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Check {
    /// Constraint name.
    pub name: String,
    /// Referenced columns.
    pub columns: Vec<String>,
    /// Check expression.
    pub expression: String,
}

/// All constraints of one table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableConstraints {
    /// Primary key, if any.
    pub primary_key: Option<PrimaryKey>,
    /// Foreign keys.
    pub foreign_keys: Vec<ForeignKey>,
    /// Unique constraints.
    pub uniques: Vec<Unique>,
    /// Check constraints.
    pub checks: Vec<Check>,
}

/// Rows of one constraint, in catalog order.
pub type ConstraintGroup = (String, Vec<ConstraintRow>);

/// Groups rows by kind, then by name.
///
/// Groups appear in order of first appearance, and rows keep their catalog
/// order inside a group. Rows of an unknown kind are dropped.
#[must_use]
pub fn group_rows(
    rows: Vec<ConstraintRow>,
    kind_of: impl Fn(&str) -> Option<ConstraintKind>,
) -> Vec<(ConstraintKind, Vec<ConstraintGroup>)> {
    let mut groups: Vec<(ConstraintKind, Vec<ConstraintGroup>)> = Vec::new();
    for row in rows {
        let Some(kind) = kind_of(&row.constraint_type) else {
            continue;
        };
        let kind_pos = match groups.iter().position(|(k, _)| *k == kind) {
            Some(pos) => pos,
            None => {
                groups.push((kind, Vec::new()));
                groups.len() - 1
            }
        };
        let by_name = &mut groups[kind_pos].1;
        match by_name.iter_mut().find(|(name, _)| *name == row.name) {
            Some((_, items)) => items.push(row),
            None => by_name.push((row.name.clone(), vec![row])),
        }
    }
    groups
}

/// Keeps the first occurrence of each name, in order.
fn distinct<'r>(names: impl Iterator<Item = &'r str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.iter().any(|seen| seen == name) {
            out.push(String::from(name));
        }
    }
    out
}

fn column_names(items: &[ConstraintRow]) -> Vec<String> {
    distinct(items.iter().map(|item| item.column_name.as_str()))
}

fn foreign_column_names(items: &[ConstraintRow]) -> Vec<String> {
    distinct(
        items
            .iter()
            .filter_map(|item| item.foreign_column_name.as_deref())
            .filter(|name| !name.is_empty()),
    )
}

impl TableConstraints {
    /// Builds constraints from catalog rows.
    ///
    /// `kind_of` maps the dialect's raw type spelling to a kind.
    #[must_use]
    pub fn from_rows(
        rows: Vec<ConstraintRow>,
        kind_of: impl Fn(&str) -> Option<ConstraintKind>,
    ) -> Self {
        let mut constraints = Self::default();
        for (kind, groups) in group_rows(rows, kind_of) {
            for (name, items) in groups {
                let first = &items[0];
                match kind {
                    ConstraintKind::PrimaryKey => {
                        constraints.primary_key = Some(PrimaryKey {
                            columns: column_names(&items),
                            name,
                        });
                    }
                    ConstraintKind::ForeignKey => constraints.foreign_keys.push(ForeignKey {
                        foreign_schema: first.foreign_table_schema.clone().unwrap_or_default(),
                        foreign_table: first.foreign_table_name.clone().unwrap_or_default(),
                        foreign_columns: foreign_column_names(&items),
                        on_update: first.on_update.clone().unwrap_or_default(),
                        on_delete: first.on_delete.clone().unwrap_or_default(),
                        columns: column_names(&items),
                        name,
                    }),
                    ConstraintKind::Unique => constraints.uniques.push(Unique {
                        columns: column_names(&items),
                        name,
                    }),
                    ConstraintKind::Check => constraints.checks.push(Check {
                        expression: first.check_expr.clone().unwrap_or_default(),
                        columns: column_names(&items),
                        name,
                    }),
                }
            }
        }
        constraints
    }

    /// Returns `true` if a primary key with at least one column exists.
    #[must_use]
    pub fn has_primary_key(&self) -> bool {
        self.primary_key
            .as_ref()
            .is_some_and(|pk| !pk.columns.is_empty())
    }

    /// Returns `true` if any foreign key exists.
    #[must_use]
    pub fn has_foreign_keys(&self) -> bool {
        !self.foreign_keys.is_empty()
    }

    /// Returns `true` if any unique constraint exists.
    #[must_use]
    pub fn has_uniques(&self) -> bool {
        !self.uniques.is_empty()
    }

    /// Returns `true` if any check constraint exists.
    #[must_use]
    pub fn has_checks(&self) -> bool {
        !self.checks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, column: &str, kind: &str) -> ConstraintRow {
        ConstraintRow {
            name: String::from(name),
            column_name: String::from(column),
            constraint_type: String::from(kind),
            ..ConstraintRow::default()
        }
    }

    fn fk(name: &str, column: &str, foreign: &str) -> ConstraintRow {
        ConstraintRow {
            foreign_table_name: Some(String::from("users")),
            foreign_column_name: Some(String::from(foreign)),
            on_delete: Some(String::from("CASCADE")),
            on_update: Some(String::from("NO ACTION")),
            ..row(name, column, "FOREIGN KEY")
        }
    }

    #[test]
    fn test_grouping_preserves_row_order() {
        let rows = vec![
            row("PRIMARY", "b", "PRIMARY KEY"),
            row("uq_x", "x", "UNIQUE"),
            row("PRIMARY", "a", "PRIMARY KEY"),
            row("uq_x", "y", "UNIQUE"),
        ];
        let groups = group_rows(rows, ConstraintKind::parse);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, ConstraintKind::PrimaryKey);
        let pk_rows = &groups[0].1[0].1;
        assert_eq!(pk_rows[0].column_name, "b");
        assert_eq!(pk_rows[1].column_name, "a");
    }

    #[test]
    fn test_from_rows_builds_each_kind() {
        let rows = vec![
            row("PRIMARY", "id", "PRIMARY KEY"),
            fk("fk_owner", "owner_id", "id"),
            fk("fk_owner", "owner_org", "org"),
            row("uq_email", "email", "UNIQUE"),
            ConstraintRow {
                check_expr: Some(String::from("age > 0")),
                ..row("ck_age", "age", "CHECK")
            },
            row("weird", "x", "EXCLUDE"),
        ];
        let constraints = TableConstraints::from_rows(rows, ConstraintKind::parse);

        assert!(constraints.has_primary_key());
        assert_eq!(constraints.primary_key.as_ref().unwrap().columns, vec!["id"]);

        assert_eq!(constraints.foreign_keys.len(), 1);
        let key = &constraints.foreign_keys[0];
        assert_eq!(key.columns, vec!["owner_id", "owner_org"]);
        assert_eq!(key.foreign_columns, vec!["id", "org"]);
        assert_eq!(key.foreign_table, "users");
        assert_eq!(key.on_delete, "CASCADE");

        assert_eq!(constraints.uniques[0].columns, vec!["email"]);
        assert_eq!(constraints.checks[0].expression, "age > 0");
    }

    #[test]
    fn test_cross_joined_foreign_key_rows_collapse() {
        let rows = vec![
            fk("fk_pair", "a1", "f1"),
            fk("fk_pair", "a1", "f2"),
            fk("fk_pair", "a2", "f1"),
            fk("fk_pair", "a2", "f2"),
        ];
        let constraints = TableConstraints::from_rows(rows, ConstraintKind::parse);
        let key = &constraints.foreign_keys[0];
        assert_eq!(key.columns, vec!["a1", "a2"]);
        assert_eq!(key.foreign_columns, vec!["f1", "f2"]);
    }

    #[test]
    fn test_empty() {
        let constraints = TableConstraints::from_rows(Vec::new(), ConstraintKind::parse);
        assert!(!constraints.has_primary_key());
        assert!(!constraints.has_foreign_keys());
        assert!(!constraints.has_uniques());
        assert!(!constraints.has_checks());
    }
}
