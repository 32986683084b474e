//! Column change detection.
//!
//! A loaded column keeps a snapshot of its catalog state. Comparing the
//! snapshot with the current value yields the list of pending changes;
//! nothing is tracked through flags on the column itself.

use super::column::{Column, DefaultValue};
use super::data_type::DataType;

/// One attribute that differs between the snapshot and the current value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnChange {
    /// The column gets a new name.
    Rename {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// The abstract type changed.
    DataType {
        /// Old type.
        from: DataType,
        /// New type.
        to: DataType,
    },
    /// Length changed.
    Length {
        /// Old length.
        from: u32,
        /// New length.
        to: u32,
    },
    /// Precision changed.
    Precision {
        /// Old precision.
        from: u32,
        /// New precision.
        to: u32,
    },
    /// Scale changed.
    Scale {
        /// Old scale.
        from: u32,
        /// New scale.
        to: u32,
    },
    /// Nullability changed.
    Nullable(bool),
    /// Default value changed.
    Default {
        /// Old default.
        from: Option<DefaultValue>,
        /// New default.
        to: Option<DefaultValue>,
    },
    /// Primary-key membership changed.
    PrimaryKey(bool),
    /// Auto increment changed.
    AutoIncrement(bool),
    /// Signedness changed.
    Unsigned(bool),
    /// Comment changed.
    Comment(Option<String>),
    /// Collation changed.
    Collation(Option<String>),
    /// Character set changed.
    Charset(Option<String>),
    /// Enum or set values changed.
    AllowedValues(Vec<String>),
}

/// Pending changes of one column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnDiff {
    /// Column name before the change.
    pub column: String,
    /// Changes, in a fixed attribute order.
    pub changes: Vec<ColumnChange>,
}

impl ColumnDiff {
    /// Compares two states of the same column.
    #[must_use]
    pub fn between(old: &Column, new: &Column) -> Self {
        let mut changes = Vec::new();

        if let Some(to) = new.rename() {
            changes.push(ColumnChange::Rename {
                from: new.name.clone(),
                to: String::from(to),
            });
        }
        if old.data_type != new.data_type {
            changes.push(ColumnChange::DataType {
                from: old.data_type,
                to: new.data_type,
            });
        }
        if old.length != new.length {
            changes.push(ColumnChange::Length {
                from: old.length,
                to: new.length,
            });
        }
        if old.precision != new.precision {
            changes.push(ColumnChange::Precision {
                from: old.precision,
                to: new.precision,
            });
        }
        if old.scale != new.scale {
            changes.push(ColumnChange::Scale {
                from: old.scale,
                to: new.scale,
            });
        }
        if old.nullable != new.nullable {
            changes.push(ColumnChange::Nullable(new.nullable));
        }
        if old.default != new.default || old.use_current != new.use_current {
            changes.push(ColumnChange::Default {
                from: old.default.clone(),
                to: new.default.clone(),
            });
        }
        if old.primary_key != new.primary_key {
            changes.push(ColumnChange::PrimaryKey(new.primary_key));
        }
        if old.auto_increment != new.auto_increment {
            changes.push(ColumnChange::AutoIncrement(new.auto_increment));
        }
        if old.unsigned != new.unsigned {
            changes.push(ColumnChange::Unsigned(new.unsigned));
        }
        if old.comment != new.comment {
            changes.push(ColumnChange::Comment(new.comment.clone()));
        }
        if old.collation != new.collation {
            changes.push(ColumnChange::Collation(new.collation.clone()));
        }
        if old.charset != new.charset {
            changes.push(ColumnChange::Charset(new.charset.clone()));
        }
        if old.allowed_values != new.allowed_values {
            changes.push(ColumnChange::AllowedValues(new.allowed_values.clone()));
        }

        Self {
            column: new.name.clone(),
            changes,
        }
    }

    /// Diffs a column against its load-time snapshot.
    ///
    /// Returns `None` for a column that was never loaded.
    #[must_use]
    pub fn of(column: &Column) -> Option<Self> {
        column
            .snapshot
            .as_deref()
            .map(|snapshot| Self::between(snapshot, column))
    }

    /// Returns `true` when nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::column::ColumnOption;

    fn loaded(name: &str, data_type: DataType) -> Column {
        let mut column = Column::new(name, data_type);
        column.added = false;
        column.store();
        column
    }

    #[test]
    fn test_unchanged_column() {
        let column = loaded("a", DataType::Int);
        assert!(ColumnDiff::of(&column).unwrap().is_empty());
    }

    #[test]
    fn test_declared_column_has_no_diff() {
        assert!(ColumnDiff::of(&Column::new("a", DataType::Int)).is_none());
    }

    #[test]
    fn test_changes_in_attribute_order() {
        let mut column = loaded("name", DataType::String);
        column.apply([
            ColumnOption::Nullable(true),
            ColumnOption::Length(100),
            ColumnOption::Rename(String::from("full_name")),
            ColumnOption::Comment(String::from("display name")),
        ]);
        let diff = ColumnDiff::of(&column).unwrap();
        assert_eq!(diff.column, "name");
        assert_eq!(
            diff.changes,
            vec![
                ColumnChange::Rename {
                    from: String::from("name"),
                    to: String::from("full_name"),
                },
                ColumnChange::Length { from: 0, to: 100 },
                ColumnChange::Nullable(true),
                ColumnChange::Comment(Some(String::from("display name"))),
            ]
        );
    }

    #[test]
    fn test_use_current_counts_as_default_change() {
        let mut column = loaded("created_at", DataType::Timestamp);
        column.apply([ColumnOption::UseCurrent]);
        let diff = ColumnDiff::of(&column).unwrap();
        assert!(matches!(diff.changes[0], ColumnChange::Default { .. }));
    }
}
