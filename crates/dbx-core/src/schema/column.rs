//! Abstract column definitions and their options.

use super::data_type::DataType;

/// Default value for a column.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default.
    Boolean(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default.
    String(String),
    /// Raw SQL expression (e.g., `CURRENT_TIMESTAMP`).
    Expression(String),
}

impl DefaultValue {
    /// Creates a raw SQL expression default.
    #[must_use]
    pub fn expr(sql: impl Into<String>) -> Self {
        Self::Expression(sql.into())
    }

    /// Returns the literal text to be quoted, or `None` for NULL and raw
    /// expressions.
    #[must_use]
    pub fn literal_text(&self) -> Option<String> {
        match self {
            Self::Null | Self::Expression(_) => None,
            Self::Boolean(b) => Some(String::from(if *b { "1" } else { "0" })),
            Self::Integer(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::String(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for DefaultValue {
    fn from(s: &str) -> Self {
        Self::String(String::from(s))
    }
}

impl From<String> for DefaultValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for DefaultValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for DefaultValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for DefaultValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for DefaultValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

/// A single column attribute change, applied in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnOption {
    /// Rename the column.
    Rename(String),
    /// Place the column after another column (MySQL).
    After(String),
    /// Auto-increment an integer column.
    AutoIncrement,
    /// Clear auto increment.
    NotAutoIncrement,
    /// Allowed values of an enum or set column.
    AllowedValues(Vec<String>),
    /// Character set (MySQL).
    Charset(String),
    /// Column comment.
    Comment(String),
    /// Collation.
    Collation(String),
    /// Default value.
    Default(DefaultValue),
    /// Place the column first (MySQL).
    First,
    /// SQL identity column (PostgreSQL).
    GeneratedAs {
        /// Sequence options, may be empty.
        expr: String,
        /// `ALWAYS` instead of `BY DEFAULT`.
        always: bool,
    },
    /// Set nullability.
    Nullable(bool),
    /// Part of the primary key.
    PrimaryKey,
    /// Stored generated column.
    StoredAs(String),
    /// Change the data type.
    Type(DataType),
    /// Unsigned integer (MySQL).
    Unsigned,
    /// Default to the current timestamp.
    UseCurrent,
    /// Virtual generated column.
    VirtualAs(String),
    /// Display length.
    Length(u32),
    /// Numeric precision.
    Precision(u32),
    /// Numeric scale.
    Scale(u32),
    /// Precision and scale at once.
    Size {
        /// Numeric precision.
        precision: u32,
        /// Numeric scale.
        scale: u32,
    },
    /// Shorthand for `Nullable(false)`.
    NotNull,
    /// Shorthand for `Nullable(true)`.
    AllowNull,
    /// Geometry projection (PostgreSQL).
    Projection(String),
    /// Spatial reference id (MySQL).
    Srid(u32),
}

/// An abstract column.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Column {
    /// Column name, unquoted.
    pub name: String,
    /// New name for a rename, unquoted.
    pub rename: Option<String>,
    /// Abstract type.
    pub data_type: DataType,
    /// Display length.
    pub length: u32,
    /// Numeric or fractional-seconds precision.
    pub precision: u32,
    /// Numeric scale.
    pub scale: u32,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Part of the primary key.
    pub primary_key: bool,
    /// Auto increment.
    pub auto_increment: bool,
    /// Unsigned integer.
    pub unsigned: bool,
    /// Identity sequence options (PostgreSQL).
    pub generated_as: Option<String>,
    /// Identity is `ALWAYS` rather than `BY DEFAULT`.
    pub always: bool,
    /// Virtual generated expression.
    pub virtual_as: Option<String>,
    /// Stored generated expression.
    pub stored_as: Option<String>,
    /// Default value.
    pub default: Option<DefaultValue>,
    /// Default to `CURRENT_TIMESTAMP`.
    pub use_current: bool,
    /// Character set.
    pub charset: Option<String>,
    /// Collation.
    pub collation: Option<String>,
    /// Comment.
    pub comment: Option<String>,
    /// Placement hint: after this column.
    pub after: Option<String>,
    /// Placement hint: first column.
    pub first: bool,
    /// Geometry projection.
    pub projection: Option<String>,
    /// Spatial reference id.
    pub srid: u32,
    /// Allowed values of an enum or set.
    pub allowed_values: Vec<String>,
    /// `true` when declared, `false` when loaded from a database.
    pub added: bool,
    /// State captured at load time.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub snapshot: Option<Box<Column>>,
}

impl Column {
    /// Creates a column with defaults: not null, not a key, not auto
    /// incremented, signed, added.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            rename: None,
            data_type,
            length: 0,
            precision: 0,
            scale: 0,
            nullable: false,
            primary_key: false,
            auto_increment: false,
            unsigned: false,
            generated_as: None,
            always: false,
            virtual_as: None,
            stored_as: None,
            default: None,
            use_current: false,
            charset: None,
            collation: None,
            comment: None,
            after: None,
            first: false,
            projection: None,
            srid: 0,
            allowed_values: Vec::new(),
            added: true,
            snapshot: None,
        }
    }

    /// Applies options in order.
    #[must_use]
    pub fn with(mut self, options: impl IntoIterator<Item = ColumnOption>) -> Self {
        self.apply(options);
        self
    }

    /// Applies options in order, in place.
    pub fn apply(&mut self, options: impl IntoIterator<Item = ColumnOption>) {
        for option in options {
            self.apply_one(option);
        }
    }

    fn apply_one(&mut self, option: ColumnOption) {
        match option {
            ColumnOption::Rename(name) => self.rename = Some(name),
            ColumnOption::After(column) => self.after = Some(column),
            ColumnOption::AutoIncrement => self.auto_increment = true,
            ColumnOption::NotAutoIncrement => self.auto_increment = false,
            ColumnOption::AllowedValues(values) => self.allowed_values = values,
            ColumnOption::Charset(charset) => self.charset = Some(charset),
            ColumnOption::Comment(comment) => self.comment = Some(comment),
            ColumnOption::Collation(collation) => self.collation = Some(collation),
            ColumnOption::Default(value) => self.default = Some(value),
            ColumnOption::First => self.first = true,
            ColumnOption::GeneratedAs { expr, always } => {
                self.generated_as = Some(expr);
                self.always = always;
            }
            ColumnOption::Nullable(nullable) => self.nullable = nullable,
            ColumnOption::PrimaryKey => self.primary_key = true,
            ColumnOption::StoredAs(expr) => self.stored_as = Some(expr),
            ColumnOption::Type(data_type) => self.data_type = data_type,
            ColumnOption::Unsigned => self.unsigned = true,
            ColumnOption::UseCurrent => self.use_current = true,
            ColumnOption::VirtualAs(expr) => self.virtual_as = Some(expr),
            ColumnOption::Length(length) => self.length = length,
            ColumnOption::Precision(precision) => self.precision = precision,
            ColumnOption::Scale(scale) => self.scale = scale,
            ColumnOption::Size { precision, scale } => {
                self.precision = precision;
                self.scale = scale;
            }
            ColumnOption::NotNull => self.nullable = false,
            ColumnOption::AllowNull => self.nullable = true,
            ColumnOption::Projection(projection) => self.projection = Some(projection),
            ColumnOption::Srid(srid) => self.srid = srid,
        }
    }

    /// Returns the pending new name, or `None` when it equals the current
    /// name or is unset.
    #[must_use]
    pub fn rename(&self) -> Option<&str> {
        self.rename
            .as_deref()
            .filter(|rename| !rename.is_empty() && *rename != self.name)
    }

    /// Captures the current state as the load-time baseline.
    pub fn store(&mut self) {
        let mut copy = self.clone();
        copy.snapshot = None;
        self.snapshot = Some(Box::new(copy));
    }

    /// Returns `true` if the column is auto-increment on an integer type.
    #[must_use]
    pub const fn is_auto_increment_integer(&self) -> bool {
        self.auto_increment && self.data_type.is_integer()
    }
}
