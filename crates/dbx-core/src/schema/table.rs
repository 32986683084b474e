//! Table declarations and mutations.
//!
//! A [`Table`] is either declared (`added == true`) and later rendered as a
//! single `CREATE TABLE`, or loaded from a catalog (`added == false`) and
//! mutated, each mutation appending a [`Command`].

use super::column::{Column, ColumnOption};
use super::command::Command;
use super::data_type::DataType;
use super::diff::ColumnDiff;
use super::index::{Index, IndexOption, IndexType};

/// Default length of `char` and `string` columns.
pub const DEFAULT_STRING_LENGTH: u32 = 255;

/// A table: its attributes, ordered columns and pending commands.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    /// Table name without prefix.
    pub name: String,
    /// Owning schema or database.
    pub schema: Option<String>,
    /// Name prefix.
    pub prefix: String,
    /// `CREATE TEMPORARY TABLE`.
    pub temporary: bool,
    /// Storage engine (MySQL).
    pub engine: Option<String>,
    /// Default character set.
    pub charset: Option<String>,
    /// Default collation.
    pub collation: Option<String>,
    /// Table comment.
    pub comment: Option<String>,
    /// Raw create options as reported by the catalog.
    pub options: Option<String>,
    /// Columns in declaration order.
    pub columns: Vec<Column>,
    /// `true` when declared, `false` when loaded.
    pub added: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    commands: Vec<Command>,
}

macro_rules! column_constructors {
    ($($(#[$doc:meta])* $fn_name:ident => $data_type:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $fn_name(
                &mut self,
                name: &str,
                options: impl IntoIterator<Item = ColumnOption>,
            ) -> &mut Column {
                self.add_column(name, DataType::$data_type, options)
            }
        )*
    };
}

impl Table {
    /// Declares a new table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            prefix: String::new(),
            temporary: false,
            engine: None,
            charset: None,
            collation: None,
            comment: None,
            options: None,
            columns: Vec::new(),
            added: true,
            commands: Vec::new(),
        }
    }

    /// Creates an empty table that represents catalog state.
    #[must_use]
    pub fn loaded(name: impl Into<String>) -> Self {
        Self {
            added: false,
            ..Self::new(name)
        }
    }

    /// Returns the prefixed name, unquoted.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}{}", self.prefix, self.name)
    }

    /// Sets the schema.
    pub fn set_schema(&mut self, schema: impl Into<String>) -> &mut Self {
        self.schema = Some(schema.into()).filter(|s: &String| !s.is_empty());
        self
    }

    /// Sets the name prefix.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.prefix = prefix.into();
        self
    }

    /// Marks the table as temporary.
    pub const fn set_temporary(&mut self, temporary: bool) -> &mut Self {
        self.temporary = temporary;
        self
    }

    /// Sets the storage engine.
    pub fn set_engine(&mut self, engine: impl Into<String>) -> &mut Self {
        self.engine = Some(engine.into());
        self
    }

    /// Sets the default character set.
    pub fn set_charset(&mut self, charset: impl Into<String>) -> &mut Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the default collation.
    pub fn set_collation(&mut self, collation: impl Into<String>) -> &mut Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets the comment.
    pub fn set_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the raw create options.
    pub fn set_options(&mut self, options: impl Into<String>) -> &mut Self {
        self.options = Some(options.into());
        self
    }

    /// Pending commands, in append order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Appends a command.
    pub fn add_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Removes and returns every pending command.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Appends a column.
    ///
    /// On a loaded table this also appends [`Command::AddColumn`].
    pub fn add_column(
        &mut self,
        name: &str,
        data_type: DataType,
        options: impl IntoIterator<Item = ColumnOption>,
    ) -> &mut Column {
        self.push_column(Column::new(name, data_type).with(options))
    }

    /// Appends an already built column.
    pub fn push_column(&mut self, column: Column) -> &mut Column {
        if !self.added {
            self.commands.push(Command::AddColumn(column.name.clone()));
        }
        let pos = self.columns.len();
        self.columns.push(column);
        &mut self.columns[pos]
    }

    /// Auto-incrementing unsigned integer primary key.
    pub fn id(&mut self, name: &str, options: impl IntoIterator<Item = ColumnOption>) -> &mut Column {
        self.identity(name, DataType::Int, options)
    }

    /// Auto-incrementing unsigned big integer primary key.
    pub fn big_id(
        &mut self,
        name: &str,
        options: impl IntoIterator<Item = ColumnOption>,
    ) -> &mut Column {
        self.identity(name, DataType::BigInt, options)
    }

    fn identity(
        &mut self,
        name: &str,
        data_type: DataType,
        options: impl IntoIterator<Item = ColumnOption>,
    ) -> &mut Column {
        let column = Column::new(name, data_type).with(options).with([
            ColumnOption::PrimaryKey,
            ColumnOption::AutoIncrement,
            ColumnOption::Unsigned,
        ]);
        self.push_column(column)
    }

    /// Fixed-length string column, 255 characters unless overridden.
    pub fn char(&mut self, name: &str, options: impl IntoIterator<Item = ColumnOption>) -> &mut Column {
        self.sized_string(name, DataType::Char, options)
    }

    /// Variable-length string column, 255 characters unless overridden.
    pub fn string(
        &mut self,
        name: &str,
        options: impl IntoIterator<Item = ColumnOption>,
    ) -> &mut Column {
        self.sized_string(name, DataType::String, options)
    }

    fn sized_string(
        &mut self,
        name: &str,
        data_type: DataType,
        options: impl IntoIterator<Item = ColumnOption>,
    ) -> &mut Column {
        let column = Column::new(name, data_type)
            .with([ColumnOption::Length(DEFAULT_STRING_LENGTH)])
            .with(options);
        self.push_column(column)
    }

    /// MAC address column; the length is always 17.
    pub fn mac_address(
        &mut self,
        name: &str,
        options: impl IntoIterator<Item = ColumnOption>,
    ) -> &mut Column {
        let column = Column::new(name, DataType::MacAddress)
            .with(options)
            .with([ColumnOption::Length(17)]);
        self.push_column(column)
    }

    column_constructors! {
        /// Text column.
        text => Text;
        /// Medium text column.
        medium_text => MediumText;
        /// Long text column.
        long_text => LongText;
        /// 4-byte integer column.
        int => Int;
        /// 1-byte integer column.
        tiny_int => TinyInt;
        /// 2-byte integer column.
        small_int => SmallInt;
        /// 3-byte integer column.
        medium_int => MediumInt;
        /// 8-byte integer column.
        big_int => BigInt;
        /// Float column.
        float => Float;
        /// Double column.
        double => Double;
        /// Decimal column; use [`ColumnOption::Size`] for precision and scale.
        decimal => Decimal;
        /// Boolean column.
        boolean => Boolean;
        /// Enum column; use [`ColumnOption::AllowedValues`].
        enumeration => Enum;
        /// Set column; use [`ColumnOption::AllowedValues`].
        set => Set;
        /// JSON column.
        json => Json;
        /// Binary JSON column.
        jsonb => Jsonb;
        /// Date column.
        date => Date;
        /// Date-time column.
        date_time => DateTime;
        /// Date-time column with time zone.
        date_time_tz => DateTimeTz;
        /// Time column.
        time => Time;
        /// Time column with time zone.
        time_tz => TimeTz;
        /// Timestamp column.
        timestamp => Timestamp;
        /// Timestamp column with time zone.
        timestamp_tz => TimestampTz;
        /// Year column.
        year => Year;
        /// Binary column.
        binary => Binary;
        /// UUID column.
        uuid => Uuid;
        /// IP address column.
        ip_address => IpAddress;
        /// Geometry column.
        geometry => Geometry;
        /// Point column.
        point => Point;
        /// Line string column.
        line_string => LineString;
        /// Polygon column.
        polygon => Polygon;
        /// Geometry collection column.
        geometry_collection => GeometryCollection;
        /// Multi point column.
        multi_point => MultiPoint;
        /// Multi line string column.
        multi_line_string => MultiLineString;
        /// Multi polygon column.
        multi_polygon => MultiPolygon;
        /// Multi polygon Z column; no dialect maps it.
        multi_polygon_z => MultiPolygonZ;
        /// Tiny blob column.
        tiny_blob => TinyBlob;
        /// Blob column.
        blob => Blob;
        /// Medium blob column.
        medium_blob => MediumBlob;
        /// Long blob column.
        long_blob => LongBlob;
    }

    /// Removes the column `name`, compared case-insensitively.
    pub fn remove_column(&mut self, name: &str) -> &mut Self {
        self.columns
            .retain(|column| !column.name.eq_ignore_ascii_case(name));
        self
    }

    /// Returns `true` if the column exists.
    #[must_use]
    pub fn column_exists(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Returns the column `name`.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Returns the column `name` for mutation.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|column| column.name == name)
    }

    /// Names of the primary-key columns, in column order.
    #[must_use]
    pub fn primary_key(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| column.primary_key)
            .map(|column| column.name.clone())
            .collect()
    }

    /// Columns declared on this table, as opposed to loaded ones.
    #[must_use]
    pub fn added_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|column| column.added).collect()
    }

    /// Loaded columns that differ from their load-time snapshot.
    #[must_use]
    pub fn changed_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|column| !column.added)
            .filter(|column| ColumnDiff::of(column).is_some_and(|diff| !diff.is_empty()))
            .collect()
    }

    /// Renames the table.
    pub fn rename(&mut self, to: impl Into<String>) {
        self.commands.push(Command::RenameTable(to.into()));
    }

    /// Drops the table.
    #[allow(clippy::should_implement_trait)]
    pub fn drop(&mut self) {
        let name = self.full_name();
        self.commands.push(Command::DropTable(name));
    }

    /// Drops the table if it exists.
    pub fn drop_if_exists(&mut self) {
        let name = self.full_name();
        self.commands.push(Command::DropTableIfExists(name));
    }

    /// Applies `options` to the column now and alters it when compiled.
    ///
    /// An unknown column is reported when the command is compiled.
    pub fn modify(&mut self, column: &str, options: impl IntoIterator<Item = ColumnOption>) {
        if let Some(existing) = self.column_mut(column) {
            existing.apply(options);
        }
        self.commands.push(Command::ModifyColumn(String::from(column)));
    }

    /// Drops columns.
    pub fn drop_columns<S: AsRef<str>>(&mut self, columns: &[S]) {
        self.commands
            .push(Command::DropColumns(to_strings(columns)));
    }

    /// Adds a primary key.
    pub fn add_primary_key<S: AsRef<str>>(&mut self, columns: &[S]) {
        self.commands
            .push(Command::AddPrimaryKey(to_strings(columns)));
    }

    /// Drops the primary key.
    pub fn drop_primary_key(&mut self) {
        self.commands.push(Command::DropPrimaryKey);
    }

    /// Adds a plain index.
    pub fn index<S: AsRef<str>>(&mut self, columns: &[S], options: impl IntoIterator<Item = IndexOption>) {
        self.add_index(IndexType::Normal, columns, options);
    }

    /// Adds a unique index.
    pub fn unique<S: AsRef<str>>(&mut self, columns: &[S], options: impl IntoIterator<Item = IndexOption>) {
        self.add_index(IndexType::Unique, columns, options);
    }

    /// Adds a spatial index.
    pub fn spatial_index<S: AsRef<str>>(
        &mut self,
        columns: &[S],
        options: impl IntoIterator<Item = IndexOption>,
    ) {
        self.add_index(IndexType::Spatial, columns, options);
    }

    /// Adds a full-text index.
    pub fn fulltext_index<S: AsRef<str>>(
        &mut self,
        columns: &[S],
        options: impl IntoIterator<Item = IndexOption>,
    ) {
        self.add_index(IndexType::FullText, columns, options);
    }

    /// Adds an index of any kind.
    pub fn add_index<S: AsRef<str>>(
        &mut self,
        index_type: IndexType,
        columns: &[S],
        options: impl IntoIterator<Item = IndexOption>,
    ) {
        self.commands
            .push(Command::AddIndex(Index::new(index_type, columns, options)));
    }

    /// Drops an index.
    pub fn drop_index(&mut self, name: impl Into<String>) {
        self.commands.push(Command::DropIndex(name.into()));
    }

    /// Drops a unique index.
    pub fn drop_unique(&mut self, name: impl Into<String>) {
        self.commands.push(Command::DropUnique(name.into()));
    }

    /// Drops a spatial index.
    pub fn drop_spatial_index(&mut self, name: impl Into<String>) {
        self.commands.push(Command::DropSpatialIndex(name.into()));
    }

    /// Drops a foreign key.
    pub fn drop_foreign(&mut self, name: impl Into<String>) {
        self.commands.push(Command::DropForeign(name.into()));
    }

    /// Renames an index.
    pub fn rename_index(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.commands.push(Command::RenameIndex {
            from: from.into(),
            to: to.into(),
        });
    }
}

fn to_strings<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().map(|item| String::from(item.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::column::DefaultValue;

    #[test]
    fn test_declared_table_records_no_add_commands() {
        let mut table = Table::new("users");
        table.id("id", []);
        table.string("email", [ColumnOption::Length(120)]);
        assert!(table.commands().is_empty());
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.added_columns().len(), 2);
    }

    #[test]
    fn test_loaded_table_records_add_column() {
        let mut table = Table::loaded("users");
        table.boolean("active", [ColumnOption::Default(DefaultValue::from(true))]);
        assert_eq!(table.commands(), [Command::AddColumn(String::from("active"))]);
    }

    #[test]
    fn test_id_options_come_last() {
        let mut table = Table::new("t");
        let column = table.big_id("id", [ColumnOption::NotAutoIncrement]);
        assert_eq!(column.data_type, DataType::BigInt);
        assert!(column.primary_key);
        assert!(column.auto_increment);
        assert!(column.unsigned);
    }

    #[test]
    fn test_string_length_defaults() {
        let mut table = Table::new("t");
        assert_eq!(table.string("a", []).length, 255);
        assert_eq!(table.char("b", [ColumnOption::Length(2)]).length, 2);
        assert_eq!(table.mac_address("c", [ColumnOption::Length(40)]).length, 17);
    }

    #[test]
    fn test_every_constructor_applies_options() {
        let mut table = Table::new("t");
        let column = table.uuid("u", [ColumnOption::Nullable(true)]);
        assert!(column.nullable);
        let column = table.date("d", [ColumnOption::Comment(String::from("day"))]);
        assert_eq!(column.comment.as_deref(), Some("day"));
        let column = table.medium_text("m", [ColumnOption::AllowNull]);
        assert!(column.nullable);
    }

    #[test]
    fn test_remove_column_is_case_insensitive() {
        let mut table = Table::new("t");
        table.int("Score", []);
        table.int("other", []);
        table.remove_column("score");
        assert!(!table.column_exists("Score"));
        assert!(table.column_exists("other"));
    }

    #[test]
    fn test_primary_key_in_column_order() {
        let mut table = Table::new("t");
        table.int("b", [ColumnOption::PrimaryKey]);
        table.int("x", []);
        table.int("a", [ColumnOption::PrimaryKey]);
        assert_eq!(table.primary_key(), vec!["b", "a"]);
    }

    #[test]
    fn test_modify_applies_options_now() {
        let mut table = Table::loaded("t");
        let mut column = Column::new("name", DataType::String);
        column.added = false;
        column.store();
        table.columns.push(column);
        assert!(table.changed_columns().is_empty());

        table.modify("name", [ColumnOption::Length(64)]);
        assert_eq!(table.column("name").unwrap().length, 64);
        assert_eq!(table.changed_columns().len(), 1);
        assert_eq!(table.commands(), [Command::ModifyColumn(String::from("name"))]);
    }

    #[test]
    fn test_commands_in_append_order() {
        let mut table = Table::loaded("t");
        table.set_prefix("app_");
        table.index(&["a", "b"], []);
        table.unique(&["c"], [IndexOption::Name(String::from("uq_c"))]);
        table.rename_index("uq_c", "uq_cc");
        table.drop();
        let kinds: Vec<&str> = table.commands().iter().map(Command::kind).collect();
        assert_eq!(kinds, vec!["add_index", "add_index", "rename_index", "drop_table"]);
        assert_eq!(
            table.commands()[3],
            Command::DropTable(String::from("app_t"))
        );
        assert_eq!(table.take_commands().len(), 4);
        assert!(table.commands().is_empty());
    }
}
