//! Error types shared by the query builders, the schema compilers and the
//! catalog loaders.

/// Errors produced while compiling SQL or loading a schema.
#[derive(Debug, thiserror::Error)]
pub enum DbxError {
    /// The abstract data type has no mapping for the active dialect.
    #[error("unsupported data type '{0}'")]
    UnsupportedDataType(String),

    /// The dialect cannot express the requested DDL or catalog query.
    #[error("not supported: {0}")]
    UnsupportedFeature(String),

    /// A table, column or constraint is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bound argument count differs from the placeholder count.
    #[error("wrong placeholder count: expected {expected}, got {actual}")]
    PlaceholderCount {
        /// Placeholders found in the SQL text.
        expected: usize,
        /// Arguments supplied.
        actual: usize,
    },

    /// A catalog row could not be decoded into the schema model.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A statement was compiled without a target table.
    #[error("table not specified")]
    TableNotSpecified,

    /// An insert was compiled without columns.
    #[error("column not specified")]
    ColumnNotSpecified,

    /// The execution collaborator failed.
    #[error("query failed: {0}")]
    Query(String),

    /// Another error, annotated with what was being processed.
    #[error("{context}: {source}")]
    Context {
        /// What was being done.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<DbxError>,
    },
}

impl DbxError {
    /// Wraps this error with a description of the failing operation.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping any context wrappers.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, DbxError>;

/// Adds [`DbxError::context`] to results.
pub trait ResultExt<T> {
    /// Wraps the error, if any, with a lazily built context message.
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped in [`DbxError::Context`].
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.context(f()))
    }
}
