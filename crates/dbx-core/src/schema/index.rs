//! Index definitions.

use std::fmt;

/// Index kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexType {
    /// `PRIMARY KEY`
    Primary,
    /// `UNIQUE`
    Unique,
    /// Plain `INDEX`.
    Normal,
    /// `SPATIAL` on MySQL, GIST on PostgreSQL.
    Spatial,
    /// `FULLTEXT`, MySQL only.
    FullText,
    /// GIST, PostgreSQL.
    Gist,
    /// GIN, PostgreSQL.
    Gin,
}

impl IndexType {
    /// Returns the SQL keyword of the index kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "PRIMARY KEY",
            Self::Unique => "UNIQUE",
            Self::Normal => "INDEX",
            Self::Spatial => "SPATIAL",
            Self::FullText => "FULLTEXT",
            Self::Gist => "GIST",
            Self::Gin => "GIN",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index attribute changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOption {
    /// Explicit index name.
    Name(String),
    /// Index comment.
    Comment(String),
    /// Algorithm hint (`BTREE`, `HASH`, ...).
    Algorithm(String),
}

/// An index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Index {
    /// Index name; `idx_<col1>_<col2>...` unless set explicitly.
    pub name: String,
    /// Index kind.
    pub index_type: IndexType,
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// Algorithm hint.
    pub algorithm: Option<String>,
    /// Comment.
    pub comment: Option<String>,
}

impl Index {
    /// Creates an index, applying options in order.
    #[must_use]
    pub fn new<S: AsRef<str>>(
        index_type: IndexType,
        columns: &[S],
        options: impl IntoIterator<Item = IndexOption>,
    ) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| String::from(c.as_ref())).collect();
        let mut name = None;
        let mut algorithm = None;
        let mut comment = None;
        for option in options {
            match option {
                IndexOption::Name(n) => name = Some(n),
                IndexOption::Comment(c) => comment = Some(c),
                IndexOption::Algorithm(a) => algorithm = Some(a),
            }
        }
        let name = name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_name(&columns));
        Self {
            name,
            index_type,
            columns,
            algorithm,
            comment,
        }
    }
}

fn default_name(columns: &[String]) -> String {
    let mut name = String::from("idx");
    for column in columns {
        name.push('_');
        name.push_str(column);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name() {
        let index = Index::new(IndexType::Normal, &["a", "b"], []);
        assert_eq!(index.name, "idx_a_b");
        assert_eq!(index.columns, vec!["a", "b"]);
    }

    #[test]
    fn test_options() {
        let index = Index::new(
            IndexType::Unique,
            &["email"],
            [
                IndexOption::Name(String::from("uq_email")),
                IndexOption::Algorithm(String::from("BTREE")),
                IndexOption::Comment(String::from("login")),
            ],
        );
        assert_eq!(index.name, "uq_email");
        assert_eq!(index.algorithm.as_deref(), Some("BTREE"));
        assert_eq!(index.comment.as_deref(), Some("login"));
        assert_eq!(index.index_type.to_string(), "UNIQUE");
    }
}
