//! # dbx-core
//!
//! SQL generation and schema introspection for MySQL, PostgreSQL and
//! SQLite.
//!
//! This crate provides:
//! - Statement builders for SELECT, INSERT, UPDATE and DELETE with
//!   dialect-specific quoting and placeholders
//! - An abstract schema model (tables, columns, indexes, constraints)
//!   compiled to per-dialect DDL
//! - Catalog introspection that loads a table back into the same model
//! - A [`Session`] that loads, mutates and applies table changes
//!
//! The crate never opens a connection. Anything that touches a database
//! goes through a caller-supplied [`Query`].
//!
//! ## Building DDL
//!
//! ```rust
//! use dbx_core::dialect::Sqlite;
//! use dbx_core::grammar::DdlCompiler;
//! use dbx_core::schema::Table;
//!
//! let mut table = Table::new("users");
//! table.id("id", []);
//! table.string("email", []);
//!
//! assert_eq!(
//!     Sqlite.compile_create(&table).unwrap(),
//!     "CREATE TABLE \"users\"(\n\t\"id\" integer NOT NULL PRIMARY KEY AUTOINCREMENT,\n\t\"email\" varchar NOT NULL\n);"
//! );
//! ```
//!
//! ## Building queries
//!
//! ```rust
//! use dbx_core::builder::Update;
//! use dbx_core::condition::eq;
//! use dbx_core::dialect::MySql;
//!
//! let (sql, args) = Update::new(&MySql, "users")
//!     .set("name", "bob")
//!     .and_where(eq("id", 7))
//!     .to_sql()
//!     .unwrap();
//!
//! assert_eq!(sql, "UPDATE `users` SET `name` = ? WHERE `id` = ?");
//! assert_eq!(args.len(), 2);
//! ```

pub mod buffer;
pub mod builder;
pub mod condition;
pub mod dialect;
pub mod error;
pub mod grammar;
pub mod query;
pub mod schema;
pub mod session;
pub mod util;
pub mod value;

pub use builder::{Delete, Insert, Select, Update};
pub use dialect::{Dialect, MySql, Postgres, Sqlite};
pub use error::{DbxError, Result, ResultExt};
pub use grammar::{DdlCompiler, Introspector, SchemaDialect, TypeMapping};
pub use query::{FromRow, Query, QueryExt, Row};
pub use schema::{
    Column, ColumnOption, DataType, DefaultValue, Index, IndexType, Table, TableConstraints,
};
pub use session::Session;
pub use value::{SqlValue, ToSqlValue};
