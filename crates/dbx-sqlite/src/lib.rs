//! # dbx-sqlite
//!
//! A synchronous [`dbx_core::Query`] implementation over an `sqlx` SQLite
//! pool.
//!
//! ```rust
//! use dbx_core::{Session, Sqlite};
//! use dbx_sqlite::SqliteExecutor;
//!
//! let executor = SqliteExecutor::in_memory().unwrap();
//! let session = Session::new(&Sqlite, &executor);
//!
//! session
//!     .create_table("users", |table| {
//!         table.id("id", []);
//!         table.string("email", []);
//!     })
//!     .unwrap();
//!
//! assert!(session.table_exists("users", None).unwrap());
//! ```

mod error;
mod executor;

pub use error::{Result, SqliteError};
pub use executor::SqliteExecutor;
