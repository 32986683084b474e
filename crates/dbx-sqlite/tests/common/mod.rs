//! Shared fixtures for SQLite integration tests.

#![allow(dead_code)]

use dbx_core::{ColumnOption, DefaultValue, Session, Sqlite};
use dbx_sqlite::SqliteExecutor;

pub fn executor() -> SqliteExecutor {
    SqliteExecutor::in_memory().expect("in-memory database")
}

/// Creates `users(id, email, active, role, bio)` with a unique email.
pub fn create_users(session: &Session<'_, SqliteExecutor>) {
    session
        .create_table("users", |table| {
            table.id("id", []);
            table.string("email", []);
            table.boolean("active", [ColumnOption::Default(DefaultValue::from(true))]);
            table.enumeration(
                "role",
                [ColumnOption::AllowedValues(vec![
                    String::from("admin"),
                    String::from("member"),
                ])],
            );
            table.text("bio", [ColumnOption::AllowNull]);
            table.unique(&["email"], []);
        })
        .expect("create users");
}

pub fn session(executor: &SqliteExecutor) -> Session<'_, SqliteExecutor> {
    Session::new(&Sqlite, executor)
}
