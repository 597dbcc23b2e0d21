//! Drop and recreate the library tables

use sqlx::{Executor, PgConnection};

use crate::error::AppResult;

/// Same DDL the migrator applies at startup
const CREATE_TABLES: &str = include_str!("../../migrations/20240501000000_library.sql");

/// `borrow` goes first; it refers to both `book` and `card`
const DROP_TABLES: [&str; 3] = [
    "DROP TABLE IF EXISTS borrow",
    "DROP TABLE IF EXISTS book",
    "DROP TABLE IF EXISTS card",
];

/// Drop every library table and recreate it empty
pub async fn reset(conn: &mut PgConnection) -> AppResult<()> {
    for statement in DROP_TABLES {
        (&mut *conn).execute(statement).await?;
    }

    (&mut *conn).execute(CREATE_TABLES).await?;

    Ok(())
}
