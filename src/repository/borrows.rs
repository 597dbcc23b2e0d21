//! Borrow table access

use sqlx::PgConnection;

use super::violated_unique_constraint;
use crate::{
    error::{AppError, AppResult},
    models::borrow::{Borrow, BorrowHistoryItem, NewBorrow, OUTSTANDING},
};

/// Partial unique index allowing one outstanding borrow per (card, book)
const OUTSTANDING_INDEX: &str = "borrow_outstanding";

/// Does this card currently hold this book?
pub async fn is_outstanding(conn: &mut PgConnection, card_id: i32, book_id: i32) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM borrow WHERE card_id = $1 AND book_id = $2 AND return_time = $3)",
    )
    .bind(card_id)
    .bind(book_id)
    .bind(OUTSTANDING)
    .fetch_one(&mut *conn)
    .await?;

    Ok(exists)
}

/// Is any copy of this book currently borrowed?
pub async fn book_has_outstanding(conn: &mut PgConnection, book_id: i32) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM borrow WHERE book_id = $1 AND return_time = $2)",
    )
    .bind(book_id)
    .bind(OUTSTANDING)
    .fetch_one(&mut *conn)
    .await?;

    Ok(exists)
}

/// Does this card hold any book?
pub async fn card_has_outstanding(conn: &mut PgConnection, card_id: i32) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM borrow WHERE card_id = $1 AND return_time = $2)",
    )
    .bind(card_id)
    .bind(OUTSTANDING)
    .fetch_one(&mut *conn)
    .await?;

    Ok(exists)
}

/// Fetch and lock the outstanding borrow of `(card_id, book_id)`
pub async fn find_outstanding_for_update(
    conn: &mut PgConnection,
    card_id: i32,
    book_id: i32,
) -> AppResult<Option<Borrow>> {
    let borrow = sqlx::query_as::<_, Borrow>(
        r#"
        SELECT card_id, book_id, borrow_time, return_time
        FROM borrow
        WHERE card_id = $1 AND book_id = $2 AND return_time = $3
        FOR UPDATE
        "#,
    )
    .bind(card_id)
    .bind(book_id)
    .bind(OUTSTANDING)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(borrow)
}

/// Insert an outstanding borrow
pub async fn insert(conn: &mut PgConnection, borrow: &NewBorrow) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO borrow (card_id, book_id, borrow_time, return_time) VALUES ($1, $2, $3, $4)",
    )
    .bind(borrow.card_id)
    .bind(borrow.book_id)
    .bind(borrow.borrow_time)
    .bind(OUTSTANDING)
    .execute(&mut *conn)
    .await
    .map_err(|e| match violated_unique_constraint(&e) {
        Some(OUTSTANDING_INDEX) => {
            AppError::Conflict("Book to be borrowed has not been returned".to_string())
        }
        // Primary key: the same card already borrowed this book at this exact time
        Some(_) => AppError::Conflict(format!(
            "Card {} already has a borrow of book {} at time {}",
            borrow.card_id, borrow.book_id, borrow.borrow_time
        )),
        None => AppError::from(e),
    })?;

    Ok(())
}

/// Close an outstanding borrow. Returns the number of rows updated.
pub async fn mark_returned(conn: &mut PgConnection, borrow: &Borrow, return_time: i64) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE borrow SET return_time = $1
        WHERE card_id = $2 AND book_id = $3 AND borrow_time = $4 AND return_time = $5
        "#,
    )
    .bind(return_time)
    .bind(borrow.card_id)
    .bind(borrow.book_id)
    .bind(borrow.borrow_time)
    .bind(OUTSTANDING)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Every borrow of a card joined with its book, newest first
pub async fn history(conn: &mut PgConnection, card_id: i32) -> AppResult<Vec<BorrowHistoryItem>> {
    let items = sqlx::query_as::<_, BorrowHistoryItem>(
        r#"
        SELECT br.card_id, br.book_id, b.category, b.title, b.press, b.publish_year,
               b.author, b.price, br.borrow_time, br.return_time
        FROM borrow br
        JOIN book b ON b.book_id = br.book_id
        WHERE br.card_id = $1
        ORDER BY br.borrow_time DESC, br.book_id ASC
        "#,
    )
    .bind(card_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}
