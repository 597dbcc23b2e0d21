//! Book table access

use sqlx::PgConnection;

use super::{book_query::BookQuery, is_unique_violation};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQueryConditions, NewBook, UpdateBook},
};

/// Fields that identify a book
#[derive(Debug, Clone, Copy)]
pub struct BookKey<'a> {
    pub category: &'a str,
    pub title: &'a str,
    pub press: &'a str,
    pub publish_year: i32,
    pub author: &'a str,
}

impl<'a> From<&'a NewBook> for BookKey<'a> {
    fn from(book: &'a NewBook) -> Self {
        Self {
            category: &book.category,
            title: &book.title,
            press: &book.press,
            publish_year: book.publish_year,
            author: &book.author,
        }
    }
}

impl<'a> From<&'a UpdateBook> for BookKey<'a> {
    fn from(book: &'a UpdateBook) -> Self {
        Self {
            category: &book.category,
            title: &book.title,
            press: &book.press,
            publish_year: book.publish_year,
            author: &book.author,
        }
    }
}

/// Check whether a book with this identity exists, optionally ignoring one id
pub async fn key_exists(
    conn: &mut PgConnection,
    key: BookKey<'_>,
    exclude_id: Option<i32>,
) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM book
            WHERE category = $1 AND title = $2 AND press = $3
              AND publish_year = $4 AND author = $5
              AND book_id IS DISTINCT FROM $6
        )
        "#,
    )
    .bind(key.category)
    .bind(key.title)
    .bind(key.press)
    .bind(key.publish_year)
    .bind(key.author)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(exists)
}

/// Insert a book and return its generated id
pub async fn insert(conn: &mut PgConnection, book: &NewBook) -> AppResult<i32> {
    sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO book (category, title, press, publish_year, author, price, stock)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING book_id
        "#,
    )
    .bind(&book.category)
    .bind(&book.title)
    .bind(&book.press)
    .bind(book.publish_year)
    .bind(&book.author)
    .bind(book.price)
    .bind(book.stock)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Book to be stored already exists".to_string())
        } else {
            e.into()
        }
    })
}

/// Get book by ID
pub async fn find_by_id(conn: &mut PgConnection, id: i32) -> AppResult<Option<Book>> {
    let book = sqlx::query_as::<_, Book>(
        r#"
        SELECT book_id, category, title, press, publish_year, author, price, stock
        FROM book
        WHERE book_id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(book)
}

/// Read the stock of a book and hold its row lock until the transaction ends
pub async fn lock_stock(conn: &mut PgConnection, id: i32) -> AppResult<Option<i32>> {
    let stock = sqlx::query_scalar::<_, i32>("SELECT stock FROM book WHERE book_id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(stock)
}

/// Add `delta` to the stock and return the new value
pub async fn add_stock(conn: &mut PgConnection, id: i32, delta: i32) -> AppResult<i32> {
    sqlx::query_scalar::<_, i32>(
        "UPDATE book SET stock = stock + $1 WHERE book_id = $2 RETURNING stock",
    )
    .bind(delta)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
}

/// Overwrite the descriptive fields of a book. Returns the number of rows matched.
pub async fn update_info(conn: &mut PgConnection, id: i32, book: &UpdateBook) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE book SET
            category = $1,
            title = $2,
            press = $3,
            publish_year = $4,
            author = $5,
            price = $6
        WHERE book_id = $7
        "#,
    )
    .bind(&book.category)
    .bind(&book.title)
    .bind(&book.press)
    .bind(book.publish_year)
    .bind(&book.author)
    .bind(book.price)
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Another book already has this identity".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    Ok(result.rows_affected())
}

/// Delete a book. Returns the number of rows removed.
pub async fn delete(conn: &mut PgConnection, id: i32) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM book WHERE book_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Books matching the conditions, in the requested order
pub async fn query(
    conn: &mut PgConnection,
    conditions: &BookQueryConditions,
) -> AppResult<Vec<Book>> {
    BookQuery::new(conditions).fetch_all(conn).await
}
