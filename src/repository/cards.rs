//! Card table access

use sqlx::PgConnection;

use super::is_unique_violation;
use crate::{
    error::{AppError, AppResult},
    models::card::{Card, CardRow, NewCard},
};

/// Check whether a card with this `(name, department, type)` exists, optionally ignoring one id
pub async fn key_exists(
    conn: &mut PgConnection,
    card: &NewCard,
    exclude_id: Option<i32>,
) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM card
            WHERE name = $1 AND department = $2 AND type = $3
              AND card_id IS DISTINCT FROM $4
        )
        "#,
    )
    .bind(&card.name)
    .bind(&card.department)
    .bind(card.card_type.as_code())
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(exists)
}

/// Check that a card exists and keep it from being removed until the transaction ends
pub async fn lock_shared(conn: &mut PgConnection, id: i32) -> AppResult<bool> {
    let found = sqlx::query_scalar::<_, i32>("SELECT card_id FROM card WHERE card_id = $1 FOR SHARE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(found.is_some())
}

/// Lock a card row for modification or removal
pub async fn lock(conn: &mut PgConnection, id: i32) -> AppResult<bool> {
    let found = sqlx::query_scalar::<_, i32>("SELECT card_id FROM card WHERE card_id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(found.is_some())
}

/// Insert a card and return its generated id
pub async fn insert(conn: &mut PgConnection, card: &NewCard) -> AppResult<i32> {
    sqlx::query_scalar::<_, i32>(
        "INSERT INTO card (name, department, type) VALUES ($1, $2, $3) RETURNING card_id",
    )
    .bind(&card.name)
    .bind(&card.department)
    .bind(card.card_type.as_code())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Card to be registered already exists".to_string())
        } else {
            e.into()
        }
    })
}

/// Overwrite a card. Returns the number of rows matched.
pub async fn update(conn: &mut PgConnection, id: i32, card: &NewCard) -> AppResult<u64> {
    let result = sqlx::query("UPDATE card SET name = $1, department = $2, type = $3 WHERE card_id = $4")
        .bind(&card.name)
        .bind(&card.department)
        .bind(card.card_type.as_code())
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Another card already has this identity".to_string())
            } else {
                AppError::from(e)
            }
        })?;

    Ok(result.rows_affected())
}

/// Delete a card. Returns the number of rows removed.
pub async fn delete(conn: &mut PgConnection, id: i32) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM card WHERE card_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// All cards ordered by id
pub async fn list(conn: &mut PgConnection) -> AppResult<Vec<Card>> {
    let rows = sqlx::query_as::<_, CardRow>(
        "SELECT card_id, name, department, type FROM card ORDER BY card_id ASC",
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(Card::try_from).collect()
}
