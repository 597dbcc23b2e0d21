//! Borrow and return endpoints

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::borrow::{BookReturn, NewBorrow},
};

use super::{ApiResponse, AppJson};

/// Borrow request
#[derive(Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub card_id: i32,
    pub book_id: i32,
    /// Epoch milliseconds; defaults to now
    pub borrow_time: Option<i64>,
}

/// Return request
#[derive(Deserialize, ToSchema)]
pub struct ReturnRequest {
    pub card_id: i32,
    pub book_id: i32,
    /// Epoch milliseconds; defaults to now
    pub return_time: Option<i64>,
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Book borrowed"),
        (status = 404, description = "Book or card not found"),
        (status = 409, description = "Card already holds this book"),
        (status = 422, description = "No copy in stock")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AppJson(request): AppJson<BorrowRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<()>>)> {
    let borrow = NewBorrow {
        card_id: request.card_id,
        book_id: request.book_id,
        borrow_time: request.borrow_time.unwrap_or_else(now_millis),
    };

    state.services.loans.borrow_book(borrow).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::message("Book borrowed successfully"),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrows/return",
    tag = "borrows",
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Book returned"),
        (status = 404, description = "No outstanding borrow for this card and book"),
        (status = 422, description = "Return time is not after borrow time")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AppJson(request): AppJson<ReturnRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let book_return = BookReturn {
        card_id: request.card_id,
        book_id: request.book_id,
        return_time: request.return_time.unwrap_or_else(now_millis),
    };

    state.services.loans.return_book(book_return).await?;

    Ok(ApiResponse::message("Book returned successfully"))
}
