//! Borrower card endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        borrow::BorrowHistories,
        card::{CardList, NewCard},
    },
};

use super::{ApiResponse, AppJson, AppPath};

/// List all cards
#[utoipa::path(
    get,
    path = "/cards",
    tag = "cards",
    responses(
        (status = 200, description = "All cards ordered by id", body = CardList)
    )
)]
pub async fn list_cards(
    State(state): State<crate::AppState>,
) -> AppResult<Json<ApiResponse<CardList>>> {
    let cards = state.services.cards.show_cards().await?;
    Ok(ApiResponse::payload(cards))
}

/// Register a card
#[utoipa::path(
    post,
    path = "/cards",
    tag = "cards",
    request_body = NewCard,
    responses(
        (status = 201, description = "Card registered, payload is the new card id", body = i32),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Card already exists")
    )
)]
pub async fn create_card(
    State(state): State<crate::AppState>,
    AppJson(card): AppJson<NewCard>,
) -> AppResult<(StatusCode, Json<ApiResponse<i32>>)> {
    let id = state.services.cards.register_card(card).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(id, "Card created successfully"),
    ))
}

/// Modify a card
#[utoipa::path(
    put,
    path = "/cards/{id}",
    tag = "cards",
    params(
        ("id" = i32, Path, description = "Card ID")
    ),
    request_body = NewCard,
    responses(
        (status = 200, description = "Card modified"),
        (status = 404, description = "Card not found"),
        (status = 409, description = "Another card has the same identity")
    )
)]
pub async fn update_card(
    State(state): State<crate::AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(card): AppJson<NewCard>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.cards.modify_card(id, card).await?;
    Ok(ApiResponse::message("Card modified successfully"))
}

/// Remove a card
#[utoipa::path(
    delete,
    path = "/cards/{id}",
    tag = "cards",
    params(
        ("id" = i32, Path, description = "Card ID")
    ),
    responses(
        (status = 200, description = "Card removed"),
        (status = 404, description = "Card not found"),
        (status = 409, description = "Card still holds books")
    )
)]
pub async fn delete_card(
    State(state): State<crate::AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.cards.remove_card(id).await?;
    Ok(ApiResponse::message("Card deleted successfully"))
}

/// Borrow history of a card
#[utoipa::path(
    get,
    path = "/cards/{id}/borrows",
    tag = "cards",
    params(
        ("id" = i32, Path, description = "Card ID")
    ),
    responses(
        (status = 200, description = "Borrow records, newest first", body = BorrowHistories)
    )
)]
pub async fn card_borrows(
    State(state): State<crate::AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<ApiResponse<BorrowHistories>>> {
    let history = state.services.loans.borrow_history(id).await?;
    Ok(ApiResponse::payload(history))
}
