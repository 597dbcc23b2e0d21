//! Book (catalog) endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{
        Book, BookQueryConditions, BookQueryParams, BookQueryResults, NewBook, StockDelta,
        UpdateBook,
    },
};

use super::{ApiResponse, AppJson, AppPath, AppQuery};

/// Batch store request
#[derive(Deserialize, ToSchema)]
pub struct BatchBooksRequest {
    pub books: Vec<NewBook>,
}

/// Stock after an adjustment
#[derive(Serialize, ToSchema)]
pub struct StockLevel {
    pub book_id: i32,
    pub stock: i32,
}

/// Query books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQueryParams),
    responses(
        (status = 200, description = "Matching books and their count", body = BookQueryResults)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AppQuery(params): AppQuery<BookQueryParams>,
) -> AppResult<Json<ApiResponse<BookQueryResults>>> {
    let conditions = BookQueryConditions::from(params);
    let results = state.services.catalog.query_books(&conditions).await?;
    Ok(ApiResponse::payload(results))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(ApiResponse::payload(book))
}

/// Store a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = NewBook,
    responses(
        (status = 201, description = "Book stored, payload is the new book id", body = i32),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Book already exists")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AppJson(book): AppJson<NewBook>,
) -> AppResult<(StatusCode, Json<ApiResponse<i32>>)> {
    let id = state.services.catalog.store_book(book).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(id, "Book created successfully"),
    ))
}

/// Store several books atomically
#[utoipa::path(
    post,
    path = "/books/batch",
    tag = "books",
    request_body = BatchBooksRequest,
    responses(
        (status = 201, description = "Books stored, payload is the new ids in input order", body = Vec<i32>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "One of the books already exists, nothing stored")
    )
)]
pub async fn create_books_batch(
    State(state): State<crate::AppState>,
    AppJson(request): AppJson<BatchBooksRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<i32>>>)> {
    let ids = state.services.catalog.store_books(request.books).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(ids, "Books created successfully"),
    ))
}

/// Modify book information (stock excluded)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book modified", body = Book),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Another book has the same identity")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(book): AppJson<UpdateBook>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let updated = state.services.catalog.modify_book_info(id, book).await?;
    Ok(ApiResponse::with_message(updated, "Book modified successfully"))
}

/// Remove a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book removed"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book is still borrowed")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.catalog.remove_book(id).await?;
    Ok(ApiResponse::message("Book removed successfully"))
}

/// Adjust the stock of a book
#[utoipa::path(
    post,
    path = "/books/{id}/stock",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = StockDelta,
    responses(
        (status = 200, description = "Stock updated", body = StockLevel),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Stock would become negative")
    )
)]
pub async fn adjust_stock(
    State(state): State<crate::AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(request): AppJson<StockDelta>,
) -> AppResult<Json<ApiResponse<StockLevel>>> {
    let stock = state.services.catalog.inc_book_stock(id, request.delta).await?;
    Ok(ApiResponse::with_message(
        StockLevel { book_id: id, stock },
        format!("Book stock modified successfully, the current stock is {}", stock),
    ))
}
