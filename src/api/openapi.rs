//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, books, borrows, cards, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library API",
        version = "1.0.0",
        description = "Book, card and borrow management REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::create_books_batch,
        books::update_book,
        books::delete_book,
        books::adjust_stock,
        // Cards
        cards::list_cards,
        cards::create_card,
        cards::update_card,
        cards::delete_card,
        cards::card_borrows,
        // Borrows
        borrows::borrow_book,
        borrows::return_book,
        // Admin
        admin::reset_database,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::NewBook,
            crate::models::book::UpdateBook,
            crate::models::book::StockDelta,
            crate::models::book::SortColumn,
            crate::models::book::SortOrder,
            crate::models::book::BookQueryParams,
            crate::models::book::BookQueryResults,
            books::BatchBooksRequest,
            books::StockLevel,
            // Cards
            crate::models::card::Card,
            crate::models::card::CardType,
            crate::models::card::NewCard,
            crate::models::card::CardList,
            // Borrows
            crate::models::borrow::Borrow,
            crate::models::borrow::BorrowHistoryItem,
            crate::models::borrow::BorrowHistories,
            borrows::BorrowRequest,
            borrows::ReturnRequest,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog and stock"),
        (name = "cards", description = "Borrower cards"),
        (name = "borrows", description = "Borrowing and returning books"),
        (name = "admin", description = "Database administration")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
