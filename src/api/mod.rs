//! API handlers for the library REST endpoints

pub mod admin;
pub mod books;
pub mod borrows;
pub mod cards;
pub mod health;
pub mod openapi;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// Success envelope. Failures use [`crate::error::ErrorResponse`], which has `ok: false`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn payload(payload: T) -> Json<Self> {
        Json(Self {
            ok: true,
            payload: Some(payload),
            message: None,
        })
    }

    pub fn with_message(payload: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            ok: true,
            payload: Some(payload),
            message: Some(message.into()),
        })
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            ok: true,
            payload: None,
            message: Some(message.into()),
        })
    }
}

/// JSON body extractor whose rejections use the error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path extractor whose rejections use the error envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string extractor whose rejections use the error envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/batch", post(books::create_books_batch))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/stock", post(books::adjust_stock))
        // Cards
        .route("/cards", get(cards::list_cards).post(cards::create_card))
        .route(
            "/cards/:id",
            put(cards::update_card).delete(cards::delete_card),
        )
        .route("/cards/:id/borrows", get(cards::card_borrows))
        // Borrows
        .route("/borrows", post(borrows::borrow_book))
        .route("/borrows/return", post(borrows::return_book));

    if state.config.admin.allow_reset {
        tracing::warn!("POST /api/v1/admin/reset is enabled");
        api_v1 = api_v1.route("/admin/reset", post(admin::reset_database));
    }

    Router::new()
        .nest("/api/v1", api_v1.with_state(state))
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
