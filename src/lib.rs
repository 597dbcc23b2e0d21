//! Library Management Server
//!
//! Books, borrower cards and borrow records kept in PostgreSQL, exposed as a
//! REST JSON API. Every operation that changes more than one row runs in a
//! single database transaction.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
