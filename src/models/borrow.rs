//! Borrow record model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// `return_time` value of a borrow that has not been returned yet
pub const OUTSTANDING: i64 = 0;

/// Borrow record from database. Times are Unix epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrow {
    pub card_id: i32,
    pub book_id: i32,
    pub borrow_time: i64,
    pub return_time: i64,
}

/// Borrow a book
#[derive(Debug, Clone)]
pub struct NewBorrow {
    pub card_id: i32,
    pub book_id: i32,
    pub borrow_time: i64,
}

/// Return a borrowed book
#[derive(Debug, Clone)]
pub struct BookReturn {
    pub card_id: i32,
    pub book_id: i32,
    pub return_time: i64,
}

/// One line of a card's borrow history, joined with the book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowHistoryItem {
    pub card_id: i32,
    pub book_id: i32,
    pub category: String,
    pub title: String,
    pub press: String,
    pub publish_year: i32,
    pub author: String,
    pub price: f64,
    pub borrow_time: i64,
    /// 0 while the book is still out
    pub return_time: i64,
}

/// Borrow history of one card
#[derive(Debug, Serialize, ToSchema)]
pub struct BorrowHistories {
    pub count: usize,
    pub items: Vec<BorrowHistoryItem>,
}

impl From<Vec<BorrowHistoryItem>> for BorrowHistories {
    fn from(items: Vec<BorrowHistoryItem>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}
