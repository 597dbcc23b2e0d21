//! Data models for the library server

pub mod book;
pub mod borrow;
pub mod card;

// Re-export commonly used types
pub use book::{Book, BookQueryConditions, BookQueryResults, NewBook, SortColumn, SortOrder, UpdateBook};
pub use borrow::{BookReturn, Borrow, BorrowHistories, BorrowHistoryItem, NewBorrow};
pub use card::{Card, CardList, CardType, NewCard};
