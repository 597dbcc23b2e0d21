//! Book model, query conditions and sort enumerations

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub book_id: i32,
    pub category: String,
    pub title: String,
    pub press: String,
    pub publish_year: i32,
    pub author: String,
    pub price: f64,
    /// Copies currently on the shelf
    pub stock: i32,
}

/// Create book request. `(category, title, press, publish_year, author)` identifies a book.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewBook {
    #[validate(length(min = 1, max = 63, message = "Category must be 1 to 63 characters"))]
    pub category: String,
    #[validate(length(min = 1, max = 63, message = "Title must be 1 to 63 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 63, message = "Press must be 1 to 63 characters"))]
    pub press: String,
    pub publish_year: i32,
    #[validate(length(min = 1, max = 63, message = "Author must be 1 to 63 characters"))]
    pub author: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[serde(default)]
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
}

/// Update book request. Stock only moves through stock adjustments and borrow/return.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 63, message = "Category must be 1 to 63 characters"))]
    pub category: String,
    #[validate(length(min = 1, max = 63, message = "Title must be 1 to 63 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 63, message = "Press must be 1 to 63 characters"))]
    pub press: String,
    pub publish_year: i32,
    #[validate(length(min = 1, max = 63, message = "Author must be 1 to 63 characters"))]
    pub author: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
}

/// Stock adjustment request
#[derive(Debug, Deserialize, ToSchema)]
pub struct StockDelta {
    /// Signed number of copies to add
    pub delta: i32,
}

/// Column a book query is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    BookId,
    Category,
    Title,
    Press,
    PublishYear,
    Author,
    Price,
    Stock,
}

impl SortColumn {
    /// SQL column name; the only way a caller-chosen identifier reaches the query text
    pub fn column(&self) -> &'static str {
        match self {
            SortColumn::BookId => "book_id",
            SortColumn::Category => "category",
            SortColumn::Title => "title",
            SortColumn::Press => "press",
            SortColumn::PublishYear => "publish_year",
            SortColumn::Author => "author",
            SortColumn::Price => "price",
            SortColumn::Stock => "stock",
        }
    }

    /// Parse a sort column name; `None` for anything outside the enumeration
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "bookid" | "id" => Some(SortColumn::BookId),
            "category" => Some(SortColumn::Category),
            "title" => Some(SortColumn::Title),
            "press" => Some(SortColumn::Press),
            "publishyear" => Some(SortColumn::PublishYear),
            "author" => Some(SortColumn::Author),
            "price" => Some(SortColumn::Price),
            "stock" => Some(SortColumn::Stock),
            _ => None,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl From<&str> for SortOrder {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

/// Book query parameters as they arrive on the wire
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQueryParams {
    /// Exact category
    pub category: Option<String>,
    /// Substring of the title (case-sensitive)
    pub title: Option<String>,
    /// Substring of the press (case-sensitive)
    pub press: Option<String>,
    /// Substring of the author (case-sensitive)
    pub author: Option<String>,
    pub min_publish_year: Option<i32>,
    pub max_publish_year: Option<i32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// book_id, category, title, press, publish_year, author, price or stock
    pub sort_by: Option<String>,
    /// ASC or DESC
    pub sort_order: Option<String>,
}

/// Typed book query conditions. Every `Some` field becomes one ANDed predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookQueryConditions {
    pub category: Option<String>,
    pub title: Option<String>,
    pub press: Option<String>,
    pub min_publish_year: Option<i32>,
    pub max_publish_year: Option<i32>,
    pub author: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_by: SortColumn,
    pub sort_order: SortOrder,
}

impl From<BookQueryParams> for BookQueryConditions {
    fn from(params: BookQueryParams) -> Self {
        // An unknown sort column falls back to book_id ASC, ignoring the requested order
        let (sort_by, sort_order) = match params.sort_by.as_deref().map(SortColumn::parse) {
            Some(Some(column)) => (
                column,
                params
                    .sort_order
                    .as_deref()
                    .map(SortOrder::from)
                    .unwrap_or_default(),
            ),
            _ => (SortColumn::BookId, SortOrder::Asc),
        };

        Self {
            category: params.category,
            title: params.title,
            press: params.press,
            min_publish_year: params.min_publish_year,
            max_publish_year: params.max_publish_year,
            author: params.author,
            min_price: params.min_price,
            max_price: params.max_price,
            sort_by,
            sort_order,
        }
    }
}

/// Result of a book query
#[derive(Debug, Serialize, ToSchema)]
pub struct BookQueryResults {
    pub count: usize,
    pub results: Vec<Book>,
}

impl From<Vec<Book>> for BookQueryResults {
    fn from(results: Vec<Book>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}
