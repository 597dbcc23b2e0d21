//! Book catalog service: storage, stock and queries

use sqlx::PgConnection;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQueryConditions, BookQueryResults, NewBook, UpdateBook},
    repository::{books, borrows, Repository},
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Store a new book and return its id
    pub async fn store_book(&self, book: NewBook) -> AppResult<i32> {
        book.validate()?;

        let mut uow = self.repository.begin("store_book").await?;
        let result = store_unique(uow.conn(), &book).await;
        let book_id = uow.finish(result).await?;

        tracing::info!(book_id, title = %book.title, "Book stored");
        Ok(book_id)
    }

    /// Store several books atomically; one duplicate rejects the whole batch.
    /// Ids are returned in input order.
    pub async fn store_books(&self, books: Vec<NewBook>) -> AppResult<Vec<i32>> {
        for (idx, book) in books.iter().enumerate() {
            book.validate()
                .map_err(|e| AppError::Validation(format!("Book #{}: {}", idx + 1, e)))?;
        }

        let mut uow = self.repository.begin("store_books").await?;
        let result = store_batch(uow.conn(), &books).await;
        let ids = uow.finish(result).await?;

        tracing::info!(count = ids.len(), "Books stored");
        Ok(ids)
    }

    /// Add `delta` (possibly negative) to a book's stock; returns the new stock
    pub async fn inc_book_stock(&self, book_id: i32, delta: i32) -> AppResult<i32> {
        let mut uow = self.repository.begin("inc_book_stock").await?;
        let result = adjust_stock(uow.conn(), book_id, delta).await;
        let stock = uow.finish(result).await?;

        tracing::info!(book_id, delta, stock, "Book stock updated");
        Ok(stock)
    }

    /// Remove a book that nobody currently holds
    pub async fn remove_book(&self, book_id: i32) -> AppResult<()> {
        let mut uow = self.repository.begin("remove_book").await?;
        let result = remove(uow.conn(), book_id).await;
        uow.finish(result).await?;

        tracing::info!(book_id, "Book removed");
        Ok(())
    }

    /// Overwrite the descriptive fields of a book. Stock is left untouched.
    pub async fn modify_book_info(&self, book_id: i32, book: UpdateBook) -> AppResult<Book> {
        book.validate()?;

        let mut uow = self.repository.begin("modify_book_info").await?;
        let result = modify(uow.conn(), book_id, &book).await;
        let updated = uow.finish(result).await?;

        tracing::info!(book_id, "Book modified");
        Ok(updated)
    }

    /// Get book by ID
    pub async fn get_book(&self, book_id: i32) -> AppResult<Book> {
        let mut uow = self.repository.begin("get_book").await?;
        let result = books::find_by_id(uow.conn(), book_id)
            .await
            .and_then(|book| {
                book.ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))
            });
        uow.finish(result).await
    }

    /// Books matching the conditions plus their count
    pub async fn query_books(&self, conditions: &BookQueryConditions) -> AppResult<BookQueryResults> {
        let mut uow = self.repository.begin("query_book").await?;
        let result = books::query(uow.conn(), conditions).await;
        let found = uow.finish(result).await?;

        Ok(BookQueryResults::from(found))
    }
}

async fn store_unique(conn: &mut PgConnection, book: &NewBook) -> AppResult<i32> {
    if books::key_exists(conn, book.into(), None).await? {
        return Err(AppError::Conflict("Book to be stored already exists".to_string()));
    }

    books::insert(conn, book).await
}

async fn store_batch(conn: &mut PgConnection, batch: &[NewBook]) -> AppResult<Vec<i32>> {
    let mut ids = Vec::with_capacity(batch.len());

    for (idx, book) in batch.iter().enumerate() {
        // Earlier rows of the batch are visible here, so in-batch duplicates are caught too
        if books::key_exists(conn, book.into(), None).await? {
            return Err(AppError::Conflict(format!(
                "Book #{} ({}) already exists",
                idx + 1,
                book.title
            )));
        }
        ids.push(books::insert(conn, book).await?);
    }

    Ok(ids)
}

async fn adjust_stock(conn: &mut PgConnection, book_id: i32, delta: i32) -> AppResult<i32> {
    let stock = books::lock_stock(conn, book_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

    match stock.checked_add(delta) {
        Some(new_stock) if new_stock >= 0 => books::add_stock(conn, book_id, delta).await,
        Some(_) => Err(AppError::InvalidState(format!(
            "Stock is not enough: {} in stock, change of {}",
            stock, delta
        ))),
        None => Err(AppError::Validation(format!("Stock change {} is out of range", delta))),
    }
}

async fn remove(conn: &mut PgConnection, book_id: i32) -> AppResult<()> {
    // Lock first so no borrow can start between the check and the delete
    let found = books::lock_stock(conn, book_id).await?.is_some();

    if borrows::book_has_outstanding(conn, book_id).await? {
        return Err(AppError::Conflict(
            "Book to be removed has not been returned".to_string(),
        ));
    }
    if !found || books::delete(conn, book_id).await? == 0 {
        return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
    }

    Ok(())
}

async fn modify(conn: &mut PgConnection, book_id: i32, book: &UpdateBook) -> AppResult<Book> {
    if books::find_by_id(conn, book_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
    }
    if books::key_exists(conn, book.into(), Some(book_id)).await? {
        return Err(AppError::Conflict(
            "Another book already has this category, title, press, year and author".to_string(),
        ));
    }
    if books::update_info(conn, book_id, book).await? == 0 {
        return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
    }

    books::find_by_id(conn, book_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))
}
