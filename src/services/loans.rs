//! Borrow / return service

use sqlx::PgConnection;

use crate::{
    error::{AppError, AppResult},
    models::borrow::{BookReturn, BorrowHistories, NewBorrow},
    repository::{books, borrows, cards, Repository},
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Lend one copy of a book to a card
    pub async fn borrow_book(&self, borrow: NewBorrow) -> AppResult<()> {
        if borrow.borrow_time <= 0 {
            return Err(AppError::Validation(
                "Borrow time must be a positive epoch timestamp".to_string(),
            ));
        }

        let mut uow = self.repository.begin("borrow_book").await?;
        let result = lend(uow.conn(), &borrow).await;
        let stock = uow.finish(result).await?;

        tracing::info!(
            card_id = borrow.card_id,
            book_id = borrow.book_id,
            stock,
            "Book borrowed"
        );
        Ok(())
    }

    /// Close the outstanding borrow of `(card, book)`
    pub async fn return_book(&self, book_return: BookReturn) -> AppResult<()> {
        let mut uow = self.repository.begin("return_book").await?;
        let result = take_back(uow.conn(), &book_return).await;
        let stock = uow.finish(result).await?;

        tracing::info!(
            card_id = book_return.card_id,
            book_id = book_return.book_id,
            stock,
            "Book returned"
        );
        Ok(())
    }

    /// Every borrow of a card, newest first
    pub async fn borrow_history(&self, card_id: i32) -> AppResult<BorrowHistories> {
        let mut uow = self.repository.begin("show_borrow_history").await?;
        let result = borrows::history(uow.conn(), card_id).await;
        let items = uow.finish(result).await?;

        Ok(BorrowHistories::from(items))
    }
}

/// Returns the stock left after the borrow
async fn lend(conn: &mut PgConnection, borrow: &NewBorrow) -> AppResult<i32> {
    if borrows::is_outstanding(conn, borrow.card_id, borrow.book_id).await? {
        return Err(AppError::Conflict(
            "Book to be borrowed has not been returned".to_string(),
        ));
    }

    // Row lock serializes concurrent borrows of the same book
    let stock = books::lock_stock(conn, borrow.book_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Book with id {} does not exist", borrow.book_id))
        })?;

    if !cards::lock_shared(conn, borrow.card_id).await? {
        return Err(AppError::NotFound(format!(
            "Card with id {} does not exist",
            borrow.card_id
        )));
    }
    if stock <= 0 {
        return Err(AppError::InvalidState("Stock is not enough".to_string()));
    }

    borrows::insert(conn, borrow).await?;
    books::add_stock(conn, borrow.book_id, -1).await
}

/// Returns the stock after the copy is back
async fn take_back(conn: &mut PgConnection, book_return: &BookReturn) -> AppResult<i32> {
    let borrow = borrows::find_outstanding_for_update(conn, book_return.card_id, book_return.book_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Book to be returned has not been borrowed".to_string())
        })?;

    if book_return.return_time <= borrow.borrow_time {
        return Err(AppError::InvalidState(format!(
            "Return time {} is not after borrow time {}",
            book_return.return_time, borrow.borrow_time
        )));
    }
    if borrows::mark_returned(conn, &borrow, book_return.return_time).await? == 0 {
        return Err(AppError::NotFound(
            "Book to be returned has not been borrowed".to_string(),
        ));
    }

    books::add_stock(conn, book_return.book_id, 1).await
}
