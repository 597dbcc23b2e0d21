//! Borrower card service

use sqlx::PgConnection;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::card::{CardList, NewCard},
    repository::{borrows, cards, Repository},
};

#[derive(Clone)]
pub struct CardsService {
    repository: Repository,
}

impl CardsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a card and return its id
    pub async fn register_card(&self, card: NewCard) -> AppResult<i32> {
        card.validate()?;

        let mut uow = self.repository.begin("register_card").await?;
        let result = register(uow.conn(), &card).await;
        let card_id = uow.finish(result).await?;

        tracing::info!(card_id, card_type = %card.card_type, "Card registered");
        Ok(card_id)
    }

    pub async fn modify_card(&self, card_id: i32, card: NewCard) -> AppResult<()> {
        card.validate()?;

        let mut uow = self.repository.begin("modify_card").await?;
        let result = modify(uow.conn(), card_id, &card).await;
        uow.finish(result).await?;

        tracing::info!(card_id, "Card modified");
        Ok(())
    }

    /// Remove a card that holds no book
    pub async fn remove_card(&self, card_id: i32) -> AppResult<()> {
        let mut uow = self.repository.begin("remove_card").await?;
        let result = remove(uow.conn(), card_id).await;
        uow.finish(result).await?;

        tracing::info!(card_id, "Card removed");
        Ok(())
    }

    /// All cards ordered by id
    pub async fn show_cards(&self) -> AppResult<CardList> {
        let mut uow = self.repository.begin("show_cards").await?;
        let result = cards::list(uow.conn()).await;
        let all = uow.finish(result).await?;

        Ok(CardList::from(all))
    }
}

async fn register(conn: &mut PgConnection, card: &NewCard) -> AppResult<i32> {
    if cards::key_exists(conn, card, None).await? {
        return Err(AppError::Conflict(
            "Card to be registered already exists".to_string(),
        ));
    }

    cards::insert(conn, card).await
}

async fn modify(conn: &mut PgConnection, card_id: i32, card: &NewCard) -> AppResult<()> {
    if !cards::lock(conn, card_id).await? {
        return Err(AppError::NotFound(format!("Card with id {} not found", card_id)));
    }
    if cards::key_exists(conn, card, Some(card_id)).await? {
        return Err(AppError::Conflict(
            "Another card already has this name, department and type".to_string(),
        ));
    }
    if cards::update(conn, card_id, card).await? == 0 {
        return Err(AppError::NotFound(format!("Card with id {} not found", card_id)));
    }

    Ok(())
}

async fn remove(conn: &mut PgConnection, card_id: i32) -> AppResult<()> {
    // Lock first so no borrow can start between the check and the delete
    let found = cards::lock(conn, card_id).await?;

    if borrows::card_has_outstanding(conn, card_id).await? {
        return Err(AppError::Conflict(
            "Card to be removed has not returned books".to_string(),
        ));
    }
    if !found || cards::delete(conn, card_id).await? == 0 {
        return Err(AppError::NotFound(format!("Card with id {} not found", card_id)));
    }

    Ok(())
}
