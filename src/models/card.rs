//! Borrower card model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Card holder category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CardType {
    #[serde(alias = "S", alias = "student")]
    Student,
    #[serde(alias = "T", alias = "teacher")]
    Teacher,
}

impl CardType {
    /// Single-character code stored in the `card.type` column
    pub fn as_code(&self) -> &'static str {
        match self {
            CardType::Student => "S",
            CardType::Teacher => "T",
        }
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CardType::Student => "Student",
            CardType::Teacher => "Teacher",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for CardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "student" => Ok(CardType::Student),
            "t" | "teacher" => Ok(CardType::Teacher),
            _ => Err(format!("Invalid card type: {}", s)),
        }
    }
}

/// Raw card row; `type` is the stored single-character code
#[derive(Debug, FromRow)]
pub struct CardRow {
    card_id: i32,
    name: String,
    department: String,
    #[sqlx(rename = "type")]
    card_type: String,
}

impl TryFrom<CardRow> for Card {
    type Error = AppError;

    fn try_from(row: CardRow) -> Result<Self, Self::Error> {
        let card_type = row.card_type.parse().map_err(|e| {
            AppError::Internal(format!("Card {} has a corrupt type: {}", row.card_id, e))
        })?;

        Ok(Card {
            card_id: row.card_id,
            name: row.name,
            department: row.department,
            card_type,
        })
    }
}

/// Borrower card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Card {
    pub card_id: i32,
    pub name: String,
    pub department: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
}

/// Register / modify card request. `(name, department, type)` identifies a card.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewCard {
    #[validate(length(min = 1, max = 63, message = "Name must be 1 to 63 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 63, message = "Department must be 1 to 63 characters"))]
    pub department: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
}

/// All registered cards
#[derive(Debug, Serialize, ToSchema)]
pub struct CardList {
    pub count: usize,
    pub cards: Vec<Card>,
}

impl From<Vec<Card>> for CardList {
    fn from(cards: Vec<Card>) -> Self {
        Self {
            count: cards.len(),
            cards,
        }
    }
}
