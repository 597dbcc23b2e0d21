//! Business logic services
//!
//! Every public operation runs in exactly one [`crate::repository::UnitOfWork`].

pub mod admin;
pub mod cards;
pub mod catalog;
pub mod loans;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub cards: cards::CardsService,
    pub loans: loans::LoansService,
    pub admin: admin::AdminService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            cards: cards::CardsService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone()),
            admin: admin::AdminService::new(repository),
        }
    }
}
