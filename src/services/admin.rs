//! Database administration service

use crate::{
    error::AppResult,
    repository::{schema, Repository},
};

#[derive(Clone)]
pub struct AdminService {
    repository: Repository,
}

impl AdminService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Drop and recreate every library table in one transaction
    pub async fn reset_database(&self) -> AppResult<()> {
        let mut uow = self.repository.begin("reset_database").await?;
        let result = schema::reset(uow.conn()).await;
        uow.finish(result).await?;

        tracing::warn!("Library database reset");
        Ok(())
    }

    /// Check database connectivity
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
