mod category_repo;
mod tag_repo;
mod transaction_repo;
mod user_repo;
mod wallet_repo;

use crate::{HealthCheck, Repos};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use tracing::instrument;

pub struct SQLxRepo {
    pool: Pool<Postgres>,
}

impl SQLxRepo {
    pub fn new(pool: Pool<Postgres>) -> SQLxRepo {
        SQLxRepo { pool }
    }
}

#[async_trait]
impl HealthCheck for SQLxRepo {
    #[instrument(skip(self))]
    async fn check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

pub async fn create_repos(
    database_url: String,
    max_pool_size: u32,
) -> Result<Repos, anyhow::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_pool_size)
        .connect(&database_url)
        .await
        .context("Unable to connect to database")?;

    let repo = Arc::new(SQLxRepo::new(pool));
    Ok(Repos {
        user_repo: repo.clone(),
        wallet_repo: repo.clone(),
        transaction_repo: repo.clone(),
        category_repo: repo.clone(),
        tag_repo: repo.clone(),
        health_check: repo,
    })
}
