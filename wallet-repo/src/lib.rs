use async_trait::async_trait;
use std::sync::Arc;

pub mod balance;
pub mod category_repo;
pub mod page;
pub mod tag_repo;
pub mod transaction_repo;
pub mod user_repo;
pub mod wallet_repo;

// implementation modules
pub mod mem_repo;
pub mod sqlx_repo;

use category_repo::CategoryRepo;
use tag_repo::TagRepo;
use transaction_repo::TransactionRepo;
use user_repo::UserRepo;
use wallet_repo::WalletRepo;

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> bool;
}

/// Handles to every repository of one store. All handles point at the same backing state.
#[derive(Clone)]
pub struct Repos {
    pub user_repo: Arc<dyn UserRepo>,
    pub wallet_repo: Arc<dyn WalletRepo>,
    pub transaction_repo: Arc<dyn TransactionRepo>,
    pub category_repo: Arc<dyn CategoryRepo>,
    pub tag_repo: Arc<dyn TagRepo>,
    pub health_check: Arc<dyn HealthCheck>,
}
