pub mod generator;
pub mod test_user;

use rust_decimal::Decimal;
use std::env;
use tracing::info;
use wallet_repo::category_repo::NewCategory;
use wallet_repo::transaction_repo::{NewTransaction, Transaction};
use wallet_repo::wallet_repo::{NewWallet, Wallet};
use wallet_repo::Repos;

#[derive(Debug)]
pub enum RepoType {
    SQLx,
    Mem,
}

/// Builds the repos of the given store. The SQLx store needs a migrated database at
/// `DATABASE_URL`; without it the SQLx cases are skipped.
pub async fn build_repos(repo_type: RepoType) -> Option<Repos> {
    match repo_type {
        RepoType::SQLx => {
            let Ok(database_url) = env::var("DATABASE_URL") else {
                info!("DATABASE_URL not set, skipping");
                return None;
            };
            Some(
                wallet_repo::sqlx_repo::create_repos(database_url, 1)
                    .await
                    .unwrap(),
            )
        }
        RepoType::Mem => Some(wallet_repo::mem_repo::create_repos()),
    }
}

#[allow(dead_code)]
pub async fn create_wallet(repos: &Repos) -> Wallet {
    repos
        .wallet_repo
        .create_wallet(NewWallet::new("cash".to_owned(), "Test wallet".to_owned()))
        .await
        .unwrap()
}

#[allow(dead_code)]
pub async fn create_category(repos: &Repos, title: &str) -> i32 {
    repos
        .category_repo
        .create_category(NewCategory::new(title.to_owned()))
        .await
        .unwrap()
        .id
}

#[allow(dead_code)]
pub async fn deposit(repos: &Repos, wallet_id: i32, category_id: i32, amount: i64) -> Transaction {
    repos
        .transaction_repo
        .create_transaction(NewTransaction::new(
            "Deposit".to_owned(),
            Decimal::from(amount),
            category_id,
            wallet_id,
            Default::default(),
        ))
        .await
        .unwrap()
}
