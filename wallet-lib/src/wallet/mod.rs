mod handlers;

use crate::pagination::Page;
use actix_web::{web, Scope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wallet_repo::transaction_repo::Transaction;
use wallet_repo::wallet_repo::Wallet;

/// A wallet with one page of its transactions, newest first.
#[derive(Serialize, Deserialize, Debug)]
pub struct WalletDetail {
    pub wallet: Wallet,
    pub transactions: Page<Transaction>,
}

/// Limits the transactions listed with a wallet to those created in `[from, until]`.
#[derive(Deserialize, Debug, Default)]
pub struct PeriodQuery {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

pub fn wallet_service() -> Scope {
    web::scope("/wallet")
        .service(handlers::get_wallets)
        .service(handlers::create_wallet)
        .service(handlers::get_wallet)
        .service(handlers::update_wallet)
        .service(handlers::delete_wallet)
}
