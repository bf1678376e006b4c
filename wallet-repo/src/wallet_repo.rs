use crate::page::{PageOptions, Paginated};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[async_trait]
pub trait WalletRepo: Sync + Send {
    async fn get_wallet(&self, wallet_id: i32) -> Result<Wallet, WalletRepoError>;

    async fn get_wallets(
        &self,
        page_options: Option<PageOptions>,
    ) -> Result<Paginated<Wallet>, WalletRepoError>;

    async fn create_wallet(&self, new_wallet: NewWallet) -> Result<Wallet, WalletRepoError>;

    async fn update_wallet(
        &self,
        wallet_id: i32,
        updated_wallet: NewWallet,
    ) -> Result<Wallet, WalletRepoError>;

    /// Deletes a wallet that has no transactions left.
    async fn delete_wallet(&self, wallet_id: i32) -> Result<Wallet, WalletRepoError>;

    async fn get_balance(&self, wallet_id: i32) -> Result<Decimal, WalletRepoError>;
}

#[derive(Error, Debug)]
pub enum WalletRepoError {
    #[error("Wallet with id {0} not found")]
    WalletNotFound(i32),
    #[error("Wallet with id {0} still has transactions")]
    WalletNotEmpty(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Wallet {
    pub id: i32,
    pub wallet_type: String,
    pub title: String,
    pub balance: Decimal,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewWallet {
    pub wallet_type: String,
    pub title: String,
}

impl NewWallet {
    pub fn new(wallet_type: String, title: String) -> NewWallet {
        NewWallet { wallet_type, title }
    }

    pub fn to_wallet(self, id: i32, balance: Decimal) -> Wallet {
        Wallet {
            id,
            wallet_type: self.wallet_type,
            title: self.title,
            balance,
        }
    }
}
