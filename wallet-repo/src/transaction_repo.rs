use crate::balance::{BalanceError, InsufficientFunds, InvalidAmount};
use crate::page::{PageOptions, Paginated};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Default, Clone, Debug)]
pub struct Filter {
    pub wallet_id: Option<i32>,
    pub category_id: Option<i32>,
    pub tag_id: Option<i32>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl Filter {
    pub const NONE: Filter = Filter {
        wallet_id: None,
        category_id: None,
        tag_id: None,
        from: None,
        until: None,
    };

    pub fn wallet(wallet_id: i32) -> Filter {
        Filter {
            wallet_id: Some(wallet_id),
            ..Filter::NONE
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.wallet_id.map_or(true, |id| transaction.wallet_id == id)
            && self
                .category_id
                .map_or(true, |id| transaction.category_id == id)
            && self.tag_id.map_or(true, |id| transaction.tags.contains(&id))
            && self.from.map_or(true, |from| transaction.created_at >= from)
            && self
                .until
                .map_or(true, |until| transaction.created_at <= until)
    }
}

/// Transaction writes validate the wallet, category and tags they reference and refuse to
/// overdraw a wallet. See [crate::balance].
#[async_trait]
pub trait TransactionRepo: Sync + Send {
    async fn get_transaction(&self, transaction_id: i32)
        -> Result<Transaction, TransactionRepoError>;

    /// Transactions matching `filter`, newest first.
    async fn get_transactions(
        &self,
        filter: Filter,
        page_options: Option<PageOptions>,
    ) -> Result<Paginated<Transaction>, TransactionRepoError>;

    async fn create_transaction(
        &self,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn update_transaction(
        &self,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn delete_transaction(&self, transaction_id: i32)
        -> Result<Transaction, TransactionRepoError>;
}

#[derive(Error, Debug)]
pub enum TransactionRepoError {
    #[error("Transaction with id {0} not found")]
    TransactionNotFound(i32),
    #[error("Wallet with id {0} not found")]
    WalletNotFound(i32),
    #[error("Category with id {0} not found")]
    CategoryNotFound(i32),
    #[error("Tag with id {0} not found")]
    TagNotFound(i32),
    #[error(transparent)]
    InsufficientFunds(#[from] InsufficientFunds),
    #[error("Balance of wallet {0} would leave the supported range")]
    BalanceOutOfRange(i32),
    #[error(transparent)]
    InvalidAmount(#[from] InvalidAmount),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<BalanceError> for TransactionRepoError {
    fn from(value: BalanceError) -> Self {
        match value {
            BalanceError::InsufficientFunds(e) => TransactionRepoError::InsufficientFunds(e),
            BalanceError::OutOfRange(wallet_id) => TransactionRepoError::BalanceOutOfRange(wallet_id),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Transaction {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub amount: Decimal,
    pub category_id: i32,
    pub wallet_id: i32,
    pub balance_after_transaction: Decimal,
    pub tags: BTreeSet<i32>,
}

impl PartialOrd for Transaction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Transaction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewTransaction {
    pub title: String,
    pub amount: Decimal,
    pub category_id: i32,
    pub wallet_id: i32,
    #[serde(default)]
    pub tags: BTreeSet<i32>,
}

impl NewTransaction {
    pub const fn new(
        title: String,
        amount: Decimal,
        category_id: i32,
        wallet_id: i32,
        tags: BTreeSet<i32>,
    ) -> NewTransaction {
        NewTransaction {
            title,
            amount,
            category_id,
            wallet_id,
            tags,
        }
    }

    pub fn to_transaction(
        self,
        id: i32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        balance_after_transaction: Decimal,
    ) -> Transaction {
        Transaction {
            id,
            created_at,
            updated_at,
            title: self.title,
            amount: self.amount,
            category_id: self.category_id,
            wallet_id: self.wallet_id,
            balance_after_transaction,
            tags: self.tags,
        }
    }
}
