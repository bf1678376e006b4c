mod handlers;

use actix_web::{web, Scope};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use wallet_repo::transaction_repo::{Filter, NewTransaction};

/// Body of transaction writes. The wallet may instead come from the request path, or on update
/// from the transaction being edited.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TransactionRequest {
    pub title: String,
    pub amount: Decimal,
    pub category_id: i32,
    #[serde(default)]
    pub wallet_id: Option<i32>,
    #[serde(default)]
    pub tags: BTreeSet<i32>,
}

impl TransactionRequest {
    pub fn new(title: &str, amount: Decimal, category_id: i32, wallet_id: Option<i32>) -> Self {
        TransactionRequest {
            title: title.to_owned(),
            amount,
            category_id,
            wallet_id,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_tags(mut self, tags: BTreeSet<i32>) -> Self {
        self.tags = tags;
        self
    }

    fn into_new_transaction(self, wallet_id: i32) -> NewTransaction {
        NewTransaction::new(
            self.title,
            self.amount,
            self.category_id,
            wallet_id,
            self.tags,
        )
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct TransactionQuery {
    pub wallet_id: Option<i32>,
    pub category_id: Option<i32>,
    pub tag_id: Option<i32>,
}

impl From<TransactionQuery> for Filter {
    fn from(query: TransactionQuery) -> Self {
        Filter {
            wallet_id: query.wallet_id,
            category_id: query.category_id,
            tag_id: query.tag_id,
            ..Filter::NONE
        }
    }
}

pub fn transaction_service() -> Scope {
    web::scope("/transaction")
        .service(handlers::get_transactions)
        .service(handlers::create_transaction)
        .service(handlers::create_wallet_transaction)
        .service(handlers::get_transaction)
        .service(handlers::update_transaction)
        .service(handlers::delete_transaction)
}
