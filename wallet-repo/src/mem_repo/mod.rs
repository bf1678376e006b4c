use crate::category_repo::Category;
use crate::tag_repo::Tag;
use crate::transaction_repo::Transaction;
use crate::user_repo::{User, UserId};
use crate::wallet_repo::NewWallet;
use crate::{HealthCheck, Repos};
use anyhow::anyhow;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod category_repo;
mod tag_repo;
mod transaction_repo;
mod user_repo;
mod wallet_repo;

/// Id generator mirroring a database serial column: ids start at 1 and are never reused.
#[derive(Default)]
struct Sequence(i32);

impl Sequence {
    fn next(&mut self) -> i32 {
        self.0 += 1;
        self.0
    }
}

#[derive(Default)]
struct State {
    users: BTreeMap<UserId, User>,
    wallets: BTreeMap<i32, NewWallet>,
    transactions: HashMap<i32, Transaction>,
    wallet_transactions: HashMap<i32, HashSet<i32>>,
    categories: BTreeMap<i32, Category>,
    tags: BTreeMap<i32, Tag>,
    user_ids: Sequence,
    wallet_ids: Sequence,
    transaction_ids: Sequence,
    category_ids: Sequence,
    tag_ids: Sequence,
}

impl State {
    fn transactions_of(&self, wallet_id: i32) -> impl Iterator<Item = &Transaction> + '_ {
        self.wallet_transactions
            .get(&wallet_id)
            .into_iter()
            .flatten()
            .map(move |id| {
                self.transactions
                    .get(id)
                    .expect("transactions should have all the ids from wallet_transactions")
            })
    }

    fn balance(&self, wallet_id: i32) -> Result<Decimal, anyhow::Error> {
        crate::balance::sum_amounts(self.transactions_of(wallet_id).map(|t| t.amount))
            .ok_or_else(|| anyhow!("Balance of wallet {} overflowed", wallet_id))
    }
}

/// In-memory store. A single lock guards all tables so that multi-table writes, such as a
/// transaction write together with the balance check it depends on, are atomic.
pub struct MemRepo {
    state: RwLock<State>,
}

impl MemRepo {
    pub fn new() -> MemRepo {
        MemRepo {
            state: RwLock::new(State::default()),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<State>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<State>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

impl Default for MemRepo {
    fn default() -> Self {
        MemRepo::new()
    }
}

#[async_trait]
impl HealthCheck for MemRepo {
    async fn check(&self) -> bool {
        self.read_lock().is_ok()
    }
}

pub fn create_repos() -> Repos {
    let repo = Arc::new(MemRepo::new());

    Repos {
        user_repo: repo.clone(),
        wallet_repo: repo.clone(),
        transaction_repo: repo.clone(),
        category_repo: repo.clone(),
        tag_repo: repo.clone(),
        health_check: repo,
    }
}
