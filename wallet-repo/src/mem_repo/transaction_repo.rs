use crate::balance::{check_amount, check_balance_change, BalanceChange};
use crate::mem_repo::{MemRepo, State};
use crate::page::{PageOptions, Paginated};
use crate::transaction_repo::TransactionRepoError::{
    CategoryNotFound, TagNotFound, TransactionNotFound, WalletNotFound,
};
use crate::transaction_repo::{
    Filter, NewTransaction, Transaction, TransactionRepo, TransactionRepoError,
};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::debug;

impl State {
    fn check_references(&self, transaction: &NewTransaction) -> Result<(), TransactionRepoError> {
        if !self.wallets.contains_key(&transaction.wallet_id) {
            return Err(WalletNotFound(transaction.wallet_id));
        }
        if !self.categories.contains_key(&transaction.category_id) {
            return Err(CategoryNotFound(transaction.category_id));
        }
        if let Some(tag_id) = transaction
            .tags
            .iter()
            .find(|tag_id| !self.tags.contains_key(tag_id))
        {
            return Err(TagNotFound(*tag_id));
        }
        Ok(())
    }

    fn checked_balance(
        &self,
        wallet_id: i32,
        change: BalanceChange,
    ) -> Result<Decimal, TransactionRepoError> {
        let balance = self.balance(wallet_id)?;
        let prospective = check_balance_change(wallet_id, balance, change)?;
        Ok(prospective)
    }
}

#[async_trait]
impl TransactionRepo for MemRepo {
    async fn get_transaction(
        &self,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .transactions
            .get(&transaction_id)
            .cloned()
            .ok_or(TransactionNotFound(transaction_id))
    }

    async fn get_transactions(
        &self,
        filter: Filter,
        page_options: Option<PageOptions>,
    ) -> Result<Paginated<Transaction>, TransactionRepoError> {
        let read_guard = self.read_lock()?;

        let mut transactions: Vec<&Transaction> = read_guard
            .transactions
            .values()
            .filter(|t| filter.matches(t))
            .collect();
        transactions.sort_by(|a, b| b.cmp(a));

        let total = transactions.len() as i64;
        let transactions = transactions.into_iter().cloned();
        let transactions = match page_options {
            Some(page_options) => page_options.apply(transactions),
            None => transactions.collect(),
        };

        Ok(Paginated::new(transactions, total))
    }

    async fn create_transaction(
        &self,
        mut new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        new_transaction.amount = check_amount(new_transaction.amount)?;
        let mut write_guard = self.write_lock()?;

        write_guard.check_references(&new_transaction)?;
        let balance_after = write_guard.checked_balance(
            new_transaction.wallet_id,
            BalanceChange::Create {
                amount: new_transaction.amount,
            },
        )?;

        let id = write_guard.transaction_ids.next();
        let now = Utc::now();
        let transaction = new_transaction.to_transaction(id, now, now, balance_after);

        write_guard.transactions.insert(id, transaction.clone());
        write_guard
            .wallet_transactions
            .entry(transaction.wallet_id)
            .or_default()
            .insert(id);

        Ok(transaction)
    }

    async fn update_transaction(
        &self,
        transaction_id: i32,
        mut updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        updated_transaction.amount = check_amount(updated_transaction.amount)?;
        let mut write_guard = self.write_lock()?;

        let original = write_guard
            .transactions
            .get(&transaction_id)
            .cloned()
            .ok_or(TransactionNotFound(transaction_id))?;
        write_guard.check_references(&updated_transaction)?;

        let balance_after = if original.wallet_id == updated_transaction.wallet_id {
            write_guard.checked_balance(
                original.wallet_id,
                BalanceChange::Update {
                    original: original.amount,
                    amount: updated_transaction.amount,
                },
            )?
        } else {
            debug!(
                from = original.wallet_id,
                to = updated_transaction.wallet_id,
                "Moving transaction between wallets"
            );
            write_guard.checked_balance(
                original.wallet_id,
                BalanceChange::Delete {
                    original: original.amount,
                },
            )?;
            write_guard.checked_balance(
                updated_transaction.wallet_id,
                BalanceChange::Create {
                    amount: updated_transaction.amount,
                },
            )?
        };

        let transaction = updated_transaction.to_transaction(
            transaction_id,
            original.created_at,
            Utc::now(),
            balance_after,
        );

        if original.wallet_id != transaction.wallet_id {
            if let Some(ids) = write_guard.wallet_transactions.get_mut(&original.wallet_id) {
                ids.remove(&transaction_id);
            }
            write_guard
                .wallet_transactions
                .entry(transaction.wallet_id)
                .or_default()
                .insert(transaction_id);
        }
        write_guard
            .transactions
            .insert(transaction_id, transaction.clone());

        Ok(transaction)
    }

    async fn delete_transaction(
        &self,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        let Some(original) = write_guard.transactions.get(&transaction_id) else {
            return Err(TransactionNotFound(transaction_id));
        };
        let (wallet_id, amount) = (original.wallet_id, original.amount);
        write_guard.checked_balance(wallet_id, BalanceChange::Delete { original: amount })?;

        if let Some(ids) = write_guard.wallet_transactions.get_mut(&wallet_id) {
            ids.remove(&transaction_id);
        }
        let transaction = write_guard
            .transactions
            .remove(&transaction_id)
            .ok_or(TransactionNotFound(transaction_id))?;
        Ok(transaction)
    }
}
