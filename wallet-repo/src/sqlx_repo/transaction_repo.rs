use crate::balance::{check_amount, check_balance_change, BalanceChange};
use crate::page::{PageOptions, Paginated};
use crate::sqlx_repo::SQLxRepo;
use crate::transaction_repo::TransactionRepoError::{
    CategoryNotFound, TagNotFound, TransactionNotFound, WalletNotFound,
};
use crate::transaction_repo::{
    Filter, NewTransaction, Transaction, TransactionRepo, TransactionRepoError,
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{query, query_as, query_scalar, Executor, PgConnection, Postgres, QueryBuilder};
use tracing::instrument;

const SELECT_TRANSACTIONS: &str = r#"
    SELECT t.id,
           t.created_at,
           t.updated_at,
           t.title,
           t.amount,
           t.category_id,
           t.wallet_id,
           t.balance_after_transaction,
           COALESCE(ARRAY_AGG(tt.tag_id) FILTER (WHERE tt.tag_id IS NOT NULL), '{}') AS tags
    FROM transactions t
             LEFT JOIN transactions_tags tt ON tt.transaction_id = t.id
    WHERE TRUE
    "#;

#[derive(sqlx::FromRow)]
struct TransactionEntry {
    id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    title: String,
    amount: Decimal,
    category_id: i32,
    wallet_id: i32,
    balance_after_transaction: Decimal,
    tags: Vec<i32>,
}

impl From<TransactionEntry> for Transaction {
    fn from(value: TransactionEntry) -> Self {
        Transaction {
            id: value.id,
            created_at: value.created_at,
            updated_at: value.updated_at,
            title: value.title,
            amount: value.amount,
            category_id: value.category_id,
            wallet_id: value.wallet_id,
            balance_after_transaction: value.balance_after_transaction,
            tags: value.tags.into_iter().collect(),
        }
    }
}

fn push_filter(query_builder: &mut QueryBuilder<Postgres>, filter: Filter) {
    if let Some(wallet_id) = filter.wallet_id {
        query_builder.push(" AND t.wallet_id = ").push_bind(wallet_id);
    }
    if let Some(category_id) = filter.category_id {
        query_builder
            .push(" AND t.category_id = ")
            .push_bind(category_id);
    }
    if let Some(tag_id) = filter.tag_id {
        query_builder
            .push(" AND EXISTS (SELECT 1 FROM transactions_tags f WHERE f.transaction_id = t.id AND f.tag_id = ")
            .push_bind(tag_id)
            .push(")");
    }
    if let Some(from) = filter.from {
        query_builder.push(" AND t.created_at >= ").push_bind(from);
    }
    if let Some(until) = filter.until {
        query_builder.push(" AND t.created_at <= ").push_bind(until);
    }
}

impl SQLxRepo {
    #[instrument(skip(db_executor))]
    async fn get_transaction_entry<'e, E>(
        db_executor: E,
        transaction_id: i32,
    ) -> Result<Option<TransactionEntry>, TransactionRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut query_builder = QueryBuilder::<Postgres>::new(SELECT_TRANSACTIONS);
        query_builder
            .push(" AND t.id = ")
            .push_bind(transaction_id)
            .push(" GROUP BY t.id");
        let transaction_entry: Option<TransactionEntry> = query_builder
            .build_query_as()
            .fetch_optional(db_executor)
            .await
            .with_context(|| format!("Unable to get transaction {}", transaction_id))?;
        Ok(transaction_entry)
    }

    /// Locks the transaction row and returns its wallet and amount.
    #[instrument(skip(db_executor))]
    async fn lock_transaction<'e, E>(
        db_executor: E,
        transaction_id: i32,
    ) -> Result<(i32, Decimal), TransactionRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let original: Option<(i32, Decimal)> =
            query_as("SELECT wallet_id, amount FROM transactions WHERE id = $1 FOR UPDATE")
                .bind(transaction_id)
                .fetch_optional(db_executor)
                .await
                .with_context(|| format!("Unable to lock transaction {}", transaction_id))?;
        original.ok_or(TransactionNotFound(transaction_id))
    }

    /// Locks every wallet in `wallet_ids`, in id order, failing if one of them is missing.
    #[instrument(skip(db_executor))]
    async fn lock_wallets<'e, E>(
        db_executor: E,
        wallet_ids: &[i32],
    ) -> Result<(), TransactionRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locked: Vec<i32> =
            query_scalar("SELECT id FROM wallets WHERE id = ANY($1) ORDER BY id FOR UPDATE")
                .bind(wallet_ids)
                .fetch_all(db_executor)
                .await
                .context("Unable to lock wallets")?;
        match wallet_ids.iter().find(|id| !locked.contains(id)) {
            Some(missing) => Err(WalletNotFound(*missing)),
            None => Ok(()),
        }
    }

    #[instrument(skip(conn, transaction))]
    async fn check_category_and_tags(
        conn: &mut PgConnection,
        transaction: &NewTransaction,
    ) -> Result<(), TransactionRepoError> {
        let category_exists: bool =
            query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(transaction.category_id)
                .fetch_one(&mut *conn)
                .await
                .context("Unable to check category")?;
        if !category_exists {
            return Err(CategoryNotFound(transaction.category_id));
        }

        if transaction.tags.is_empty() {
            return Ok(());
        }
        let tag_ids: Vec<i32> = transaction.tags.iter().copied().collect();
        let found: Vec<i32> = query_scalar("SELECT id FROM tags WHERE id = ANY($1)")
            .bind(&tag_ids)
            .fetch_all(&mut *conn)
            .await
            .context("Unable to check tags")?;
        match tag_ids.into_iter().find(|id| !found.contains(id)) {
            Some(missing) => Err(TagNotFound(missing)),
            None => Ok(()),
        }
    }

    #[instrument(skip(conn))]
    async fn replace_tags(
        conn: &mut PgConnection,
        transaction_id: i32,
        tag_ids: Vec<i32>,
    ) -> Result<(), TransactionRepoError> {
        query("DELETE FROM transactions_tags WHERE transaction_id = $1")
            .bind(transaction_id)
            .execute(&mut *conn)
            .await
            .with_context(|| format!("Unable to clear tags of transaction {}", transaction_id))?;
        if !tag_ids.is_empty() {
            query("INSERT INTO transactions_tags(transaction_id, tag_id) SELECT $1, UNNEST($2::INT[])")
                .bind(transaction_id)
                .bind(&tag_ids)
                .execute(&mut *conn)
                .await
                .with_context(|| format!("Unable to tag transaction {}", transaction_id))?;
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_transaction(
        &self,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        Self::get_transaction_entry(&self.pool, transaction_id)
            .await?
            .ok_or(TransactionNotFound(transaction_id))
            .map(|t| t.into())
    }

    #[instrument(skip(self))]
    async fn get_transactions(
        &self,
        filter: Filter,
        page_options: Option<PageOptions>,
    ) -> Result<Paginated<Transaction>, TransactionRepoError> {
        let mut count_builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM transactions t WHERE TRUE");
        push_filter(&mut count_builder, filter.clone());
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .context("Unable to count transactions")?;

        let mut query_builder = QueryBuilder::<Postgres>::new(SELECT_TRANSACTIONS);
        push_filter(&mut query_builder, filter);
        query_builder.push(" GROUP BY t.id ORDER BY t.created_at DESC, t.id DESC");
        if let Some(po) = page_options {
            query_builder
                .push(" OFFSET ")
                .push_bind(po.offset)
                .push(" LIMIT ")
                .push_bind(po.limit);
        }
        let transaction_entries: Vec<TransactionEntry> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("Unable to get transactions")?;

        Ok(Paginated::new(
            transaction_entries.into_iter().map(|t| t.into()).collect(),
            total,
        ))
    }

    #[instrument(skip(self, new_transaction))]
    async fn create_transaction(
        &self,
        mut new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        new_transaction.amount = check_amount(new_transaction.amount)?;
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to begin database transaction")?;

        let wallet_id = new_transaction.wallet_id;
        Self::lock_wallets(&mut *tx, &[wallet_id]).await?;
        Self::check_category_and_tags(&mut *tx, &new_transaction).await?;

        let balance = Self::wallet_balance(&mut *tx, wallet_id).await?;
        let balance_after = check_balance_change(
            wallet_id,
            balance,
            BalanceChange::Create {
                amount: new_transaction.amount,
            },
        )?;

        let (id, created_at, updated_at): (i32, DateTime<Utc>, DateTime<Utc>) = query_as(
            "INSERT INTO transactions(title, amount, category_id, wallet_id, balance_after_transaction) VALUES ($1, $2, $3, $4, $5) RETURNING id, created_at, updated_at",
        )
        .bind(&new_transaction.title)
        .bind(new_transaction.amount)
        .bind(new_transaction.category_id)
        .bind(wallet_id)
        .bind(balance_after)
        .fetch_one(&mut *tx)
        .await
        .context("Unable to insert transaction")?;
        Self::replace_tags(
            &mut *tx,
            id,
            new_transaction.tags.iter().copied().collect(),
        )
        .await?;

        tx.commit()
            .await
            .context("Unable to commit database transaction")?;

        Ok(new_transaction.to_transaction(id, created_at, updated_at, balance_after))
    }

    #[instrument(skip(self, updated_transaction))]
    async fn update_transaction(
        &self,
        transaction_id: i32,
        mut updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        updated_transaction.amount = check_amount(updated_transaction.amount)?;
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to begin database transaction")?;

        let (original_wallet_id, original_amount) =
            Self::lock_transaction(&mut *tx, transaction_id).await?;
        let wallet_id = updated_transaction.wallet_id;
        let mut wallet_ids = vec![original_wallet_id, wallet_id];
        wallet_ids.sort_unstable();
        wallet_ids.dedup();
        Self::lock_wallets(&mut *tx, &wallet_ids).await?;
        Self::check_category_and_tags(&mut *tx, &updated_transaction).await?;

        let balance_after = if original_wallet_id == wallet_id {
            let balance = Self::wallet_balance(&mut *tx, wallet_id).await?;
            check_balance_change(
                wallet_id,
                balance,
                BalanceChange::Update {
                    original: original_amount,
                    amount: updated_transaction.amount,
                },
            )?
        } else {
            let original_balance = Self::wallet_balance(&mut *tx, original_wallet_id).await?;
            check_balance_change(
                original_wallet_id,
                original_balance,
                BalanceChange::Delete {
                    original: original_amount,
                },
            )?;
            let balance = Self::wallet_balance(&mut *tx, wallet_id).await?;
            check_balance_change(
                wallet_id,
                balance,
                BalanceChange::Create {
                    amount: updated_transaction.amount,
                },
            )?
        };

        let (created_at, updated_at): (DateTime<Utc>, DateTime<Utc>) = query_as(
            "UPDATE transactions SET title = $1, amount = $2, category_id = $3, wallet_id = $4, balance_after_transaction = $5, updated_at = now() WHERE id = $6 RETURNING created_at, updated_at",
        )
        .bind(&updated_transaction.title)
        .bind(updated_transaction.amount)
        .bind(updated_transaction.category_id)
        .bind(wallet_id)
        .bind(balance_after)
        .bind(transaction_id)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("Unable to update transaction {}", transaction_id))?;
        Self::replace_tags(
            &mut *tx,
            transaction_id,
            updated_transaction.tags.iter().copied().collect(),
        )
        .await?;

        tx.commit()
            .await
            .context("Unable to commit database transaction")?;

        Ok(updated_transaction.to_transaction(
            transaction_id,
            created_at,
            updated_at,
            balance_after,
        ))
    }

    #[instrument(skip(self))]
    async fn delete_transaction(
        &self,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to begin database transaction")?;

        let (wallet_id, amount) = Self::lock_transaction(&mut *tx, transaction_id).await?;
        Self::lock_wallets(&mut *tx, &[wallet_id]).await?;
        let balance = Self::wallet_balance(&mut *tx, wallet_id).await?;
        check_balance_change(wallet_id, balance, BalanceChange::Delete { original: amount })?;

        let transaction_entry = Self::get_transaction_entry(&mut *tx, transaction_id)
            .await?
            .ok_or(TransactionNotFound(transaction_id))?;
        query("DELETE FROM transactions WHERE id = $1")
            .bind(transaction_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to delete transaction {}", transaction_id))?;

        tx.commit()
            .await
            .context("Unable to commit database transaction")?;

        Ok(transaction_entry.into())
    }
}
