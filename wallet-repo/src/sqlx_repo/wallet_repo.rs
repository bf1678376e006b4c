use crate::page::{PageOptions, Paginated};
use crate::sqlx_repo::SQLxRepo;
use crate::wallet_repo::WalletRepoError::{WalletNotEmpty, WalletNotFound};
use crate::wallet_repo::{NewWallet, Wallet, WalletRepo, WalletRepoError};
use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{query, query_as, query_scalar, Executor, Postgres, QueryBuilder};
use tracing::instrument;

const SELECT_WALLETS: &str = r#"
    SELECT w.id, w.wallet_type, w.title, COALESCE(SUM(t.amount), 0) AS balance
    FROM wallets w
             LEFT JOIN transactions t ON t.wallet_id = w.id
    "#;

#[derive(sqlx::FromRow)]
struct WalletEntry {
    id: i32,
    wallet_type: String,
    title: String,
    balance: Decimal,
}

impl From<WalletEntry> for Wallet {
    fn from(value: WalletEntry) -> Self {
        Wallet {
            id: value.id,
            wallet_type: value.wallet_type,
            title: value.title,
            balance: value.balance,
        }
    }
}

impl SQLxRepo {
    /// Locks the wallet row for the rest of the database transaction. Returns false if the
    /// wallet does not exist.
    #[instrument(skip(db_executor))]
    pub(super) async fn lock_wallet<'e, E>(
        db_executor: E,
        wallet_id: i32,
    ) -> Result<bool, anyhow::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: Option<i32> = query_scalar("SELECT id FROM wallets WHERE id = $1 FOR UPDATE")
            .bind(wallet_id)
            .fetch_optional(db_executor)
            .await
            .with_context(|| format!("Unable to lock wallet {}", wallet_id))?;
        Ok(id.is_some())
    }

    #[instrument(skip(db_executor))]
    pub(super) async fn wallet_balance<'e, E>(
        db_executor: E,
        wallet_id: i32,
    ) -> Result<Decimal, anyhow::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance: Decimal =
            query_scalar("SELECT COALESCE(SUM(amount), 0) FROM transactions WHERE wallet_id = $1")
                .bind(wallet_id)
                .fetch_one(db_executor)
                .await
                .with_context(|| format!("Unable to get balance of wallet {}", wallet_id))?;
        Ok(balance)
    }
}

#[async_trait]
impl WalletRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_wallet(&self, wallet_id: i32) -> Result<Wallet, WalletRepoError> {
        let mut query_builder = QueryBuilder::<Postgres>::new(SELECT_WALLETS);
        query_builder
            .push(" WHERE w.id = ")
            .push_bind(wallet_id)
            .push(" GROUP BY w.id");
        let wallet_entry: Option<WalletEntry> = query_builder
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to get wallet {}", wallet_id))?;

        wallet_entry
            .map(|w| w.into())
            .ok_or(WalletNotFound(wallet_id))
    }

    #[instrument(skip(self))]
    async fn get_wallets(
        &self,
        page_options: Option<PageOptions>,
    ) -> Result<Paginated<Wallet>, WalletRepoError> {
        let total: i64 = query_scalar("SELECT COUNT(*) FROM wallets")
            .fetch_one(&self.pool)
            .await
            .context("Unable to count wallets")?;

        let mut query_builder = QueryBuilder::<Postgres>::new(SELECT_WALLETS);
        query_builder.push(" GROUP BY w.id ORDER BY w.id");
        if let Some(po) = page_options {
            query_builder
                .push(" OFFSET ")
                .push_bind(po.offset)
                .push(" LIMIT ")
                .push_bind(po.limit);
        }
        let wallet_entries: Vec<WalletEntry> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("Unable to get wallets")?;

        Ok(Paginated::new(
            wallet_entries.into_iter().map(|w| w.into()).collect(),
            total,
        ))
    }

    #[instrument(skip(self))]
    async fn create_wallet(&self, new_wallet: NewWallet) -> Result<Wallet, WalletRepoError> {
        let id: i32 =
            query_scalar("INSERT INTO wallets(wallet_type, title) VALUES ($1, $2) RETURNING id")
                .bind(&new_wallet.wallet_type)
                .bind(&new_wallet.title)
                .fetch_one(&self.pool)
                .await
                .context("Unable to insert wallet")?;

        Ok(new_wallet.to_wallet(id, Decimal::ZERO))
    }

    #[instrument(skip(self))]
    async fn update_wallet(
        &self,
        wallet_id: i32,
        updated_wallet: NewWallet,
    ) -> Result<Wallet, WalletRepoError> {
        let result = query("UPDATE wallets SET wallet_type = $1, title = $2 WHERE id = $3")
            .bind(&updated_wallet.wallet_type)
            .bind(&updated_wallet.title)
            .bind(wallet_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to update wallet {}", wallet_id))?;
        if result.rows_affected() == 0 {
            return Err(WalletNotFound(wallet_id));
        }

        let balance = Self::wallet_balance(&self.pool, wallet_id).await?;
        Ok(updated_wallet.to_wallet(wallet_id, balance))
    }

    #[instrument(skip(self))]
    async fn delete_wallet(&self, wallet_id: i32) -> Result<Wallet, WalletRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to begin database transaction")?;

        if !Self::lock_wallet(&mut *tx, wallet_id).await? {
            return Err(WalletNotFound(wallet_id));
        }
        let transaction_count: i64 =
            query_scalar("SELECT COUNT(*) FROM transactions WHERE wallet_id = $1")
                .bind(wallet_id)
                .fetch_one(&mut *tx)
                .await
                .with_context(|| format!("Unable to count transactions of wallet {}", wallet_id))?;
        if transaction_count > 0 {
            return Err(WalletNotEmpty(wallet_id));
        }

        let (wallet_type, title): (String, String) =
            query_as("DELETE FROM wallets WHERE id = $1 RETURNING wallet_type, title")
                .bind(wallet_id)
                .fetch_one(&mut *tx)
                .await
                .with_context(|| format!("Unable to delete wallet {}", wallet_id))?;
        tx.commit()
            .await
            .context("Unable to commit database transaction")?;

        Ok(NewWallet::new(wallet_type, title).to_wallet(wallet_id, Decimal::ZERO))
    }

    #[instrument(skip(self))]
    async fn get_balance(&self, wallet_id: i32) -> Result<Decimal, WalletRepoError> {
        let exists: bool = query_scalar("SELECT EXISTS(SELECT 1 FROM wallets WHERE id = $1)")
            .bind(wallet_id)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Unable to get wallet {}", wallet_id))?;
        if !exists {
            return Err(WalletNotFound(wallet_id));
        }

        Ok(Self::wallet_balance(&self.pool, wallet_id).await?)
    }
}
