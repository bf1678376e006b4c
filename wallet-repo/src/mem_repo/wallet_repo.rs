use crate::mem_repo::MemRepo;
use crate::page::{PageOptions, Paginated};
use crate::wallet_repo::WalletRepoError::{WalletNotEmpty, WalletNotFound};
use crate::wallet_repo::{NewWallet, Wallet, WalletRepo, WalletRepoError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::btree_map::Entry;

#[async_trait]
impl WalletRepo for MemRepo {
    async fn get_wallet(&self, wallet_id: i32) -> Result<Wallet, WalletRepoError> {
        let read_guard = self.read_lock()?;

        let wallet = read_guard
            .wallets
            .get(&wallet_id)
            .ok_or(WalletNotFound(wallet_id))?;
        Ok(wallet
            .clone()
            .to_wallet(wallet_id, read_guard.balance(wallet_id)?))
    }

    async fn get_wallets(
        &self,
        page_options: Option<PageOptions>,
    ) -> Result<Paginated<Wallet>, WalletRepoError> {
        let read_guard = self.read_lock()?;

        let wallets = read_guard.wallets.iter().map(|(id, w)| {
            let balance = read_guard.balance(*id)?;
            Ok::<_, anyhow::Error>(w.clone().to_wallet(*id, balance))
        });
        let total = read_guard.wallets.len() as i64;
        let wallets = match page_options {
            Some(page_options) => page_options.apply(wallets),
            None => wallets.collect(),
        };
        let wallets = wallets.into_iter().collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated::new(wallets, total))
    }

    async fn create_wallet(&self, new_wallet: NewWallet) -> Result<Wallet, WalletRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = write_guard.wallet_ids.next();
        write_guard.wallets.insert(id, new_wallet.clone());

        Ok(new_wallet.to_wallet(id, Decimal::ZERO))
    }

    async fn update_wallet(
        &self,
        wallet_id: i32,
        updated_wallet: NewWallet,
    ) -> Result<Wallet, WalletRepoError> {
        let mut write_guard = self.write_lock()?;

        match write_guard.wallets.entry(wallet_id) {
            Entry::Occupied(mut e) => {
                e.insert(updated_wallet.clone());
            }
            Entry::Vacant(_) => return Err(WalletNotFound(wallet_id)),
        }

        let balance = write_guard.balance(wallet_id)?;
        Ok(updated_wallet.to_wallet(wallet_id, balance))
    }

    async fn delete_wallet(&self, wallet_id: i32) -> Result<Wallet, WalletRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.transactions_of(wallet_id).next().is_some() {
            return Err(WalletNotEmpty(wallet_id));
        }

        write_guard.wallet_transactions.remove(&wallet_id);
        let wallet = write_guard
            .wallets
            .remove(&wallet_id)
            .ok_or(WalletNotFound(wallet_id))?;
        Ok(wallet.to_wallet(wallet_id, Decimal::ZERO))
    }

    async fn get_balance(&self, wallet_id: i32) -> Result<Decimal, WalletRepoError> {
        let read_guard = self.read_lock()?;

        if !read_guard.wallets.contains_key(&wallet_id) {
            return Err(WalletNotFound(wallet_id));
        }
        Ok(read_guard.balance(wallet_id)?)
    }
}
