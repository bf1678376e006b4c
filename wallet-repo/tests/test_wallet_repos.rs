mod utils;

use rstest::rstest;
use rust_decimal::Decimal;
use utils::RepoType;
use wallet_repo::page::PageOptions;
use wallet_repo::wallet_repo::{NewWallet, WalletRepoError};

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_create_and_get_wallet(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };

    let wallet = repos
        .wallet_repo
        .create_wallet(NewWallet::new("bank".to_owned(), "Savings".to_owned()))
        .await
        .unwrap();
    assert_eq!(wallet.balance, Decimal::ZERO);

    let stored = repos.wallet_repo.get_wallet(wallet.id).await.unwrap();
    assert_eq!(stored, wallet);
    assert_eq!(stored.wallet_type, "bank");
    assert_eq!(stored.title, "Savings");
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_get_missing_wallet(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };

    let result = repos.wallet_repo.get_wallet(i32::MAX).await;
    assert!(matches!(result, Err(WalletRepoError::WalletNotFound(id)) if id == i32::MAX));

    let result = repos.wallet_repo.get_balance(i32::MAX).await;
    assert!(matches!(result, Err(WalletRepoError::WalletNotFound(_))));
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_balance_is_sum_of_amounts(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let wallet = utils::create_wallet(&repos).await;
    let category_id = utils::create_category(&repos, "Salary").await;

    utils::deposit(&repos, wallet.id, category_id, 100).await;
    utils::deposit(&repos, wallet.id, category_id, 50).await;

    let balance = repos.wallet_repo.get_balance(wallet.id).await.unwrap();
    assert_eq!(balance, Decimal::from(150));
    let stored = repos.wallet_repo.get_wallet(wallet.id).await.unwrap();
    assert_eq!(stored.balance, Decimal::from(150));
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_update_wallet_keeps_balance(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let wallet = utils::create_wallet(&repos).await;
    let category_id = utils::create_category(&repos, "Gift").await;
    utils::deposit(&repos, wallet.id, category_id, 20).await;

    let updated = repos
        .wallet_repo
        .update_wallet(
            wallet.id,
            NewWallet::new("card".to_owned(), "Renamed".to_owned()),
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.wallet_type, "card");
    assert_eq!(updated.balance, Decimal::from(20));

    let result = repos
        .wallet_repo
        .update_wallet(
            i32::MAX,
            NewWallet::new("card".to_owned(), "Missing".to_owned()),
        )
        .await;
    assert!(matches!(result, Err(WalletRepoError::WalletNotFound(_))));
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_delete_wallet(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let empty = utils::create_wallet(&repos).await;
    let used = utils::create_wallet(&repos).await;
    let category_id = utils::create_category(&repos, "Misc").await;
    let transaction = utils::deposit(&repos, used.id, category_id, 5).await;

    let deleted = repos.wallet_repo.delete_wallet(empty.id).await.unwrap();
    assert_eq!(deleted.id, empty.id);
    assert!(repos.wallet_repo.get_wallet(empty.id).await.is_err());

    let result = repos.wallet_repo.delete_wallet(used.id).await;
    assert!(matches!(result, Err(WalletRepoError::WalletNotEmpty(id)) if id == used.id));

    repos
        .transaction_repo
        .delete_transaction(transaction.id)
        .await
        .unwrap();
    assert!(repos.wallet_repo.delete_wallet(used.id).await.is_ok());

    let result = repos.wallet_repo.delete_wallet(used.id).await;
    assert!(matches!(result, Err(WalletRepoError::WalletNotFound(_))));
}

#[rstest]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_wallet_pages(#[case] repo_type: RepoType) {
    let Some(repos) = utils::build_repos(repo_type).await else {
        return;
    };
    let mut ids = Vec::new();
    for _ in 0..12 {
        ids.push(utils::create_wallet(&repos).await.id);
    }

    let first = repos
        .wallet_repo
        .get_wallets(Some(PageOptions::for_page(1, 10)))
        .await
        .unwrap();
    assert_eq!(first.total, 12);
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.items[0].id, ids[0]);

    let second = repos
        .wallet_repo
        .get_wallets(Some(PageOptions::for_page(2, 10)))
        .await
        .unwrap();
    assert_eq!(second.total, 12);
    let second_ids: Vec<i32> = second.items.iter().map(|w| w.id).collect();
    assert_eq!(second_ids, ids[10..].to_vec());

    let all = repos.wallet_repo.get_wallets(None).await.unwrap();
    assert_eq!(all.items.len(), 12);
}
