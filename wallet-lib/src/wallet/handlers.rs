use crate::error::HandlerError;
use crate::pagination::{Page, PageQuery};
use crate::wallet::{PeriodQuery, WalletDetail};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use std::sync::Arc;
use wallet_repo::transaction_repo::{Filter, TransactionRepo};
use wallet_repo::wallet_repo::{NewWallet, WalletRepo};

#[get("")]
pub async fn get_wallets(
    wallet_repo: web::Data<Arc<dyn WalletRepo>>,
    page: web::Query<PageQuery>,
) -> Result<impl Responder, HandlerError> {
    let page = page.into_inner();
    let wallets = wallet_repo.get_wallets(Some(page.options())).await?;
    Ok(HttpResponse::Ok().json(Page::new(wallets, page)))
}

#[post("")]
pub async fn create_wallet(
    wallet_repo: web::Data<Arc<dyn WalletRepo>>,
    new_wallet: web::Json<NewWallet>,
) -> Result<impl Responder, HandlerError> {
    let wallet = wallet_repo.create_wallet(new_wallet.into_inner()).await?;
    Ok(HttpResponse::Created().json(wallet))
}

#[get("/{wallet_id}")]
pub async fn get_wallet(
    wallet_repo: web::Data<Arc<dyn WalletRepo>>,
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    wallet_id: web::Path<i32>,
    page: web::Query<PageQuery>,
    period: web::Query<PeriodQuery>,
) -> Result<impl Responder, HandlerError> {
    let wallet_id = wallet_id.into_inner();
    let page = page.into_inner();
    let period = period.into_inner();

    let wallet = wallet_repo.get_wallet(wallet_id).await?;
    let filter = Filter {
        from: period.from,
        until: period.until,
        ..Filter::wallet(wallet_id)
    };
    let transactions = transaction_repo
        .get_transactions(filter, Some(page.options()))
        .await?;

    Ok(HttpResponse::Ok().json(WalletDetail {
        wallet,
        transactions: Page::new(transactions, page),
    }))
}

#[put("/{wallet_id}")]
pub async fn update_wallet(
    wallet_repo: web::Data<Arc<dyn WalletRepo>>,
    wallet_id: web::Path<i32>,
    updated_wallet: web::Json<NewWallet>,
) -> Result<impl Responder, HandlerError> {
    let wallet = wallet_repo
        .update_wallet(wallet_id.into_inner(), updated_wallet.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(wallet))
}

#[delete("/{wallet_id}")]
pub async fn delete_wallet(
    wallet_repo: web::Data<Arc<dyn WalletRepo>>,
    wallet_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let wallet = wallet_repo.delete_wallet(wallet_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(wallet))
}
