use crate::error::HandlerError;
use crate::pagination::{Page, PageQuery};
use crate::transaction::{TransactionQuery, TransactionRequest};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use std::sync::Arc;
use tracing::debug;
use wallet_repo::transaction_repo::TransactionRepo;

#[get("")]
pub async fn get_transactions(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    page: web::Query<PageQuery>,
    query: web::Query<TransactionQuery>,
) -> Result<impl Responder, HandlerError> {
    let page = page.into_inner();
    let transactions = transaction_repo
        .get_transactions(query.into_inner().into(), Some(page.options()))
        .await?;
    Ok(HttpResponse::Ok().json(Page::new(transactions, page)))
}

#[post("")]
pub async fn create_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    request: web::Json<TransactionRequest>,
) -> Result<impl Responder, HandlerError> {
    let request = request.into_inner();
    let wallet_id = request
        .wallet_id
        .ok_or_else(|| HandlerError::BadRequest("wallet_id is required".to_owned()))?;

    let transaction = transaction_repo
        .create_transaction(request.into_new_transaction(wallet_id))
        .await?;
    Ok(HttpResponse::Created().json(transaction))
}

#[post("/create/{wallet_id}")]
pub async fn create_wallet_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    wallet_id: web::Path<i32>,
    request: web::Json<TransactionRequest>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .create_transaction(request.into_inner().into_new_transaction(wallet_id.into_inner()))
        .await?;
    Ok(HttpResponse::Created().json(transaction))
}

#[get("/{transaction_id}")]
pub async fn get_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    transaction_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .get_transaction(transaction_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[put("/{transaction_id}")]
pub async fn update_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    transaction_id: web::Path<i32>,
    request: web::Json<TransactionRequest>,
) -> Result<impl Responder, HandlerError> {
    let transaction_id = transaction_id.into_inner();
    let request = request.into_inner();

    let wallet_id = match request.wallet_id {
        Some(wallet_id) => wallet_id,
        None => {
            debug!(transaction_id, "Keeping wallet of edited transaction");
            transaction_repo
                .get_transaction(transaction_id)
                .await?
                .wallet_id
        }
    };
    let transaction = transaction_repo
        .update_transaction(transaction_id, request.into_new_transaction(wallet_id))
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[delete("/{transaction_id}")]
pub async fn delete_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    transaction_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .delete_transaction(transaction_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}
