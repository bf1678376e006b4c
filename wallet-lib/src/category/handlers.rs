use crate::auth::AuthenticatedUser;
use crate::error::HandlerError;
use crate::pagination::{Page, PageQuery};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use std::sync::Arc;
use wallet_repo::category_repo::{CategoryRepo, NewCategory};
use wallet_repo::user_repo::Role;

#[get("")]
pub async fn get_categories(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    page: web::Query<PageQuery>,
) -> Result<impl Responder, HandlerError> {
    let page = page.into_inner();
    let categories = category_repo.get_categories(Some(page.options())).await?;
    Ok(HttpResponse::Ok().json(Page::new(categories, page)))
}

#[post("")]
pub async fn create_category(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user: web::ReqData<AuthenticatedUser>,
    new_category: web::Json<NewCategory>,
) -> Result<impl Responder, HandlerError> {
    user.require(Role::Admin)?;
    let category = category_repo
        .create_category(new_category.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(category))
}

#[get("/{category_id}")]
pub async fn get_category(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    category_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let category = category_repo.get_category(category_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(category))
}

#[put("/{category_id}")]
pub async fn update_category(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user: web::ReqData<AuthenticatedUser>,
    category_id: web::Path<i32>,
    category: web::Json<NewCategory>,
) -> Result<impl Responder, HandlerError> {
    user.require(Role::Admin)?;
    let category = category_repo
        .update_category(category_id.into_inner(), category.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[delete("/{category_id}")]
pub async fn delete_category(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user: web::ReqData<AuthenticatedUser>,
    category_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    user.require(Role::Admin)?;
    let category = category_repo
        .delete_category(category_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(category))
}
