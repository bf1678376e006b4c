use crate::auth::AuthenticatedUser;
use crate::error::HandlerError;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use std::sync::Arc;
use wallet_repo::tag_repo::{NewTag, TagRepo};
use wallet_repo::user_repo::Role;

#[get("")]
pub async fn get_tags(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<impl Responder, HandlerError> {
    user.require(Role::Admin)?;
    let tags = tag_repo.get_tags().await?;
    Ok(HttpResponse::Ok().json(tags))
}

#[post("")]
pub async fn create_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user: web::ReqData<AuthenticatedUser>,
    new_tag: web::Json<NewTag>,
) -> Result<impl Responder, HandlerError> {
    user.require(Role::Admin)?;
    let tag = tag_repo.create_tag(new_tag.into_inner()).await?;
    Ok(HttpResponse::Created().json(tag))
}

#[get("/{tag_id}")]
pub async fn get_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user: web::ReqData<AuthenticatedUser>,
    tag_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    user.require(Role::Admin)?;
    let tag = tag_repo.get_tag(tag_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tag))
}

#[put("/{tag_id}")]
pub async fn update_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user: web::ReqData<AuthenticatedUser>,
    tag_id: web::Path<i32>,
    tag: web::Json<NewTag>,
) -> Result<impl Responder, HandlerError> {
    user.require(Role::Admin)?;
    let tag = tag_repo
        .update_tag(tag_id.into_inner(), tag.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(tag))
}

#[delete("/{tag_id}")]
pub async fn delete_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    user: web::ReqData<AuthenticatedUser>,
    tag_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    user.require(Role::Admin)?;
    let tag = tag_repo.delete_tag(tag_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tag))
}
