use crate::auth::handlers::{check_email, check_new_password};
use crate::auth::{password, AuthenticatedUser};
use crate::error::HandlerError;
use crate::user::UserView;
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use wallet_repo::user_repo::UserRepo;

#[derive(Serialize, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Serialize, Deserialize)]
pub struct EmailChange {
    pub email: String,
}

pub async fn change_password(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user: web::ReqData<AuthenticatedUser>,
    change: web::Json<PasswordChange>,
) -> Result<impl Responder, HandlerError> {
    let change = change.into_inner();
    let stored = user_repo.get_user(user.id).await?;
    if !password::verify_password(&change.old_password, &stored.password_hash)? {
        return Err(HandlerError::InvalidCredentials);
    }
    check_new_password(&change.new_password, &change.confirm_password)?;

    let password_hash = password::encode_password(&change.new_password)?;
    user_repo
        .update_password_hash(user.id, &password_hash)
        .await?;
    info!(user_id = user.id, "Changed password");

    Ok(HttpResponse::Ok().json(UserView::from(stored)))
}

pub async fn change_email(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user: web::ReqData<AuthenticatedUser>,
    change: web::Json<EmailChange>,
) -> Result<impl Responder, HandlerError> {
    let change = change.into_inner();
    check_email(&change.email)?;

    user_repo.update_email(user.id, &change.email).await?;
    let updated = user_repo.get_user(user.id).await?;

    Ok(HttpResponse::Ok().json(UserView::from(updated)))
}
