use crate::admin::UserUpdate;
use crate::auth::handlers::{check_email, check_password_length};
use crate::auth::{password, AuthenticatedUser};
use crate::error::HandlerError;
use crate::user::UserView;
use actix_web::{get, put, web, HttpResponse, Responder};
use std::sync::Arc;
use tracing::info;
use wallet_repo::user_repo::{Role, UserRepo};

#[get("")]
pub async fn get_users(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<impl Responder, HandlerError> {
    user.require(Role::Admin)?;
    let users: Vec<UserView> = user_repo
        .get_users()
        .await?
        .into_iter()
        .map(UserView::from)
        .collect();
    Ok(HttpResponse::Ok().json(users))
}

#[get("/{user_id}")]
pub async fn get_user(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user: web::ReqData<AuthenticatedUser>,
    user_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    user.require(Role::Admin)?;
    let shown = user_repo.get_user(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserView::from(shown)))
}

#[put("/{user_id}")]
pub async fn update_user(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user: web::ReqData<AuthenticatedUser>,
    user_id: web::Path<i32>,
    update: web::Json<UserUpdate>,
) -> Result<impl Responder, HandlerError> {
    user.require(Role::Admin)?;
    let user_id = user_id.into_inner();
    let update = update.into_inner();

    // fail with 404 or 400 before applying any of the changes
    user_repo.get_user(user_id).await?;
    if let Some(email) = &update.email {
        check_email(email)?;
    }
    if let Some(new_password) = &update.password {
        check_password_length(new_password)?;
    }
    let password_hash = update
        .password
        .as_deref()
        .map(password::encode_password)
        .transpose()?;

    if let Some(email) = &update.email {
        user_repo.update_email(user_id, email).await?;
    }
    if let Some(mut roles) = update.roles {
        roles.insert(Role::User);
        user_repo.update_roles(user_id, &roles).await?;
    }
    if let Some(password_hash) = password_hash {
        user_repo.update_password_hash(user_id, &password_hash).await?;
    }
    info!(admin_id = user.id, user_id, "Updated user");

    let updated = user_repo.get_user(user_id).await?;
    Ok(HttpResponse::Ok().json(UserView::from(updated)))
}
