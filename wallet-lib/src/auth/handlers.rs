use crate::auth::jwt::JWTAuth;
use crate::auth::password;
use crate::error::HandlerError;
use crate::user::UserView;
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};
use wallet_repo::user_repo::{NewUser, Role, UserRepo, UserRepoError};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Serialize, Deserialize)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub token: String,
}

/// Checks a new password against its confirmation and the minimum length.
pub fn check_new_password(password: &str, confirmation: &str) -> Result<(), HandlerError> {
    if password != confirmation {
        return Err(HandlerError::BadRequest("Passwords do not match".to_owned()));
    }
    check_password_length(password)
}

pub fn check_password_length(password: &str) -> Result<(), HandlerError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(HandlerError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub fn check_email(email: &str) -> Result<(), HandlerError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(HandlerError::BadRequest(format!(
            "Invalid email address: {:?}",
            email
        )));
    }
    Ok(())
}

#[post("/register")]
pub async fn register(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    registration: web::Json<Registration>,
) -> Result<impl Responder, HandlerError> {
    let registration = registration.into_inner();
    check_email(&registration.email)?;
    check_new_password(&registration.password, &registration.confirm_password)?;
    let password_hash = password::encode_password(&registration.password)?;

    let user = user_repo
        .create_user(NewUser::new(
            registration.email,
            password_hash,
            BTreeSet::from([Role::User]),
        ))
        .await?;
    info!(user_id = user.id, "Registered user");

    Ok(HttpResponse::Created().json(UserView::from(user)))
}

#[post("/token")]
pub async fn get_token(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    credentials: web::Json<UserCredentials>,
    req: HttpRequest,
) -> Result<impl Responder, HandlerError> {
    let credentials = credentials.into_inner();

    let user = match user_repo.get_user_by_email(&credentials.email).await {
        Ok(user) => user,
        Err(UserRepoError::EmailNotFound(_)) => {
            warn!("Token requested for unknown email");
            return Err(HandlerError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    if !password::verify_password(&credentials.password, &user.password_hash)? {
        warn!(user_id = user.id, "Wrong password");
        return Err(HandlerError::InvalidCredentials);
    }

    let jwt_auth = req
        .app_data::<JWTAuth>()
        .ok_or_else(|| anyhow!("JWTAuth not configured"))?;
    let token = jwt_auth.create_token(user.id)?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
