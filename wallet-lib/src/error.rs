use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;
use wallet_repo::category_repo::CategoryRepoError;
use wallet_repo::tag_repo::TagRepoError;
use wallet_repo::transaction_repo::TransactionRepoError;
use wallet_repo::user_repo::{Role, UserRepoError};
use wallet_repo::wallet_repo::WalletRepoError;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    Wallet(#[from] WalletRepoError),
    #[error(transparent)]
    Transaction(#[from] TransactionRepoError),
    #[error(transparent)]
    Category(#[from] CategoryRepoError),
    #[error(transparent)]
    Tag(#[from] TagRepoError),
    #[error(transparent)]
    User(#[from] UserRepoError),
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Requires {0}")]
    MissingRole(Role),
    #[error(transparent)]
    Password(#[from] argon2::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::Wallet(e) => match e {
                WalletRepoError::WalletNotFound(_) => StatusCode::NOT_FOUND,
                WalletRepoError::WalletNotEmpty(_) => StatusCode::CONFLICT,
                WalletRepoError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            HandlerError::Transaction(e) => match e {
                TransactionRepoError::TransactionNotFound(_)
                | TransactionRepoError::WalletNotFound(_)
                | TransactionRepoError::CategoryNotFound(_)
                | TransactionRepoError::TagNotFound(_) => StatusCode::NOT_FOUND,
                TransactionRepoError::InsufficientFunds(_)
                | TransactionRepoError::BalanceOutOfRange(_) => StatusCode::UNPROCESSABLE_ENTITY,
                TransactionRepoError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
                TransactionRepoError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            HandlerError::Category(e) => match e {
                CategoryRepoError::CategoryNotFound(_) => StatusCode::NOT_FOUND,
                CategoryRepoError::CategoryInUse(_) => StatusCode::CONFLICT,
                CategoryRepoError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            HandlerError::Tag(e) => match e {
                TagRepoError::TagNotFound(_) => StatusCode::NOT_FOUND,
                TagRepoError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            HandlerError::User(e) => match e {
                UserRepoError::UserNotFound(_) | UserRepoError::EmailNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                UserRepoError::EmailAlreadyExists(_) => StatusCode::CONFLICT,
                UserRepoError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            HandlerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HandlerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            HandlerError::MissingRole(_) => StatusCode::FORBIDDEN,
            HandlerError::Password(_) | HandlerError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = ?self, "Request failed");
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(serde_json::json!({ "error": message }))
    }
}
