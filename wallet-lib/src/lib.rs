use crate::auth::jwt::JWTAuth;
use actix_web::error::JsonPayloadError;
use actix_web::web::{Data, ServiceConfig};
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_httpauth::middleware::HttpAuthentication;
use wallet_repo::Repos;

pub mod admin;
pub mod auth;
pub mod category;
pub mod config;
pub mod error;
pub mod health;
pub mod pagination;
pub mod tag;
pub mod tracing;
pub mod transaction;
pub mod user;
pub mod wallet;

/// Registers every repository as app data under its trait object type.
pub fn repo_data(cfg: &mut ServiceConfig, repos: Repos) {
    cfg.app_data(Data::new(repos.user_repo))
        .app_data(Data::new(repos.wallet_repo))
        .app_data(Data::new(repos.transaction_repo))
        .app_data(Data::new(repos.category_repo))
        .app_data(Data::new(repos.tag_repo))
        .app_data(Data::new(repos.health_check));
}

/// Answers malformed JSON bodies with a 400 describing the problem.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    ::tracing::error!(req_path = req.path(), %err);
    match err {
        JsonPayloadError::Deserialize(deserialize_err) => {
            let error_body = serde_json::json!({
                "error": "Unable to parse JSON payload",
                "detail": format!("{}", deserialize_err),
            });
            actix_web::error::InternalError::from_response(
                deserialize_err,
                HttpResponse::BadRequest()
                    .content_type("application/json")
                    .body(error_body.to_string()),
            )
            .into()
        }
        _ => err.into(),
    }
}

/// Configures the whole API: public routes, the token-protected routes and shared app data.
pub fn app_config_func(
    jwt_auth: JWTAuth,
    repos: Repos,
    signups_enabled: bool,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let bearer_auth_middleware = HttpAuthentication::bearer(auth::credentials_validator);

        repo_data(cfg, repos);
        cfg.app_data(jwt_auth).app_data(json_config());

        cfg.service(health::health);
        auth::public_service(cfg, signups_enabled);
        for resource in user::account_resources() {
            cfg.service(resource.wrap(bearer_auth_middleware.clone()));
        }
        cfg.service(wallet::wallet_service().wrap(bearer_auth_middleware.clone()))
            .service(transaction::transaction_service().wrap(bearer_auth_middleware.clone()))
            .service(category::category_service().wrap(bearer_auth_middleware.clone()))
            .service(tag::tag_service().wrap(bearer_auth_middleware.clone()))
            .service(admin::admin_service().wrap(bearer_auth_middleware));
    }
}
