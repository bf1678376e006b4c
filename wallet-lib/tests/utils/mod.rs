use std::collections::BTreeSet;

use rstest::*;
use tracing::info;
use tracing::Level;

use wallet_lib::auth::AuthenticatedUser;
use wallet_repo::user_repo::Role;
use wallet_repo::Repos;

pub mod signed_in;

/// Builds the API with every token-protected route signed in as `$user`.
macro_rules! build_app {
    ($repos:expr, $user:expr) => {{
        let repos: wallet_repo::Repos = $repos;
        let user: wallet_lib::auth::AuthenticatedUser = $user;
        let mut app = App::new()
            .configure(move |cfg| wallet_lib::repo_data(cfg, repos))
            .app_data(wallet_lib::json_config())
            .service(wallet_lib::health::health)
            .service(
                wallet_lib::wallet::wallet_service()
                    .wrap(SignedInAs(user.clone())),
            )
            .service(
                wallet_lib::transaction::transaction_service()
                    .wrap(SignedInAs(user.clone())),
            )
            .service(
                wallet_lib::category::category_service()
                    .wrap(SignedInAs(user.clone())),
            )
            .service(
                wallet_lib::tag::tag_service().wrap(SignedInAs(user.clone())),
            )
            .service(
                wallet_lib::admin::admin_service()
                    .wrap(SignedInAs(user.clone())),
            );
        for resource in wallet_lib::user::account_resources() {
            app = app.service(resource.wrap(SignedInAs(user.clone())));
        }
        let app = app.wrap(wallet_lib::tracing::create_middleware());
        tracing::info!("Built app");
        app
    }};
}

macro_rules! create_transaction {
    (&$service:ident, $request:expr) => {{
        let request = TestRequest::post()
            .uri("/transaction")
            .set_json(&$request)
            .to_request();
        let response = test::call_service(&$service, request).await;
        assert!(
            response.status().is_success(),
            "Got {} response when creating transaction",
            response.status()
        );
        test::read_body_json(response).await
    }};
}

#[allow(unused_macros)]
macro_rules! send_json {
    (&$service:ident, $method:ident, $uri:expr, $body:expr) => {{
        let request = TestRequest::$method()
            .uri(&$uri)
            .set_json(&$body)
            .to_request();
        test::call_service(&$service, request).await
    }};
}

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::DEBUG)
        .init();
    info!("tracing initialized");
}

#[fixture]
pub fn repos() -> Repos {
    wallet_repo::mem_repo::create_repos()
}

#[allow(dead_code)]
pub fn member() -> AuthenticatedUser {
    AuthenticatedUser {
        id: 1,
        roles: BTreeSet::from([Role::User]),
    }
}

#[allow(dead_code)]
pub fn admin() -> AuthenticatedUser {
    AuthenticatedUser {
        id: 2,
        roles: BTreeSet::from([Role::User, Role::Admin]),
    }
}
