use crate::error::HandlerError;
use actix_web::dev::ServiceRequest;
use actix_web::{web, Error, HttpMessage};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use actix_web_httpauth::extractors::{bearer, AuthenticationError};
use actix_web_httpauth::headers::www_authenticate::bearer::Bearer;
use anyhow::anyhow;
use jwt::JWTAuth;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;
use tracing_actix_web::RootSpan;
use wallet_repo::user_repo::{Role, UserId, UserRepo, UserRepoError};

pub mod handlers;
pub mod jwt;
pub mod password;

/// The caller of an authenticated request with the roles currently stored for them.
#[derive(Clone, PartialEq, Debug)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub roles: BTreeSet<Role>,
}

impl AuthenticatedUser {
    pub fn require(&self, role: Role) -> Result<(), HandlerError> {
        if self.roles.contains(&role) {
            Ok(())
        } else {
            Err(HandlerError::MissingRole(role))
        }
    }
}

/// Validates credentials using [JWTAuth] and loads the token's user, with its current roles, from
/// the [UserRepo]. If valid, injects the [AuthenticatedUser] into the request and the user id into
/// the [RootSpan]
pub async fn credentials_validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let validated = req
        .app_data::<JWTAuth>()
        .map(|jwt_auth| jwt_auth.validate_token(credentials.token()));
    let Some(Ok(user_id)) = validated else {
        return Err((invalid_token(), req));
    };
    let Some(user_repo) = req.app_data::<web::Data<Arc<dyn UserRepo>>>().cloned() else {
        let error = HandlerError::Other(anyhow!("UserRepo not configured"));
        return Err((error.into(), req));
    };

    let user = match user_repo.get_user(user_id).await {
        Ok(user) => user,
        Err(UserRepoError::UserNotFound(_)) => {
            warn!(user_id, "Token of a user that no longer exists");
            return Err((invalid_token(), req));
        }
        Err(e) => return Err((HandlerError::from(e).into(), req)),
    };

    if let Some(root_span) = req.extensions().get::<RootSpan>() {
        root_span.record("user_id", &user.id);
    }
    req.extensions_mut().insert(AuthenticatedUser {
        id: user.id,
        roles: user.roles,
    });
    Ok(req)
}

fn invalid_token() -> Error {
    let challenge = Bearer::build().error(bearer::Error::InvalidToken).finish();
    AuthenticationError::new(challenge).into()
}

/// Routes that do not need a token.
pub fn public_service(cfg: &mut web::ServiceConfig, signups_enabled: bool) {
    cfg.service(handlers::get_token);
    if signups_enabled {
        cfg.service(handlers::register);
    }
}

#[cfg(test)]
mod tests {
    use super::{credentials_validator, AuthenticatedUser};
    use crate::auth::jwt::JWTAuth;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use actix_web::web::Data;
    use actix_web::{http, test, web, App, HttpResponse, Responder};
    use actix_web_httpauth::middleware::HttpAuthentication;
    use rstest::fixture;
    use rstest::rstest;
    use std::collections::BTreeSet;
    use wallet_repo::user_repo::{NewUser, Role, User};
    use wallet_repo::Repos;

    macro_rules! build_service {
        ($jwt_auth:ident, $repos:ident) => {{
            let bearer_auth_middleware = HttpAuthentication::bearer(credentials_validator);
            let app = App::new()
                .app_data($jwt_auth)
                .app_data(Data::new($repos.user_repo.clone()))
                .route("/", web::get().to(return_user))
                .wrap(bearer_auth_middleware);
            test::init_service(app).await
        }};
    }

    #[fixture]
    fn jwt_auth() -> JWTAuth {
        let secret: [u8; 32] = rand::random();
        JWTAuth::from_secret(secret.to_vec())
    }

    #[fixture]
    fn repos() -> Repos {
        wallet_repo::mem_repo::create_repos()
    }

    async fn create_user(repos: &Repos, roles: BTreeSet<Role>) -> User {
        repos
            .user_repo
            .create_user(NewUser::new(
                "member@example.com".to_owned(),
                "hash".to_owned(),
                roles,
            ))
            .await
            .unwrap()
    }

    #[rstest]
    #[actix_rt::test]
    async fn valid_user(jwt_auth: JWTAuth, repos: Repos) {
        let user = create_user(&repos, BTreeSet::from([Role::User])).await;
        let token = jwt_auth.create_token(user.id).unwrap();

        let service = build_service!(jwt_auth, repos);

        let request = TestRequest::get()
            .uri("/")
            .insert_header((
                http::header::AUTHORIZATION,
                (String::from("Bearer ") + &token),
            ))
            .to_request();
        let response = test::call_service(&service, request).await;
        assert!(
            response.status().is_success(),
            "Response status is {}",
            response.status()
        );

        let body = test::read_body(response).await;
        assert_eq!(body, format!("{} {{User}}", user.id))
    }

    #[rstest]
    #[actix_rt::test]
    async fn roles_come_from_the_store(jwt_auth: JWTAuth, repos: Repos) {
        let user = create_user(&repos, BTreeSet::from([Role::User, Role::Admin])).await;
        let token = jwt_auth.create_token(user.id).unwrap();
        repos
            .user_repo
            .update_roles(user.id, &BTreeSet::from([Role::User]))
            .await
            .unwrap();

        let service = build_service!(jwt_auth, repos);

        let request = TestRequest::get()
            .uri("/")
            .insert_header((
                http::header::AUTHORIZATION,
                (String::from("Bearer ") + &token),
            ))
            .to_request();
        let body = test::read_body(test::call_service(&service, request).await).await;
        assert_eq!(body, format!("{} {{User}}", user.id))
    }

    #[rstest]
    #[actix_rt::test]
    async fn token_of_unknown_user(jwt_auth: JWTAuth, repos: Repos) {
        let token = jwt_auth.create_token(42).unwrap();

        let service = build_service!(jwt_auth, repos);

        let request = TestRequest::get()
            .uri("/")
            .insert_header((
                http::header::AUTHORIZATION,
                (String::from("Bearer ") + &token),
            ))
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED)
    }

    #[rstest]
    #[actix_rt::test]
    async fn token_of_other_server(jwt_auth: JWTAuth, repos: Repos) {
        let user = create_user(&repos, BTreeSet::from([Role::User])).await;
        let other_auth = JWTAuth::from_secret(rand::random::<[u8; 32]>().to_vec());
        let token = other_auth.create_token(user.id).unwrap();

        let service = build_service!(jwt_auth, repos);

        let request = TestRequest::get()
            .uri("/")
            .insert_header((
                http::header::AUTHORIZATION,
                (String::from("Bearer ") + &token),
            ))
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED)
    }

    #[rstest]
    #[actix_rt::test]
    async fn no_token(jwt_auth: JWTAuth, repos: Repos) {
        let service = build_service!(jwt_auth, repos);

        let request = TestRequest::get().uri("/").to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED)
    }

    #[::core::prelude::v1::test]
    fn require_role() {
        let user = AuthenticatedUser {
            id: 1,
            roles: BTreeSet::from([Role::User]),
        };
        assert!(user.require(Role::User).is_ok());
        assert!(user.require(Role::Admin).is_err());
    }

    async fn return_user(user: web::ReqData<AuthenticatedUser>) -> impl Responder {
        HttpResponse::Ok().body(format!("{} {:?}", user.id, user.roles))
    }
}
