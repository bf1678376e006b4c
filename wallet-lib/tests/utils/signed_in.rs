use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::HttpMessage;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use wallet_lib::auth::AuthenticatedUser;

/// Wallet routes normally sit behind the bearer token check. In tests they are wrapped in
/// [SignedInAs] instead, which hands the wrapped user to every handler without a token.
#[derive(Clone)]
pub struct SignedInAs(pub AuthenticatedUser);

impl<S, B> Transform<S, ServiceRequest> for SignedInAs
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = SignedInService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SignedInService {
            service,
            caller: self.0.clone(),
        }))
    }
}

pub struct SignedInService<S> {
    service: S,
    caller: AuthenticatedUser,
}

impl<S, B> Service<ServiceRequest> for SignedInService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        req.extensions_mut().insert(self.caller.clone());
        Box::pin(self.service.call(req))
    }
}
