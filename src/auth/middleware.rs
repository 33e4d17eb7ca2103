use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use chrono::Utc;
use futures::future::{ready, LocalBoxFuture, Ready};
use log::debug;

use crate::auth::guard::{authorize, GuardOutcome};
use crate::error::AppError;
use crate::state::AppState;

/// Request interceptor for protected scopes.
///
/// Runs the guard once per request before any handler. On success the caller's
/// `AuthenticatedUserId` is stored in the request extensions and the request
/// continues; otherwise the pipeline stops with a 401.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let state = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state.clone(),
            None => {
                let app_err = AppError::Internal("AppState is not registered".into());
                return Box::pin(async move { Err(app_err.into()) });
            }
        };

        match authorize(req.headers(), &state.tokens, Utc::now()) {
            GuardOutcome::Authorized(user_id) => {
                req.extensions_mut().insert(user_id);
                Box::pin(self.service.call(req))
            }
            GuardOutcome::Rejected(reason) => {
                debug!("rejected {} {}: {:?}", req.method(), req.path(), reason);
                let app_err: AppError = reason.into();
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}
