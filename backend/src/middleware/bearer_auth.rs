//! Authorization gate for bearer-token protected scopes.
//!
//! The middleware runs before any handler in the wrapped scope:
//! - no `Authorization` header: 403 `forbidden`;
//! - a header that is not `Bearer <token>`, or a token that fails
//!   verification or has expired: 401 `unauthorized`;
//! - otherwise the verified [`UserId`] is stored in the request extensions
//!   for the `AuthenticatedUser` extractor.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{Error, HttpMessage, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{Error as DomainError, TokenService, TokenVerification, UserId};

const BEARER_PREFIX: &str = "Bearer ";

/// Middleware factory holding the token verifier.
#[derive(Clone)]
pub struct BearerAuth {
    tokens: Arc<TokenService>,
}

impl BearerAuth {
    /// Gate requests using `tokens` for verification.
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

/// Resolve the caller from request headers.
///
/// Exposed for tests and for adapters that need the same decision without
/// the middleware.
pub fn authorize(headers: &HeaderMap, tokens: &TokenService) -> Result<UserId, DomainError> {
    let Some(header) = headers.get(AUTHORIZATION) else {
        return Err(DomainError::forbidden("no token provided"));
    };
    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| DomainError::unauthorized("malformed authorization header"))?;
    verify_bearer(token, tokens)
}

/// Resolve the caller from a bare token, as carried by the `/ws` query string.
pub fn verify_bearer(token: &str, tokens: &TokenService) -> Result<UserId, DomainError> {
    match tokens.verify(token) {
        TokenVerification::Verified(user_id) => Ok(user_id),
        TokenVerification::Expired => Err(DomainError::unauthorized("token expired")),
        TokenVerification::Invalid => Err(DomainError::unauthorized("invalid token")),
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthMiddleware {
            service: Rc::new(service),
            tokens: Arc::clone(&self.tokens),
        }))
    }
}

/// Service wrapper produced by [`BearerAuth`].
pub struct BearerAuthMiddleware<S> {
    service: Rc<S>,
    tokens: Arc<TokenService>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let tokens = Arc::clone(&self.tokens);
        Box::pin(async move {
            match authorize(req.headers(), &tokens) {
                Ok(user_id) => {
                    req.extensions_mut().insert(user_id);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(error) => {
                    debug!(code = ?error.code(), path = %req.path(), "request rejected by gate");
                    let response = error.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
