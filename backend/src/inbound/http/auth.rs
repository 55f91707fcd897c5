//! Caller identity for handlers behind the bearer-token gate.
//!
//! [`crate::middleware::BearerAuth`] stores the verified [`UserId`] in the
//! request extensions; handlers read it back through [`AuthenticatedUser`].

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{Ready, ready};

use crate::domain::{Error, UserId};

/// Extractor yielding the user the request was authorized for.
///
/// Fails with `401 unauthorized` when the handler is mounted outside the
/// gate, so a wiring mistake never serves another user's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// The verified user id.
    pub fn user_id(&self) -> &UserId {
        &self.0
    }

    /// Consume the extractor.
    pub fn into_inner(self) -> UserId {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<UserId>().copied();
        ready(user.map(Self).ok_or_else(|| Error::unauthorized("login required")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn reads_user_from_extensions() {
        let user = UserId::random();
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(user);

        let extracted = AuthenticatedUser::extract(&req).await.expect("user present");
        assert_eq!(extracted.into_inner(), user);
    }

    #[actix_web::test]
    async fn missing_user_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let err = AuthenticatedUser::extract(&req)
            .await
            .expect_err("no user stored");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
