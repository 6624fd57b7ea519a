//! `Authorization: Bearer <token>` extractor.

use axum::extract::FromRequestParts;
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::StatusCode;
use http::request::Parts;

/// Raw session token taken from the `Authorization` header.
///
/// Returns 401 if the header is absent, not a bearer credential, or empty.
/// Validation of the token itself is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Extract synchronously and return a 'static future so the impl does not
    // capture the `parts` borrow.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().trim().to_owned())
            .filter(|t| !t.is_empty());

        async move { token.map(Self).ok_or(StatusCode::UNAUTHORIZED) }
    }
}
