//! JWT session-token issuance and validation.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// `iss` claim stamped on every session token.
pub const SESSION_ISSUER: &str = "gatepass";

/// Tolerated clock difference between issuer and validator, in seconds.
pub const CLOCK_SKEW_LEEWAY_SECS: u64 = 30;

/// Errors returned by [`validate_session_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("wrong issuer")]
    WrongIssuer,
    #[error("malformed token")]
    Malformed,
    #[error("token encoding failed")]
    Encoding,
}

/// JWT claims payload of a session token.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user email (the principal) |
/// | `uid` | custom | user id, must match the principal loaded by `sub` |
/// | `roles` | custom | persisted role strings, e.g. `ROLE_ADMIN` |
/// | `iat` / `exp` | `iat` / `exp` | seconds since UNIX epoch |
/// | `iss` | `iss` | always [`SESSION_ISSUER`] |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub uid: i64,
    pub roles: Vec<String>,
    pub iat: u64,
    pub exp: u64,
    pub iss: String,
}

impl SessionClaims {
    pub fn new(email: &str, user_id: i64, roles: Vec<String>, iat: u64, exp: u64) -> Self {
        Self {
            sub: email.to_owned(),
            uid: user_id,
            roles,
            iat,
            exp,
            iss: SESSION_ISSUER.to_owned(),
        }
    }
}

/// Sign claims with HS256.
pub fn issue_session_token(claims: &SessionClaims, secret: &str) -> Result<String, AuthError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "session token encoding failed");
        AuthError::Encoding
    })
}

/// Decode and validate a session token.
///
/// Validation: HS256 signature, `exp`/`sub`/`iss` required, issuer must be
/// [`SESSION_ISSUER`], expiry checked with [`CLOCK_SKEW_LEEWAY_SECS`] leeway.
/// An empty `sub` is rejected as malformed.
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = CLOCK_SKEW_LEEWAY_SECS;
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::WrongIssuer,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    if data.claims.sub.trim().is_empty() {
        return Err(AuthError::Malformed);
    }
    Ok(data.claims)
}
