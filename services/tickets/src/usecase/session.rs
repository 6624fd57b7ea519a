use chrono::{DateTime, Duration, Utc};

use gatepass_auth_types::token::{SessionClaims, issue_session_token, validate_session_token};

use crate::domain::types::User;
use crate::error::TicketingError;

/// Bearer credential handed out after a successful OTP verification.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints and checks HS256 session tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    pub secret: String,
    pub ttl: Duration,
}

impl SessionIssuer {
    pub fn new(secret: impl Into<String>, ttl_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<IssuedSession, TicketingError> {
        let expires_at = now + self.ttl;
        let claims = SessionClaims::new(
            &user.email,
            user.id.0,
            user.roles.to_strings(),
            unix_secs(now),
            unix_secs(expires_at),
        );
        let token = issue_session_token(&claims, &self.secret)
            .map_err(|e| anyhow::anyhow!("issue session token: {e}"))?;
        Ok(IssuedSession { token, expires_at })
    }

    /// Validate signature, issuer and expiry. Every failure is `InvalidToken`.
    pub fn authenticate(&self, token: &str) -> Result<SessionClaims, TicketingError> {
        validate_session_token(token, &self.secret).map_err(|e| {
            tracing::debug!(error = %e, "session token rejected");
            TicketingError::InvalidToken
        })
    }
}

fn unix_secs(at: DateTime<Utc>) -> u64 {
    u64::try_from(at.timestamp()).unwrap_or(0)
}
