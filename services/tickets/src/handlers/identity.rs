//! Authenticated principal extraction.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use gatepass_auth_types::bearer::BearerToken;
use gatepass_domain::role::Role;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::TicketingError;
use crate::state::AppState;

/// The user behind a valid `Authorization: Bearer` session token.
///
/// The token's `sub` is re-resolved against the user store on every request
/// and must belong to the same id as its `uid` claim, so a token outlives
/// neither its account nor an email reassignment.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// `Forbidden` unless the user holds at least one of `roles`.
    pub fn require_any(&self, roles: &[Role]) -> Result<(), TicketingError> {
        if self.0.roles.contains_any(roles) {
            Ok(())
        } else {
            tracing::info!(user_id = %self.0.id, ?roles, "missing required role");
            Err(TicketingError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = TicketingError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state)
            .await
            .map_err(|_| TicketingError::InvalidToken)?;
        let claims = state.sessions.authenticate(&token)?;

        let user = state
            .user_repo()
            .find_by_email(&claims.sub)
            .await?
            .filter(|u| u.id.0 == claims.uid)
            .ok_or_else(|| {
                tracing::info!(uid = claims.uid, "token principal no longer matches");
                TicketingError::InvalidToken
            })?;
        Ok(Self(user))
    }
}
