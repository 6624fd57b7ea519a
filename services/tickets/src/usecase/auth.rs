use chrono::Duration;
use serde_json::json;
use uuid::Uuid;

use gatepass_domain::role::{Role, RoleSet};

use crate::domain::clock::Clock;
use crate::domain::credential::{normalize_email, validate_email, validate_password};
use crate::domain::entropy::Entropy;
use crate::domain::repository::{CredentialHasher, OtpChallengeRepository, UserRepository};
use crate::domain::types::{
    MAX_ACTIVE_CHALLENGES, NewOtpChallenge, NewUser, OTP_ISSUED_EVENT, OTP_TTL_SECS,
    OtpChallenge, OutboxEvent, User,
};
use crate::error::{LoginRejection, OtpRejection, TicketingError};
use crate::usecase::session::{IssuedSession, SessionIssuer};

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// ── Register ──────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct RegisterUseCase<U, H, E, C>
where
    U: UserRepository,
    H: CredentialHasher,
    E: Entropy,
    C: Clock,
{
    pub users: U,
    pub hasher: H,
    pub entropy: E,
    pub clock: C,
}

impl<U, H, E, C> RegisterUseCase<U, H, E, C>
where
    U: UserRepository,
    H: CredentialHasher,
    E: Entropy,
    C: Clock,
{
    pub async fn execute(&self, input: RegisterInput) -> Result<User, TicketingError> {
        let email = normalize_email(&input.email);
        validate_email(&email)?;
        validate_password(&input.password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(TicketingError::EmailAlreadyUsed);
        }

        let user = NewUser {
            email,
            password_hash: self.hasher.hash(&input.password).await?,
            first_name: trimmed(input.first_name),
            last_name: trimmed(input.last_name),
            k_user: self.entropy.opaque_key(),
            roles: [Role::User].into_iter().collect::<RoleSet>(),
            created_at: self.clock.now(),
        };
        // The unique index still catches a concurrent registration.
        let user = self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}

// ── Login (password step) ─────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<U, O, H, E, C>
where
    U: UserRepository,
    O: OtpChallengeRepository,
    H: CredentialHasher,
    E: Entropy,
    C: Clock,
{
    pub users: U,
    pub challenges: O,
    pub hasher: H,
    pub entropy: E,
    pub clock: C,
}

impl<U, O, H, E, C> LoginUseCase<U, O, H, E, C>
where
    U: UserRepository,
    O: OtpChallengeRepository,
    H: CredentialHasher,
    E: Entropy,
    C: Clock,
{
    /// Check the password and issue a fresh OTP challenge. Never returns a credential.
    pub async fn execute(&self, input: LoginInput) -> Result<OtpChallenge, TicketingError> {
        let email = normalize_email(&input.email);

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                // Same hashing cost as a wrong password.
                self.hasher.verify_unknown(&input.password).await;
                tracing::info!("login rejected: unknown user");
                return Err(TicketingError::InvalidCredentials(
                    LoginRejection::UnknownUser,
                ));
            }
        };
        if !self.hasher.verify(&input.password, &user.password_hash).await {
            tracing::info!(user_id = %user.id, "login rejected: wrong password");
            return Err(TicketingError::InvalidCredentials(
                LoginRejection::WrongPassword,
            ));
        }

        let now = self.clock.now();
        let code = self.entropy.otp_code();
        let challenge = NewOtpChallenge {
            user_id: user.id,
            code: code.clone(),
            issued_at: now,
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
        };

        let event_id = Uuid::new_v4();
        let event = OutboxEvent {
            id: event_id,
            kind: OTP_ISSUED_EVENT.to_owned(),
            payload: json!({ "email": user.email, "code": code }),
            idempotency_key: format!("{OTP_ISSUED_EVENT}:{event_id}"),
        };

        let challenge = match self
            .challenges
            .create_with_outbox(&challenge, &event, MAX_ACTIVE_CHALLENGES)
            .await
        {
            Err(TicketingError::TooManyChallenges) => {
                tracing::warn!(user_id = %user.id, "otp challenge limit reached");
                return Err(TicketingError::TooManyChallenges);
            }
            other => other?,
        };
        tracing::info!(
            user_id = %user.id,
            challenge_id = %challenge.id,
            "otp challenge issued"
        );
        Ok(challenge)
    }
}

// ── OTP verification ──────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub email: String,
    pub code: String,
}

pub struct VerifyOtpUseCase<U, O, C>
where
    U: UserRepository,
    O: OtpChallengeRepository,
    C: Clock,
{
    pub users: U,
    pub challenges: O,
    pub clock: C,
    pub sessions: SessionIssuer,
}

impl<U, O, C> VerifyOtpUseCase<U, O, C>
where
    U: UserRepository,
    O: OtpChallengeRepository,
    C: Clock,
{
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<IssuedSession, TicketingError> {
        let email = normalize_email(&input.email);
        let code = input.code.trim();

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| reject(None, OtpRejection::UserNotFound))?;

        // Only the latest challenge counts; older ones are superseded.
        let challenge = self
            .challenges
            .find_latest(user.id)
            .await?
            .ok_or_else(|| reject(Some(&user), OtpRejection::NoChallenge))?;

        let now = self.clock.now();
        if challenge.consumed_at.is_some() {
            return Err(reject(Some(&user), OtpRejection::AlreadyConsumed));
        }
        if !challenge.is_usable(now) {
            return Err(reject(Some(&user), OtpRejection::Expired));
        }
        if challenge.code != code {
            return Err(reject(Some(&user), OtpRejection::CodeMismatch));
        }

        // A racing verification of the same code may have claimed it first.
        if !self.challenges.mark_consumed(challenge.id, now).await? {
            return Err(reject(Some(&user), OtpRejection::AlreadyConsumed));
        }

        let session = self.sessions.issue(&user, now)?;
        tracing::info!(user_id = %user.id, "otp verified, session issued");
        Ok(session)
    }
}

fn reject(user: Option<&User>, reason: OtpRejection) -> TicketingError {
    match user {
        Some(user) => tracing::info!(user_id = %user.id, ?reason, "otp rejected"),
        None => tracing::info!(?reason, "otp rejected"),
    }
    TicketingError::InvalidOtp(reason)
}
