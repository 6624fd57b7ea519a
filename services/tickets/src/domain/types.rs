use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatepass_domain::id::{OfferId, OrderId, OtpChallengeId, TicketId, UserId};
use gatepass_domain::role::RoleSet;

/// Registered account with its role set.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Key-derivation entropy. Never serialized into any response.
    pub k_user: String,
    pub roles: RoleSet,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub k_user: String,
    pub roles: RoleSet,
    pub created_at: DateTime<Utc>,
}

/// Second-factor login challenge.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub id: OtpChallengeId,
    pub user_id: UserId,
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl OtpChallenge {
    /// Usable iff not consumed and `now` is strictly before expiry.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.consumed_at.is_none() && now < self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct NewOtpChallenge {
    pub user_id: UserId,
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Outbox event for async delivery (e.g. OTP email).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub id: OfferId,
    pub code: String,
    pub name: String,
    pub description: String,
    pub seats: i32,
    pub price_cents: i32,
    pub active: bool,
}

/// Validated offer fields for create and update. `code` is already upper-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferDraft {
    pub code: String,
    pub name: String,
    pub description: String,
    pub seats: i32,
    pub price_cents: i32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Key-derivation entropy. Never serialized into any response.
    pub purchase_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub purchase_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: TicketId,
    pub order_id: OrderId,
    pub offer_id: OfferId,
    pub final_key: String,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn is_live(&self) -> bool {
        self.consumed_at.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewTicket {
    pub offer_id: OfferId,
    pub final_key: String,
}

/// Result of a consume-once attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// This call performed the transition.
    Consumed(Ticket),
    /// Another call got there first; carries the current state.
    AlreadyConsumed(Ticket),
    NotFound,
}

/// Length of an OTP code in decimal digits.
pub const OTP_LEN: usize = 6;

/// OTP time-to-live in seconds.
pub const OTP_TTL_SECS: i64 = 120;

/// Maximum number of active (unconsumed, unexpired) challenges per user.
pub const MAX_ACTIVE_CHALLENGES: u64 = 5;

/// Most tickets a single cart line may ask for.
pub const MAX_TICKETS_PER_LINE: u64 = 10;

/// Most tickets one order may issue across all its lines.
pub const MAX_TICKETS_PER_ORDER: u64 = 20;

/// Outbox event kind consumed by the mailer.
pub const OTP_ISSUED_EVENT: &str = "otp_issued";
