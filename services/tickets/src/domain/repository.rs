#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use gatepass_domain::id::{OfferId, OrderId, OtpChallengeId, TicketId, UserId};

use crate::domain::types::{
    ConsumeOutcome, NewOrder, NewOtpChallenge, NewTicket, NewUser, Offer, OfferDraft, Order,
    OtpChallenge, OutboxEvent, Ticket, User,
};
use crate::error::TicketingError;

/// Repository for user accounts and their roles.
pub trait UserRepository: Send + Sync {
    /// Lookup by normalized (trimmed, lower-cased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, TicketingError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, TicketingError>;

    /// Insert the user and its roles atomically.
    /// Fails with [`TicketingError::EmailAlreadyUsed`] on a duplicate email.
    async fn create(&self, user: &NewUser) -> Result<User, TicketingError>;
}

/// Repository for login OTP challenges.
pub trait OtpChallengeRepository: Send + Sync {
    /// Insert a challenge and its delivery outbox event in the same transaction.
    ///
    /// The user's challenges that are unconsumed and unexpired at
    /// `challenge.issued_at` are counted inside that transaction, serialized
    /// per user; at `max_active` or more this fails with
    /// [`TicketingError::TooManyChallenges`] and writes nothing.
    async fn create_with_outbox(
        &self,
        challenge: &NewOtpChallenge,
        event: &OutboxEvent,
        max_active: u64,
    ) -> Result<OtpChallenge, TicketingError>;

    /// Most recently issued challenge for the user (highest id), consumed or not.
    async fn find_latest(&self, user_id: UserId) -> Result<Option<OtpChallenge>, TicketingError>;

    /// Stamp `consumed_at` if still null. Returns `true` only for the caller
    /// that performed the transition.
    async fn mark_consumed(
        &self,
        id: OtpChallengeId,
        now: DateTime<Utc>,
    ) -> Result<bool, TicketingError>;
}

/// Repository for the offer catalog.
pub trait OfferRepository: Send + Sync {
    /// All offers ordered by id; only active ones when `active_only`.
    async fn list(&self, active_only: bool) -> Result<Vec<Offer>, TicketingError>;

    async fn find_by_id(&self, id: OfferId) -> Result<Option<Offer>, TicketingError>;

    /// Whether `code` (upper-cased) is used by an offer other than `except`.
    async fn code_taken(
        &self,
        code: &str,
        except: Option<OfferId>,
    ) -> Result<bool, TicketingError>;

    async fn create(&self, draft: &OfferDraft) -> Result<Offer, TicketingError>;

    /// Returns `None` if the offer does not exist.
    async fn update(&self, id: OfferId, draft: &OfferDraft)
    -> Result<Option<Offer>, TicketingError>;

    /// Returns `None` if the offer does not exist.
    async fn set_active(&self, id: OfferId, active: bool)
    -> Result<Option<Offer>, TicketingError>;

    /// Returns `true` if deleted, `false` if not found.
    async fn delete(&self, id: OfferId) -> Result<bool, TicketingError>;

    async fn has_tickets(&self, id: OfferId) -> Result<bool, TicketingError>;

    async fn count(&self) -> Result<u64, TicketingError>;
}

/// Repository for orders. Owns ticket issuance.
pub trait OrderRepository: Send + Sync {
    /// Insert the order and all its tickets in one transaction; on any failure
    /// nothing is persisted. A `final_key` collision fails with
    /// [`TicketingError::DuplicateTicketKey`]. Tickets come back in input order.
    async fn create_with_tickets(
        &self,
        order: &NewOrder,
        tickets: &[NewTicket],
    ) -> Result<(Order, Vec<Ticket>), TicketingError>;

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, TicketingError>;

    /// The user's orders, newest first.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, TicketingError>;

    /// Delete the order and, by cascade, its tickets. Returns `false` if not found.
    async fn delete(&self, id: OrderId) -> Result<bool, TicketingError>;
}

/// Repository for issued tickets.
pub trait TicketRepository: Send + Sync {
    async fn find_by_key(&self, final_key: &str) -> Result<Option<Ticket>, TicketingError>;

    async fn find_by_id(&self, id: TicketId) -> Result<Option<Ticket>, TicketingError>;

    /// Tickets of one order, ascending id.
    async fn list_by_order(&self, order_id: OrderId) -> Result<Vec<Ticket>, TicketingError>;

    /// Atomically set `consumed_at = now` where the key matches and
    /// `consumed_at` is null. At most one concurrent caller sees `Consumed`.
    async fn consume_once(
        &self,
        final_key: &str,
        now: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, TicketingError>;
}

/// One-way password hashing. Implementations must not block the async runtime.
pub trait CredentialHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String, TicketingError>;

    /// `false` for a wrong password or an unparseable stored hash.
    async fn verify(&self, password: &str, hash: &str) -> bool;

    /// Run one verification against a placeholder hash when no account exists,
    /// at the same cost as [`verify`](Self::verify).
    async fn verify_unknown(&self, password: &str);
}

/// Renders ticket content as a QR code image. Implementations must not block
/// the async runtime.
pub trait QrRenderer: Send + Sync {
    /// PNG bytes encoding `content`.
    async fn render_png(&self, content: &str) -> Result<Vec<u8>, TicketingError>;
}
