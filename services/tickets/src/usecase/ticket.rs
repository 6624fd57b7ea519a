use gatepass_domain::id::TicketId;

use crate::domain::clock::Clock;
use crate::domain::repository::{OrderRepository, QrRenderer, TicketRepository};
use crate::domain::types::{ConsumeOutcome, Ticket, User};
use crate::error::TicketingError;

// ── Verify (read-only) ────────────────────────────────────────────────────────

/// Gate-side lookup. `ticket` is `None` for a blank or unknown key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketStatus {
    pub valid: bool,
    pub ticket: Option<Ticket>,
}

pub struct VerifyTicketUseCase<T>
where
    T: TicketRepository,
{
    pub tickets: T,
}

impl<T> VerifyTicketUseCase<T>
where
    T: TicketRepository,
{
    /// Never mutates. A consumed ticket is still reported as valid, with its
    /// consumption time.
    pub async fn execute(&self, key: &str) -> Result<TicketStatus, TicketingError> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(TicketStatus {
                valid: false,
                ticket: None,
            });
        }
        let ticket = self.tickets.find_by_key(key).await?;
        Ok(TicketStatus {
            valid: ticket.is_some(),
            ticket,
        })
    }
}

// ── Consume (exactly once) ────────────────────────────────────────────────────

pub struct ConsumeTicketUseCase<T, C>
where
    T: TicketRepository,
    C: Clock,
{
    pub tickets: T,
    pub clock: C,
}

impl<T, C> ConsumeTicketUseCase<T, C>
where
    T: TicketRepository,
    C: Clock,
{
    pub async fn execute(&self, key: &str) -> Result<Ticket, TicketingError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(TicketingError::MissingTicketKey);
        }
        match self.tickets.consume_once(key, self.clock.now()).await? {
            ConsumeOutcome::Consumed(ticket) => {
                tracing::info!(ticket_id = %ticket.id, "ticket consumed");
                Ok(ticket)
            }
            ConsumeOutcome::AlreadyConsumed(ticket) => {
                tracing::warn!(
                    ticket_id = %ticket.id,
                    consumed_at = ?ticket.consumed_at,
                    "ticket already consumed"
                );
                Err(TicketingError::TicketAlreadyConsumed)
            }
            ConsumeOutcome::NotFound => Err(TicketingError::TicketNotFound),
        }
    }
}

// ── QR image (owner only) ─────────────────────────────────────────────────────

pub struct TicketQrUseCase<T, R, Q>
where
    T: TicketRepository,
    R: OrderRepository,
    Q: QrRenderer,
{
    pub tickets: T,
    pub orders: R,
    pub qr: Q,
}

impl<T, R, Q> TicketQrUseCase<T, R, Q>
where
    T: TicketRepository,
    R: OrderRepository,
    Q: QrRenderer,
{
    /// PNG of the ticket's key. Other users' tickets are `Forbidden`.
    pub async fn execute(&self, requester: &User, id: TicketId) -> Result<Vec<u8>, TicketingError> {
        let ticket = self
            .tickets
            .find_by_id(id)
            .await?
            .ok_or(TicketingError::TicketNotFound)?;
        let order = self
            .orders
            .find_by_id(ticket.order_id)
            .await?
            .ok_or(TicketingError::TicketNotFound)?;
        if order.user_id != requester.id {
            return Err(TicketingError::Forbidden);
        }
        self.qr.render_png(&ticket.final_key).await
    }
}
