use gatepass_domain::id::{OfferId, OrderId, TicketId};

use crate::domain::clock::Clock;
use crate::domain::entropy::Entropy;
use crate::domain::key::derive_ticket_key;
use crate::domain::repository::{OfferRepository, OrderRepository, QrRenderer};
use crate::domain::types::{
    MAX_TICKETS_PER_LINE, MAX_TICKETS_PER_ORDER, NewOrder, NewTicket, Offer, User,
};
use crate::error::TicketingError;

pub struct CartLine {
    pub offer_id: OfferId,
    pub quantity: i64,
}

pub struct CheckoutInput {
    pub user: User,
    pub items: Vec<CartLine>,
}

#[derive(Debug)]
pub struct IssuedTicket {
    pub ticket_id: TicketId,
    pub offer_id: OfferId,
    pub final_key: String,
    pub qr_png: Vec<u8>,
}

#[derive(Debug)]
pub struct CheckoutOutput {
    pub order_id: OrderId,
    /// In issuance order.
    pub tickets: Vec<IssuedTicket>,
}

pub struct CheckoutUseCase<F, R, Q, E, C>
where
    F: OfferRepository,
    R: OrderRepository,
    Q: QrRenderer,
    E: Entropy,
    C: Clock,
{
    pub offers: F,
    pub orders: R,
    pub qr: Q,
    pub entropy: E,
    pub clock: C,
}

impl<F, R, Q, E, C> CheckoutUseCase<F, R, Q, E, C>
where
    F: OfferRepository,
    R: OrderRepository,
    Q: QrRenderer,
    E: Entropy,
    C: Clock,
{
    pub async fn execute(&self, input: CheckoutInput) -> Result<CheckoutOutput, TicketingError> {
        // Lines with a non-positive quantity are dropped; nothing left means empty.
        let lines: Vec<(OfferId, u64)> = input
            .items
            .iter()
            .filter_map(|line| {
                u64::try_from(line.quantity)
                    .ok()
                    .filter(|q| *q > 0)
                    .map(|q| (line.offer_id, q))
            })
            .collect();
        if lines.is_empty() {
            return Err(TicketingError::EmptyCart);
        }

        // Bounded before any key is derived or image rendered.
        let mut total: u64 = 0;
        for (offer_id, quantity) in &lines {
            total = total.saturating_add(*quantity);
            if *quantity > MAX_TICKETS_PER_LINE || total > MAX_TICKETS_PER_ORDER {
                tracing::info!(
                    offer_id = %offer_id,
                    quantity,
                    total,
                    "checkout rejected: cart too large"
                );
                return Err(TicketingError::CartTooLarge);
            }
        }

        // Every offer is resolved before anything is derived, rendered or written.
        let mut resolved: Vec<(Offer, u64)> = Vec::with_capacity(lines.len());
        for (offer_id, quantity) in lines {
            let offer = self
                .offers
                .find_by_id(offer_id)
                .await?
                .filter(|o| o.active)
                .ok_or_else(|| {
                    tracing::info!(offer_id = %offer_id, "checkout rejected: offer unavailable");
                    TicketingError::OfferNotFound
                })?;
            resolved.push((offer, quantity));
        }

        let purchase_key = self.entropy.opaque_key();
        let mut new_tickets = Vec::with_capacity(total as usize);
        let mut images = Vec::with_capacity(total as usize);
        let mut index: u64 = 0;
        for (offer, quantity) in &resolved {
            for _ in 0..*quantity {
                let final_key =
                    derive_ticket_key(Some(&input.user.k_user), &purchase_key, offer.id, index);
                index += 1;
                images.push(self.qr.render_png(&final_key).await?);
                new_tickets.push(NewTicket {
                    offer_id: offer.id,
                    final_key,
                });
            }
        }

        let order = NewOrder {
            user_id: input.user.id,
            purchase_key,
            created_at: self.clock.now(),
        };
        let (order, tickets) = self.orders.create_with_tickets(&order, &new_tickets).await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            tickets = tickets.len(),
            "order placed"
        );

        Ok(CheckoutOutput {
            order_id: order.id,
            tickets: tickets
                .into_iter()
                .zip(images)
                .map(|(ticket, qr_png)| IssuedTicket {
                    ticket_id: ticket.id,
                    offer_id: ticket.offer_id,
                    final_key: ticket.final_key,
                    qr_png,
                })
                .collect(),
        })
    }
}
