use std::collections::HashMap;

use gatepass_domain::id::{OfferId, OrderId};

use crate::domain::repository::{OfferRepository, OrderRepository, TicketRepository};
use crate::domain::types::{Order, Ticket, User};
use crate::error::TicketingError;

pub struct ListOrdersUseCase<R>
where
    R: OrderRepository,
{
    pub orders: R,
}

impl<R> ListOrdersUseCase<R>
where
    R: OrderRepository,
{
    /// The requester's own orders, newest first.
    pub async fn execute(&self, requester: &User) -> Result<Vec<Order>, TicketingError> {
        self.orders.list_by_user(requester.id).await
    }
}

/// A ticket together with the display name of its offer.
#[derive(Debug, Clone)]
pub struct OrderTicket {
    pub ticket: Ticket,
    pub offer_name: Option<String>,
}

pub struct ListOrderTicketsUseCase<R, T, F>
where
    R: OrderRepository,
    T: TicketRepository,
    F: OfferRepository,
{
    pub orders: R,
    pub tickets: T,
    pub offers: F,
}

impl<R, T, F> ListOrderTicketsUseCase<R, T, F>
where
    R: OrderRepository,
    T: TicketRepository,
    F: OfferRepository,
{
    pub async fn execute(
        &self,
        requester: &User,
        order_id: OrderId,
    ) -> Result<Vec<OrderTicket>, TicketingError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(TicketingError::OrderNotFound)?;
        if order.user_id != requester.id {
            return Err(TicketingError::Forbidden);
        }

        let tickets = self.tickets.list_by_order(order.id).await?;
        let mut names: HashMap<OfferId, Option<String>> = HashMap::new();
        let mut out = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let offer_name = match names.get(&ticket.offer_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self
                        .offers
                        .find_by_id(ticket.offer_id)
                        .await?
                        .map(|o| o.name);
                    names.insert(ticket.offer_id, name.clone());
                    name
                }
            };
            out.push(OrderTicket { ticket, offer_name });
        }
        Ok(out)
    }
}

pub struct DeleteOrderUseCase<R>
where
    R: OrderRepository,
{
    pub orders: R,
}

impl<R> DeleteOrderUseCase<R>
where
    R: OrderRepository,
{
    /// Removes the order and all of its tickets.
    pub async fn execute(&self, order_id: OrderId) -> Result<(), TicketingError> {
        if !self.orders.delete(order_id).await? {
            return Err(TicketingError::OrderNotFound);
        }
        tracing::info!(order_id = %order_id, "order deleted");
        Ok(())
    }
}
