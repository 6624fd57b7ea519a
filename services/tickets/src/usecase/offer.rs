use gatepass_domain::id::OfferId;

use crate::domain::repository::OfferRepository;
use crate::domain::types::{Offer, OfferDraft};
use crate::error::TicketingError;

pub const MAX_CODE_LEN: usize = 32;
pub const MAX_NAME_LEN: usize = 128;
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// Raw create/update payload before validation.
pub struct OfferInput {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub seats: i64,
    /// Absent means inactive.
    pub active: Option<bool>,
}

impl OfferInput {
    /// Trim fields, upper-case the code and check bounds.
    pub fn into_draft(self) -> Result<OfferDraft, TicketingError> {
        let code = self.code.trim().to_uppercase();
        let name = self.name.trim().to_owned();
        let description = self
            .description
            .map(|d| d.trim().to_owned())
            .unwrap_or_default();

        if code.is_empty() || code.chars().count() > MAX_CODE_LEN {
            return Err(invalid("code must be 1 to 32 characters"));
        }
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(invalid("name must be 1 to 128 characters"));
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(invalid("description must be at most 1024 characters"));
        }
        let seats = i32::try_from(self.seats)
            .ok()
            .filter(|s| *s >= 1)
            .ok_or_else(|| invalid("seats must be at least 1"))?;
        let price_cents = i32::try_from(self.price_cents)
            .ok()
            .filter(|p| *p >= 0)
            .ok_or_else(|| invalid("price must not be negative"))?;

        Ok(OfferDraft {
            code,
            name,
            description,
            seats,
            price_cents,
            active: self.active.unwrap_or(false),
        })
    }
}

fn invalid(reason: &str) -> TicketingError {
    TicketingError::InvalidOffer(reason.to_owned())
}

pub struct ListOffersUseCase<F>
where
    F: OfferRepository,
{
    pub offers: F,
}

impl<F> ListOffersUseCase<F>
where
    F: OfferRepository,
{
    pub async fn execute(&self, active_only: bool) -> Result<Vec<Offer>, TicketingError> {
        self.offers.list(active_only).await
    }
}

pub struct CreateOfferUseCase<F>
where
    F: OfferRepository,
{
    pub offers: F,
}

impl<F> CreateOfferUseCase<F>
where
    F: OfferRepository,
{
    pub async fn execute(&self, input: OfferInput) -> Result<Offer, TicketingError> {
        let draft = input.into_draft()?;
        if self.offers.code_taken(&draft.code, None).await? {
            return Err(TicketingError::OfferCodeTaken);
        }
        let offer = self.offers.create(&draft).await?;
        tracing::info!(offer_id = %offer.id, code = %offer.code, "offer created");
        Ok(offer)
    }
}

pub struct UpdateOfferUseCase<F>
where
    F: OfferRepository,
{
    pub offers: F,
}

impl<F> UpdateOfferUseCase<F>
where
    F: OfferRepository,
{
    pub async fn execute(&self, id: OfferId, input: OfferInput) -> Result<Offer, TicketingError> {
        let draft = input.into_draft()?;
        if self.offers.find_by_id(id).await?.is_none() {
            return Err(TicketingError::OfferNotFound);
        }
        if self.offers.code_taken(&draft.code, Some(id)).await? {
            return Err(TicketingError::OfferCodeTaken);
        }
        self.offers
            .update(id, &draft)
            .await?
            .ok_or(TicketingError::OfferNotFound)
    }
}

pub struct SetOfferActiveUseCase<F>
where
    F: OfferRepository,
{
    pub offers: F,
}

impl<F> SetOfferActiveUseCase<F>
where
    F: OfferRepository,
{
    /// Deactivation only hides the offer; issued tickets are untouched.
    pub async fn execute(&self, id: OfferId, active: bool) -> Result<Offer, TicketingError> {
        let offer = self
            .offers
            .set_active(id, active)
            .await?
            .ok_or(TicketingError::OfferNotFound)?;
        tracing::info!(offer_id = %offer.id, active, "offer activation changed");
        Ok(offer)
    }
}

pub struct DeleteOfferUseCase<F>
where
    F: OfferRepository,
{
    pub offers: F,
}

impl<F> DeleteOfferUseCase<F>
where
    F: OfferRepository,
{
    pub async fn execute(&self, id: OfferId) -> Result<(), TicketingError> {
        if self.offers.find_by_id(id).await?.is_none() {
            return Err(TicketingError::OfferNotFound);
        }
        if self.offers.has_tickets(id).await? {
            return Err(TicketingError::OfferInUse);
        }
        if !self.offers.delete(id).await? {
            return Err(TicketingError::OfferNotFound);
        }
        tracing::info!(offer_id = %id, "offer deleted");
        Ok(())
    }
}
