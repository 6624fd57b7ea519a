use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use gatepass_domain::id::OfferId;
use gatepass_domain::role::Role;

use crate::domain::types::Offer;
use crate::error::TicketingError;
use crate::handlers::identity::CurrentUser;
use crate::state::AppState;
use crate::usecase::offer::{
    CreateOfferUseCase, DeleteOfferUseCase, ListOffersUseCase, OfferInput, SetOfferActiveUseCase,
    UpdateOfferUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    pub id: OfferId,
    pub code: String,
    pub name: String,
    pub description: String,
    pub seats: i32,
    pub price_cents: i32,
    pub active: bool,
}

impl From<Offer> for OfferResponse {
    fn from(offer: Offer) -> Self {
        Self {
            id: offer.id,
            code: offer.code,
            name: offer.name,
            description: offer.description,
            seats: offer.seats,
            price_cents: offer.price_cents,
            active: offer.active,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferRequest {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub seats: i64,
    pub active: Option<bool>,
}

impl From<OfferRequest> for OfferInput {
    fn from(body: OfferRequest) -> Self {
        Self {
            code: body.code,
            name: body.name,
            description: body.description,
            price_cents: body.price_cents,
            seats: body.seats,
            active: body.active,
        }
    }
}

fn to_response(offers: Vec<Offer>) -> Json<Vec<OfferResponse>> {
    Json(offers.into_iter().map(OfferResponse::from).collect())
}

// ── GET /offers (public) ──────────────────────────────────────────────────────

pub async fn list_offers(
    State(state): State<AppState>,
) -> Result<Json<Vec<OfferResponse>>, TicketingError> {
    let usecase = ListOffersUseCase {
        offers: state.offer_repo(),
    };
    Ok(to_response(usecase.execute(true).await?))
}

// ── /admin/offers ─────────────────────────────────────────────────────────────

pub async fn admin_list_offers(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<OfferResponse>>, TicketingError> {
    user.require_any(&[Role::Admin])?;
    let usecase = ListOffersUseCase {
        offers: state.offer_repo(),
    };
    Ok(to_response(usecase.execute(false).await?))
}

pub async fn create_offer(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<OfferRequest>,
) -> Result<(StatusCode, Json<OfferResponse>), TicketingError> {
    user.require_any(&[Role::Admin])?;
    let usecase = CreateOfferUseCase {
        offers: state.offer_repo(),
    };
    let offer = usecase.execute(body.into()).await?;
    Ok((StatusCode::CREATED, Json(offer.into())))
}

pub async fn update_offer(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<OfferId>,
    Json(body): Json<OfferRequest>,
) -> Result<Json<OfferResponse>, TicketingError> {
    user.require_any(&[Role::Admin])?;
    let usecase = UpdateOfferUseCase {
        offers: state.offer_repo(),
    };
    Ok(Json(usecase.execute(id, body.into()).await?.into()))
}

#[derive(Deserialize)]
pub struct SetActiveRequest {
    #[serde(default)]
    pub active: bool,
}

pub async fn set_offer_active(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<OfferId>,
    Json(body): Json<SetActiveRequest>,
) -> Result<Json<OfferResponse>, TicketingError> {
    user.require_any(&[Role::Admin])?;
    let usecase = SetOfferActiveUseCase {
        offers: state.offer_repo(),
    };
    Ok(Json(usecase.execute(id, body.active).await?.into()))
}

pub async fn delete_offer(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<OfferId>,
) -> Result<StatusCode, TicketingError> {
    user.require_any(&[Role::Admin])?;
    let usecase = DeleteOfferUseCase {
        offers: state.offer_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
