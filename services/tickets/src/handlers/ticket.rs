use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatepass_domain::id::{OfferId, TicketId};
use gatepass_domain::role::Role;

use crate::error::TicketingError;
use crate::handlers::identity::CurrentUser;
use crate::state::AppState;
use crate::usecase::ticket::{ConsumeTicketUseCase, TicketQrUseCase, VerifyTicketUseCase};

// ── GET /tickets/verify?key= ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    pub key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    pub ticket_id: Option<TicketId>,
    pub offer_id: Option<OfferId>,
    #[serde(serialize_with = "gatepass_core::serde::to_rfc3339_ms_opt")]
    pub consumed_at: Option<DateTime<Utc>>,
}

pub async fn verify_ticket(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<VerifyResponse>, TicketingError> {
    let usecase = VerifyTicketUseCase {
        tickets: state.ticket_repo(),
    };
    let status = usecase.execute(&query.key).await?;
    let ticket = status.ticket.as_ref();
    Ok(Json(VerifyResponse {
        valid: status.valid,
        ticket_id: ticket.map(|t| t.id),
        offer_id: ticket.map(|t| t.offer_id),
        consumed_at: ticket.and_then(|t| t.consumed_at),
    }))
}

// ── POST /tickets/consume ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ConsumeRequest {
    #[serde(default)]
    pub key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeResponse {
    pub ticket_id: TicketId,
    pub offer_id: OfferId,
    #[serde(serialize_with = "gatepass_core::serde::to_rfc3339_ms_opt")]
    pub consumed_at: Option<DateTime<Utc>>,
}

pub async fn consume_ticket(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<ConsumeRequest>,
) -> Result<Json<ConsumeResponse>, TicketingError> {
    user.require_any(&[Role::Agent, Role::Admin])?;
    let usecase = ConsumeTicketUseCase {
        tickets: state.ticket_repo(),
        clock: state.clock(),
    };
    let ticket = usecase.execute(&body.key).await?;
    Ok(Json(ConsumeResponse {
        ticket_id: ticket.id,
        offer_id: ticket.offer_id,
        consumed_at: ticket.consumed_at,
    }))
}

// ── GET /tickets/{ticket_id}/qr.png ───────────────────────────────────────────

pub async fn ticket_qr(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(ticket_id): Path<TicketId>,
) -> Result<impl IntoResponse, TicketingError> {
    let usecase = TicketQrUseCase {
        tickets: state.ticket_repo(),
        orders: state.order_repo(),
        qr: state.qr(),
    };
    let png = usecase.execute(&user, ticket_id).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
