use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatepass_domain::id::{OfferId, OrderId, TicketId};
use gatepass_domain::role::Role;

use crate::error::TicketingError;
use crate::handlers::identity::CurrentUser;
use crate::state::AppState;
use crate::usecase::checkout::{CartLine, CheckoutInput, CheckoutUseCase};
use crate::usecase::order::{DeleteOrderUseCase, ListOrderTicketsUseCase, ListOrdersUseCase};

// ── POST /checkout ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub offer_id: OfferId,
    pub quantity: i64,
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTicketResponse {
    pub ticket_id: TicketId,
    pub offer_id: OfferId,
    pub qr_image_base64: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub tickets: Vec<IssuedTicketResponse>,
}

pub async fn checkout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, TicketingError> {
    let usecase = CheckoutUseCase {
        offers: state.offer_repo(),
        orders: state.order_repo(),
        qr: state.qr(),
        entropy: state.entropy(),
        clock: state.clock(),
    };
    let out = usecase
        .execute(CheckoutInput {
            user,
            items: body
                .items
                .into_iter()
                .map(|item| CartLine {
                    offer_id: item.offer_id,
                    quantity: item.quantity,
                })
                .collect(),
        })
        .await?;

    Ok(Json(CheckoutResponse {
        order_id: out.order_id,
        tickets: out
            .tickets
            .into_iter()
            .map(|t| IssuedTicketResponse {
                ticket_id: t.ticket_id,
                offer_id: t.offer_id,
                qr_image_base64: STANDARD.encode(t.qr_png),
            })
            .collect(),
    }))
}

// ── GET /orders ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryResponse {
    pub order_id: OrderId,
    #[serde(serialize_with = "gatepass_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<OrderSummaryResponse>>, TicketingError> {
    let usecase = ListOrdersUseCase {
        orders: state.order_repo(),
    };
    let orders = usecase.execute(&user).await?;
    Ok(Json(
        orders
            .into_iter()
            .map(|o| OrderSummaryResponse {
                order_id: o.id,
                created_at: o.created_at,
            })
            .collect(),
    ))
}

// ── GET /orders/{order_id}/tickets ────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTicketResponse {
    pub ticket_id: TicketId,
    pub offer_id: OfferId,
    pub offer_name: Option<String>,
    pub final_key: String,
    #[serde(serialize_with = "gatepass_core::serde::to_rfc3339_ms_opt")]
    pub consumed_at: Option<DateTime<Utc>>,
}

pub async fn list_order_tickets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Vec<OrderTicketResponse>>, TicketingError> {
    let usecase = ListOrderTicketsUseCase {
        orders: state.order_repo(),
        tickets: state.ticket_repo(),
        offers: state.offer_repo(),
    };
    let tickets = usecase.execute(&user, order_id).await?;
    Ok(Json(
        tickets
            .into_iter()
            .map(|t| OrderTicketResponse {
                ticket_id: t.ticket.id,
                offer_id: t.ticket.offer_id,
                offer_name: t.offer_name,
                final_key: t.ticket.final_key,
                consumed_at: t.ticket.consumed_at,
            })
            .collect(),
    ))
}

// ── DELETE /admin/orders/{order_id} ───────────────────────────────────────────

pub async fn delete_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(order_id): Path<OrderId>,
) -> Result<StatusCode, TicketingError> {
    user.require_any(&[Role::Admin])?;
    let usecase = DeleteOrderUseCase {
        orders: state.order_repo(),
    };
    usecase.execute(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
