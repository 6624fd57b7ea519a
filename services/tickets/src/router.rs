use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use gatepass_core::health::healthz;
use gatepass_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    auth::{login, me, register, verify_otp},
    health::readyz,
    offer::{
        admin_list_offers, create_offer, delete_offer, list_offers, set_offer_active,
        update_offer,
    },
    order::{checkout, delete_order, list_order_tickets, list_orders},
    ticket::{consume_ticket, ticket_qr, verify_ticket},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Identity
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/otp/verify", post(verify_otp))
        .route("/me", get(me))
        // Catalog
        .route("/offers", get(list_offers))
        // Orders
        .route("/checkout", post(checkout))
        .route("/orders", get(list_orders))
        .route("/orders/{order_id}/tickets", get(list_order_tickets))
        // Tickets
        .route("/tickets/verify", get(verify_ticket))
        .route("/tickets/consume", post(consume_ticket))
        .route("/tickets/{ticket_id}/qr.png", get(ticket_qr))
        // Admin
        .route("/admin/offers", get(admin_list_offers))
        .route("/admin/offers", post(create_offer))
        .route("/admin/offers/{id}", put(update_offer))
        .route("/admin/offers/{id}", delete(delete_offer))
        .route("/admin/offers/{id}/active", patch(set_offer_active))
        .route("/admin/orders/{order_id}", delete(delete_order))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
