use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::{Value, json};

use gatepass_domain::id::UserId;
use gatepass_domain::role::{Role, RoleSet};
use gatepass_tickets::domain::types::User;
use gatepass_tickets::router::build_router;
use gatepass_tickets::state::AppState;
use gatepass_tickets::usecase::session::SessionIssuer;
use gatepass_tickets_schema::{offers, user_roles, users};

use crate::helpers::test_sessions;

fn server(db: DatabaseConnection) -> TestServer {
    let state = AppState {
        db: Arc::new(db),
        sessions: test_sessions(),
        qr_size: 128,
    };
    TestServer::new(build_router(state)).unwrap()
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn alice() -> User {
    User {
        id: UserId(7),
        email: "alice@example.com".to_owned(),
        password_hash: String::new(),
        first_name: Some("Alice".to_owned()),
        last_name: None,
        k_user: "k".to_owned(),
        roles: [Role::User].into_iter().collect::<RoleSet>(),
        created_at: Utc::now(),
    }
}

/// Mock rows for resolving alice's token back to her account.
fn alice_rows(db: MockDatabase) -> MockDatabase {
    db.append_query_results([vec![users::Model {
        id: 7,
        email: "alice@example.com".to_owned(),
        password_hash: String::new(),
        first_name: Some("Alice".to_owned()),
        last_name: None,
        k_user: "k".to_owned(),
        created_at: Utc::now(),
    }]])
    .append_query_results([vec![user_roles::Model {
        user_id: 7,
        role: "ROLE_USER".to_owned(),
    }]])
}

#[tokio::test]
async fn should_answer_healthz() {
    server(empty_db()).get("/healthz").await.assert_status_ok();
}

#[tokio::test]
async fn should_reject_me_without_token() {
    let response = server(empty_db()).get("/me").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_TOKEN");
}

#[tokio::test]
async fn should_reject_token_signed_with_another_secret() {
    let forged = SessionIssuer::new("not-the-server-secret", 60)
        .issue(&alice(), Utc::now())
        .unwrap();

    let response = server(empty_db())
        .get("/orders")
        .authorization_bearer(forged.token)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_report_blank_key_as_invalid_without_lookup() {
    let response = server(empty_db())
        .get("/tickets/verify")
        .add_query_param("key", "   ")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["valid"], false);
    assert!(body["ticketId"].is_null());
}

#[tokio::test]
async fn should_list_active_offers_in_camel_case() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![offers::Model {
            id: 1,
            code: "SOLO".to_owned(),
            name: "Billet Solo".to_owned(),
            description: "Accès standard pour 1 personne.".to_owned(),
            seats: 1,
            price_cents: 2500,
            active: true,
        }]])
        .into_connection();

    let response = server(db).get("/offers").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body,
        json!([{
            "id": 1,
            "code": "SOLO",
            "name": "Billet Solo",
            "description": "Accès standard pour 1 personne.",
            "seats": 1,
            "priceCents": 2500,
            "active": true,
        }])
    );
}

#[tokio::test]
async fn should_describe_current_user() {
    let db = alice_rows(MockDatabase::new(DatabaseBackend::Postgres)).into_connection();
    let token = test_sessions().issue(&alice(), Utc::now()).unwrap().token;

    let response = server(db).get("/me").authorization_bearer(token).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["firstName"], "Alice");
    assert_eq!(body["roles"], json!(["ROLE_USER"]));
    assert!(body.get("kUser").is_none(), "derivation secret must not leak");
}

#[tokio::test]
async fn should_forbid_consume_for_plain_user() {
    let db = alice_rows(MockDatabase::new(DatabaseBackend::Postgres)).into_connection();
    let token = test_sessions().issue(&alice(), Utc::now()).unwrap().token;

    let response = server(db)
        .post("/tickets/consume")
        .authorization_bearer(token)
        .json(&json!({ "key": "anything" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_forbid_admin_catalog_for_plain_user() {
    let db = alice_rows(MockDatabase::new(DatabaseBackend::Postgres)).into_connection();
    let token = test_sessions().issue(&alice(), Utc::now()).unwrap().token;

    let response = server(db)
        .post("/admin/offers")
        .authorization_bearer(token)
        .json(&json!({
            "code": "VIP",
            "name": "Billet VIP",
            "priceCents": 9900,
            "seats": 1,
        }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}
