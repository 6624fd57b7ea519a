use gatepass_domain::id::OrderId;
use gatepass_domain::role::Role;
use gatepass_tickets::domain::entropy::OsEntropy;
use gatepass_tickets::domain::types::User;
use gatepass_tickets::error::TicketingError;
use gatepass_tickets::usecase::checkout::{CartLine, CheckoutInput, CheckoutOutput, CheckoutUseCase};
use gatepass_tickets::usecase::order::{
    DeleteOrderUseCase, ListOrderTicketsUseCase, ListOrdersUseCase,
};
use gatepass_tickets::usecase::ticket::VerifyTicketUseCase;

use crate::helpers::{EchoQr, MemoryDb, TestClock, t0};

async fn buy(db: &MemoryDb, user: &User, items: Vec<CartLine>) -> CheckoutOutput {
    CheckoutUseCase {
        offers: db.clone(),
        orders: db.clone(),
        qr: EchoQr,
        entropy: OsEntropy,
        clock: TestClock::at(t0()),
    }
    .execute(CheckoutInput {
        user: user.clone(),
        items,
    })
    .await
    .unwrap()
}

fn tickets_uc(db: &MemoryDb) -> ListOrderTicketsUseCase<MemoryDb, MemoryDb, MemoryDb> {
    ListOrderTicketsUseCase {
        orders: db.clone(),
        tickets: db.clone(),
        offers: db.clone(),
    }
}

#[tokio::test]
async fn should_list_only_own_orders_newest_first() {
    let db = MemoryDb::new();
    let alice = db.add_user("alice@example.com", &[Role::User]);
    let bob = db.add_user("bob@example.com", &[Role::User]);
    let solo = db.add_offer("SOLO", true);
    let one = || {
        vec![CartLine {
            offer_id: solo.id,
            quantity: 1,
        }]
    };

    let first = buy(&db, &alice, one()).await;
    buy(&db, &bob, one()).await;
    let second = buy(&db, &alice, one()).await;

    let orders = ListOrdersUseCase { orders: db.clone() }
        .execute(&alice)
        .await
        .unwrap();
    let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![second.order_id, first.order_id]);
    assert!(orders.iter().all(|o| o.user_id == alice.id));
}

#[tokio::test]
async fn should_list_order_tickets_with_offer_names() {
    let db = MemoryDb::new();
    let alice = db.add_user("alice@example.com", &[Role::User]);
    let solo = db.add_offer("SOLO", true);
    let duo = db.add_offer("DUO", true);

    let output = buy(
        &db,
        &alice,
        vec![
            CartLine {
                offer_id: solo.id,
                quantity: 1,
            },
            CartLine {
                offer_id: duo.id,
                quantity: 2,
            },
        ],
    )
    .await;

    let listed = tickets_uc(&db)
        .execute(&alice, output.order_id)
        .await
        .unwrap();
    let names: Vec<Option<String>> = listed.iter().map(|t| t.offer_name.clone()).collect();
    assert_eq!(
        names,
        vec![
            Some("Offer SOLO".to_owned()),
            Some("Offer DUO".to_owned()),
            Some("Offer DUO".to_owned()),
        ]
    );
    let keys: Vec<&str> = listed.iter().map(|t| t.ticket.final_key.as_str()).collect();
    let issued: Vec<&str> = output.tickets.iter().map(|t| t.final_key.as_str()).collect();
    assert_eq!(keys, issued, "listed in issuance order");
}

#[tokio::test]
async fn should_forbid_listing_another_users_order() {
    let db = MemoryDb::new();
    let alice = db.add_user("alice@example.com", &[Role::User]);
    let bob = db.add_user("bob@example.com", &[Role::User]);
    let solo = db.add_offer("SOLO", true);
    let output = buy(
        &db,
        &alice,
        vec![CartLine {
            offer_id: solo.id,
            quantity: 1,
        }],
    )
    .await;

    let result = tickets_uc(&db).execute(&bob, output.order_id).await;
    assert!(
        matches!(result, Err(TicketingError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );

    let missing = tickets_uc(&db).execute(&alice, OrderId(9_999)).await;
    assert!(
        matches!(missing, Err(TicketingError::OrderNotFound)),
        "expected OrderNotFound, got {missing:?}"
    );
}

#[tokio::test]
async fn should_delete_order_with_its_tickets() {
    let db = MemoryDb::new();
    let alice = db.add_user("alice@example.com", &[Role::User]);
    let family = db.add_offer("FAMILY", true);
    let output = buy(
        &db,
        &alice,
        vec![CartLine {
            offer_id: family.id,
            quantity: 3,
        }],
    )
    .await;
    assert_eq!(db.ticket_count(), 3);

    let uc = DeleteOrderUseCase { orders: db.clone() };
    uc.execute(output.order_id).await.unwrap();

    assert_eq!(db.order_count(), 0);
    assert_eq!(db.ticket_count(), 0, "tickets go with their order");
    let status = VerifyTicketUseCase { tickets: db.clone() }
        .execute(&output.tickets[0].final_key)
        .await
        .unwrap();
    assert!(!status.valid, "a deleted ticket no longer verifies");

    let again = uc.execute(output.order_id).await;
    assert!(
        matches!(again, Err(TicketingError::OrderNotFound)),
        "expected OrderNotFound, got {again:?}"
    );
}
