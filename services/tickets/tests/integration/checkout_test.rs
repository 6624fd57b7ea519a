use std::collections::HashSet;

use gatepass_domain::id::{OfferId, UserId};
use gatepass_domain::role::Role;
use gatepass_tickets::domain::entropy::{Entropy, OsEntropy};
use gatepass_tickets::domain::key::{FINAL_KEY_LEN, derive_ticket_key};
use gatepass_tickets::domain::repository::OrderRepository;
use gatepass_tickets::domain::types::{
    MAX_TICKETS_PER_LINE, MAX_TICKETS_PER_ORDER, NewOrder, NewTicket,
};
use gatepass_tickets::error::TicketingError;
use gatepass_tickets::usecase::checkout::{CartLine, CheckoutInput, CheckoutUseCase};

use crate::helpers::{CountingQr, EchoQr, MemoryDb, ScriptedEntropy, TestClock, t0};

fn checkout_uc<E: Entropy>(
    db: &MemoryDb,
    entropy: E,
) -> CheckoutUseCase<MemoryDb, MemoryDb, EchoQr, E, TestClock> {
    CheckoutUseCase {
        offers: db.clone(),
        orders: db.clone(),
        qr: EchoQr,
        entropy,
        clock: TestClock::at(t0()),
    }
}

fn counting_uc(
    db: &MemoryDb,
    qr: &CountingQr,
) -> CheckoutUseCase<MemoryDb, MemoryDb, CountingQr, OsEntropy, TestClock> {
    CheckoutUseCase {
        offers: db.clone(),
        orders: db.clone(),
        qr: qr.clone(),
        entropy: OsEntropy,
        clock: TestClock::at(t0()),
    }
}

fn line(offer_id: OfferId, quantity: i64) -> CartLine {
    CartLine { offer_id, quantity }
}

#[tokio::test]
async fn should_issue_one_ticket_per_unit_with_derived_keys() {
    let db = MemoryDb::new();
    let user = db.add_user("alice@example.com", &[Role::User]);
    let solo = db.add_offer("SOLO", true);
    let duo = db.add_offer("DUO", true);

    let output = checkout_uc(&db, ScriptedEntropy::with_codes(&[]))
        .execute(CheckoutInput {
            user: user.clone(),
            items: vec![line(solo.id, 2), line(duo.id, 1)],
        })
        .await
        .unwrap();

    assert_eq!(output.tickets.len(), 3);
    assert_eq!(db.order_count(), 1);
    assert_eq!(db.ticket_count(), 3);

    // ScriptedEntropy hands out "opaque-0" as the first purchase key.
    let expected: Vec<String> = [(solo.id, 0), (solo.id, 1), (duo.id, 2)]
        .into_iter()
        .map(|(offer, index)| derive_ticket_key(Some(&user.k_user), "opaque-0", offer, index))
        .collect();
    let issued: Vec<String> = output.tickets.iter().map(|t| t.final_key.clone()).collect();
    assert_eq!(issued, expected, "keys follow the global issuance index");

    for ticket in &output.tickets {
        assert_eq!(ticket.final_key.len(), FINAL_KEY_LEN);
        assert_eq!(ticket.qr_png, ticket.final_key.as_bytes(), "QR encodes the key");
    }
}

#[tokio::test]
async fn should_reject_empty_cart() {
    let db = MemoryDb::new();
    let user = db.add_user("alice@example.com", &[Role::User]);

    let result = checkout_uc(&db, OsEntropy)
        .execute(CheckoutInput {
            user,
            items: vec![],
        })
        .await;

    assert!(
        matches!(result, Err(TicketingError::EmptyCart)),
        "expected EmptyCart, got {result:?}"
    );
}

#[tokio::test]
async fn should_treat_non_positive_quantities_as_empty() {
    let db = MemoryDb::new();
    let user = db.add_user("alice@example.com", &[Role::User]);
    let solo = db.add_offer("SOLO", true);

    let result = checkout_uc(&db, OsEntropy)
        .execute(CheckoutInput {
            user,
            items: vec![line(solo.id, 0), line(solo.id, -3)],
        })
        .await;

    assert!(
        matches!(result, Err(TicketingError::EmptyCart)),
        "expected EmptyCart, got {result:?}"
    );
    assert_eq!(db.order_count(), 0);
}

#[tokio::test]
async fn should_skip_zero_quantity_lines_among_valid_ones() {
    let db = MemoryDb::new();
    let user = db.add_user("alice@example.com", &[Role::User]);
    let solo = db.add_offer("SOLO", true);
    let duo = db.add_offer("DUO", true);

    let output = checkout_uc(&db, OsEntropy)
        .execute(CheckoutInput {
            user,
            items: vec![line(solo.id, 0), line(duo.id, 2)],
        })
        .await
        .unwrap();

    assert_eq!(output.tickets.len(), 2);
    assert!(output.tickets.iter().all(|t| t.offer_id == duo.id));
}

#[tokio::test]
async fn should_persist_nothing_when_any_offer_is_missing() {
    let db = MemoryDb::new();
    let user = db.add_user("alice@example.com", &[Role::User]);
    let solo = db.add_offer("SOLO", true);

    let result = checkout_uc(&db, OsEntropy)
        .execute(CheckoutInput {
            user,
            items: vec![line(solo.id, 2), line(OfferId(9_999), 1)],
        })
        .await;

    assert!(
        matches!(result, Err(TicketingError::OfferNotFound)),
        "expected OfferNotFound, got {result:?}"
    );
    assert_eq!(db.order_count(), 0, "no order may be left behind");
    assert_eq!(db.ticket_count(), 0, "no ticket may be left behind");
}

#[tokio::test]
async fn should_reject_inactive_offer() {
    let db = MemoryDb::new();
    let user = db.add_user("alice@example.com", &[Role::User]);
    let retired = db.add_offer("RETIRED", false);

    let result = checkout_uc(&db, OsEntropy)
        .execute(CheckoutInput {
            user,
            items: vec![line(retired.id, 1)],
        })
        .await;

    assert!(
        matches!(result, Err(TicketingError::OfferNotFound)),
        "expected OfferNotFound, got {result:?}"
    );
    assert_eq!(db.ticket_count(), 0);
}

#[tokio::test]
async fn should_roll_back_whole_order_on_key_collision() {
    let db = MemoryDb::new();
    let solo = db.add_offer("SOLO", true);
    let order = NewOrder {
        user_id: UserId(1),
        purchase_key: "p".to_owned(),
        created_at: t0(),
    };
    let ticket = |key: &str| NewTicket {
        offer_id: solo.id,
        final_key: key.to_owned(),
    };

    db.create_with_tickets(&order, &[ticket("k1")]).await.unwrap();

    let result = db
        .create_with_tickets(&order, &[ticket("k2"), ticket("k1")])
        .await;
    assert!(
        matches!(result, Err(TicketingError::DuplicateTicketKey)),
        "expected DuplicateTicketKey, got {result:?}"
    );
    assert_eq!(db.order_count(), 1, "failed order must not be stored");
    assert_eq!(db.ticket_count(), 1, "no partial ticket set");
}

#[tokio::test]
async fn should_keep_keys_unique_across_many_checkouts() {
    let db = MemoryDb::new();
    let alice = db.add_user("alice@example.com", &[Role::User]);
    let bob = db.add_user("bob@example.com", &[Role::User]);
    let solo = db.add_offer("SOLO", true);
    let duo = db.add_offer("DUO", true);
    let uc = checkout_uc(&db, OsEntropy);

    let mut keys = HashSet::new();
    for round in 0..25 {
        for user in [&alice, &bob] {
            let output = uc
                .execute(CheckoutInput {
                    user: user.clone(),
                    items: vec![line(solo.id, 1 + round % 3), line(duo.id, 2)],
                })
                .await
                .unwrap();
            for ticket in output.tickets {
                assert!(keys.insert(ticket.final_key), "duplicate final key issued");
            }
        }
    }
    assert_eq!(keys.len(), db.ticket_count());
}

#[tokio::test]
async fn should_reject_oversized_line_before_rendering() {
    let db = MemoryDb::new();
    let user = db.add_user("alice@example.com", &[Role::User]);
    let solo = db.add_offer("SOLO", true);
    let qr = CountingQr::default();

    let result = counting_uc(&db, &qr)
        .execute(CheckoutInput {
            user,
            items: vec![line(solo.id, i64::MAX)],
        })
        .await;

    assert!(
        matches!(result, Err(TicketingError::CartTooLarge)),
        "expected CartTooLarge, got {result:?}"
    );
    assert_eq!(qr.count(), 0, "nothing may be rendered");
    assert_eq!(db.order_count(), 0);
}

#[tokio::test]
async fn should_cap_tickets_across_lines() {
    let db = MemoryDb::new();
    let user = db.add_user("alice@example.com", &[Role::User]);
    let solo = db.add_offer("SOLO", true);
    let duo = db.add_offer("DUO", true);
    let qr = CountingQr::default();
    let uc = counting_uc(&db, &qr);
    let per_line = MAX_TICKETS_PER_LINE as i64;
    let per_order = MAX_TICKETS_PER_ORDER as i64;

    // Every line is within its own limit; only the total is over.
    let over = uc
        .execute(CheckoutInput {
            user: user.clone(),
            items: (0..=per_order).map(|_| line(solo.id, 1)).collect(),
        })
        .await;
    assert!(
        matches!(over, Err(TicketingError::CartTooLarge)),
        "expected CartTooLarge, got {over:?}"
    );
    assert_eq!(qr.count(), 0);

    let at_limit = uc
        .execute(CheckoutInput {
            user,
            items: vec![
                line(solo.id, per_line),
                line(duo.id, per_order - per_line),
            ],
        })
        .await
        .unwrap();
    assert_eq!(at_limit.tickets.len() as i64, per_order);
    assert_eq!(qr.count() as i64, per_order);
}
