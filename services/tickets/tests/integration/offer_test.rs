use gatepass_domain::id::OfferId;
use gatepass_domain::role::Role;
use gatepass_tickets::domain::entropy::OsEntropy;
use gatepass_tickets::domain::repository::UserRepository;
use gatepass_tickets::error::TicketingError;
use gatepass_tickets::usecase::checkout::{CartLine, CheckoutInput, CheckoutUseCase};
use gatepass_tickets::usecase::offer::{
    CreateOfferUseCase, DeleteOfferUseCase, ListOffersUseCase, OfferInput, SetOfferActiveUseCase,
    UpdateOfferUseCase,
};
use gatepass_tickets::usecase::seed::{SeedAdminUseCase, SeedOffersUseCase};

use crate::helpers::{EchoQr, MemoryDb, PlainHasher, ScriptedEntropy, TestClock, t0};

fn input(code: &str) -> OfferInput {
    OfferInput {
        code: code.to_owned(),
        name: "Billet Soirée".to_owned(),
        description: Some("Entrée après 20h".to_owned()),
        price_cents: 1500,
        seats: 1,
        active: Some(true),
    }
}

#[tokio::test]
async fn should_create_offer_with_canonical_code() {
    let db = MemoryDb::new();
    let offer = CreateOfferUseCase { offers: db.clone() }
        .execute(input(" night "))
        .await
        .unwrap();

    assert_eq!(offer.code, "NIGHT");
    assert_eq!(offer.description, "Entrée après 20h");
    assert_eq!(db.offers(), vec![offer]);
}

#[tokio::test]
async fn should_reject_duplicate_code_ignoring_case() {
    let db = MemoryDb::new();
    let uc = CreateOfferUseCase { offers: db.clone() };
    uc.execute(input("NIGHT")).await.unwrap();

    let result = uc.execute(input("Night")).await;
    assert!(
        matches!(result, Err(TicketingError::OfferCodeTaken)),
        "expected OfferCodeTaken, got {result:?}"
    );
    assert_eq!(db.offers().len(), 1);
}

#[tokio::test]
async fn should_reject_invalid_offer_fields() {
    let db = MemoryDb::new();
    let uc = CreateOfferUseCase { offers: db.clone() };

    let result = uc
        .execute(OfferInput {
            name: "   ".to_owned(),
            ..input("NIGHT")
        })
        .await;
    assert!(
        matches!(result, Err(TicketingError::InvalidOffer(_))),
        "expected InvalidOffer, got {result:?}"
    );
    assert!(db.offers().is_empty());
}

#[tokio::test]
async fn should_update_offer_keeping_its_own_code() {
    let db = MemoryDb::new();
    let offer = db.add_offer("SOLO", true);

    let updated = UpdateOfferUseCase { offers: db.clone() }
        .execute(
            offer.id,
            OfferInput {
                price_cents: 2800,
                active: None,
                ..input("solo")
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, offer.id);
    assert_eq!(updated.price_cents, 2800);
    assert!(!updated.active, "omitted active flag means inactive");
}

#[tokio::test]
async fn should_reject_update_to_code_of_another_offer() {
    let db = MemoryDb::new();
    db.add_offer("SOLO", true);
    let duo = db.add_offer("DUO", true);

    let result = UpdateOfferUseCase { offers: db.clone() }
        .execute(duo.id, input("SOLO"))
        .await;
    assert!(
        matches!(result, Err(TicketingError::OfferCodeTaken)),
        "expected OfferCodeTaken, got {result:?}"
    );
}

#[tokio::test]
async fn should_return_not_found_for_unknown_offer() {
    let db = MemoryDb::new();
    let missing = OfferId(404);

    let update = UpdateOfferUseCase { offers: db.clone() }
        .execute(missing, input("X"))
        .await;
    assert!(matches!(update, Err(TicketingError::OfferNotFound)), "got {update:?}");

    let toggle = SetOfferActiveUseCase { offers: db.clone() }
        .execute(missing, true)
        .await;
    assert!(matches!(toggle, Err(TicketingError::OfferNotFound)), "got {toggle:?}");

    let delete = DeleteOfferUseCase { offers: db }.execute(missing).await;
    assert!(matches!(delete, Err(TicketingError::OfferNotFound)), "got {delete:?}");
}

#[tokio::test]
async fn should_hide_deactivated_offer_from_public_list() {
    let db = MemoryDb::new();
    let solo = db.add_offer("SOLO", true);
    db.add_offer("DUO", true);

    SetOfferActiveUseCase { offers: db.clone() }
        .execute(solo.id, false)
        .await
        .unwrap();

    let list = ListOffersUseCase { offers: db.clone() };
    let public: Vec<String> = list
        .execute(true)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.code)
        .collect();
    assert_eq!(public, vec!["DUO"]);
    assert_eq!(list.execute(false).await.unwrap().len(), 2, "admin sees all");
}

#[tokio::test]
async fn should_refuse_to_delete_offer_with_issued_tickets() {
    let db = MemoryDb::new();
    let user = db.add_user("alice@example.com", &[Role::User]);
    let sold = db.add_offer("SOLD", true);
    let unsold = db.add_offer("UNSOLD", true);

    CheckoutUseCase {
        offers: db.clone(),
        orders: db.clone(),
        qr: EchoQr,
        entropy: OsEntropy,
        clock: TestClock::at(t0()),
    }
    .execute(CheckoutInput {
        user,
        items: vec![CartLine {
            offer_id: sold.id,
            quantity: 1,
        }],
    })
    .await
    .unwrap();

    let uc = DeleteOfferUseCase { offers: db.clone() };
    let result = uc.execute(sold.id).await;
    assert!(
        matches!(result, Err(TicketingError::OfferInUse)),
        "expected OfferInUse, got {result:?}"
    );

    uc.execute(unsold.id).await.unwrap();
    let codes: Vec<String> = db.offers().into_iter().map(|o| o.code).collect();
    assert_eq!(codes, vec!["SOLD"]);
}

#[tokio::test]
async fn should_seed_default_offers_only_into_empty_catalog() {
    let db = MemoryDb::new();
    let uc = SeedOffersUseCase { offers: db.clone() };

    assert_eq!(uc.execute().await.unwrap(), 3);
    assert_eq!(uc.execute().await.unwrap(), 0, "second run is a no-op");

    let codes: Vec<String> = db.offers().into_iter().map(|o| o.code).collect();
    assert_eq!(codes, vec!["SOLO", "DUO", "FAMILY"]);
}

#[tokio::test]
async fn should_seed_admin_once_with_admin_and_user_roles() {
    let db = MemoryDb::new();
    let uc = SeedAdminUseCase {
        users: db.clone(),
        hasher: PlainHasher,
        entropy: ScriptedEntropy::with_codes(&[]),
        clock: TestClock::at(t0()),
    };

    assert!(uc.execute(" Admin@Example.com", "Admin!2345").await.unwrap());
    assert!(!uc.execute("admin@example.com", "Other!2345").await.unwrap());

    let admin = db.find_by_email("admin@example.com").await.unwrap().unwrap();
    assert!(admin.roles.contains(Role::Admin));
    assert!(admin.roles.contains(Role::User));
    assert_eq!(admin.password_hash, "plain:Admin!2345");
}
