use gatepass_domain::role::{Role, RoleSet};

use crate::domain::clock::Clock;
use crate::domain::credential::normalize_email;
use crate::domain::entropy::Entropy;
use crate::domain::repository::{CredentialHasher, OfferRepository, UserRepository};
use crate::domain::types::{NewUser, OfferDraft};
use crate::error::TicketingError;

/// Default catalog inserted into an empty offer table.
pub fn default_offers() -> Vec<OfferDraft> {
    vec![
        OfferDraft {
            code: "SOLO".to_owned(),
            name: "Billet Solo".to_owned(),
            description: "Accès standard pour 1 personne.".to_owned(),
            seats: 1,
            price_cents: 2500,
            active: true,
        },
        OfferDraft {
            code: "DUO".to_owned(),
            name: "Billet Duo".to_owned(),
            description: "Accès pour 2 personnes à tarif avantageux.".to_owned(),
            seats: 2,
            price_cents: 4500,
            active: true,
        },
        OfferDraft {
            code: "FAMILY".to_owned(),
            name: "Pack Familial".to_owned(),
            description: "Formule 4 personnes.".to_owned(),
            seats: 4,
            price_cents: 8000,
            active: true,
        },
    ]
}

pub struct SeedAdminUseCase<U, H, E, C>
where
    U: UserRepository,
    H: CredentialHasher,
    E: Entropy,
    C: Clock,
{
    pub users: U,
    pub hasher: H,
    pub entropy: E,
    pub clock: C,
}

impl<U, H, E, C> SeedAdminUseCase<U, H, E, C>
where
    U: UserRepository,
    H: CredentialHasher,
    E: Entropy,
    C: Clock,
{
    /// Create the admin account unless the email is already registered.
    /// Returns `true` if an account was created.
    pub async fn execute(&self, email: &str, password: &str) -> Result<bool, TicketingError> {
        let email = normalize_email(email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Ok(false);
        }
        let admin = NewUser {
            email,
            password_hash: self.hasher.hash(password).await?,
            first_name: Some("Admin".to_owned()),
            last_name: None,
            k_user: self.entropy.opaque_key(),
            roles: [Role::Admin, Role::User].into_iter().collect::<RoleSet>(),
            created_at: self.clock.now(),
        };
        let admin = self.users.create(&admin).await?;
        tracing::info!(user_id = %admin.id, "admin account seeded");
        Ok(true)
    }
}

pub struct SeedOffersUseCase<F>
where
    F: OfferRepository,
{
    pub offers: F,
}

impl<F> SeedOffersUseCase<F>
where
    F: OfferRepository,
{
    /// Insert [`default_offers`] when the catalog is empty. Returns how many were inserted.
    pub async fn execute(&self) -> Result<usize, TicketingError> {
        if self.offers.count().await? > 0 {
            return Ok(0);
        }
        let drafts = default_offers();
        for draft in &drafts {
            self.offers.create(draft).await?;
        }
        tracing::info!(count = drafts.len(), "default offers seeded");
        Ok(drafts.len())
    }
}
