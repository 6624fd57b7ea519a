use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::domain::clock::SystemClock;
use crate::domain::entropy::OsEntropy;
use crate::infra::db::{
    DbOfferRepository, DbOrderRepository, DbOtpChallengeRepository, DbTicketRepository,
    DbUserRepository,
};
use crate::infra::password::Argon2Hasher;
use crate::infra::qr::PngQrRenderer;
use crate::usecase::session::SessionIssuer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub sessions: SessionIssuer,
    pub qr_size: u32,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_repo(&self) -> DbOtpChallengeRepository {
        DbOtpChallengeRepository {
            db: self.db.clone(),
        }
    }

    pub fn offer_repo(&self) -> DbOfferRepository {
        DbOfferRepository {
            db: self.db.clone(),
        }
    }

    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
        }
    }

    pub fn ticket_repo(&self) -> DbTicketRepository {
        DbTicketRepository {
            db: self.db.clone(),
        }
    }

    pub fn hasher(&self) -> Argon2Hasher {
        Argon2Hasher
    }

    pub fn qr(&self) -> PngQrRenderer {
        PngQrRenderer {
            size: self.qr_size,
        }
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock
    }

    pub fn entropy(&self) -> OsEntropy {
        OsEntropy
    }
}
