use std::sync::Arc;

use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::{info, warn};

use gatepass_core::config::Config;
use gatepass_core::tracing::init_tracing;
use gatepass_tickets::config::TicketsConfig;
use gatepass_tickets::router::build_router;
use gatepass_tickets::state::AppState;
use gatepass_tickets::usecase::seed::{SeedAdminUseCase, SeedOffersUseCase};
use gatepass_tickets::usecase::session::SessionIssuer;
use gatepass_tickets_migration::Migrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = TicketsConfig::from_env();

    let db = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;

    let state = AppState {
        db: Arc::new(db),
        sessions: SessionIssuer::new(config.jwt_secret.clone(), config.jwt_expires_min),
        qr_size: config.qr_size,
    };

    seed(&state, &config).await?;

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.tickets_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("tickets service listening on {addr}");
    axum::serve(listener, router).await?;
    Ok(())
}

async fn seed(state: &AppState, config: &TicketsConfig) -> anyhow::Result<()> {
    match (&config.admin_email, &config.admin_password) {
        (Some(email), Some(password)) => {
            let usecase = SeedAdminUseCase {
                users: state.user_repo(),
                hasher: state.hasher(),
                entropy: state.entropy(),
                clock: state.clock(),
            };
            usecase.execute(email, password).await?;
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("ADMIN_EMAIL and ADMIN_PASSWORD must both be set; admin seeding skipped");
        }
        (None, None) => {}
    }

    if config.seed_offers {
        let usecase = SeedOffersUseCase {
            offers: state.offer_repo(),
        };
        usecase.execute().await?;
    }
    Ok(())
}
