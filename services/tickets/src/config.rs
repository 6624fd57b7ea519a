use serde::Deserialize;

use gatepass_core::config::Config;

/// Tickets service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketsConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// HMAC secret for signing session tokens. Env var: `JWT_SECRET`.
    pub jwt_secret: String,
    /// Session token lifetime in minutes (default 60). Env var: `JWT_EXPIRES_MIN`.
    #[serde(default = "default_jwt_expires_min")]
    pub jwt_expires_min: i64,
    /// TCP port to listen on (default 3120). Env var: `TICKETS_PORT`.
    #[serde(default = "default_tickets_port")]
    pub tickets_port: u16,
    /// Edge length of rendered QR images in pixels (default 256). Env var: `QR_SIZE`.
    #[serde(default = "default_qr_size")]
    pub qr_size: u32,
    /// Insert the default offer catalog when it is empty. Env var: `SEED_OFFERS`.
    #[serde(default)]
    pub seed_offers: bool,
    /// Bootstrap admin account, created at startup when both are set.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config for TicketsConfig {}

fn default_jwt_expires_min() -> i64 {
    60
}

fn default_tickets_port() -> u16 {
    3120
}

fn default_qr_size() -> u32 {
    256
}
