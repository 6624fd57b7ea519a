//! Ticket key derivation.
//!
//! A ticket's `final_key` is `hex(sha256("{user_secret}:{purchase_key}:{offer_id}:{index}"))`.
//! The per-user secret and the per-order purchase key are both random and
//! never exposed, so keys are unpredictable to outsiders yet reproducible
//! from the stored purchase context.

use sha2::{Digest, Sha256};

use gatepass_domain::id::OfferId;

/// Substituted for a missing or blank user secret.
pub const NO_USER_SENTINEL: &str = "nouser";

/// Length of a derived key: 32 digest bytes as lowercase hex.
pub const FINAL_KEY_LEN: usize = 64;

pub fn derive_ticket_key(
    user_secret: Option<&str>,
    purchase_key: &str,
    offer_id: OfferId,
    index: u64,
) -> String {
    let secret = user_secret
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_USER_SENTINEL);
    let material = format!("{secret}:{purchase_key}:{offer_id}:{index}");
    hex::encode(Sha256::digest(material.as_bytes()))
}
