use rand::RngExt;
use uuid::Uuid;

use crate::domain::types::OTP_LEN;

/// Source of secret random values.
pub trait Entropy: Send + Sync {
    /// Zero-padded decimal code, uniform over `000000..=999999`.
    fn otp_code(&self) -> String;

    /// Opaque random token used as a purchase key or per-user secret.
    fn opaque_key(&self) -> String;
}

/// OS-seeded CSPRNG (`rand::rng`) and UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl Entropy for OsEntropy {
    fn otp_code(&self) -> String {
        let n: u32 = rand::rng().random_range(0..1_000_000);
        format!("{n:0width$}", width = OTP_LEN)
    }

    fn opaque_key(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
