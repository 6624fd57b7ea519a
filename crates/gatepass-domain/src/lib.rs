//! Domain types shared across all Gatepass crates.
//!
//! Pure types with no framework dependencies.

pub mod id;
pub mod role;
