//! Service plumbing shared by Gatepass binaries: error rendering, health
//! probes, request ids, tracing setup, env config and serde helpers.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
