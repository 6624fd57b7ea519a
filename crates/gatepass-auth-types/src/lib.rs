//! Session credential types shared by Gatepass services and gate devices.
//!
//! Provides JWT issuance/validation for session tokens and the
//! `BearerToken` extractor for `Authorization: Bearer <token>` headers.

pub mod bearer;
pub mod token;
