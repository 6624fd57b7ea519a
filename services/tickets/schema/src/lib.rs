//! sea-orm entities for the tickets service database.

pub mod offers;
pub mod orders;
pub mod otp_challenges;
pub mod outbox_events;
pub mod tickets;
pub mod user_roles;
pub mod users;
