pub mod auth;
pub mod health;
pub mod identity;
pub mod offer;
pub mod order;
pub mod ticket;
