pub mod auth;
pub mod checkout;
pub mod offer;
pub mod order;
pub mod seed;
pub mod session;
pub mod ticket;
