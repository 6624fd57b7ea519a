pub mod clock;
pub mod credential;
pub mod entropy;
pub mod key;
pub mod repository;
pub mod types;
