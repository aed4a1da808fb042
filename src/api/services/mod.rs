pub mod health;
pub mod pending;
