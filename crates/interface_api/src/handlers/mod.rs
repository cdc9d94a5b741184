//! Request handlers, one module per resource family

pub mod audit;
pub mod health;
pub mod party;
pub mod reference;
pub mod relationship;
