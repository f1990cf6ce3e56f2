//! SeaORM entities mapping the relational schema to the domain types.

pub mod post;
pub mod session;
pub mod user;
