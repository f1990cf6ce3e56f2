//! Database connection management and repositories.

mod connections;
pub mod entity;
mod memory;
mod postgres_base;
pub mod postgres_repo;

pub use connections::{DatabaseConfig, connect};
pub use memory::{InMemoryPostRepository, InMemorySessionRepository, InMemoryUserRepository};
pub use postgres_repo::{
    PostgresPostRepository, PostgresSessionRepository, PostgresUserRepository,
};

#[cfg(test)]
mod tests;
