//! # Kittygram Infrastructure
//!
//! Concrete implementations of the ports defined in `kittygram-core`:
//! SeaORM/Postgres repositories (with in-memory fallbacks), Argon2 password
//! hashing, session token generation, and filesystem media storage.

pub mod auth;
pub mod database;
pub mod media;

pub use auth::{Argon2PasswordService, generate_session_token};
pub use database::{
    DatabaseConfig, InMemoryPostRepository, InMemorySessionRepository, InMemoryUserRepository,
    PostgresPostRepository, PostgresSessionRepository, PostgresUserRepository, connect,
};
pub use media::FsMediaStore;
