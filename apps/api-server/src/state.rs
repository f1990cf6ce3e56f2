//! Application state - shared across all handlers.

use std::path::Path;
use std::sync::Arc;

use kittygram_core::ports::{
    MediaStore, PasswordService, PostRepository, SessionRepository, UserRepository,
};
use kittygram_infra::database::{
    InMemoryPostRepository, InMemorySessionRepository, InMemoryUserRepository,
    PostgresPostRepository, PostgresSessionRepository, PostgresUserRepository, connect,
};
use kittygram_infra::{Argon2PasswordService, FsMediaStore};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub media: Arc<dyn MediaStore>,
    pub passwords: Arc<dyn PasswordService>,
    pub session_ttl: chrono::Duration,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        if let Some(db_config) = &config.database {
            match connect(db_config).await {
                Ok(db) => {
                    return Self {
                        users: Arc::new(PostgresUserRepository::new(db.clone())),
                        posts: Arc::new(PostgresPostRepository::new(db.clone())),
                        sessions: Arc::new(PostgresSessionRepository::new(db)),
                        media: Arc::new(FsMediaStore::new(config.media_root.clone())),
                        passwords: Arc::new(Argon2PasswordService::new()),
                        session_ttl: chrono::Duration::hours(config.session_ttl_hours),
                    };
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        Self::in_memory(&config.media_root, chrono::Duration::hours(config.session_ttl_hours))
    }

    /// Fully in-memory state. Fallback when Postgres is unavailable, and the
    /// backing store for API tests.
    pub fn in_memory(media_root: &Path, session_ttl: chrono::Duration) -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            sessions: Arc::new(InMemorySessionRepository::new()),
            media: Arc::new(FsMediaStore::new(media_root.to_path_buf())),
            passwords: Arc::new(Argon2PasswordService::new()),
            session_ttl,
        }
    }
}
