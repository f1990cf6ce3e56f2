use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, Session, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Update an existing entity in full.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their unique username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Fetch the users matching the given ids, in no particular order.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    /// Delete every user. Cascading to owned posts and sessions is the
    /// backing store's concern; callers wanting a full wipe delete posts
    /// first.
    async fn delete_all(&self) -> Result<u64, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// All posts, newest first.
    async fn find_all(&self) -> Result<Vec<Post>, RepoError>;

    /// One author's posts, newest first.
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    async fn delete_all(&self) -> Result<u64, RepoError>;
}

/// Session repository.
#[async_trait]
pub trait SessionRepository: BaseRepository<Session, Uuid> {
    /// Look up a session by its opaque token.
    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, RepoError>;

    /// Terminate a session by token. Ok(()) even if it was already gone.
    async fn delete_by_token(&self, token: &str) -> Result<(), RepoError>;
}
