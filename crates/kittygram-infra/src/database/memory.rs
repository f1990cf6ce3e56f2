//! In-memory repositories - used as fallback when Postgres is not configured,
//! and as the backing store for API-level tests.
//!
//! Note: data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use kittygram_core::domain::{Post, Session, User};
use kittygram_core::error::RepoError;
use kittygram_core::ports::{
    BaseRepository, PostRepository, SessionRepository, UserRepository,
};

/// In-memory user repository. Enforces the same username uniqueness the
/// database index would.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.store.read().await.len() as u64)
    }

    async fn delete_all(&self) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        let n = store.len() as u64;
        store.clear();
        Ok(n)
    }
}

/// In-memory post repository.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    posts
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.store.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        Ok(newest_first(
            self.store.read().await.values().cloned().collect(),
        ))
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        Ok(newest_first(
            self.store
                .read()
                .await
                .values()
                .filter(|p| p.author_id == author_id)
                .cloned()
                .collect(),
        ))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.store.read().await.len() as u64)
    }

    async fn delete_all(&self) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        let n = store.len() as u64;
        store.clear();
        Ok(n)
    }
}

/// In-memory session repository.
#[derive(Default)]
pub struct InMemorySessionRepository {
    store: RwLock<HashMap<Uuid, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Session, Uuid> for InMemorySessionRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, session: Session) -> Result<Session, RepoError> {
        let mut store = self.store.write().await;
        if store.values().any(|s| s.token == session.token) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        store.insert(session.id, session.clone());
        Ok(session)
    }

    async fn update(&self, session: Session) -> Result<Session, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&session.id) {
            return Err(RepoError::NotFound);
        }
        store.insert(session.id, session.clone());
        Ok(session)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .find(|s| s.token == token)
            .cloned())
    }

    async fn delete_by_token(&self, token: &str) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let id = store
            .values()
            .find(|s| s.token == token)
            .map(|s| s.id);
        if let Some(id) = id {
            store.remove(&id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let repo = InMemoryUserRepository::new();
        let first = User::new("kira".into(), "kira@example.com".into(), "hash".into());
        repo.insert(first).await.unwrap();

        let second = User::new("kira".into(), "other@example.com".into(), "hash".into());
        let err = repo.insert(second).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn user_delete_all_leaves_other_stores_alone() {
        let users = InMemoryUserRepository::new();
        let posts = InMemoryPostRepository::new();

        let user = User::new("kira".into(), "kira@example.com".into(), "hash".into());
        let author_id = user.id;
        users.insert(user).await.unwrap();
        posts
            .insert(Post::new(author_id, "Cat".into(), String::new()))
            .await
            .unwrap();

        assert_eq!(users.delete_all().await.unwrap(), 1);

        // No FK cascade here; dependents must be deleted explicitly.
        assert_eq!(posts.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn posts_come_back_newest_first() {
        let repo = InMemoryPostRepository::new();
        let author = Uuid::new_v4();

        for i in 0..3 {
            let mut post = Post::new(author, format!("post {i}"), String::new());
            post.created_at = chrono::Utc::now() - chrono::Duration::hours(3 - i);
            repo.insert(post).await.unwrap();
        }

        let posts = repo.find_all().await.unwrap();
        assert_eq!(posts.len(), 3);
        assert!(posts.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert_eq!(posts[0].title, "post 2");
    }

    #[tokio::test]
    async fn logout_removes_only_the_matching_session() {
        let repo = InMemorySessionRepository::new();
        let user = Uuid::new_v4();
        let keep = Session::new(user, "keep".into(), chrono::Duration::hours(1));
        let drop = Session::new(user, "drop".into(), chrono::Duration::hours(1));
        repo.insert(keep.clone()).await.unwrap();
        repo.insert(drop).await.unwrap();

        repo.delete_by_token("drop").await.unwrap();
        assert!(repo.find_by_token("drop").await.unwrap().is_none());
        assert!(repo.find_by_token("keep").await.unwrap().is_some());

        // Deleting a token that is already gone is not an error.
        repo.delete_by_token("drop").await.unwrap();
    }
}
