//! Post entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum title length accepted on create/update.
pub const MAX_TITLE_LEN: usize = 200;

/// Post entity - a single image-plus-text entry owned by one user.
///
/// `author_id` is fixed at creation; nothing in the system reassigns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    /// Media-relative path of the stored image (e.g. `posts/<uuid>.jpg`).
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `author_id`.
    pub fn new(author_id: Uuid, title: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            description,
            image: None,
            created_at: Utc::now(),
        }
    }

    /// Whether `viewer` may mutate this post.
    pub fn can_edit(&self, viewer: Option<Uuid>) -> bool {
        viewer == Some(self.author_id)
    }
}
