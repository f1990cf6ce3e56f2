//! Post CRUD handlers with ownership-based authorization.

use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use uuid::Uuid;

use kittygram_core::domain::{MAX_TITLE_LEN, Post, User};
use kittygram_core::error::MediaError;
use kittygram_core::ports::{
    BaseRepository, ImageKind, MediaStore, PostRepository, UserRepository, sniff_image_kind,
};
use kittygram_shared::dto::{CreatePostRequest, PostResponse, UpdatePostRequest, UserResponse};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Media-relative path prefix for post images.
const IMAGE_PREFIX: &str = "posts";

fn media_url(path: &str) -> String {
    format!("/media/{path}")
}

fn post_response(post: &Post, author: UserResponse, viewer: Option<Uuid>) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title.clone(),
        description: post.description.clone(),
        image: post.image.as_deref().map(media_url),
        author,
        created_at: post.created_at.to_rfc3339(),
        can_edit: post.can_edit(viewer),
    }
}

fn author_fields(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
    }
}

fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::BadRequest(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Decode a base64 image payload (optionally a `data:` URI) and identify it.
fn decode_image(payload: &str) -> AppResult<(Vec<u8>, ImageKind)> {
    let data = if payload.starts_with("data:") {
        payload
            .split_once(',')
            .map(|(_, d)| d)
            .ok_or_else(|| AppError::BadRequest("Malformed data URI".to_string()))?
    } else {
        payload
    };

    let bytes = BASE64
        .decode(data.trim())
        .map_err(|_| AppError::BadRequest("Image must be base64-encoded".to_string()))?;

    let kind = sniff_image_kind(&bytes).ok_or(MediaError::UnsupportedFormat)?;
    Ok((bytes, kind))
}

async fn store_image(state: &AppState, payload: &str) -> AppResult<String> {
    let (bytes, kind) = decode_image(payload)?;
    let path = state
        .media
        .save(IMAGE_PREFIX, kind.extension(), &bytes)
        .await?;
    Ok(path)
}

async fn remove_image(state: &AppState, path: &str) {
    if let Err(e) = state.media.remove(path).await {
        tracing::warn!(path, "Failed to remove stored image: {}", e);
    }
}

/// GET /api/posts - public, newest first
pub async fn list(state: web::Data<AppState>, caller: OptionalIdentity) -> AppResult<HttpResponse> {
    let viewer = caller.0.as_ref().map(|i| i.user_id);
    let posts = state.posts.find_all().await?;

    let mut author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
    author_ids.sort();
    author_ids.dedup();

    let authors: HashMap<Uuid, User> = state
        .users
        .find_by_ids(&author_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let body: Vec<PostResponse> = posts
        .iter()
        .filter_map(|post| match authors.get(&post.author_id) {
            Some(author) => Some(post_response(post, author_fields(author), viewer)),
            None => {
                // Authors cascade-delete their posts, so this is a store anomaly.
                tracing::warn!(post_id = %post.id, "Post without author, skipping");
                None
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/posts/{id} - public
pub async fn retrieve(
    state: web::Data<AppState>,
    caller: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let viewer = caller.0.as_ref().map(|i| i.user_id);

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;

    let author = state
        .users
        .find_by_id(post.author_id)
        .await?
        .ok_or_else(|| AppError::Internal("Post author missing".to_string()))?;

    Ok(HttpResponse::Ok().json(post_response(&post, author_fields(&author), viewer)))
}

/// POST /api/posts - requires session; the author is always the caller.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_title(&req.title)?;

    let mut post = Post::new(
        identity.user_id,
        req.title,
        req.description.unwrap_or_default(),
    );

    if let Some(payload) = &req.image {
        post.image = Some(store_image(&state, payload).await?);
    }

    let post = state.posts.insert(post).await?;

    tracing::debug!(post_id = %post.id, author = %identity.username, "Post created");

    let response = post_response(&post, identity.public_fields(), Some(identity.user_id));
    Ok(HttpResponse::Created().json(response))
}

/// PATCH /api/posts/{id} - owner only; only supplied fields change.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();

    let mut post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;

    if !post.can_edit(Some(identity.user_id)) {
        return Err(AppError::Forbidden(
            "You can only edit your own posts".to_string(),
        ));
    }

    if let Some(title) = req.title {
        validate_title(&title)?;
        post.title = title;
    }
    if let Some(description) = req.description {
        post.description = description;
    }

    // The image is replaced only when one is supplied.
    let mut old_image = None;
    let mut new_image = None;
    if let Some(payload) = &req.image {
        let stored = store_image(&state, payload).await?;
        old_image = post.image.replace(stored.clone());
        new_image = Some(stored);
    }

    let post = match state.posts.update(post).await {
        Ok(post) => post,
        Err(e) => {
            // The freshly stored file is orphaned if the row update failed.
            if let Some(stored) = &new_image {
                remove_image(&state, stored).await;
            }
            return Err(e.into());
        }
    };

    if let Some(old) = old_image {
        remove_image(&state, &old).await;
    }

    let response = post_response(&post, identity.public_fields(), Some(identity.user_id));
    Ok(HttpResponse::Ok().json(response))
}

/// DELETE /api/posts/{id} - owner only.
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;

    if !post.can_edit(Some(identity.user_id)) {
        return Err(AppError::Forbidden(
            "You can only delete your own posts".to_string(),
        ));
    }

    state.posts.delete(id).await?;

    if let Some(image) = &post.image {
        remove_image(&state, image).await;
    }

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/posts/my_posts - the caller's posts, newest first.
pub async fn my_posts(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let posts = state.posts.find_by_author(identity.user_id).await?;

    let body: Vec<PostResponse> = posts
        .iter()
        .map(|post| post_response(post, identity.public_fields(), Some(identity.user_id)))
        .collect();

    Ok(HttpResponse::Ok().json(body))
}
