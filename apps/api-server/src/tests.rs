//! API tests over in-memory repositories.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::middleware::NormalizePath;
use actix_web::{App, Error, test, web};
use serde_json::json;

use kittygram_core::domain::Session;
use kittygram_core::ports::{BaseRepository, PostRepository, SessionRepository, UserRepository};
use kittygram_infra::generate_session_token;
use kittygram_shared::dto::{AuthResponse, PostResponse, UserResponse};

use crate::handlers;
use crate::state::AppState;

fn test_state() -> AppState {
    let media_root =
        std::env::temp_dir().join(format!("kittygram-api-test-{}", uuid::Uuid::new_v4()));
    AppState::in_memory(&media_root, chrono::Duration::hours(1))
}

async fn spawn_app(
    state: &AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    test::init_service(
        App::new()
            .wrap(NormalizePath::trim())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes),
    )
    .await
}

fn register_body(username: &str) -> serde_json::Value {
    json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": "pass1234",
        "password_confirm": "pass1234",
    })
}

/// Register a user through the API and return the session response.
async fn register_ok(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error>,
    username: &str,
) -> AuthResponse {
    let req = test::TestRequest::post()
        .uri("/api/auth/register/")
        .set_json(register_body(username))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    test::read_body_json(resp).await
}

async fn create_post_ok(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error>,
    token: &str,
    title: &str,
) -> PostResponse {
    let req = test::TestRequest::post()
        .uri("/api/posts/")
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .set_json(json!({ "title": title, "description": "a cat" }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    test::read_body_json(resp).await
}

#[actix_web::test]
async fn register_creates_user_and_establishes_session() {
    let state = test_state();
    let app = spawn_app(&state).await;

    let auth = register_ok(&app, "u1").await;
    assert_eq!(auth.user.username, "u1");
    assert_eq!(state.users.count().await.unwrap(), 1);

    // The returned token is a live session.
    let req = test::TestRequest::get()
        .uri("/api/auth/me/")
        .insert_header((AUTHORIZATION, format!("Bearer {}", auth.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: UserResponse = test::read_body_json(resp).await;
    assert_eq!(me.username, "u1");
}

#[actix_web::test]
async fn register_password_mismatch_creates_no_user() {
    let state = test_state();
    let app = spawn_app(&state).await;

    let mut body = register_body("u1");
    body["password_confirm"] = json!("different1");
    let req = test::TestRequest::post()
        .uri("/api/auth/register/")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.users.count().await.unwrap(), 0);
}

#[actix_web::test]
async fn register_duplicate_username_is_rejected() {
    let state = test_state();
    let app = spawn_app(&state).await;

    register_ok(&app, "u1").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register/")
        .set_json(register_body("u1"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.users.count().await.unwrap(), 1);
}

#[actix_web::test]
async fn register_with_active_session_is_forbidden() {
    let state = test_state();
    let app = spawn_app(&state).await;

    let auth = register_ok(&app, "u1").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register/")
        .insert_header((AUTHORIZATION, format!("Bearer {}", auth.token)))
        .set_json(register_body("u2"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn login_logout_lifecycle() {
    let state = test_state();
    let app = spawn_app(&state).await;

    let auth = register_ok(&app, "u1").await;

    // Logout terminates the session.
    let req = test::TestRequest::post()
        .uri("/api/auth/logout/")
        .insert_header((AUTHORIZATION, format!("Bearer {}", auth.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // The old token no longer authenticates.
    let req = test::TestRequest::get()
        .uri("/api/auth/me/")
        .insert_header((AUTHORIZATION, format!("Bearer {}", auth.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Fresh login works.
    let req = test::TestRequest::post()
        .uri("/api/auth/login/")
        .set_json(json!({ "username": "u1", "password": "pass1234" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Wrong password is a credentials failure.
    let req = test::TestRequest::post()
        .uri("/api/auth/login/")
        .set_json(json!({ "username": "u1", "password": "wrong-pass" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn expired_session_is_rejected_and_reaped() {
    let state = test_state();
    let app = spawn_app(&state).await;

    let auth = register_ok(&app, "u1").await;

    let token = generate_session_token();
    let expired = Session::new(auth.user.id, token.clone(), chrono::Duration::hours(-1));
    state.sessions.insert(expired).await.unwrap();

    let req = test::TestRequest::get()
        .uri("/api/auth/me/")
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // First use past the deadline removed the row.
    assert!(state.sessions.find_by_token(&token).await.unwrap().is_none());
}

#[actix_web::test]
async fn login_to_disabled_account_is_a_bad_request() {
    let state = test_state();
    let app = spawn_app(&state).await;

    register_ok(&app, "u1").await;

    let mut user = state.users.find_by_username("u1").await.unwrap().unwrap();
    user.is_active = false;
    state.users.update(user).await.unwrap();

    let req = test::TestRequest::post()
        .uri("/api/auth/login/")
        .set_json(json!({ "username": "u1", "password": "pass1234" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unauthenticated_create_is_forbidden() {
    let state = test_state();
    let app = spawn_app(&state).await;

    let req = test::TestRequest::post()
        .uri("/api/posts/")
        .set_json(json!({ "title": "Cat" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(state.posts.count().await.unwrap(), 0);
}

#[actix_web::test]
async fn author_is_forced_to_the_caller() {
    let state = test_state();
    let app = spawn_app(&state).await;

    let auth = register_ok(&app, "u1").await;
    let post = create_post_ok(&app, &auth.token, "Cat").await;

    assert_eq!(post.author.id, auth.user.id);
    assert!(post.can_edit);

    let stored = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.author_id, auth.user.id);
}

#[actix_web::test]
async fn overlong_title_is_rejected() {
    let state = test_state();
    let app = spawn_app(&state).await;

    let auth = register_ok(&app, "u1").await;

    let req = test::TestRequest::post()
        .uri("/api/posts/")
        .insert_header((AUTHORIZATION, format!("Bearer {}", auth.token)))
        .set_json(json!({ "title": "x".repeat(201) }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.posts.count().await.unwrap(), 0);
}

#[actix_web::test]
async fn listing_is_newest_first_with_per_viewer_can_edit() {
    let state = test_state();
    let app = spawn_app(&state).await;

    let a = register_ok(&app, "u1").await;
    let b = register_ok(&app, "u2").await;
    create_post_ok(&app, &a.token, "first").await;
    create_post_ok(&app, &a.token, "second").await;

    // Anonymous: everything visible, nothing editable.
    let req = test::TestRequest::get().uri("/api/posts/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Vec<PostResponse> = test::read_body_json(resp).await;
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "second");
    assert_eq!(posts[1].title, "first");
    assert!(posts.iter().all(|p| !p.can_edit));

    // The author sees can_edit on their own posts.
    let req = test::TestRequest::get()
        .uri("/api/posts/")
        .insert_header((AUTHORIZATION, format!("Bearer {}", a.token)))
        .to_request();
    let posts: Vec<PostResponse> =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert!(posts.iter().all(|p| p.can_edit));

    // A different authenticated user does not.
    let req = test::TestRequest::get()
        .uri("/api/posts/")
        .insert_header((AUTHORIZATION, format!("Bearer {}", b.token)))
        .to_request();
    let posts: Vec<PostResponse> =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert!(posts.iter().all(|p| !p.can_edit));
}

#[actix_web::test]
async fn only_the_author_may_update_or_delete() {
    let state = test_state();
    let app = spawn_app(&state).await;

    let a = register_ok(&app, "u1").await;
    let b = register_ok(&app, "u2").await;
    let post = create_post_ok(&app, &a.token, "Original").await;

    // Another user cannot update...
    let req = test::TestRequest::patch()
        .uri(&format!("/api/posts/{}/", post.id))
        .insert_header((AUTHORIZATION, format!("Bearer {}", b.token)))
        .set_json(json!({ "title": "Hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let stored = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Original");

    // ...nor delete.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}/", post.id))
        .insert_header((AUTHORIZATION, format!("Bearer {}", b.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(state.posts.count().await.unwrap(), 1);

    // The author's partial update touches only the supplied field.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/posts/{}/", post.id))
        .insert_header((AUTHORIZATION, format!("Bearer {}", a.token)))
        .set_json(json!({ "title": "New" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stored = state.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "New");
    assert_eq!(stored.description, "a cat");

    // And the author can delete.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}/", post.id))
        .insert_header((AUTHORIZATION, format!("Bearer {}", a.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(state.posts.count().await.unwrap(), 0);
}

#[actix_web::test]
async fn my_posts_returns_only_the_callers() {
    let state = test_state();
    let app = spawn_app(&state).await;

    let a = register_ok(&app, "u1").await;
    let b = register_ok(&app, "u2").await;
    create_post_ok(&app, &a.token, "a1").await;
    create_post_ok(&app, &a.token, "a2").await;
    create_post_ok(&app, &b.token, "b1").await;

    let req = test::TestRequest::get()
        .uri("/api/posts/my_posts/")
        .insert_header((AUTHORIZATION, format!("Bearer {}", b.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Vec<PostResponse> = test::read_body_json(resp).await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "b1");
}

#[actix_web::test]
async fn unknown_post_id_is_not_found() {
    let state = test_state();
    let app = spawn_app(&state).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}/", uuid::Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn uploaded_image_is_stored_and_served() {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;

    let state = test_state();
    let app = spawn_app(&state).await;
    let auth = register_ok(&app, "u1").await;

    let png: &[u8] = b"\x89PNG\r\n\x1a\n0000";
    let payload = format!("data:image/png;base64,{}", BASE64.encode(png));

    let req = test::TestRequest::post()
        .uri("/api/posts/")
        .insert_header((AUTHORIZATION, format!("Bearer {}", auth.token)))
        .set_json(json!({ "title": "Cat", "image": payload }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: PostResponse = test::read_body_json(resp).await;

    let url = post.image.expect("image url");
    assert!(url.starts_with("/media/posts/"));
    assert!(url.ends_with(".png"));

    let req = test::TestRequest::get().uri(&url).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "image/png"
    );
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], png);
}
