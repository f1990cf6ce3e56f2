//! Authentication handlers: register, login, logout, current user.

use actix_web::{HttpResponse, web};

use kittygram_core::domain::{Session, User};
use kittygram_core::ports::{BaseRepository, PasswordService, SessionRepository, UserRepository};
use kittygram_infra::generate_session_token;
use kittygram_shared::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn public_fields(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
    }
}

async fn open_session(state: &AppState, user: &User) -> AppResult<String> {
    let token = generate_session_token();
    let session = Session::new(user.id, token.clone(), state.session_ttl);
    state.sessions.insert(session).await?;
    Ok(token)
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    caller: OptionalIdentity,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    if caller.0.is_some() {
        return Err(AppError::Forbidden(
            "Already authenticated. Logout to register a new account.".to_string(),
        ));
    }

    let req = body.into_inner();

    // Validate input
    if req.username.trim().is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if req.password != req.password_confirm {
        return Err(AppError::BadRequest("Passwords do not match".to_string()));
    }

    // Check if the username is already taken
    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::BadRequest("Username already taken".to_string()));
    }

    // Hash password
    let password_hash = state
        .passwords
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // Create user; a concurrent duplicate surfaces as a constraint error,
    // which maps to 400 like the pre-check above.
    let user = User::new(req.username, req.email, password_hash);
    let user = state.users.insert(user).await?;

    // Registration logs the new user straight in.
    let token = open_session(&state, &user).await?;

    tracing::info!(username = %user.username, "New user registered");

    Ok(HttpResponse::Created().json(AuthResponse {
        user: public_fields(&user),
        token,
        message: Some("User registered and logged in".to_string()),
    }))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = state
        .passwords
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized);
    }

    if !user.is_active {
        return Err(AppError::BadRequest("Account is disabled".to_string()));
    }

    let token = open_session(&state, &user).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: public_fields(&user),
        token,
        message: None,
    }))
}

/// POST /api/auth/logout - Protected route
pub async fn logout(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    state.sessions.delete_by_token(&identity.token).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/auth/me - Protected route
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(identity.public_fields()))
}
