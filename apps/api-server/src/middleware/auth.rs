//! Session-based authentication extractors.

use std::future::Future;
use std::pin::Pin;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};

use kittygram_core::ports::{AuthError, BaseRepository, SessionRepository};
use kittygram_shared::ErrorResponse;
use kittygram_shared::dto::UserResponse;

use crate::state::AppState;

/// Authenticated caller, resolved from the session table per request.
///
/// Use this in handlers to require an active session:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
    pub email: String,
    /// The session token the caller presented; logout deletes this session.
    pub token: String,
}

impl Identity {
    pub fn public_fields(&self) -> UserResponse {
        UserResponse {
            id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            // Session auth reports both a missing and a dead session as 403,
            // matching the behavior the frontend was written against.
            AuthError::MissingSession => actix_web::http::StatusCode::FORBIDDEN,
            AuthError::InvalidSession => actix_web::http::StatusCode::FORBIDDEN,
            AuthError::InvalidCredentials => actix_web::http::StatusCode::UNAUTHORIZED,
            AuthError::AccountDisabled => actix_web::http::StatusCode::BAD_REQUEST,
            _ => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let error = match &self.0 {
            AuthError::MissingSession => ErrorResponse::forbidden(
                "Authentication required. Provide a Bearer session token.",
            ),
            AuthError::InvalidSession => {
                ErrorResponse::forbidden("Session is invalid or has expired. Please login again.")
            }
            AuthError::InvalidCredentials => ErrorResponse::unauthorized(),
            AuthError::AccountDisabled => ErrorResponse::bad_request("Account is disabled"),
            _ => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                tracing::error!("AppState not found in app data");
                AuthenticationError(AuthError::Internal(
                    "Server configuration error".to_string(),
                ))
            })?;

            let token = token.ok_or(AuthenticationError(AuthError::MissingSession))?;

            let session = state
                .sessions
                .find_by_token(&token)
                .await
                .map_err(|e| AuthenticationError(AuthError::Internal(e.to_string())))?
                .ok_or(AuthenticationError(AuthError::InvalidSession))?;

            if session.is_expired() {
                // Expired rows are reaped lazily, on first use past the deadline.
                if let Err(e) = state.sessions.delete_by_token(&token).await {
                    tracing::warn!("Failed to drop expired session: {}", e);
                }
                return Err(AuthenticationError(AuthError::InvalidSession));
            }

            let user = state
                .users
                .find_by_id(session.user_id)
                .await
                .map_err(|e| AuthenticationError(AuthError::Internal(e.to_string())))?
                .ok_or(AuthenticationError(AuthError::InvalidSession))?;

            if !user.is_active {
                return Err(AuthenticationError(AuthError::InvalidSession));
            }

            Ok(Identity {
                user_id: user.id,
                username: user.username,
                email: user.email,
                token,
            })
        })
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Identity::from_request(req, payload);
        Box::pin(async move { Ok(OptionalIdentity(fut.await.ok())) })
    }
}
