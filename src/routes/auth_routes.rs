//! Registration, login and current-user endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::Auth;
use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{PublicUser, Role, User};
use crate::state::AppState;
use crate::store::StoreError;
use crate::utils::http_helpers::HTTPError;

const MIN_PASSWORD_LEN: usize = 6;

/// Registers authentication routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

#[derive(Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
    full_name: String,
    role: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct AuthResponse {
    token: String,
    user: PublicUser,
}

impl RegisterRequest {
    fn validate(&self) -> Result<Role, AppError> {
        if !self.email.contains('@') {
            return Err(AppError::validation("A valid email is required"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if self.full_name.trim().is_empty() {
            return Err(AppError::validation("Full name is required"));
        }
        // Admin accounts are never self-service.
        match self.role.parse::<Role>() {
            Ok(role @ (Role::JobSeeker | Role::Employer)) => Ok(role),
            _ => Err(AppError::validation("Role must be job_seeker or employer")),
        }
    }
}

/// bcrypt is deliberately slow, so it runs off the async workers.
async fn hash_password(auth: Arc<Auth>, password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || auth.credentials.hash(&password))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

async fn verify_password(auth: Arc<Auth>, password: String, digest: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || auth.credentials.verify(&password, &digest))
        .await
        .map_err(|e| AppError::Internal(format!("password check task failed: {}", e)))
}

/// Creates a job seeker or employer account and signs them in.
async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), HTTPError> {
    let Json(body) = body?;
    let role = body.validate()?;
    let email = normalize_email(&body.email);

    if state.store.find_user_by_email(&email).await.map_err(AppError::from)?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()).into());
    }

    let digest = hash_password(state.auth.clone(), body.password).await?;
    let user = User::new(&email, digest, body.full_name.trim().to_string(), role);
    match state.store.insert_user(&user).await {
        Ok(()) => {}
        Err(StoreError::Duplicate(_)) => {
            return Err(AppError::Conflict("Email already registered".to_string()).into())
        }
        Err(e) => return Err(AppError::from(e).into()),
    }

    let token = state.auth.credentials.issue(&user.id).map_err(AppError::from)?;
    info!(user_id = %user.id, role = %user.role, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.public(),
        }),
    ))
}

/// Exchanges an email and password for a bearer token.
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, HTTPError> {
    let Json(body) = body?;
    let email = normalize_email(&body.email);
    let user = state
        .store
        .find_user_by_email(&email)
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(state.auth.clone(), body.password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "Failed login attempt");
        return Err(AppError::InvalidCredentials.into());
    }
    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated").into());
    }

    let token = state.auth.credentials.issue(&user.id).map_err(AppError::from)?;
    info!(user_id = %user.id, "User logged in");
    Ok(Json(AuthResponse {
        token,
        user: user.public(),
    }))
}

/// Returns the caller as the store currently sees them.
async fn me(user: User) -> Json<PublicUser> {
    Json(user.public())
}
