use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        middleware::{require_auth, AuthUser},
        password::{hash_password_blocking, verify_password_blocking},
        repo_types::{CreateUser, NewUser},
    },
    error::AppError,
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route_layer(from_fn_with_state(state.jwt.clone(), require_auth))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Shape checks done before the store is touched. Returns the trimmed
/// name and email.
fn validate_registration(payload: &RegisterRequest) -> Result<(&str, &str), AppError> {
    let name = payload.name.trim();
    let email = payload.email.trim();

    if name.is_empty() {
        return Err(AppError::InvalidPayload("Name is required".into()));
    }
    if !is_valid_email(email) {
        return Err(AppError::InvalidPayload("Invalid email".into()));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidPayload(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok((name, email))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let Json(payload) = payload?;
    let (name, email) = validate_registration(&payload).map_err(|e| {
        warn!(error = %e, "invalid registration payload");
        e
    })?;

    // Early exit only; the unique index settles concurrent registrations.
    if state.users.find_by_email(email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::EmailAlreadyRegistered);
    }

    let password_hash = hash_password_blocking(payload.password.clone()).await?;
    let new_user = NewUser {
        email: email.to_string(),
        name: name.to_string(),
        password_hash,
        avatar: name.chars().next().map(String::from),
    };

    let user = match state.users.create(new_user).await? {
        CreateUser::Created(u) => u,
        CreateUser::ConflictExists => {
            warn!(email = %email, "email registered concurrently");
            return Err(AppError::EmailAlreadyRegistered);
        }
    };

    let token = state.jwt.issue(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(payload) = payload?;
    let email = payload.email.trim();

    if email.is_empty() || payload.password.is_empty() {
        warn!("login with missing email or password");
        return Err(AppError::InvalidPayload(
            "Email and password are required".into(),
        ));
    }
    if !is_valid_email(email) {
        warn!("login with malformed email");
        return Err(AppError::InvalidPayload("Invalid email".into()));
    }

    let user = match state.users.find_by_email(email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    let matches =
        verify_password_blocking(payload.password.clone(), user.password_hash.clone()).await?;
    if !matches {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.jwt.issue(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = state
        .users
        .find_by_id(ctx.user_id)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;
    Ok(Json(user.into()))
}
