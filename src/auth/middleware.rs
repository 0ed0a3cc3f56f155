use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{
    auth::{claims::AuthContext, jwt::JwtKeys},
    error::AppError,
};

pub const AUTH_SCHEME: &str = "Bearer";

/// Pulls the token out of an `Authorization` value of the exact form
/// `Bearer <token>`.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let raw = header
        .filter(|h| !h.is_empty())
        .ok_or(AppError::MissingAuthorization)?;

    let mut parts = raw.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(AUTH_SCHEME), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::MalformedAuthorization),
    }
}

/// Runs the whole gate: header present, well-formed, token valid.
pub fn authorize(header: Option<&str>, keys: &JwtKeys) -> Result<AuthContext, AppError> {
    let token = bearer_token(header)?;
    let claims = keys.validate(token)?;
    Ok(claims.into())
}

/// Rejects the request before any inner handler runs unless it carries a
/// valid bearer token. On success the caller's [`AuthContext`] is stored in
/// the request extensions.
pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = match req.headers().get(AUTHORIZATION) {
        Some(v) => Some(v.to_str().map_err(|_| AppError::MalformedAuthorization)?),
        None => None,
    };
    let ctx = authorize(header, &keys)?;
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

/// Identity of the caller, available on routes behind [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthContext);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::MissingAuthorization)
    }
}
