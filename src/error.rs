use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::auth::jwt::TokenError;

/// Every failure a handler or the auth gate can surface to a client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidPayload(String),

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /* Auth gate */
    #[error("missing Authorization header")]
    MissingAuthorization,
    #[error("malformed Authorization header")]
    MalformedAuthorization,
    #[error("invalid or expired token: {0}")]
    InvalidOrExpiredToken(#[from] TokenError),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("search backend failed: {0}")]
    SearchFailed(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyRegistered => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::MissingAuthorization
            | AppError::MalformedAuthorization
            | AppError::InvalidOrExpiredToken(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SearchFailed(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the client. Internal details never leave the process.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidPayload(msg) => msg.clone(),
            AppError::EmailAlreadyRegistered => "Email already registered".into(),
            AppError::InvalidCredentials => "Invalid credentials".into(),
            AppError::MissingAuthorization
            | AppError::MalformedAuthorization
            | AppError::InvalidOrExpiredToken(_) => "Unauthorized".into(),
            AppError::NotFound(what) => (*what).into(),
            AppError::SearchFailed(_) => "Search failed".into(),
            AppError::Internal(_) => "Internal server error".into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rej: JsonRejection) -> Self {
        AppError::InvalidPayload(format!("Invalid request body: {}", rej.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        } else if status == StatusCode::UNAUTHORIZED {
            warn!(reason = %self, "request unauthorized");
        }
        let body = Json(json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_gate_failures_share_one_message() {
        let errs = [
            AppError::MissingAuthorization,
            AppError::MalformedAuthorization,
            AppError::InvalidOrExpiredToken(TokenError::Expired),
            AppError::InvalidOrExpiredToken(TokenError::InvalidSignature),
        ];
        for e in errs {
            assert_eq!(e.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(e.public_message(), "Unauthorized");
        }
    }

    #[test]
    fn internal_errors_hide_details() {
        let e = AppError::Internal(anyhow::anyhow!("connection refused on 10.0.0.3"));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.public_message(), "Internal server error");
    }

    #[test]
    fn invalid_payload_reports_constraint() {
        let e = AppError::InvalidPayload("Password too short".into());
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.public_message(), "Password too short");
    }
}
