use actix_web::http::StatusCode;
use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tokio_postgres::error::SqlState;

use crate::services::auth_services::AuthError;

/// Every failure a request can surface, domain errors first. Infrastructure
/// variants collapse to 500; the domain ones carry their own status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("username already taken")]
    DuplicateUsername,
    #[error("incorrect username or password")]
    InvalidCredentials,
    #[error("post not found")]
    PostNotFound,
    #[error("you cannot modify this post")]
    Forbidden,
    #[error("you cannot interact with your own post")]
    SelfInteractionForbidden,
    #[error("unsupported image format")]
    UnsupportedImageFormat,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Transient storage faults worth one retry on the interaction upsert
    /// path: a dropped connection, a serialization failure, a deadlock.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Database(e) => {
                e.is_closed()
                    || matches!(
                        e.code(),
                        Some(&SqlState::T_R_SERIALIZATION_FAILURE)
                            | Some(&SqlState::T_R_DEADLOCK_DETECTED)
                    )
            }
            _ => false,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::DuplicateUsername
            | ApiError::SelfInteractionForbidden
            | ApiError::UnsupportedImageFormat
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::PostNotFound => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Auth(e) => match e {
                AuthError::TokenExpired | AuthError::TokenInvalid => StatusCode::UNAUTHORIZED,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Pool(_)
            | ApiError::Database(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("request failed: {}", self);
        }
        let mut builder = HttpResponse::build(status);
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(json!({
            "status": "error",
            "message": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_their_status() {
        assert_eq!(
            ApiError::DuplicateUsername.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::PostNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::SelfInteractionForbidden.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::UnsupportedImageFormat.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn token_errors_are_unauthorized() {
        assert_eq!(
            ApiError::Auth(AuthError::TokenExpired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Auth(AuthError::TokenInvalid).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn unauthorized_responses_advertise_bearer() {
        let resp = ApiError::InvalidCredentials.error_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn non_transient_errors_are_not_retried() {
        assert!(!ApiError::PostNotFound.is_transient());
        assert!(!ApiError::Internal("boom".into()).is_transient());
    }
}
