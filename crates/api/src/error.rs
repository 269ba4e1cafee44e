use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use taskhub_services::auth::AuthError;
use taskhub_services::dao::base::DaoError;
use taskhub_services::membership::MembershipError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    Internal(String),
    Validation(String),
    InvalidToken(String),
    ExpiredToken(String),
    AlreadyConsumed(String),
    AlreadyMember(String),
    InvalidTarget(String),
    TransferConflict(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // `error` carries the taxonomy kind so clients can branch on it
        // without parsing message text.
        let (status, kind, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation", msg),
            ApiError::InvalidToken(msg) => (StatusCode::BAD_REQUEST, "invalid_token", msg),
            ApiError::ExpiredToken(msg) => (StatusCode::GONE, "expired_token", msg),
            ApiError::AlreadyConsumed(msg) => (StatusCode::GONE, "already_consumed", msg),
            ApiError::AlreadyMember(msg) => (StatusCode::CONFLICT, "already_member", msg),
            ApiError::InvalidTarget(msg) => (StatusCode::CONFLICT, "invalid_target", msg),
            ApiError::TransferConflict(msg) => (StatusCode::CONFLICT, "transfer_conflict", msg),
        };

        let body = ErrorResponse {
            error: kind.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DaoError> for ApiError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            DaoError::DuplicateKey(msg) => ApiError::Conflict(msg),
            DaoError::Forbidden(msg) => ApiError::Forbidden(msg),
            DaoError::Validation(msg) => ApiError::Validation(msg),
            DaoError::Mongo(e) => ApiError::Internal(e.to_string()),
            DaoError::BsonSer(e) => ApiError::Internal(e.to_string()),
            DaoError::BsonDe(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<MembershipError> for ApiError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::Dao(e) => e.into(),
            MembershipError::Forbidden(msg) => ApiError::Forbidden(msg),
            MembershipError::AlreadyMember => {
                ApiError::AlreadyMember("User is already a member of this workspace".to_string())
            }
            MembershipError::InvalidToken => {
                ApiError::InvalidToken("Invite token is invalid".to_string())
            }
            MembershipError::ExpiredToken => {
                ApiError::ExpiredToken("Invite token has expired".to_string())
            }
            MembershipError::AlreadyConsumed => {
                ApiError::AlreadyConsumed("Invite token has already been used".to_string())
            }
            MembershipError::InvalidTarget(msg) => ApiError::InvalidTarget(msg),
            MembershipError::TransferConflict => {
                ApiError::TransferConflict("Workspace ownership changed concurrently".to_string())
            }
            MembershipError::Validation(msg) => ApiError::Validation(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::BadCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            AuthError::BadToken(msg) => ApiError::Unauthorized(msg),
            AuthError::Hash(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}
