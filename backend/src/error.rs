//! Error handling for the Farm Ledger server
//!
//! Provides consistent error responses in Georgian and English

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::{BackendErrorKind, ErrorDetail, ErrorResponse, LedgerViolation};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String, message_ka: String },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_ka: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_ka: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Ledger rules
    #[error("Bin mixing: {0}")]
    Mixing(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("{resource} cannot be deleted, still referenced by {dependents}")]
    DeleteBlocked { resource: String, dependents: String },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: &str, message: &str, message_ka: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
            message_ka: message_ka.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::TokenExpired | AppError::InvalidToken | AppError::Unauthorized { .. } => {
                StatusCode::UNAUTHORIZED
            }
            AppError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AppError::Validation { .. } | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEntry(_) | AppError::Conflict { .. } | AppError::DeleteBlocked { .. } => {
                StatusCode::CONFLICT
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Mixing(_) | AppError::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_) | AppError::Internal(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable code carried in the response body
    pub fn code(&self) -> &'static str {
        match self {
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            AppError::Unauthorized { .. } => "UNAUTHORIZED",
            AppError::Validation { .. } | AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Mixing(_) => shared::MIXING_MARKER,
            AppError::InsufficientStock(_) => shared::INSUFFICIENT_STOCK_MARKER,
            AppError::DeleteBlocked { .. } => "DELETE_BLOCKED",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Internal(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (message_en, message_ka, field) = match self {
            AppError::TokenExpired => (
                "Token has expired".to_string(),
                "სესიის ვადა ამოიწურა".to_string(),
                None,
            ),
            AppError::InvalidToken => (
                "Invalid token".to_string(),
                "ტოკენი არასწორია".to_string(),
                None,
            ),
            AppError::InsufficientPermissions => (
                "You do not have permission to perform this action".to_string(),
                "ამ მოქმედების შესრულების უფლება არ გაქვთ".to_string(),
                None,
            ),
            AppError::Unauthorized { message, message_ka } => (message.clone(), message_ka.clone(), None),
            AppError::Validation {
                field,
                message,
                message_ka,
            } => (message.clone(), message_ka.clone(), Some(field.clone())),
            AppError::ValidationError(msg) => (
                msg.clone(),
                format!("მონაცემები არასწორია: {}", msg),
                None,
            ),
            AppError::DuplicateEntry(field) => (
                format!("A record with this {} already exists", field),
                format!("ჩანაწერი ასეთი {} მნიშვნელობით უკვე არსებობს", field),
                Some(field.clone()),
            ),
            AppError::Conflict {
                resource,
                message,
                message_ka,
            } => (message.clone(), message_ka.clone(), Some(resource.clone())),
            AppError::NotFound(resource) => (
                format!("{} not found", resource),
                format!("{} ვერ მოიძებნა", resource),
                None,
            ),
            AppError::Mixing(msg) => (
                msg.clone(),
                BackendErrorKind::Mixing.message(shared::Language::Georgian).to_string(),
                None,
            ),
            AppError::InsufficientStock(msg) => (
                msg.clone(),
                BackendErrorKind::InsufficientStock
                    .message(shared::Language::Georgian)
                    .to_string(),
                None,
            ),
            AppError::DeleteBlocked { resource, dependents } => (
                format!("{} cannot be deleted while referenced ({})", resource, dependents),
                format!("{} ვერ წაიშლება, მას უკავშირდება: {}", resource, dependents),
                Some(resource.clone()),
            ),
            AppError::DatabaseError(_) => (
                "A database error occurred".to_string(),
                "მონაცემთა ბაზის შეცდომა".to_string(),
                None,
            ),
            AppError::Internal(msg) => (
                msg.clone(),
                "სერვერის შიდა შეცდომა".to_string(),
                None,
            ),
            AppError::InternalError(_) => (
                "An internal server error occurred".to_string(),
                "სერვერის შიდა შეცდომა".to_string(),
                None,
            ),
        };

        ErrorDetail {
            code: self.code().to_string(),
            message_en,
            message_ka,
            field,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!(code = self.code(), "Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: self.detail() })).into_response()
    }
}

/// Postgres errors are classified so trigger rejections and constraint
/// violations reach the client with their own codes
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return AppError::NotFound("Record".to_string());
        }

        let parts = err.as_database_error().map(|db| {
            (
                db.message().to_string(),
                db.code().map(|c| c.into_owned()),
                db.constraint().unwrap_or("record").to_string(),
            )
        });
        let Some((message, code, constraint)) = parts else {
            return AppError::DatabaseError(err);
        };

        match BackendErrorKind::from_message(&message) {
            BackendErrorKind::Mixing => return AppError::Mixing(message),
            BackendErrorKind::InsufficientStock => return AppError::InsufficientStock(message),
            _ => {}
        }

        match code.as_deref() {
            Some("23505") => AppError::DuplicateEntry(constraint),
            Some("23503") if message.contains("still referenced") => AppError::DeleteBlocked {
                resource: constraint,
                dependents: "other records".to_string(),
            },
            Some("23503") => AppError::NotFound(format!("Referenced record ({})", constraint)),
            Some("23514") => AppError::ValidationError(message),
            _ => AppError::DatabaseError(err),
        }
    }
}

impl From<LedgerViolation> for AppError {
    fn from(violation: LedgerViolation) -> Self {
        match violation {
            LedgerViolation::Mixing { .. } => AppError::Mixing(violation.to_string()),
            LedgerViolation::InsufficientStock { .. } => AppError::InsufficientStock(violation.to_string()),
            LedgerViolation::NonPositiveWeight(_) => AppError::validation(
                "weight_kg",
                &violation.to_string(),
                "წონა უნდა იყოს დადებითი",
            ),
            LedgerViolation::InvalidShape { .. } => AppError::ValidationError(violation.to_string()),
            LedgerViolation::Overflow { .. } => AppError::validation(
                "weight_kg",
                &violation.to_string(),
                "წონა დასაშვებ ზღვარს აჭარბებს",
            ),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let first = errors
            .field_errors()
            .into_iter()
            .next()
            .and_then(|(field, errs)| errs.first().map(|e| (field.to_string(), e.clone())));

        match first {
            Some((field, err)) => {
                let message = err
                    .message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", err.code));
                AppError::Validation {
                    message_ka: format!("ველი „{}“ არასწორადაა შევსებული", field),
                    field,
                    message,
                }
            }
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
