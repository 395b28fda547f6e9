use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E2xxx: Profile errors
/// - E3xxx: Matching errors
/// - E6xxx: Moderation errors
/// - E7xxx: Payment errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    BadRequest,
    StorageUnavailable,

    // Profile (E2xxx)
    ProfileNotFound,
    ProfileAlreadyExists,
    ProfileIncomplete,
    PhotoLimitReached,

    // Matching (E3xxx)
    SwipesExhausted,
    PopulationEmpty,

    // Moderation (E6xxx)
    CannotReportSelf,
    DuplicateReport,

    // Payments (E7xxx)
    InvalidPaymentPayload,
    UnknownPurchaseTier,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::BadRequest => "E0004",
            Self::StorageUnavailable => "E0005",

            // Profile
            Self::ProfileNotFound => "E2001",
            Self::ProfileAlreadyExists => "E2002",
            Self::ProfileIncomplete => "E2003",
            Self::PhotoLimitReached => "E2004",

            // Matching
            Self::SwipesExhausted => "E3001",
            Self::PopulationEmpty => "E3002",

            // Moderation
            Self::CannotReportSelf => "E6001",
            Self::DuplicateReport => "E6002",

            // Payments
            Self::InvalidPaymentPayload => "E7001",
            Self::UnknownPurchaseTier => "E7002",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::StorageUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::InvalidPaymentPayload
            | Self::UnknownPurchaseTier | Self::ProfileIncomplete => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::ProfileNotFound | Self::PopulationEmpty => StatusCode::NOT_FOUND,
            Self::SwipesExhausted => StatusCode::TOO_MANY_REQUESTS,
            Self::ProfileAlreadyExists | Self::DuplicateReport | Self::PhotoLimitReached => {
                StatusCode::CONFLICT
            }
            Self::CannotReportSelf => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known { code: ErrorCode, message: String },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message } => {
                (code.status_code(), ApiErrorResponse::new(code.code(), message))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0005", "storage error"),
                )
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
