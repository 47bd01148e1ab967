use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

use crate::search::SearchError;
use crate::sync::SyncError;

/// Structured error response returned by all endpoints on failure.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`,
    /// `UPSTREAM_UNAVAILABLE`, `UPSTREAM_DECODE_ERROR`, `MALFORMED_RECORD`,
    /// `STORAGE_UNAVAILABLE`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "pageSize must be between 1 and 1000")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    UpstreamUnavailable(String),
    UpstreamDecode(String),
    MalformedRecord(String),
    StorageUnavailable(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::UpstreamUnavailable(detail) => {
                tracing::warn!("Judge API unavailable: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        code: "UPSTREAM_UNAVAILABLE",
                        message: "The judge API could not be reached".into(),
                    },
                )
            }
            AppError::UpstreamDecode(detail) => {
                tracing::warn!("Judge API response undecodable: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        code: "UPSTREAM_DECODE_ERROR",
                        message: "The judge API returned an unexpected response".into(),
                    },
                )
            }
            AppError::MalformedRecord(msg) => {
                tracing::warn!("Malformed judge submission: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        code: "MALFORMED_RECORD",
                        message: msg,
                    },
                )
            }
            AppError::StorageUnavailable(detail) => {
                tracing::error!("Database unavailable: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        code: "STORAGE_UNAVAILABLE",
                        message: "The submission store is unavailable".into(),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
                AppError::StorageUnavailable(err.to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::UpstreamUnavailable(_) => AppError::UpstreamUnavailable(err.to_string()),
            SyncError::UpstreamDecode(_) => AppError::UpstreamDecode(err.to_string()),
            SyncError::MalformedRecord(_) => AppError::MalformedRecord(err.to_string()),
            SyncError::StorageUnavailable(_) => AppError::StorageUnavailable(err.to_string()),
            SyncError::StorageWrite(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidPage(msg) => AppError::Validation(msg),
            SearchError::Query(db) => AppError::from(db),
        }
    }
}
