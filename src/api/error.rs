//! Unified API error handling
//!
//! This module provides a consistent error response format across all API endpoints.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use uuid::Uuid;

use crate::crawler::CrawlError;
use crate::db::DbError;
use crate::service::ScanServiceError;

/// Standard error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always false on the error path; mirrors the success envelope
    pub success: bool,
    /// Human-readable error message
    pub error: String,
    /// Unique request ID for tracing
    pub request_id: String,
}

/// Unified API error type
///
/// All API endpoints should return `Result<T, ApiError>` for consistent error handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Bad request / validation error (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Audit or crawl stage failed (500)
    #[error("Scan failed: {0}")]
    ScanFailed(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    #[allow(dead_code)] // Reserved for handlers without a narrower kind
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ScanFailed(_) | ApiError::Database(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::ScanFailed(_) => "scan_failed",
            ApiError::Database(_) => "database_error",
            ApiError::Internal(_) => "internal_error",
        };

        tracing::error!(
            error_type = error_type,
            status = status.as_u16(),
            message = %self,
            "API error"
        );

        HttpResponse::build(status).json(ErrorResponse {
            success: false,
            error: self.to_string(),
            request_id: Uuid::new_v4().to_string(),
        })
    }
}

// ============================================================================
// From conversions for service errors
// ============================================================================

impl From<CrawlError> for ApiError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::InvalidInput(url) => ApiError::BadRequest(format!("invalid url: {}", url)),
            CrawlError::PageLoadBlocked(_) | CrawlError::Browser(_) => {
                ApiError::ScanFailed(err.to_string())
            }
        }
    }
}

impl From<ScanServiceError> for ApiError {
    fn from(err: ScanServiceError) -> Self {
        match err {
            ScanServiceError::InvalidInput(url) => {
                ApiError::BadRequest(format!("invalid url: {}", url))
            }
            ScanServiceError::Audit(e) => ApiError::ScanFailed(e.to_string()),
            ScanServiceError::Persistence(e) => ApiError::Database(e.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::Database(err.to_string())
    }
}
