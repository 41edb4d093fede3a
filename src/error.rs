//! Gateway error types with HTTP status code mapping.
//!
//! [`BookingError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "time slot 2025-06-01 10:00:00 UTC is not available",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`BookingError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category             | HTTP Status               |
/// |-----------|----------------------|---------------------------|
/// | 1000–1999 | Validation/Rejection | 400 Bad Request           |
/// | 2000–2099 | Authentication       | 401 / 403                 |
/// | 2100–2199 | Not Found            | 404 Not Found             |
/// | 3000–3999 | Server               | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Request body or query validation failed.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The requested appointment slot is already taken.
    #[error("time slot {0} is not available")]
    SlotTaken(chrono::DateTime<chrono::Utc>),

    /// Webhook payload signature verification failed.
    #[error("invalid webhook signature: {0}")]
    InvalidSignature(String),

    /// Coupon is unknown, expired, inactive, or exhausted.
    #[error("coupon is not valid: {0}")]
    CouponInvalid(String),

    /// Missing or invalid credentials (session token or cron secret).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not permitted to act on the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Appointment with the given ID was not found.
    #[error("appointment not found: {0}")]
    AppointmentNotFound(uuid::Uuid),

    /// Some other entity was not found.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Payment provider call failed.
    #[error("payment provider error: {0}")]
    Provider(String),

    /// Payment provider credentials are not configured.
    #[error("payment provider is not configured")]
    ProviderNotConfigured,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BookingError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::SlotTaken(_) => 1002,
            Self::InvalidSignature(_) => 1003,
            Self::CouponInvalid(_) => 1004,
            Self::Unauthorized(_) => 2001,
            Self::Forbidden(_) => 2002,
            Self::AppointmentNotFound(_) => 2101,
            Self::NotFound(_) => 2102,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::Provider(_) => 3002,
            Self::ProviderNotConfigured => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::SlotTaken(_)
            | Self::InvalidSignature(_)
            | Self::CouponInvalid(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::AppointmentNotFound(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Persistence(_)
            | Self::Provider(_)
            | Self::ProviderNotConfigured
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server faults are logged in full; the response body stays generic
        // except for the distinctly-reported missing-provider case.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
            match self {
                Self::ProviderNotConfigured => self.to_string(),
                _ => "internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message,
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let err = BookingError::Validation("bad field".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1001);
    }

    #[test]
    fn slot_conflict_maps_to_400() {
        let err = BookingError::SlotTaken(chrono::Utc::now());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1002);
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(
            BookingError::Unauthorized("no token".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BookingError::Forbidden("not yours".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = BookingError::AppointmentNotFound(uuid::Uuid::new_v4());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn server_faults_map_to_500() {
        assert_eq!(
            BookingError::Persistence("db down".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            BookingError::ProviderNotConfigured.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
