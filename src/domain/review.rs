//! Customer reviews of services.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// A customer review of a service, optionally tied to the appointment
/// it came from.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Review {
    /// Unique identifier.
    pub id: Uuid,
    /// Reviewing customer.
    pub user_id: Uuid,
    /// Reviewed service.
    pub service_id: Uuid,
    /// Appointment the review came from, if any.
    pub appointment_id: Option<Uuid>,
    /// Star rating, 1 through 5.
    pub rating: i32,
    /// Free-form comment.
    pub comment: Option<String>,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a review.
#[derive(Debug, Clone)]
pub struct NewReview {
    /// Reviewing customer.
    pub user_id: Uuid,
    /// Reviewed service.
    pub service_id: Uuid,
    /// Appointment the review came from, if any.
    pub appointment_id: Option<Uuid>,
    /// Star rating, 1 through 5.
    pub rating: i32,
    /// Free-form comment.
    pub comment: Option<String>,
}

/// Filter for listing reviews; fields combine with AND.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewFilter {
    /// Restrict to one service.
    pub service_id: Option<Uuid>,
    /// Restrict to one reviewer.
    pub user_id: Option<Uuid>,
}
