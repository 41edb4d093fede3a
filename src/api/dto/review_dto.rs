//! Review request DTOs.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{NewReview, ReviewFilter};
use crate::error::BookingError;

/// Request body for `POST /api/reviews`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    /// Service being reviewed.
    pub service_id: Uuid,
    /// Appointment the review came from, if any.
    #[serde(default)]
    pub appointment_id: Option<Uuid>,
    /// Star rating, 1 through 5.
    pub rating: i32,
    /// Free-form comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl CreateReviewRequest {
    /// Validates and converts into the domain input for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for a rating outside 1..=5.
    pub fn into_new_review(self, user_id: Uuid) -> Result<NewReview, BookingError> {
        if !(1..=5).contains(&self.rating) {
            return Err(BookingError::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        Ok(NewReview {
            user_id,
            service_id: self.service_id,
            appointment_id: self.appointment_id,
            rating: self.rating,
            comment: self.comment,
        })
    }
}

/// Query parameters for `GET /api/reviews`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListQuery {
    /// Restrict to one service.
    #[serde(default)]
    pub service_id: Option<Uuid>,
    /// Restrict to one reviewer.
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

impl From<ReviewListQuery> for ReviewFilter {
    fn from(query: ReviewListQuery) -> Self {
        Self {
            service_id: query.service_id,
            user_id: query.user_id,
        }
    }
}
