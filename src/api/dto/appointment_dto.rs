//! Appointment request/response DTOs.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{AppointmentChange, AppointmentFilter, AppointmentStatus, NewAppointment};
use crate::error::BookingError;

/// Request body for `POST /api/appointments`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    /// Service to book.
    pub service_id: Uuid,
    /// Desired slot.
    pub date_time: DateTime<Utc>,
    /// Optional customer notes (max 500 chars).
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    /// Validates and converts into the domain input for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for past slots or oversized
    /// notes.
    pub fn into_new_appointment(self, user_id: Uuid) -> Result<NewAppointment, BookingError> {
        if self.date_time <= Utc::now() {
            return Err(BookingError::Validation(
                "dateTime must be in the future".to_string(),
            ));
        }
        if self.notes.as_ref().is_some_and(|n| n.len() > 500) {
            return Err(BookingError::Validation(
                "notes must be at most 500 characters".to_string(),
            ));
        }
        Ok(NewAppointment {
            user_id,
            service_id: self.service_id,
            date_time: self.date_time,
            notes: self.notes,
        })
    }
}

/// Request body for `PATCH /api/appointments/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    /// New status, applied verbatim.
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    /// New slot; reminders are rebuilt from it.
    #[serde(default)]
    pub date_time: Option<DateTime<Utc>>,
}

impl From<UpdateAppointmentRequest> for AppointmentChange {
    fn from(req: UpdateAppointmentRequest) -> Self {
        Self {
            status: req.status,
            date_time: req.date_time,
        }
    }
}

/// Query parameters for `GET /api/appointments`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentListQuery {
    /// Restrict to a single status.
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    /// Inclusive lower bound on the slot.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the slot.
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl From<AppointmentListQuery> for AppointmentFilter {
    fn from(query: AppointmentListQuery) -> Self {
        Self {
            status: query.status,
            start: query.start_date,
            end: query.end_date,
        }
    }
}

/// Query parameters for `GET /api/appointments/availability`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    /// Slot to check.
    pub date_time: DateTime<Utc>,
}

/// Response body for the availability check.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct AvailabilityResponse {
    /// Whether the slot is free.
    pub available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn past_slot_is_rejected() {
        let request = CreateAppointmentRequest {
            service_id: Uuid::new_v4(),
            date_time: Utc::now() - Duration::hours(1),
            notes: None,
        };
        let result = request.into_new_appointment(Uuid::new_v4());
        assert!(matches!(result, Err(BookingError::Validation(_))));
    }

    #[test]
    fn oversized_notes_are_rejected() {
        let request = CreateAppointmentRequest {
            service_id: Uuid::new_v4(),
            date_time: Utc::now() + Duration::days(1),
            notes: Some("x".repeat(501)),
        };
        let result = request.into_new_appointment(Uuid::new_v4());
        assert!(matches!(result, Err(BookingError::Validation(_))));
    }

    #[test]
    fn camel_case_body_deserializes() {
        let json = r#"{
            "serviceId": "8f8e8d8c-0000-4000-8000-000000000001",
            "dateTime": "2026-09-14T10:00:00Z",
            "notes": "window seat please"
        }"#;
        let parsed: Result<CreateAppointmentRequest, _> = serde_json::from_str(json);
        let Ok(parsed) = parsed else {
            unreachable!("body should deserialize");
        };
        assert_eq!(parsed.notes.as_deref(), Some("window seat please"));
    }
}
