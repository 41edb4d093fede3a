//! Appointment entity and its lifecycle status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::catalog::Service;

/// Lifecycle status of an appointment.
///
/// Starts at `PENDING`; moves to `CONFIRMED` via deposit or full payment,
/// and to the remaining states by explicit update. Transitions are not
/// validated; any status may be set on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    /// Booked but not yet secured by a payment.
    Pending,
    /// Secured by a deposit or settled payment.
    Confirmed,
    /// Cancelled by the customer.
    Cancelled,
    /// Service was delivered.
    Completed,
    /// Customer did not show up.
    NoShow,
}

impl AppointmentStatus {
    /// Stable TEXT representation stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
            Self::NoShow => "NO_SHOW",
        }
    }

    /// True for the statuses that occupy a booking slot.
    #[must_use]
    pub const fn occupies_slot(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "CANCELLED" => Ok(Self::Cancelled),
            "COMPLETED" => Ok(Self::Completed),
            "NO_SHOW" => Ok(Self::NoShow),
            other => Err(format!("unknown appointment status: {other}")),
        }
    }
}

/// A booked appointment. Never physically deleted; status transitions
/// record its history.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Appointment {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning customer.
    pub user_id: Uuid,
    /// Booked service.
    pub service_id: Uuid,
    /// The slot: scheduled date and time.
    pub date_time: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: AppointmentStatus,
    /// Optional customer notes.
    pub notes: Option<String>,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// An appointment joined with its service, as returned by create/update.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppointmentWithService {
    /// The appointment row.
    #[serde(flatten)]
    pub appointment: Appointment,
    /// The booked service.
    pub service: Service,
}

/// Input for creating an appointment.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    /// Owning customer.
    pub user_id: Uuid,
    /// Service to book.
    pub service_id: Uuid,
    /// Desired slot.
    pub date_time: DateTime<Utc>,
    /// Optional customer notes.
    pub notes: Option<String>,
}

/// Partial update applied by `PATCH /appointments/{id}`.
#[derive(Debug, Clone, Default)]
pub struct AppointmentChange {
    /// New status, set verbatim when present.
    pub status: Option<AppointmentStatus>,
    /// New slot; triggers wholesale reminder replacement.
    pub date_time: Option<DateTime<Utc>>,
}

impl AppointmentChange {
    /// True when the change carries no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.date_time.is_none()
    }
}

/// Filter for listing a customer's appointments.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    /// Restrict to a single status.
    pub status: Option<AppointmentStatus>,
    /// Inclusive lower bound on the slot.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the slot.
    pub end: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
            AppointmentStatus::NoShow,
        ] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("RESCHEDULED".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn only_pending_and_confirmed_occupy_slots() {
        assert!(AppointmentStatus::Pending.occupies_slot());
        assert!(AppointmentStatus::Confirmed.occupies_slot());
        assert!(!AppointmentStatus::Cancelled.occupies_slot());
        assert!(!AppointmentStatus::Completed.occupies_slot());
        assert!(!AppointmentStatus::NoShow.occupies_slot());
    }

    #[test]
    fn wire_format_is_screaming_snake_case() {
        let json = serde_json::to_string(&AppointmentStatus::NoShow);
        assert_eq!(json.ok().as_deref(), Some("\"NO_SHOW\""));
    }
}
