//! Reminder schedules derived from an appointment's slot.
//!
//! Every appointment owns exactly three schedule rows, one per
//! [`ReminderKind`]. On reschedule the rows are replaced wholesale from
//! the new slot, never individually shifted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Fixed offsets before the slot at which reminders fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ReminderKind {
    /// 48 hours before the appointment.
    #[serde(rename = "REMINDER_48H")]
    Reminder48h,
    /// 24 hours before the appointment.
    #[serde(rename = "REMINDER_24H")]
    Reminder24h,
    /// 1 hour before the appointment.
    #[serde(rename = "REMINDER_1H")]
    Reminder1h,
}

impl ReminderKind {
    /// All kinds, in firing order.
    pub const ALL: [Self; 3] = [Self::Reminder48h, Self::Reminder24h, Self::Reminder1h];

    /// Stable TEXT representation stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reminder48h => "REMINDER_48H",
            Self::Reminder24h => "REMINDER_24H",
            Self::Reminder1h => "REMINDER_1H",
        }
    }

    /// How long before the slot this reminder fires.
    #[must_use]
    pub fn offset(&self) -> Duration {
        match self {
            Self::Reminder48h => Duration::hours(48),
            Self::Reminder24h => Duration::hours(24),
            Self::Reminder1h => Duration::hours(1),
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REMINDER_48H" => Ok(Self::Reminder48h),
            "REMINDER_24H" => Ok(Self::Reminder24h),
            "REMINDER_1H" => Ok(Self::Reminder1h),
            other => Err(format!("unknown reminder kind: {other}")),
        }
    }
}

/// A reminder schedule row owned by an appointment.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReminderSchedule {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning appointment.
    pub appointment_id: Uuid,
    /// When the reminder becomes due.
    pub scheduled_for: DateTime<Utc>,
    /// Which offset this row represents.
    pub kind: ReminderKind,
    /// Whether a dispatch attempt has been made.
    pub sent: bool,
    /// When the dispatch attempt was made.
    pub sent_at: Option<DateTime<Utc>>,
}

/// Input row for (re)creating an appointment's schedule.
#[derive(Debug, Clone)]
pub struct NewReminder {
    /// Owning appointment.
    pub appointment_id: Uuid,
    /// When the reminder becomes due.
    pub scheduled_for: DateTime<Utc>,
    /// Which offset this row represents.
    pub kind: ReminderKind,
}

/// Derives the three reminder rows for an appointment at `date_time`.
#[must_use]
pub fn reminder_plan(appointment_id: Uuid, date_time: DateTime<Utc>) -> Vec<NewReminder> {
    ReminderKind::ALL
        .iter()
        .map(|kind| NewReminder {
            appointment_id,
            scheduled_for: date_time - kind.offset(),
            kind: *kind,
        })
        .collect()
}
