//! Persistence layer: the storage gateway trait and its PostgreSQL
//! implementation.
//!
//! [`Store`] is the sole interface to durable storage. Multi-row writes
//! that must land together (appointment + its reminder rows) are single
//! transactions, and balance/usage increments are expressed as atomic
//! operations at the storage layer rather than read-modify-write in
//! application code.

pub mod postgres;

#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Appointment, AppointmentChange, AppointmentFilter, AppointmentStatus, Coupon, LoyaltyAccount,
    LoyaltyTransaction, NewAppointment, NewLoyaltyTransaction, NewNotification, NewPayment,
    NewReminder, NewReview, Payment, PaymentStatus, ReminderSchedule, Review, ReviewFilter,
    Service, User,
};
use crate::error::BookingError;

/// Storage gateway consumed by the service layer.
///
/// All methods map storage failures to [`BookingError::Persistence`];
/// documented variants call out the exceptions.
#[allow(clippy::missing_errors_doc)]
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    // ── Appointments ────────────────────────────────────────────────

    /// Returns the PENDING/CONFIRMED appointment at exactly `at`, if any.
    async fn find_active_at(&self, at: DateTime<Utc>) -> Result<Option<Appointment>, BookingError>;

    /// Inserts an appointment and, in the same transaction, the three
    /// reminder rows derived from its slot (see
    /// [`crate::domain::reminder_plan`]).
    ///
    /// Returns [`BookingError::SlotTaken`] when a concurrent booking won
    /// the slot.
    async fn insert_appointment(
        &self,
        new: &NewAppointment,
    ) -> Result<Appointment, BookingError>;

    /// Fetches an appointment by id.
    async fn appointment(&self, id: Uuid) -> Result<Option<Appointment>, BookingError>;

    /// Lists a user's appointments, filtered and ordered by slot ascending.
    async fn appointments_for_user(
        &self,
        user_id: Uuid,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, BookingError>;

    /// Applies a partial update; when `reminders` is given, the
    /// appointment's schedule rows are replaced wholesale in the same
    /// transaction.
    ///
    /// Returns [`BookingError::AppointmentNotFound`] when the row is gone
    /// and [`BookingError::SlotTaken`] when a reschedule hits an occupied
    /// slot.
    async fn update_appointment(
        &self,
        id: Uuid,
        change: &AppointmentChange,
        reminders: Option<&[NewReminder]>,
    ) -> Result<Appointment, BookingError>;

    /// Idempotently sets an appointment's status. Returns `false` when no
    /// such appointment exists.
    async fn set_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<bool, BookingError>;

    // ── Reminder schedules ──────────────────────────────────────────

    /// Unsent rows due at or before `now`, oldest first.
    async fn due_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReminderSchedule>, BookingError>;

    /// Marks a schedule row as attempted.
    async fn mark_reminder_sent(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), BookingError>;

    // ── Payments ────────────────────────────────────────────────────

    /// Records a payment.
    async fn insert_payment(&self, new: &NewPayment) -> Result<Payment, BookingError>;

    /// Sets the status of every payment carrying the given provider
    /// transaction id. Returns the number of rows touched.
    async fn set_payment_status_by_transaction(
        &self,
        transaction_id: &str,
        status: PaymentStatus,
    ) -> Result<u64, BookingError>;

    // ── Loyalty ─────────────────────────────────────────────────────

    /// Upserts the user's loyalty account and atomically adds `points` to
    /// both the balance and lifetime total.
    async fn accrue_loyalty(
        &self,
        user_id: Uuid,
        points: i64,
    ) -> Result<LoyaltyAccount, BookingError>;

    /// Appends a ledger entry.
    async fn append_loyalty_transaction(
        &self,
        new: &NewLoyaltyTransaction,
    ) -> Result<LoyaltyTransaction, BookingError>;

    /// Fetches the user's loyalty account, if one exists.
    async fn loyalty_account(&self, user_id: Uuid) -> Result<Option<LoyaltyAccount>, BookingError>;

    /// Ledger entries for an account, newest first.
    async fn loyalty_transactions(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<LoyaltyTransaction>, BookingError>;

    // ── Users ───────────────────────────────────────────────────────

    /// Fetches a user by id.
    async fn user(&self, id: Uuid) -> Result<Option<User>, BookingError>;

    /// Users whose birthday matches the given month and day.
    async fn users_with_birthday(&self, month: u32, day: u32) -> Result<Vec<User>, BookingError>;

    /// Claims the per-user per-year birthday greeting marker. Returns
    /// `true` exactly once per (user, year).
    async fn claim_birthday_greeting(
        &self,
        user_id: Uuid,
        year: i32,
    ) -> Result<bool, BookingError>;

    // ── Catalog ─────────────────────────────────────────────────────

    /// Fetches a service by id.
    async fn service(&self, id: Uuid) -> Result<Option<Service>, BookingError>;

    /// All active services.
    async fn active_services(&self) -> Result<Vec<Service>, BookingError>;

    /// Coupons granted to a user.
    async fn coupons_for_user(&self, user_id: Uuid) -> Result<Vec<Coupon>, BookingError>;

    /// Atomically consumes one use of a coupon if it is currently valid.
    /// Returns `None` when the coupon is unknown, inactive, outside its
    /// window, or exhausted.
    async fn redeem_coupon(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Coupon>, BookingError>;

    // ── Reviews ─────────────────────────────────────────────────────

    /// Records a review.
    async fn insert_review(&self, new: &NewReview) -> Result<Review, BookingError>;

    /// Reviews matching the filter, newest first.
    async fn reviews(&self, filter: &ReviewFilter) -> Result<Vec<Review>, BookingError>;

    // ── Notification audit log ──────────────────────────────────────

    /// Records a dispatched notification.
    async fn record_notification(&self, new: &NewNotification) -> Result<(), BookingError>;
}
