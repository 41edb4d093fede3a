//! Service layer: orchestration between the HTTP surface and storage.
//!
//! Each service owns one concern and talks to storage through the
//! [`crate::persistence::Store`] gateway, so the whole layer is testable
//! against an in-memory stand-in.

pub mod booking;
pub mod dispatch;
pub mod loyalty;
pub mod payments;
pub mod reminders;

pub use booking::BookingService;
pub use dispatch::{Dispatcher, LogDispatcher};
pub use loyalty::{LoyaltyService, LoyaltySummary};
pub use payments::{PaymentOutcome, PaymentRequest, PaymentService};
pub use reminders::{CronOutcome, ReminderService};
