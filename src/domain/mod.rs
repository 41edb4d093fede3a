//! Domain layer: booking entities and their enums.
//!
//! Plain data types shared by the persistence, service, and API layers.
//! Status and method enums serialize in SCREAMING_SNAKE_CASE on the wire
//! and round-trip through TEXT columns via `as_str`/`FromStr`.

pub mod appointment;
pub mod catalog;
pub mod loyalty;
pub mod payment;
pub mod review;
pub mod schedule;
pub mod user;

pub use appointment::{
    Appointment, AppointmentChange, AppointmentFilter, AppointmentStatus, AppointmentWithService,
    NewAppointment,
};
pub use catalog::{Coupon, DiscountType, Service};
pub use loyalty::{
    LoyaltyAccount, LoyaltyTransaction, LoyaltyTransactionKind, NewLoyaltyTransaction,
    points_for_amount,
};
pub use payment::{NewPayment, Payment, PaymentMethod, PaymentStatus};
pub use review::{NewReview, Review, ReviewFilter};
pub use schedule::{NewReminder, ReminderKind, ReminderSchedule, reminder_plan};
pub use user::{NewNotification, User, UserRole};
