//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::BookingConfig;
use crate::persistence::Store;
use crate::service::{BookingService, LoyaltyService, PaymentService, ReminderService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Appointment lifecycle orchestration.
    pub bookings: Arc<BookingService>,
    /// Payment creation and webhook settlement.
    pub payments: Arc<PaymentService>,
    /// Loyalty balances and ledger.
    pub loyalty: Arc<LoyaltyService>,
    /// Batch reminder scheduler.
    pub reminders: Arc<ReminderService>,
    /// Storage gateway, for handlers that read reference data directly.
    pub store: Arc<dyn Store>,
    /// Loaded configuration.
    pub config: Arc<BookingConfig>,
}
