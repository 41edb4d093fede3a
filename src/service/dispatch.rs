//! Outbound notification dispatch seam.
//!
//! Delivery channels (SMS, push) sit behind [`Dispatcher`] so the
//! reminder scheduler can run against a logging stand-in until a real
//! messaging integration lands.

use async_trait::async_trait;

use crate::domain::{NewNotification, User};
use crate::error::BookingError;

/// Delivers a composed notification to a recipient.
#[async_trait]
pub trait Dispatcher: Send + Sync + std::fmt::Debug {
    /// Attempts delivery. Failures are reported, not retried here; the
    /// caller decides whether to re-attempt.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Provider`] when the channel rejects the
    /// message.
    async fn dispatch(
        &self,
        recipient: &User,
        notification: &NewNotification,
    ) -> Result<(), BookingError>;
}

/// Dispatcher that writes deliveries to the log. Default channel until
/// an SMS/push integration is wired in.
#[derive(Debug, Default, Clone)]
pub struct LogDispatcher;

#[async_trait]
impl Dispatcher for LogDispatcher {
    async fn dispatch(
        &self,
        recipient: &User,
        notification: &NewNotification,
    ) -> Result<(), BookingError> {
        tracing::info!(
            user_id = %recipient.id,
            kind = %notification.kind,
            title = %notification.title,
            has_phone = recipient.phone.is_some(),
            "notification dispatched"
        );
        Ok(())
    }
}
