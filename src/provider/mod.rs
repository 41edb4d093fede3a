//! Payment provider seam.
//!
//! [`PaymentProvider`] is the contract the settlement handler depends on:
//! intent creation for card payments and signature-verified webhook
//! decoding. The production implementation is [`stripe::StripeProvider`],
//! constructed once at startup and injected.

pub mod stripe;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::BookingError;

/// Event type emitted by the provider when an intent settles.
pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";
/// Event type emitted by the provider when an intent fails.
pub const EVENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";

/// A created payment intent, returned to the client for confirmation.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    /// Provider-side intent identifier.
    pub id: String,
    /// Client secret used by the frontend to confirm the payment.
    pub client_secret: String,
}

/// Metadata attached to an intent so webhook events can be correlated
/// back to gateway records.
#[derive(Debug, Clone)]
pub struct IntentMetadata {
    /// Paying customer.
    pub user_id: Uuid,
    /// Appointment being paid for, if any.
    pub appointment_id: Option<Uuid>,
}

/// A verified webhook event.
#[derive(Debug, Clone)]
pub struct ProviderEvent {
    /// Event type string (e.g. [`EVENT_PAYMENT_SUCCEEDED`]). Unrecognized
    /// types are accepted and ignored by the settlement handler.
    pub kind: String,
    /// Intent identifier the event refers to.
    pub payment_intent_id: String,
    /// Appointment id recovered from the intent metadata, if present.
    pub appointment_id: Option<Uuid>,
}

/// Payment provider client: intent creation and webhook verification.
#[async_trait]
pub trait PaymentProvider: Send + Sync + std::fmt::Debug {
    /// Creates a payment intent for `amount` dollars.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Provider`] if the provider call fails.
    async fn create_intent(
        &self,
        amount: f64,
        metadata: &IntentMetadata,
    ) -> Result<PaymentIntent, BookingError>;

    /// Verifies a webhook payload against its signature header and
    /// decodes the event.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidSignature`] on verification failure;
    /// no state may be mutated in that case.
    fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<ProviderEvent, BookingError>;
}
