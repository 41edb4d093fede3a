//! Payment recording and asynchronous settlement.
//!
//! Two entry points: customer-initiated payment creation, and the
//! provider webhook that settles card intents after the fact. Webhook
//! settlement is idempotent: replays re-apply the same terminal status
//! and never touch the loyalty ledger.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    AppointmentStatus, NewPayment, Payment, PaymentMethod, PaymentStatus,
};
use crate::error::BookingError;
use crate::persistence::Store;
use crate::provider::{
    EVENT_PAYMENT_FAILED, EVENT_PAYMENT_SUCCEEDED, IntentMetadata, PaymentProvider,
};
use crate::service::loyalty::LoyaltyService;

/// A customer's payment submission.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    /// Appointment being paid for, if any.
    pub appointment_id: Option<Uuid>,
    /// Amount in dollars.
    pub amount: f64,
    /// Deposit portion in dollars; confirms the appointment when present.
    pub deposit_amount: Option<f64>,
    /// Payment method.
    pub method: PaymentMethod,
    /// Provider transaction id for already-confirmed card payments.
    pub transaction_id: Option<String>,
}

/// What payment creation produced.
#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    /// A provider intent awaiting client-side confirmation. No payment
    /// row exists yet; the webhook settles it later.
    Intent {
        /// Secret the frontend uses to confirm the intent.
        client_secret: String,
        /// Provider-side intent id.
        payment_intent_id: String,
    },
    /// A recorded payment row.
    Recorded(Payment),
}

/// Payment orchestration: creation, deposit confirmation, loyalty
/// accrual, and webhook settlement.
#[derive(Debug, Clone)]
pub struct PaymentService {
    store: Arc<dyn Store>,
    loyalty: LoyaltyService,
    provider: Option<Arc<dyn PaymentProvider>>,
}

impl PaymentService {
    /// Creates the service. `provider` is `None` when no payment
    /// provider credentials are configured; card intents then fail with
    /// [`BookingError::ProviderNotConfigured`].
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        loyalty: LoyaltyService,
        provider: Option<Arc<dyn PaymentProvider>>,
    ) -> Self {
        Self {
            store,
            loyalty,
            provider,
        }
    }

    /// Creates a payment for the authenticated customer.
    ///
    /// Card submissions without a transaction id open a provider intent
    /// and record nothing. Cash settles immediately; every other method
    /// starts PENDING. A deposit with an appointment confirms that
    /// appointment, and any non-deposit method accrues loyalty points.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for non-positive amounts and
    /// [`BookingError::ProviderNotConfigured`] for card intents without
    /// provider credentials.
    pub async fn create(
        &self,
        user_id: Uuid,
        request: PaymentRequest,
    ) -> Result<PaymentOutcome, BookingError> {
        if request.amount <= 0.0 {
            return Err(BookingError::Validation(
                "amount must be positive".to_string(),
            ));
        }

        if request.method == PaymentMethod::Card && request.transaction_id.is_none() {
            let provider = self
                .provider
                .as_ref()
                .ok_or(BookingError::ProviderNotConfigured)?;
            let intent = provider
                .create_intent(
                    request.amount,
                    &IntentMetadata {
                        user_id,
                        appointment_id: request.appointment_id,
                    },
                )
                .await?;
            return Ok(PaymentOutcome::Intent {
                client_secret: intent.client_secret,
                payment_intent_id: intent.id,
            });
        }

        let status = if request.method == PaymentMethod::Cash {
            PaymentStatus::Completed
        } else {
            PaymentStatus::Pending
        };
        let payment = self
            .store
            .insert_payment(&NewPayment {
                user_id,
                appointment_id: request.appointment_id,
                amount: request.amount,
                deposit_amount: request.deposit_amount,
                method: request.method,
                status,
                transaction_id: request.transaction_id,
            })
            .await?;

        if request.deposit_amount.is_some() {
            if let Some(appointment_id) = request.appointment_id {
                self.store
                    .set_appointment_status(appointment_id, AppointmentStatus::Confirmed)
                    .await?;
                tracing::info!(%appointment_id, "appointment confirmed by deposit");
            }
        }

        if request.method != PaymentMethod::Deposit {
            self.loyalty
                .accrue_for_payment(user_id, request.amount, request.appointment_id)
                .await?;
        }

        tracing::info!(
            payment_id = %payment.id,
            method = %payment.method,
            status = %payment.status,
            "payment recorded"
        );
        Ok(PaymentOutcome::Recorded(payment))
    }

    /// Settles payments from a verified provider webhook.
    ///
    /// Succeeded intents complete their payment rows and confirm the
    /// linked appointment; failed intents mark their rows FAILED. Events
    /// of any other type are acknowledged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidSignature`] when verification
    /// fails; no state is mutated in that case.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<(), BookingError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(BookingError::ProviderNotConfigured)?;
        let event = provider.verify_webhook(payload, signature_header)?;

        match event.kind.as_str() {
            EVENT_PAYMENT_SUCCEEDED => {
                let touched = self
                    .store
                    .set_payment_status_by_transaction(
                        &event.payment_intent_id,
                        PaymentStatus::Completed,
                    )
                    .await?;
                if let Some(appointment_id) = event.appointment_id {
                    self.store
                        .set_appointment_status(appointment_id, AppointmentStatus::Confirmed)
                        .await?;
                }
                tracing::info!(
                    intent_id = %event.payment_intent_id,
                    payments = touched,
                    "payment settled"
                );
            }
            EVENT_PAYMENT_FAILED => {
                let touched = self
                    .store
                    .set_payment_status_by_transaction(
                        &event.payment_intent_id,
                        PaymentStatus::Failed,
                    )
                    .await?;
                tracing::warn!(
                    intent_id = %event.payment_intent_id,
                    payments = touched,
                    "payment failed"
                );
            }
            other => {
                tracing::debug!(kind = other, "webhook event ignored");
            }
        }
        Ok(())
    }
}
