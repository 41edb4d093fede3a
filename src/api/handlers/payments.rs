//! Payment handlers: creation and the provider webhook.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{CreatePaymentRequest, PaymentIntentResponse, WebhookAck};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::Payment;
use crate::error::{BookingError, ErrorResponse};
use crate::service::PaymentOutcome;

/// `POST /payments` - Create a payment.
///
/// # Errors
///
/// Returns [`BookingError::ProviderNotConfigured`] for card intents
/// without provider credentials.
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    summary = "Create a payment",
    description = "Records a payment for the authenticated customer. Card submissions without a paymentIntentId open a provider intent instead and return its client secret; cash settles immediately; a deposit confirms its appointment.",
    security(("bearer_auth" = [])),
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = Payment),
        (status = 200, description = "Provider intent opened", body = PaymentIntentResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Payment provider not configured", body = ErrorResponse),
    )
)]
pub async fn create_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreatePaymentRequest>,
) -> Result<Response, BookingError> {
    let request = body.into_payment_request()?;
    let outcome = state.payments.create(auth.user_id, request).await?;

    Ok(match outcome {
        PaymentOutcome::Intent {
            client_secret,
            payment_intent_id,
        } => Json(PaymentIntentResponse {
            client_secret,
            payment_intent_id,
        })
        .into_response(),
        PaymentOutcome::Recorded(payment) => {
            (StatusCode::CREATED, Json(payment)).into_response()
        }
    })
}

/// `POST /payments/webhook` - Provider settlement webhook.
///
/// Unauthenticated by design; trust comes from the signature header.
///
/// # Errors
///
/// Returns [`BookingError::InvalidSignature`] when verification fails.
#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    tag = "Payments",
    summary = "Provider webhook",
    description = "Settles card intents: verified succeeded events complete the payment and confirm its appointment; failed events mark the payment failed. The raw body is verified against the stripe-signature header before anything is decoded.",
    responses(
        (status = 200, description = "Event processed or ignored", body = WebhookAck),
        (status = 400, description = "Signature verification failed", body = ErrorResponse),
    )
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<impl IntoResponse, BookingError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            BookingError::InvalidSignature("missing stripe-signature header".to_string())
        })?;

    state.payments.handle_webhook(body.as_bytes(), signature).await?;
    Ok(Json(WebhookAck { received: true }))
}

/// Payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", post(create_payment))
        .route("/payments/webhook", post(payment_webhook))
}
