//! Stripe-compatible payment provider client.
//!
//! Intent creation goes over HTTPS with the secret key as the bearer
//! credential. Webhook payloads carry a `stripe-signature` header of the
//! form `t=<unix>,v1=<hex>`; the signature is HMAC-SHA256 over
//! `"{t}.{payload}"` with the endpoint's signing secret.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use uuid::Uuid;

use super::{IntentMetadata, PaymentIntent, PaymentProvider, ProviderEvent};
use crate::config::StripeConfig;
use crate::error::BookingError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age in seconds of a webhook timestamp before it is rejected.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Stripe-compatible provider client. One instance per process,
/// injected into the settlement handler at startup.
pub struct StripeProvider {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
    api_base: String,
}

// Manual Debug: the credentials must never reach the log.
impl std::fmt::Debug for StripeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeProvider")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl StripeProvider {
    /// Creates a provider client from configuration.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: config.secret_key.clone(),
            webhook_secret: config.webhook_secret.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }
}

/// Intent fields we consume from the provider response.
#[derive(Debug, Deserialize)]
struct IntentBody {
    id: String,
    client_secret: String,
}

/// Webhook envelope fields we consume.
#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    kind: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: EventObject,
}

#[derive(Debug, Deserialize)]
struct EventObject {
    id: String,
    #[serde(default)]
    metadata: std::collections::HashMap<String, String>,
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    async fn create_intent(
        &self,
        amount: f64,
        metadata: &IntentMetadata,
    ) -> Result<PaymentIntent, BookingError> {
        // The provider API takes integral cents.
        #[allow(clippy::cast_possible_truncation)]
        let amount_cents = (amount * 100.0).round() as i64;

        let mut form = vec![
            ("amount", amount_cents.to_string()),
            ("currency", "usd".to_string()),
            ("metadata[user_id]", metadata.user_id.to_string()),
        ];
        if let Some(appointment_id) = metadata.appointment_id {
            form.push(("metadata[appointment_id]", appointment_id.to_string()));
        }

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| BookingError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BookingError::Provider(format!(
                "intent creation returned {}",
                response.status()
            )));
        }

        let body: IntentBody = response
            .json()
            .await
            .map_err(|e| BookingError::Provider(format!("malformed intent response: {e}")))?;

        tracing::info!(intent_id = %body.id, amount_cents, "payment intent created");
        Ok(PaymentIntent {
            id: body.id,
            client_secret: body.client_secret,
        })
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<ProviderEvent, BookingError> {
        let (timestamp, signature_hex) = parse_signature_header(signature_header)?;

        let now = chrono::Utc::now().timestamp();
        if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(BookingError::InvalidSignature(
                "timestamp outside tolerance".to_string(),
            ));
        }

        let body = std::str::from_utf8(payload)
            .map_err(|_| BookingError::InvalidSignature("payload is not utf-8".to_string()))?;

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|e| BookingError::Internal(e.to_string()))?;
        mac.update(format!("{timestamp}.{body}").as_bytes());

        let signature = decode_hex(&signature_hex)?;
        mac.verify_slice(&signature)
            .map_err(|_| BookingError::InvalidSignature("signature mismatch".to_string()))?;

        let envelope: EventEnvelope = serde_json::from_str(body)
            .map_err(|e| BookingError::InvalidSignature(format!("malformed event: {e}")))?;

        let appointment_id = envelope
            .data
            .object
            .metadata
            .get("appointment_id")
            .and_then(|raw| Uuid::parse_str(raw).ok());

        Ok(ProviderEvent {
            kind: envelope.kind,
            payment_intent_id: envelope.data.object.id,
            appointment_id,
        })
    }
}

/// Computes the hex HMAC-SHA256 signature for a webhook payload.
///
/// The counterpart of [`PaymentProvider::verify_webhook`]; used by tests
/// and local tooling to produce valid `t=...,v1=...` headers.
///
/// # Errors
///
/// Returns [`BookingError::Internal`] if the key setup fails.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &str) -> Result<String, BookingError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BookingError::Internal(e.to_string()))?;
    mac.update(format!("{timestamp}.{payload}").as_bytes());
    let digest = mac.finalize().into_bytes();
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

/// Parses `t=<unix>,v1=<hex>` into its parts.
fn parse_signature_header(header: &str) -> Result<(i64, String), BookingError> {
    let mut timestamp = None;
    let mut signature = None;

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signature = Some(value.to_string()),
            _ => {}
        }
    }

    match (timestamp, signature) {
        (Some(t), Some(v1)) => Ok((t, v1)),
        _ => Err(BookingError::InvalidSignature(
            "malformed signature header".to_string(),
        )),
    }
}

/// Decodes a lowercase/uppercase hex string into bytes.
fn decode_hex(hex: &str) -> Result<Vec<u8>, BookingError> {
    if hex.len() % 2 != 0 {
        return Err(BookingError::InvalidSignature(
            "odd-length hex signature".to_string(),
        ));
    }
    hex.as_bytes()
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| BookingError::InvalidSignature("invalid hex signature".to_string()))
        })
        .collect()
}
