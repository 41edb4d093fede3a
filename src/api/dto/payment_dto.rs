//! Payment and coupon request/response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::PaymentMethod;
use crate::error::BookingError;
use crate::service::PaymentRequest;

/// Request body for `POST /api/payments`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// Appointment being paid for, if any.
    #[serde(default)]
    pub appointment_id: Option<Uuid>,
    /// Amount in dollars.
    pub amount: f64,
    /// Deposit portion in dollars.
    #[serde(default)]
    pub deposit_amount: Option<f64>,
    /// Payment method.
    pub method: PaymentMethod,
    /// Provider intent id for already-confirmed card payments; arrives
    /// on the wire as `paymentIntentId`.
    #[serde(default, rename = "paymentIntentId")]
    pub transaction_id: Option<String>,
}

impl CreatePaymentRequest {
    /// Validates and converts into the service-layer request.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for non-positive amounts or a
    /// deposit exceeding the amount.
    pub fn into_payment_request(self) -> Result<PaymentRequest, BookingError> {
        if self.amount <= 0.0 {
            return Err(BookingError::Validation(
                "amount must be positive".to_string(),
            ));
        }
        if self.deposit_amount.is_some_and(|d| d <= 0.0 || d > self.amount) {
            return Err(BookingError::Validation(
                "depositAmount must be positive and at most the amount".to_string(),
            ));
        }
        Ok(PaymentRequest {
            appointment_id: self.appointment_id,
            amount: self.amount,
            deposit_amount: self.deposit_amount,
            method: self.method,
            transaction_id: self.transaction_id,
        })
    }
}

/// Response body when card payment creation opens a provider intent.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    /// Secret the frontend uses to confirm the intent.
    pub client_secret: String,
    /// Provider-side intent id.
    pub payment_intent_id: String,
}

/// Acknowledgement body returned to the webhook sender.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    /// Always `true`; the provider only needs a 2xx.
    pub received: bool,
}

/// Request body for `POST /api/coupons/redeem`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RedeemCouponRequest {
    /// Redemption code.
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: f64, deposit: Option<f64>) -> CreatePaymentRequest {
        CreatePaymentRequest {
            appointment_id: None,
            amount,
            deposit_amount: deposit,
            method: PaymentMethod::Cash,
            transaction_id: None,
        }
    }

    #[test]
    fn deposit_larger_than_amount_is_rejected() {
        let result = request(50.0, Some(80.0)).into_payment_request();
        assert!(matches!(result, Err(BookingError::Validation(_))));
    }

    #[test]
    fn valid_deposit_passes() {
        let result = request(50.0, Some(20.0)).into_payment_request();
        assert!(result.is_ok());
    }

    #[test]
    fn screaming_snake_method_deserializes() {
        let json = r#"{"amount": 45.0, "method": "APPLE_PAY"}"#;
        let parsed: Result<CreatePaymentRequest, _> = serde_json::from_str(json);
        let Ok(parsed) = parsed else {
            unreachable!("body should deserialize");
        };
        assert_eq!(parsed.method, PaymentMethod::ApplePay);
    }

    #[test]
    fn payment_intent_id_field_is_read() {
        let json = r#"{"amount": 150.0, "method": "CARD", "paymentIntentId": "pi_abc"}"#;
        let parsed: Result<CreatePaymentRequest, _> = serde_json::from_str(json);
        let Ok(parsed) = parsed else {
            unreachable!("body should deserialize");
        };
        assert_eq!(parsed.transaction_id.as_deref(), Some("pi_abc"));
    }
}
