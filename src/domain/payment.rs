//! Payment entity, methods, and settlement status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Card via the payment provider (asynchronous settlement).
    Card,
    /// Zelle transfer, confirmed out of band.
    Zelle,
    /// Apple Pay via the payment provider.
    ApplePay,
    /// Google Pay via the payment provider.
    GooglePay,
    /// Cash at the counter; settles immediately.
    Cash,
    /// Deposit securing an appointment slot.
    Deposit,
}

impl PaymentMethod {
    /// Stable TEXT representation stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "CARD",
            Self::Zelle => "ZELLE",
            Self::ApplePay => "APPLE_PAY",
            Self::GooglePay => "GOOGLE_PAY",
            Self::Cash => "CASH",
            Self::Deposit => "DEPOSIT",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CARD" => Ok(Self::Card),
            "ZELLE" => Ok(Self::Zelle),
            "APPLE_PAY" => Ok(Self::ApplePay),
            "GOOGLE_PAY" => Ok(Self::GooglePay),
            "CASH" => Ok(Self::Cash),
            "DEPOSIT" => Ok(Self::Deposit),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Settlement status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Awaiting provider confirmation.
    Pending,
    /// Settled.
    Completed,
    /// Provider reported failure.
    Failed,
}

impl PaymentStatus {
    /// Stable TEXT representation stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// A recorded payment. References its appointment weakly: appointment
/// removal must never be blocked by payment history.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Payment {
    /// Unique identifier.
    pub id: Uuid,
    /// Paying customer.
    pub user_id: Uuid,
    /// Appointment being paid for, if any.
    pub appointment_id: Option<Uuid>,
    /// Amount in dollars.
    pub amount: f64,
    /// Deposit portion in dollars, if this payment secures a slot.
    pub deposit_amount: Option<f64>,
    /// Payment method.
    pub method: PaymentMethod,
    /// Settlement status.
    pub status: PaymentStatus,
    /// Provider transaction/intent id, when one exists.
    pub transaction_id: Option<String>,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// Paying customer.
    pub user_id: Uuid,
    /// Appointment being paid for, if any.
    pub appointment_id: Option<Uuid>,
    /// Amount in dollars.
    pub amount: f64,
    /// Deposit portion in dollars.
    pub deposit_amount: Option<f64>,
    /// Payment method.
    pub method: PaymentMethod,
    /// Initial settlement status.
    pub status: PaymentStatus,
    /// Provider transaction/intent id, when one exists.
    pub transaction_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_round_trips_through_text() {
        for method in [
            PaymentMethod::Card,
            PaymentMethod::Zelle,
            PaymentMethod::ApplePay,
            PaymentMethod::GooglePay,
            PaymentMethod::Cash,
            PaymentMethod::Deposit,
        ] {
            assert_eq!(method.as_str().parse::<PaymentMethod>(), Ok(method));
        }
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<PaymentStatus>(), Ok(status));
        }
    }

    #[test]
    fn wire_format_matches_storage_format() {
        let json = serde_json::to_string(&PaymentMethod::ApplePay);
        assert_eq!(json.ok().as_deref(), Some("\"APPLE_PAY\""));
    }
}
