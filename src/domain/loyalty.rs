//! Loyalty account and its append-only transaction ledger.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Accrual rate: one point per ten dollars spent, rounded down.
const DOLLARS_PER_POINT: f64 = 10.0;

/// Converts a payment amount in dollars to loyalty points.
///
/// `floor(amount / 10)`, never negative.
#[must_use]
pub fn points_for_amount(amount: f64) -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    let points = (amount / DOLLARS_PER_POINT).floor() as i64;
    points.max(0)
}

/// A customer's loyalty balance, one row per user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoyaltyAccount {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning customer.
    pub user_id: Uuid,
    /// Current spendable balance.
    pub points: i64,
    /// Lifetime points earned.
    pub total_earned: i64,
    /// Recorded visits.
    pub visits: i32,
}

/// Ledger entry kind. `REDEEMED` is reserved; no redemption operation
/// exists in the current surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoyaltyTransactionKind {
    /// Points credited from a payment.
    Earned,
    /// Points spent (reserved for future use).
    Redeemed,
}

impl LoyaltyTransactionKind {
    /// Stable TEXT representation stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Earned => "EARNED",
            Self::Redeemed => "REDEEMED",
        }
    }
}

impl fmt::Display for LoyaltyTransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoyaltyTransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EARNED" => Ok(Self::Earned),
            "REDEEMED" => Ok(Self::Redeemed),
            other => Err(format!("unknown loyalty transaction kind: {other}")),
        }
    }
}

/// An append-only ledger entry owned by a loyalty account.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoyaltyTransaction {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning loyalty account.
    pub account_id: Uuid,
    /// Points delta (positive for EARNED).
    pub points: i64,
    /// Entry kind.
    pub kind: LoyaltyTransactionKind,
    /// Human-readable description.
    pub description: String,
    /// Appointment that triggered the entry, if any (weak reference).
    pub appointment_id: Option<Uuid>,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input for appending a ledger entry.
#[derive(Debug, Clone)]
pub struct NewLoyaltyTransaction {
    /// Owning loyalty account.
    pub account_id: Uuid,
    /// Points delta.
    pub points: i64,
    /// Entry kind.
    pub kind: LoyaltyTransactionKind,
    /// Human-readable description.
    pub description: String,
    /// Appointment that triggered the entry, if any.
    pub appointment_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_point_per_ten_dollars_rounded_down() {
        assert_eq!(points_for_amount(0.0), 0);
        assert_eq!(points_for_amount(9.99), 0);
        assert_eq!(points_for_amount(10.0), 1);
        assert_eq!(points_for_amount(25.0), 2);
        assert_eq!(points_for_amount(120.0), 12);
        assert_eq!(points_for_amount(199.99), 19);
    }

    #[test]
    fn negative_amounts_never_deduct() {
        assert_eq!(points_for_amount(-50.0), 0);
    }
}
