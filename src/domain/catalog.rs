//! Reference data: the service catalog and promotional coupons.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A bookable service. Immutable reference data consumed by appointments
/// and payments.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Service {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Marketing description.
    pub description: String,
    /// Claimed benefits copy.
    pub benefits: Option<String>,
    /// Duration in minutes.
    pub duration_minutes: i32,
    /// Price in dollars.
    pub price: f64,
    /// Catalog category (e.g. `"Facial"`, `"Massage"`).
    pub category: String,
    /// Whether the service is currently bookable.
    pub active: bool,
}

/// How a coupon's discount is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// Percentage off the total.
    Percentage,
    /// Fixed dollar amount off.
    Fixed,
}

impl DiscountType {
    /// Stable TEXT representation stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "PERCENTAGE",
            Self::Fixed => "FIXED",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERCENTAGE" => Ok(Self::Percentage),
            "FIXED" => Ok(Self::Fixed),
            other => Err(format!("unknown discount type: {other}")),
        }
    }
}

/// A promotional coupon granted to users.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Coupon {
    /// Unique identifier.
    pub id: Uuid,
    /// Redemption code, unique.
    pub code: String,
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Discount value (percent or dollars per `discount_type`).
    pub discount: f64,
    /// How the discount applies.
    pub discount_type: DiscountType,
    /// Start of the validity window.
    pub valid_from: DateTime<Utc>,
    /// End of the validity window.
    pub valid_until: DateTime<Utc>,
    /// Maximum redemptions, unlimited when absent.
    pub usage_limit: Option<i32>,
    /// Redemptions so far.
    pub used_count: i32,
    /// Whether the coupon is enabled.
    pub active: bool,
}

impl Coupon {
    /// Validity check: inside the window, active, and under the usage
    /// limit when one is set.
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.active
            && now >= self.valid_from
            && now <= self.valid_until
            && self.usage_limit.is_none_or(|limit| self.used_count < limit)
    }
}
