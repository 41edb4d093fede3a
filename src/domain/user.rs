//! Customer/staff user entity and the notification audit record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Role of a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Regular customer.
    Customer,
    /// Salon staff member.
    Staff,
    /// Platform administrator.
    Admin,
}

impl UserRole {
    /// Stable TEXT representation stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Staff => "STAFF",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOMER" => Ok(Self::Customer),
            "STAFF" => Ok(Self::Staff),
            "ADMIN" => Ok(Self::Admin),
            other => Err(format!("unknown user role: {other}")),
        }
    }
}

/// A platform user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    /// Unique identifier.
    pub id: Uuid,
    /// Login email, unique.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Phone number for SMS reminders, if provided.
    pub phone: Option<String>,
    /// Birthday for the greeting pass, if provided.
    pub birthday: Option<NaiveDate>,
    /// Platform role.
    pub role: UserRole,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input for recording a dispatched notification in the audit log.
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// Recipient.
    pub user_id: Uuid,
    /// Channel kind (`"SMS"`, `"PUSH"`, ...).
    pub kind: String,
    /// Short title.
    pub title: String,
    /// Full message body.
    pub message: String,
}
