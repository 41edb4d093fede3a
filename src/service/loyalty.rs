//! Loyalty accrual and balance reporting.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    LoyaltyTransaction, LoyaltyTransactionKind, NewLoyaltyTransaction, points_for_amount,
};
use crate::error::BookingError;
use crate::persistence::Store;

/// A customer's loyalty position: balance plus recent ledger entries.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoyaltySummary {
    /// Current spendable balance.
    pub points: i64,
    /// Lifetime points earned.
    pub total_earned: i64,
    /// Recorded visits.
    pub visits: i32,
    /// Ledger entries, newest first.
    pub history: Vec<LoyaltyTransaction>,
}

/// Loyalty program orchestration over the storage gateway.
#[derive(Debug, Clone)]
pub struct LoyaltyService {
    store: Arc<dyn Store>,
}

impl LoyaltyService {
    /// Creates the service over a storage gateway.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Credits points for a payment amount: upserts the account with an
    /// atomic increment and appends an EARNED ledger entry. Amounts under
    /// ten dollars earn nothing and leave no ledger entry.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Persistence`] on storage failure.
    pub async fn accrue_for_payment(
        &self,
        user_id: Uuid,
        amount: f64,
        appointment_id: Option<Uuid>,
    ) -> Result<i64, BookingError> {
        let points = points_for_amount(amount);
        if points == 0 {
            return Ok(0);
        }

        let account = self.store.accrue_loyalty(user_id, points).await?;
        self.store
            .append_loyalty_transaction(&NewLoyaltyTransaction {
                account_id: account.id,
                points,
                kind: LoyaltyTransactionKind::Earned,
                description: format!("Earned from ${amount:.2} payment"),
                appointment_id,
            })
            .await?;

        tracing::info!(%user_id, points, balance = account.points, "loyalty points accrued");
        Ok(points)
    }

    /// The user's balance and ledger. Users who never earned points get
    /// a zeroed summary rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Persistence`] on storage failure.
    pub async fn summary(&self, user_id: Uuid) -> Result<LoyaltySummary, BookingError> {
        let Some(account) = self.store.loyalty_account(user_id).await? else {
            return Ok(LoyaltySummary {
                points: 0,
                total_earned: 0,
                visits: 0,
                history: Vec::new(),
            });
        };
        let history = self.store.loyalty_transactions(account.id).await?;
        Ok(LoyaltySummary {
            points: account.points,
            total_earned: account.total_earned,
            visits: account.visits,
            history,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::memory::MemoryStore;

    #[tokio::test]
    async fn accruals_add_up_across_payments() {
        let store = Arc::new(MemoryStore::new());
        let loyalty = LoyaltyService::new(store.handle());
        let user_id = Uuid::new_v4();

        let first = loyalty.accrue_for_payment(user_id, 25.0, None).await;
        assert_eq!(first.ok(), Some(2));
        let second = loyalty.accrue_for_payment(user_id, 25.0, None).await;
        assert_eq!(second.ok(), Some(2));

        let Ok(summary) = loyalty.summary(user_id).await else {
            panic!("summary should succeed");
        };
        assert_eq!(summary.points, 4);
        assert_eq!(summary.total_earned, 4);
        assert_eq!(summary.history.len(), 2);
    }

    #[tokio::test]
    async fn sub_ten_dollar_payment_leaves_no_ledger_entry() {
        let store = Arc::new(MemoryStore::new());
        let loyalty = LoyaltyService::new(store.handle());
        let user_id = Uuid::new_v4();

        let earned = loyalty.accrue_for_payment(user_id, 9.5, None).await;
        assert_eq!(earned.ok(), Some(0));
        assert!(store.ledger_entries().is_empty());
    }

    #[tokio::test]
    async fn summary_for_unknown_user_is_zeroed() {
        let store = Arc::new(MemoryStore::new());
        let loyalty = LoyaltyService::new(store);

        let Ok(summary) = loyalty.summary(Uuid::new_v4()).await else {
            panic!("summary should succeed");
        };
        assert_eq!(summary.points, 0);
        assert!(summary.history.is_empty());
    }
}
