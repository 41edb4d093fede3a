//! In-memory [`Store`] used by service-layer tests.
//!
//! Mirrors the PostgreSQL implementation's observable behavior: slot
//! uniqueness over PENDING/CONFIRMED rows, atomic loyalty upserts, and
//! the one-shot birthday greeting marker.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use super::Store;
use crate::domain::{
    Appointment, AppointmentChange, AppointmentFilter, AppointmentStatus, Coupon, LoyaltyAccount,
    LoyaltyTransaction, NewAppointment, NewLoyaltyTransaction, NewNotification, NewPayment,
    NewReminder, NewReview, Payment, PaymentStatus, ReminderSchedule, Review, ReviewFilter,
    Service, User, reminder_plan,
};
use crate::error::BookingError;

#[derive(Debug, Default)]
struct Inner {
    appointments: Vec<Appointment>,
    schedules: Vec<ReminderSchedule>,
    payments: Vec<Payment>,
    accounts: Vec<LoyaltyAccount>,
    ledger: Vec<LoyaltyTransaction>,
    users: Vec<User>,
    services: Vec<Service>,
    coupons: Vec<Coupon>,
    grants: Vec<(Uuid, Uuid)>,
    reviews: Vec<Review>,
    notifications: Vec<NewNotification>,
    greetings: HashSet<(Uuid, i32)>,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Trait-object handle for wiring services while keeping this
    /// concrete reference around for seeding and inspection.
    pub(crate) fn handle(self: &Arc<Self>) -> Arc<dyn Store> {
        Arc::<Self>::clone(self)
    }

    pub(crate) fn add_user(&self, user: User) {
        self.lock().users.push(user);
    }

    pub(crate) fn add_service(&self, service: Service) {
        self.lock().services.push(service);
    }

    pub(crate) fn add_coupon(&self, coupon: Coupon) {
        self.lock().coupons.push(coupon);
    }

    pub(crate) fn grant_coupon(&self, coupon_id: Uuid, user_id: Uuid) {
        self.lock().grants.push((coupon_id, user_id));
    }

    pub(crate) fn payments(&self) -> Vec<Payment> {
        self.lock().payments.clone()
    }

    pub(crate) fn notifications(&self) -> Vec<NewNotification> {
        self.lock().notifications.clone()
    }

    pub(crate) fn ledger_entries(&self) -> Vec<LoyaltyTransaction> {
        self.lock().ledger.clone()
    }

    pub(crate) fn schedules(&self) -> Vec<ReminderSchedule> {
        self.lock().schedules.clone()
    }
}

fn push_schedule(inner: &mut Inner, reminder: &NewReminder) {
    inner.schedules.push(ReminderSchedule {
        id: Uuid::new_v4(),
        appointment_id: reminder.appointment_id,
        scheduled_for: reminder.scheduled_for,
        kind: reminder.kind,
        sent: false,
        sent_at: None,
    });
}

fn slot_occupied(inner: &Inner, at: DateTime<Utc>, excluding: Option<Uuid>) -> bool {
    inner.appointments.iter().any(|a| {
        a.date_time == at && a.status.occupies_slot() && excluding.is_none_or(|id| a.id != id)
    })
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_active_at(&self, at: DateTime<Utc>) -> Result<Option<Appointment>, BookingError> {
        let inner = self.lock();
        Ok(inner
            .appointments
            .iter()
            .find(|a| a.date_time == at && a.status.occupies_slot())
            .cloned())
    }

    async fn insert_appointment(
        &self,
        new: &NewAppointment,
    ) -> Result<Appointment, BookingError> {
        let mut inner = self.lock();
        if slot_occupied(&inner, new.date_time, None) {
            return Err(BookingError::SlotTaken(new.date_time));
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            service_id: new.service_id,
            date_time: new.date_time,
            status: AppointmentStatus::Pending,
            notes: new.notes.clone(),
            created_at: now,
            updated_at: now,
        };
        for reminder in reminder_plan(appointment.id, appointment.date_time) {
            push_schedule(&mut inner, &reminder);
        }
        inner.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn appointment(&self, id: Uuid) -> Result<Option<Appointment>, BookingError> {
        Ok(self.lock().appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn appointments_for_user(
        &self,
        user_id: Uuid,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, BookingError> {
        let inner = self.lock();
        let mut rows: Vec<_> = inner
            .appointments
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter(|a| filter.status.is_none_or(|s| a.status == s))
            .filter(|a| filter.start.is_none_or(|start| a.date_time >= start))
            .filter(|a| filter.end.is_none_or(|end| a.date_time <= end))
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.date_time);
        Ok(rows)
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        change: &AppointmentChange,
        reminders: Option<&[NewReminder]>,
    ) -> Result<Appointment, BookingError> {
        let mut inner = self.lock();

        if let Some(slot) = change.date_time {
            if slot_occupied(&inner, slot, Some(id)) {
                return Err(BookingError::SlotTaken(slot));
            }
        }

        let Some(position) = inner.appointments.iter().position(|a| a.id == id) else {
            return Err(BookingError::AppointmentNotFound(id));
        };
        let Some(appointment) = inner.appointments.get_mut(position) else {
            return Err(BookingError::AppointmentNotFound(id));
        };
        if let Some(status) = change.status {
            appointment.status = status;
        }
        if let Some(date_time) = change.date_time {
            appointment.date_time = date_time;
        }
        appointment.updated_at = Utc::now();
        let updated = appointment.clone();

        if let Some(reminders) = reminders {
            inner.schedules.retain(|s| s.appointment_id != id);
            for reminder in reminders {
                push_schedule(&mut inner, reminder);
            }
        }
        Ok(updated)
    }

    async fn set_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<bool, BookingError> {
        let mut inner = self.lock();
        match inner.appointments.iter_mut().find(|a| a.id == id) {
            Some(appointment) => {
                appointment.status = status;
                appointment.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn due_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReminderSchedule>, BookingError> {
        let inner = self.lock();
        let mut rows: Vec<_> = inner
            .schedules
            .iter()
            .filter(|s| !s.sent && s.scheduled_for <= now)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.scheduled_for);
        Ok(rows)
    }

    async fn mark_reminder_sent(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), BookingError> {
        let mut inner = self.lock();
        if let Some(schedule) = inner.schedules.iter_mut().find(|s| s.id == id) {
            schedule.sent = true;
            schedule.sent_at = Some(at);
        }
        Ok(())
    }

    async fn insert_payment(&self, new: &NewPayment) -> Result<Payment, BookingError> {
        let payment = Payment {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            appointment_id: new.appointment_id,
            amount: new.amount,
            deposit_amount: new.deposit_amount,
            method: new.method,
            status: new.status,
            transaction_id: new.transaction_id.clone(),
            created_at: Utc::now(),
        };
        self.lock().payments.push(payment.clone());
        Ok(payment)
    }

    async fn set_payment_status_by_transaction(
        &self,
        transaction_id: &str,
        status: PaymentStatus,
    ) -> Result<u64, BookingError> {
        let mut inner = self.lock();
        let mut touched = 0;
        for payment in &mut inner.payments {
            if payment.transaction_id.as_deref() == Some(transaction_id) {
                payment.status = status;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn accrue_loyalty(
        &self,
        user_id: Uuid,
        points: i64,
    ) -> Result<LoyaltyAccount, BookingError> {
        let mut inner = self.lock();
        if let Some(account) = inner.accounts.iter_mut().find(|a| a.user_id == user_id) {
            account.points += points;
            account.total_earned += points;
            return Ok(account.clone());
        }
        let account = LoyaltyAccount {
            id: Uuid::new_v4(),
            user_id,
            points,
            total_earned: points,
            visits: 0,
        };
        inner.accounts.push(account.clone());
        Ok(account)
    }

    async fn append_loyalty_transaction(
        &self,
        new: &NewLoyaltyTransaction,
    ) -> Result<LoyaltyTransaction, BookingError> {
        let entry = LoyaltyTransaction {
            id: Uuid::new_v4(),
            account_id: new.account_id,
            points: new.points,
            kind: new.kind,
            description: new.description.clone(),
            appointment_id: new.appointment_id,
            created_at: Utc::now(),
        };
        self.lock().ledger.push(entry.clone());
        Ok(entry)
    }

    async fn loyalty_account(
        &self,
        user_id: Uuid,
    ) -> Result<Option<LoyaltyAccount>, BookingError> {
        Ok(self
            .lock()
            .accounts
            .iter()
            .find(|a| a.user_id == user_id)
            .cloned())
    }

    async fn loyalty_transactions(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<LoyaltyTransaction>, BookingError> {
        let inner = self.lock();
        let mut rows: Vec<_> = inner
            .ledger
            .iter()
            .filter(|t| t.account_id == account_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn user(&self, id: Uuid) -> Result<Option<User>, BookingError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn users_with_birthday(&self, month: u32, day: u32) -> Result<Vec<User>, BookingError> {
        let inner = self.lock();
        Ok(inner
            .users
            .iter()
            .filter(|u| {
                u.birthday
                    .is_some_and(|b| b.month() == month && b.day() == day)
            })
            .cloned()
            .collect())
    }

    async fn claim_birthday_greeting(
        &self,
        user_id: Uuid,
        year: i32,
    ) -> Result<bool, BookingError> {
        Ok(self.lock().greetings.insert((user_id, year)))
    }

    async fn service(&self, id: Uuid) -> Result<Option<Service>, BookingError> {
        Ok(self.lock().services.iter().find(|s| s.id == id).cloned())
    }

    async fn active_services(&self) -> Result<Vec<Service>, BookingError> {
        Ok(self
            .lock()
            .services
            .iter()
            .filter(|s| s.active)
            .cloned()
            .collect())
    }

    async fn coupons_for_user(&self, user_id: Uuid) -> Result<Vec<Coupon>, BookingError> {
        let inner = self.lock();
        Ok(inner
            .coupons
            .iter()
            .filter(|c| {
                inner
                    .grants
                    .iter()
                    .any(|(coupon_id, grantee)| *coupon_id == c.id && *grantee == user_id)
            })
            .cloned()
            .collect())
    }

    async fn redeem_coupon(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Coupon>, BookingError> {
        let mut inner = self.lock();
        match inner.coupons.iter_mut().find(|c| c.code == code) {
            Some(coupon) if coupon.is_valid(now) => {
                coupon.used_count += 1;
                Ok(Some(coupon.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn insert_review(&self, new: &NewReview) -> Result<Review, BookingError> {
        let review = Review {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            service_id: new.service_id,
            appointment_id: new.appointment_id,
            rating: new.rating,
            comment: new.comment.clone(),
            created_at: Utc::now(),
        };
        self.lock().reviews.push(review.clone());
        Ok(review)
    }

    async fn reviews(&self, filter: &ReviewFilter) -> Result<Vec<Review>, BookingError> {
        let inner = self.lock();
        let mut rows: Vec<_> = inner
            .reviews
            .iter()
            .filter(|r| filter.service_id.is_none_or(|id| r.service_id == id))
            .filter(|r| filter.user_id.is_none_or(|id| r.user_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn record_notification(&self, new: &NewNotification) -> Result<(), BookingError> {
        self.lock().notifications.push(new.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::DiscountType;
    use chrono::Duration;

    fn coupon(code: &str, usage_limit: Option<i32>, now: DateTime<Utc>) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: code.to_string(),
            title: "Spring promo".to_string(),
            description: None,
            discount: 15.0,
            discount_type: DiscountType::Percentage,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(14),
            usage_limit,
            used_count: 0,
            active: true,
        }
    }

    #[tokio::test]
    async fn coupons_are_listed_per_grant() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let granted = coupon("SPRING15", None, now);
        store.add_coupon(granted.clone());
        store.add_coupon(coupon("OTHER", None, now));
        store.grant_coupon(granted.id, user_id);

        let Ok(coupons) = store.coupons_for_user(user_id).await else {
            panic!("listing should succeed");
        };
        assert_eq!(coupons.len(), 1);
        assert_eq!(coupons.first().map(|c| c.code.as_str()), Some("SPRING15"));
    }

    #[tokio::test]
    async fn redeem_consumes_one_use_until_exhausted() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.add_coupon(coupon("ONCE", Some(1), now));

        let Ok(first) = store.redeem_coupon("ONCE", now).await else {
            panic!("redeem should succeed");
        };
        assert_eq!(first.map(|c| c.used_count), Some(1));

        let Ok(second) = store.redeem_coupon("ONCE", now).await else {
            panic!("redeem should succeed");
        };
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn expired_coupon_is_not_redeemable() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.add_coupon(coupon("LATE", None, now - Duration::days(60)));

        let Ok(result) = store.redeem_coupon("LATE", now).await else {
            panic!("redeem should succeed");
        };
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn reviews_filter_by_service_and_user() {
        let store = MemoryStore::new();
        let service_id = Uuid::new_v4();
        let reviewer = Uuid::new_v4();

        let entries = [
            (reviewer, service_id, 5),
            (reviewer, Uuid::new_v4(), 3),
            (Uuid::new_v4(), service_id, 4),
        ];
        for (user_id, service_id, rating) in entries {
            let inserted = store
                .insert_review(&NewReview {
                    user_id,
                    service_id,
                    appointment_id: None,
                    rating,
                    comment: None,
                })
                .await;
            assert!(inserted.is_ok());
        }

        let Ok(for_service) = store
            .reviews(&ReviewFilter {
                service_id: Some(service_id),
                user_id: None,
            })
            .await
        else {
            panic!("listing should succeed");
        };
        assert_eq!(for_service.len(), 2);

        let Ok(for_both) = store
            .reviews(&ReviewFilter {
                service_id: Some(service_id),
                user_id: Some(reviewer),
            })
            .await
        else {
            panic!("listing should succeed");
        };
        assert_eq!(for_both.len(), 1);
        assert_eq!(for_both.first().map(|r| r.rating), Some(5));
    }
}
