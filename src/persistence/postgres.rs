//! PostgreSQL implementation of the storage gateway.
//!
//! Queries are runtime-checked and decode into plain tuples that map
//! into domain structs; enum columns are TEXT and parse through
//! `FromStr`. Slot contention surfaces through the partial unique index
//! `appointments_active_slot` and is translated to
//! [`BookingError::SlotTaken`] here.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::Store;
use crate::domain::{
    Appointment, AppointmentChange, AppointmentFilter, AppointmentStatus, Coupon, LoyaltyAccount,
    LoyaltyTransaction, NewAppointment, NewLoyaltyTransaction, NewNotification, NewPayment,
    NewReview, Payment, PaymentStatus, ReminderSchedule, Review, ReviewFilter, Service, User,
    reminder_plan,
};
use crate::error::BookingError;

const APPOINTMENT_COLUMNS: &str =
    "id, user_id, service_id, date_time, status, notes, created_at, updated_at";
const SCHEDULE_COLUMNS: &str = "id, appointment_id, scheduled_for, kind, sent, sent_at";
const PAYMENT_COLUMNS: &str =
    "id, user_id, appointment_id, amount, deposit_amount, method, status, transaction_id, created_at";
const ACCOUNT_COLUMNS: &str = "id, user_id, points, total_earned, visits";
const LEDGER_COLUMNS: &str =
    "id, account_id, points, kind, description, appointment_id, created_at";
const USER_COLUMNS: &str = "id, email, name, phone, birthday, role, created_at";
const SERVICE_COLUMNS: &str =
    "id, name, description, benefits, duration_minutes, price, category, active";
const COUPON_COLUMNS: &str = "id, code, title, description, discount, discount_type, \
valid_from, valid_until, usage_limit, used_count, active";
const REVIEW_COLUMNS: &str =
    "id, user_id, service_id, appointment_id, rating, comment, created_at";
const COUPON_COLUMNS_QUALIFIED: &str =
    "c.id, c.code, c.title, c.description, c.discount, c.discount_type, \
c.valid_from, c.valid_until, c.usage_limit, c.used_count, c.active";

type AppointmentRow = (
    Uuid,
    Uuid,
    Uuid,
    DateTime<Utc>,
    String,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);
type ScheduleRow = (Uuid, Uuid, DateTime<Utc>, String, bool, Option<DateTime<Utc>>);
type PaymentRow = (
    Uuid,
    Uuid,
    Option<Uuid>,
    f64,
    Option<f64>,
    String,
    String,
    Option<String>,
    DateTime<Utc>,
);
type AccountRow = (Uuid, Uuid, i64, i64, i32);
type LedgerRow = (Uuid, Uuid, i64, String, String, Option<Uuid>, DateTime<Utc>);
type UserRow = (
    Uuid,
    String,
    String,
    Option<String>,
    Option<NaiveDate>,
    String,
    DateTime<Utc>,
);
type ServiceRow = (Uuid, String, String, Option<String>, i32, f64, String, bool);
type ReviewRow = (
    Uuid,
    Uuid,
    Uuid,
    Option<Uuid>,
    i32,
    Option<String>,
    DateTime<Utc>,
);
type CouponRow = (
    Uuid,
    String,
    String,
    Option<String>,
    f64,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
    Option<i32>,
    i32,
    bool,
);

/// PostgreSQL-backed [`Store`], cheap to clone via the shared pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wraps an already-connected pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_appointment(row: AppointmentRow) -> Result<Appointment, BookingError> {
    Ok(Appointment {
        id: row.0,
        user_id: row.1,
        service_id: row.2,
        date_time: row.3,
        status: row.4.parse().map_err(BookingError::Persistence)?,
        notes: row.5,
        created_at: row.6,
        updated_at: row.7,
    })
}

fn map_schedule(row: ScheduleRow) -> Result<ReminderSchedule, BookingError> {
    Ok(ReminderSchedule {
        id: row.0,
        appointment_id: row.1,
        scheduled_for: row.2,
        kind: row.3.parse().map_err(BookingError::Persistence)?,
        sent: row.4,
        sent_at: row.5,
    })
}

fn map_payment(row: PaymentRow) -> Result<Payment, BookingError> {
    Ok(Payment {
        id: row.0,
        user_id: row.1,
        appointment_id: row.2,
        amount: row.3,
        deposit_amount: row.4,
        method: row.5.parse().map_err(BookingError::Persistence)?,
        status: row.6.parse().map_err(BookingError::Persistence)?,
        transaction_id: row.7,
        created_at: row.8,
    })
}

const fn map_account(row: AccountRow) -> LoyaltyAccount {
    LoyaltyAccount {
        id: row.0,
        user_id: row.1,
        points: row.2,
        total_earned: row.3,
        visits: row.4,
    }
}

fn map_ledger(row: LedgerRow) -> Result<LoyaltyTransaction, BookingError> {
    Ok(LoyaltyTransaction {
        id: row.0,
        account_id: row.1,
        points: row.2,
        kind: row.3.parse().map_err(BookingError::Persistence)?,
        description: row.4,
        appointment_id: row.5,
        created_at: row.6,
    })
}

fn map_user(row: UserRow) -> Result<User, BookingError> {
    Ok(User {
        id: row.0,
        email: row.1,
        name: row.2,
        phone: row.3,
        birthday: row.4,
        role: row.5.parse().map_err(BookingError::Persistence)?,
        created_at: row.6,
    })
}

fn map_service(row: ServiceRow) -> Service {
    Service {
        id: row.0,
        name: row.1,
        description: row.2,
        benefits: row.3,
        duration_minutes: row.4,
        price: row.5,
        category: row.6,
        active: row.7,
    }
}

fn map_review(row: ReviewRow) -> Review {
    Review {
        id: row.0,
        user_id: row.1,
        service_id: row.2,
        appointment_id: row.3,
        rating: row.4,
        comment: row.5,
        created_at: row.6,
    }
}

fn map_coupon(row: CouponRow) -> Result<Coupon, BookingError> {
    Ok(Coupon {
        id: row.0,
        code: row.1,
        title: row.2,
        description: row.3,
        discount: row.4,
        discount_type: row.5.parse().map_err(BookingError::Persistence)?,
        valid_from: row.6,
        valid_until: row.7,
        usage_limit: row.8,
        used_count: row.9,
        active: row.10,
    })
}

/// Translates a unique-index violation on the active-slot index into the
/// domain's slot conflict; everything else stays a persistence fault.
fn map_slot_conflict(err: sqlx::Error, slot: DateTime<Utc>) -> BookingError {
    if let sqlx::Error::Database(ref db) = err {
        if db.constraint() == Some("appointments_active_slot") {
            return BookingError::SlotTaken(slot);
        }
    }
    BookingError::from(err)
}

async fn insert_schedule_row(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    appointment_id: Uuid,
    scheduled_for: DateTime<Utc>,
    kind: &str,
) -> Result<(), BookingError> {
    sqlx::query(
        "INSERT INTO notification_schedules (id, appointment_id, scheduled_for, kind) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(appointment_id)
    .bind(scheduled_for)
    .bind(kind)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl Store for PostgresStore {
    async fn find_active_at(&self, at: DateTime<Utc>) -> Result<Option<Appointment>, BookingError> {
        let row: Option<AppointmentRow> = sqlx::query_as(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE date_time = $1 AND status IN ('PENDING', 'CONFIRMED')"
        ))
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        row.map(map_appointment).transpose()
    }

    async fn insert_appointment(
        &self,
        new: &NewAppointment,
    ) -> Result<Appointment, BookingError> {
        let mut tx = self.pool.begin().await?;

        let row: AppointmentRow = sqlx::query_as(&format!(
            "INSERT INTO appointments (id, user_id, service_id, date_time, status, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.service_id)
        .bind(new.date_time)
        .bind(AppointmentStatus::Pending.as_str())
        .bind(new.notes.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_slot_conflict(e, new.date_time))?;

        let appointment = map_appointment(row)?;
        for reminder in reminder_plan(appointment.id, appointment.date_time) {
            insert_schedule_row(
                &mut tx,
                reminder.appointment_id,
                reminder.scheduled_for,
                reminder.kind.as_str(),
            )
            .await?;
        }

        tx.commit().await?;
        Ok(appointment)
    }

    async fn appointment(&self, id: Uuid) -> Result<Option<Appointment>, BookingError> {
        let row: Option<AppointmentRow> = sqlx::query_as(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(map_appointment).transpose()
    }

    async fn appointments_for_user(
        &self,
        user_id: Uuid,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, BookingError> {
        let rows: Vec<AppointmentRow> = sqlx::query_as(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE user_id = $1 \
               AND ($2::text IS NULL OR status = $2) \
               AND ($3::timestamptz IS NULL OR date_time >= $3) \
               AND ($4::timestamptz IS NULL OR date_time <= $4) \
             ORDER BY date_time ASC"
        ))
        .bind(user_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.start)
        .bind(filter.end)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(map_appointment).collect()
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        change: &AppointmentChange,
        reminders: Option<&[crate::domain::NewReminder]>,
    ) -> Result<Appointment, BookingError> {
        let mut tx = self.pool.begin().await?;

        let result: Result<Option<AppointmentRow>, sqlx::Error> =
            match (change.status, change.date_time) {
                (Some(status), Some(date_time)) => {
                    sqlx::query_as(&format!(
                        "UPDATE appointments SET status = $2, date_time = $3, updated_at = now() \
                         WHERE id = $1 RETURNING {APPOINTMENT_COLUMNS}"
                    ))
                    .bind(id)
                    .bind(status.as_str())
                    .bind(date_time)
                    .fetch_optional(&mut *tx)
                    .await
                }
                (Some(status), None) => {
                    sqlx::query_as(&format!(
                        "UPDATE appointments SET status = $2, updated_at = now() \
                         WHERE id = $1 RETURNING {APPOINTMENT_COLUMNS}"
                    ))
                    .bind(id)
                    .bind(status.as_str())
                    .fetch_optional(&mut *tx)
                    .await
                }
                (None, Some(date_time)) => {
                    sqlx::query_as(&format!(
                        "UPDATE appointments SET date_time = $2, updated_at = now() \
                         WHERE id = $1 RETURNING {APPOINTMENT_COLUMNS}"
                    ))
                    .bind(id)
                    .bind(date_time)
                    .fetch_optional(&mut *tx)
                    .await
                }
                (None, None) => {
                    sqlx::query_as(&format!(
                        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
                    ))
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await
                }
            };

        let row = result.map_err(|e| match change.date_time {
            Some(slot) => map_slot_conflict(e, slot),
            None => BookingError::from(e),
        })?;
        let Some(row) = row else {
            return Err(BookingError::AppointmentNotFound(id));
        };

        if let Some(reminders) = reminders {
            sqlx::query("DELETE FROM notification_schedules WHERE appointment_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for reminder in reminders {
                insert_schedule_row(
                    &mut tx,
                    reminder.appointment_id,
                    reminder.scheduled_for,
                    reminder.kind.as_str(),
                )
                .await?;
            }
        }

        tx.commit().await?;
        map_appointment(row)
    }

    async fn set_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<bool, BookingError> {
        let result = sqlx::query(
            "UPDATE appointments SET status = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn due_reminders(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReminderSchedule>, BookingError> {
        let rows: Vec<ScheduleRow> = sqlx::query_as(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM notification_schedules \
             WHERE sent = FALSE AND scheduled_for <= $1 \
             ORDER BY scheduled_for ASC"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(map_schedule).collect()
    }

    async fn mark_reminder_sent(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), BookingError> {
        sqlx::query("UPDATE notification_schedules SET sent = TRUE, sent_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_payment(&self, new: &NewPayment) -> Result<Payment, BookingError> {
        let row: PaymentRow = sqlx::query_as(&format!(
            "INSERT INTO payments \
             (id, user_id, appointment_id, amount, deposit_amount, method, status, transaction_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.appointment_id)
        .bind(new.amount)
        .bind(new.deposit_amount)
        .bind(new.method.as_str())
        .bind(new.status.as_str())
        .bind(new.transaction_id.as_deref())
        .fetch_one(&self.pool)
        .await?;
        map_payment(row)
    }

    async fn set_payment_status_by_transaction(
        &self,
        transaction_id: &str,
        status: PaymentStatus,
    ) -> Result<u64, BookingError> {
        let result = sqlx::query("UPDATE payments SET status = $2 WHERE transaction_id = $1")
            .bind(transaction_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn accrue_loyalty(
        &self,
        user_id: Uuid,
        points: i64,
    ) -> Result<LoyaltyAccount, BookingError> {
        // Single-statement upsert: concurrent accruals both land, never
        // lost to a read-modify-write race.
        let row: AccountRow = sqlx::query_as(&format!(
            "INSERT INTO loyalty_accounts (id, user_id, points, total_earned, visits) \
             VALUES ($1, $2, $3, $3, 0) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 points = loyalty_accounts.points + EXCLUDED.points, \
                 total_earned = loyalty_accounts.total_earned + EXCLUDED.total_earned \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(points)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_account(row))
    }

    async fn append_loyalty_transaction(
        &self,
        new: &NewLoyaltyTransaction,
    ) -> Result<LoyaltyTransaction, BookingError> {
        let row: LedgerRow = sqlx::query_as(&format!(
            "INSERT INTO loyalty_transactions \
             (id, account_id, points, kind, description, appointment_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {LEDGER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(new.account_id)
        .bind(new.points)
        .bind(new.kind.as_str())
        .bind(&new.description)
        .bind(new.appointment_id)
        .fetch_one(&self.pool)
        .await?;
        map_ledger(row)
    }

    async fn loyalty_account(
        &self,
        user_id: Uuid,
    ) -> Result<Option<LoyaltyAccount>, BookingError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM loyalty_accounts WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(map_account))
    }

    async fn loyalty_transactions(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<LoyaltyTransaction>, BookingError> {
        let rows: Vec<LedgerRow> = sqlx::query_as(&format!(
            "SELECT {LEDGER_COLUMNS} FROM loyalty_transactions \
             WHERE account_id = $1 ORDER BY created_at DESC"
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(map_ledger).collect()
    }

    async fn user(&self, id: Uuid) -> Result<Option<User>, BookingError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(map_user).transpose()
    }

    async fn users_with_birthday(&self, month: u32, day: u32) -> Result<Vec<User>, BookingError> {
        let month = i32::try_from(month)
            .map_err(|_| BookingError::Validation("month out of range".to_string()))?;
        let day = i32::try_from(day)
            .map_err(|_| BookingError::Validation("day out of range".to_string()))?;

        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE birthday IS NOT NULL \
               AND EXTRACT(MONTH FROM birthday)::int = $1 \
               AND EXTRACT(DAY FROM birthday)::int = $2"
        ))
        .bind(month)
        .bind(day)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(map_user).collect()
    }

    async fn claim_birthday_greeting(
        &self,
        user_id: Uuid,
        year: i32,
    ) -> Result<bool, BookingError> {
        let result = sqlx::query(
            "INSERT INTO birthday_greetings (user_id, year) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(year)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn service(&self, id: Uuid) -> Result<Option<Service>, BookingError> {
        let row: Option<ServiceRow> = sqlx::query_as(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(map_service))
    }

    async fn active_services(&self) -> Result<Vec<Service>, BookingError> {
        let rows: Vec<ServiceRow> = sqlx::query_as(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE active ORDER BY category, name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(map_service).collect())
    }

    async fn coupons_for_user(&self, user_id: Uuid) -> Result<Vec<Coupon>, BookingError> {
        let rows: Vec<CouponRow> = sqlx::query_as(&format!(
            "SELECT {COUPON_COLUMNS_QUALIFIED} FROM coupons c \
             JOIN coupon_grants g ON g.coupon_id = c.id \
             WHERE g.user_id = $1 ORDER BY c.valid_until ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(map_coupon).collect()
    }

    async fn redeem_coupon(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Coupon>, BookingError> {
        // Conditional increment: validity and the usage limit are checked
        // in the same statement that consumes a use.
        let row: Option<CouponRow> = sqlx::query_as(&format!(
            "UPDATE coupons SET used_count = used_count + 1 \
             WHERE code = $1 AND active \
               AND valid_from <= $2 AND valid_until >= $2 \
               AND (usage_limit IS NULL OR used_count < usage_limit) \
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        row.map(map_coupon).transpose()
    }

    async fn insert_review(&self, new: &NewReview) -> Result<Review, BookingError> {
        let row: ReviewRow = sqlx::query_as(&format!(
            "INSERT INTO reviews (id, user_id, service_id, appointment_id, rating, comment) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.service_id)
        .bind(new.appointment_id)
        .bind(new.rating)
        .bind(new.comment.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(map_review(row))
    }

    async fn reviews(&self, filter: &ReviewFilter) -> Result<Vec<Review>, BookingError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE ($1::uuid IS NULL OR service_id = $1) \
               AND ($2::uuid IS NULL OR user_id = $2) \
             ORDER BY created_at DESC"
        ))
        .bind(filter.service_id)
        .bind(filter.user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(map_review).collect())
    }

    async fn record_notification(&self, new: &NewNotification) -> Result<(), BookingError> {
        sqlx::query(
            "INSERT INTO notifications (id, user_id, kind, title, message) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.kind)
        .bind(&new.title)
        .bind(&new.message)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
