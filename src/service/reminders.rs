//! Batch reminder scheduler and the birthday greeting pass.
//!
//! Driven by the cron trigger endpoint. Every due schedule row is
//! attempted at most once: the row is marked sent whether or not the
//! dispatch succeeded, so a flaky channel can never flood a customer
//! with repeats of the same reminder.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Appointment, NewNotification, ReminderKind, ReminderSchedule, User};
use crate::error::BookingError;
use crate::persistence::Store;
use crate::service::dispatch::Dispatcher;

/// What one scheduler run processed.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct CronOutcome {
    /// Due reminder rows processed (dispatched or skipped).
    pub processed: usize,
    /// Birthday greetings sent.
    pub greetings_sent: usize,
}

/// Scheduler over due reminder rows and birthday greetings.
#[derive(Debug, Clone)]
pub struct ReminderService {
    store: Arc<dyn Store>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl ReminderService {
    /// Creates the scheduler over a storage gateway and delivery channel.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self { store, dispatcher }
    }

    /// Processes everything due at `now`: appointment reminders first,
    /// then the birthday pass for today's date.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Persistence`] on storage failure. Dispatch
    /// failures are logged and do not abort the run.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<CronOutcome, BookingError> {
        let due = self.store.due_reminders(now).await?;
        let mut processed = 0;

        for reminder in due {
            if let Err(error) = self.send_reminder(&reminder).await {
                tracing::warn!(
                    reminder_id = %reminder.id,
                    appointment_id = %reminder.appointment_id,
                    %error,
                    "reminder dispatch failed"
                );
            }
            // Marked regardless of the dispatch outcome: one attempt per
            // row, never a resend storm.
            self.store.mark_reminder_sent(reminder.id, now).await?;
            processed += 1;
        }

        let greetings_sent = self.send_birthday_greetings(now).await?;

        tracing::info!(processed, greetings_sent, "scheduler run complete");
        Ok(CronOutcome {
            processed,
            greetings_sent,
        })
    }

    async fn send_reminder(&self, reminder: &ReminderSchedule) -> Result<(), BookingError> {
        // Appointment removed or no longer active: consume the row silently.
        let Some(appointment) = self.store.appointment(reminder.appointment_id).await? else {
            return Ok(());
        };
        if !appointment.status.occupies_slot() {
            return Ok(());
        }
        let Some(user) = self.store.user(appointment.user_id).await? else {
            return Ok(());
        };

        let notification = NewNotification {
            user_id: user.id,
            kind: "SMS".to_string(),
            title: "Appointment reminder".to_string(),
            message: reminder_message(reminder.kind, &appointment, &user),
        };
        self.dispatcher.dispatch(&user, &notification).await?;
        self.store.record_notification(&notification).await?;
        Ok(())
    }

    async fn send_birthday_greetings(&self, now: DateTime<Utc>) -> Result<usize, BookingError> {
        let today = now.date_naive();
        let celebrants = self
            .store
            .users_with_birthday(today.month(), today.day())
            .await?;

        let mut sent = 0;
        for user in celebrants {
            // The marker row makes the greeting one-shot per user per
            // year, across overlapping scheduler runs too.
            if !self.store.claim_birthday_greeting(user.id, today.year()).await? {
                continue;
            }
            let notification = NewNotification {
                user_id: user.id,
                kind: "PUSH".to_string(),
                title: "Happy birthday!".to_string(),
                message: format!(
                    "Happy birthday, {}! Enjoy a special treat on your next visit.",
                    user.name
                ),
            };
            if let Err(error) = self.dispatcher.dispatch(&user, &notification).await {
                tracing::warn!(user_id = %user.id, %error, "birthday greeting failed");
                continue;
            }
            self.store.record_notification(&notification).await?;
            sent += 1;
        }
        Ok(sent)
    }
}

fn reminder_message(kind: ReminderKind, appointment: &Appointment, user: &User) -> String {
    let when = appointment.date_time.format("%B %-d at %-I:%M %p");
    match kind {
        ReminderKind::Reminder48h => format!(
            "Hi {}! A reminder that your appointment is coming up on {when}.",
            user.name
        ),
        ReminderKind::Reminder24h => format!(
            "Hi {}! Your appointment is tomorrow, {when}. See you soon!",
            user.name
        ),
        ReminderKind::Reminder1h => format!(
            "Hi {}! Your appointment starts in one hour, at {when}.",
            user.name
        ),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};
    use std::sync::Mutex;
    use uuid::Uuid;

    use crate::domain::{
        AppointmentChange, AppointmentStatus, NewAppointment, Service, UserRole,
    };
    use crate::persistence::memory::MemoryStore;

    #[derive(Debug, Default)]
    struct RecordingDispatcher {
        delivered: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingDispatcher {
        fn failing() -> Self {
            Self {
                delivered: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn count(&self) -> usize {
            self.delivered.lock().map(|d| d.len()).unwrap_or(0)
        }

        fn handle(self: &Arc<Self>) -> Arc<dyn Dispatcher> {
            Arc::<Self>::clone(self)
        }
    }

    #[async_trait]
    impl Dispatcher for RecordingDispatcher {
        async fn dispatch(
            &self,
            _recipient: &User,
            notification: &NewNotification,
        ) -> Result<(), BookingError> {
            if self.fail {
                return Err(BookingError::Provider("channel down".to_string()));
            }
            if let Ok(mut delivered) = self.delivered.lock() {
                delivered.push(notification.message.clone());
            }
            Ok(())
        }
    }

    fn sample_user(birthday: Option<NaiveDate>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "mia@example.com".to_string(),
            name: "Mia".to_string(),
            phone: Some("+15550111".to_string()),
            birthday,
            role: UserRole::Customer,
            created_at: Utc::now(),
        }
    }

    fn sample_service() -> Service {
        Service {
            id: Uuid::new_v4(),
            name: "Gel Manicure".to_string(),
            description: "45-minute manicure".to_string(),
            benefits: None,
            duration_minutes: 45,
            price: 55.0,
            category: "Nails".to_string(),
            active: true,
        }
    }

    async fn book(store: &Arc<MemoryStore>, user: &User, service: &Service, at: DateTime<Utc>) -> Uuid {
        let appointment = store
            .insert_appointment(&NewAppointment {
                user_id: user.id,
                service_id: service.id,
                date_time: at,
                notes: None,
            })
            .await;
        let Ok(appointment) = appointment else {
            panic!("booking should succeed");
        };
        appointment.id
    }

    #[test]
    fn run_summary_reports_processed_count() {
        let outcome = CronOutcome {
            processed: 3,
            greetings_sent: 1,
        };
        let Ok(json) = serde_json::to_value(outcome) else {
            panic!("outcome should serialize");
        };
        assert_eq!(json.get("processed").and_then(|v| v.as_u64()), Some(3));
        assert_eq!(json.get("greetings_sent").and_then(|v| v.as_u64()), Some(1));
    }

    #[tokio::test]
    async fn due_reminders_are_dispatched_once() {
        let store = Arc::new(MemoryStore::new());
        let user = sample_user(None);
        let service = sample_service();
        store.add_user(user.clone());
        store.add_service(service.clone());

        // Slot 30 hours out: only the 48h reminder is due now.
        let now = Utc::now();
        book(&store, &user, &service, now + Duration::hours(30)).await;

        let dispatcher = Arc::new(RecordingDispatcher::default());
        let scheduler = ReminderService::new(store.handle(), dispatcher.handle());

        let Ok(outcome) = scheduler.run(now).await else {
            panic!("run should succeed");
        };
        assert_eq!(outcome.processed, 1);
        assert_eq!(dispatcher.count(), 1);
        assert_eq!(store.notifications().len(), 1);

        // Second run: nothing due anymore.
        let Ok(again) = scheduler.run(now).await else {
            panic!("run should succeed");
        };
        assert_eq!(again.processed, 0);
        assert_eq!(dispatcher.count(), 1);
    }

    #[tokio::test]
    async fn failed_dispatch_still_consumes_the_row() {
        let store = Arc::new(MemoryStore::new());
        let user = sample_user(None);
        let service = sample_service();
        store.add_user(user.clone());
        store.add_service(service.clone());

        let now = Utc::now();
        book(&store, &user, &service, now + Duration::hours(30)).await;

        let dispatcher = Arc::new(RecordingDispatcher::failing());
        let scheduler = ReminderService::new(store.handle(), dispatcher);

        let Ok(outcome) = scheduler.run(now).await else {
            panic!("run should succeed");
        };
        assert_eq!(outcome.processed, 1);
        assert!(store.notifications().is_empty());

        let Ok(again) = scheduler.run(now).await else {
            panic!("run should succeed");
        };
        assert_eq!(again.processed, 0);
    }

    #[tokio::test]
    async fn cancelled_appointments_get_no_reminder() {
        let store = Arc::new(MemoryStore::new());
        let user = sample_user(None);
        let service = sample_service();
        store.add_user(user.clone());
        store.add_service(service.clone());

        let now = Utc::now();
        let appointment_id = book(&store, &user, &service, now + Duration::hours(30)).await;
        let cancelled = store
            .update_appointment(
                appointment_id,
                &AppointmentChange {
                    status: Some(AppointmentStatus::Cancelled),
                    date_time: None,
                },
                None,
            )
            .await;
        assert!(cancelled.is_ok());

        let dispatcher = Arc::new(RecordingDispatcher::default());
        let scheduler = ReminderService::new(store.handle(), dispatcher.handle());

        let Ok(outcome) = scheduler.run(now).await else {
            panic!("run should succeed");
        };
        assert_eq!(outcome.processed, 1);
        assert_eq!(dispatcher.count(), 0);
    }

    #[tokio::test]
    async fn birthday_greeting_goes_out_once_per_year() {
        let now = Utc::now();
        let today = now.date_naive();
        let Some(birthday) = NaiveDate::from_ymd_opt(1990, today.month(), today.day()) else {
            panic!("valid date");
        };

        let store = Arc::new(MemoryStore::new());
        let user = sample_user(Some(birthday));
        store.add_user(user.clone());

        let dispatcher = Arc::new(RecordingDispatcher::default());
        let scheduler = ReminderService::new(store.handle(), dispatcher.handle());

        let Ok(first) = scheduler.run(now).await else {
            panic!("run should succeed");
        };
        assert_eq!(first.greetings_sent, 1);

        // A later run the same day must not greet again.
        let Ok(second) = scheduler.run(now + Duration::hours(6)).await else {
            panic!("run should succeed");
        };
        assert_eq!(second.greetings_sent, 0);
        assert_eq!(dispatcher.count(), 1);
    }

    #[tokio::test]
    async fn users_without_matching_birthday_are_skipped() {
        let now = Utc::now();
        let today = now.date_naive();
        // A birthday on a different day of the month.
        let other_day = if today.day() == 1 { 2 } else { 1 };
        let Some(birthday) = NaiveDate::from_ymd_opt(1985, today.month(), other_day) else {
            panic!("valid date");
        };

        let store = Arc::new(MemoryStore::new());
        store.add_user(sample_user(Some(birthday)));

        let dispatcher = Arc::new(RecordingDispatcher::default());
        let scheduler = ReminderService::new(store.handle(), dispatcher.handle());

        let Ok(outcome) = scheduler.run(now).await else {
            panic!("run should succeed");
        };
        assert_eq!(outcome.greetings_sent, 0);
        assert_eq!(dispatcher.count(), 0);
    }
}
