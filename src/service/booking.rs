//! Appointment booking: slot availability, creation, listing, and
//! lifecycle updates.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::domain::{
    Appointment, AppointmentChange, AppointmentFilter, AppointmentWithService, NewAppointment,
    Service, reminder_plan,
};
use crate::error::BookingError;
use crate::persistence::Store;

/// True for roles allowed to act on any customer's appointment.
fn is_staff(role: &str) -> bool {
    matches!(role, "STAFF" | "ADMIN")
}

/// Orchestrates the appointment lifecycle against the storage gateway.
///
/// Slot uniqueness is enforced twice: a pre-check here for a friendly
/// error, and the storage-level unique index for the concurrent case.
#[derive(Debug, Clone)]
pub struct BookingService {
    store: Arc<dyn Store>,
}

impl BookingService {
    /// Creates the service over a storage gateway.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Whether the exact slot is free of PENDING/CONFIRMED appointments.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Persistence`] on storage failure.
    pub async fn is_slot_available(&self, at: DateTime<Utc>) -> Result<bool, BookingError> {
        Ok(self.store.find_active_at(at).await?.is_none())
    }

    /// Books an appointment: validates the service, claims the slot, and
    /// creates the three reminder rows in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NotFound`] for an unknown or inactive
    /// service and [`BookingError::SlotTaken`] when the slot is occupied.
    pub async fn create(
        &self,
        new: NewAppointment,
    ) -> Result<AppointmentWithService, BookingError> {
        let service = self
            .store
            .service(new.service_id)
            .await?
            .filter(|s| s.active)
            .ok_or(BookingError::NotFound("service"))?;

        if let Some(existing) = self.store.find_active_at(new.date_time).await? {
            tracing::debug!(
                slot = %new.date_time,
                holder = %existing.id,
                "booking rejected: slot already held"
            );
            return Err(BookingError::SlotTaken(new.date_time));
        }

        let appointment = self.store.insert_appointment(&new).await?;
        tracing::info!(
            appointment_id = %appointment.id,
            user_id = %appointment.user_id,
            slot = %appointment.date_time,
            "appointment booked"
        );

        Ok(AppointmentWithService {
            appointment,
            service,
        })
    }

    /// Lists the caller's appointments with their services attached.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Persistence`] on storage failure.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        filter: &AppointmentFilter,
    ) -> Result<Vec<AppointmentWithService>, BookingError> {
        let appointments = self.store.appointments_for_user(user_id, filter).await?;
        let mut services: HashMap<Uuid, Service> = HashMap::new();

        let mut out = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            let service = match services.get(&appointment.service_id) {
                Some(service) => service.clone(),
                None => {
                    let service = self
                        .store
                        .service(appointment.service_id)
                        .await?
                        .ok_or(BookingError::NotFound("service"))?;
                    services.insert(appointment.service_id, service.clone());
                    service
                }
            };
            out.push(AppointmentWithService {
                appointment,
                service,
            });
        }
        Ok(out)
    }

    /// Fetches one appointment, enforcing that the caller owns it or
    /// holds a staff role.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::AppointmentNotFound`] for unknown ids and
    /// [`BookingError::Forbidden`] for other customers' appointments.
    pub async fn get_for_user(
        &self,
        id: Uuid,
        requester: &AuthUser,
    ) -> Result<AppointmentWithService, BookingError> {
        let appointment = self.load_owned(id, requester).await?;
        let service = self
            .store
            .service(appointment.service_id)
            .await?
            .ok_or(BookingError::NotFound("service"))?;
        Ok(AppointmentWithService {
            appointment,
            service,
        })
    }

    /// Applies a partial update. Status values are written verbatim; a
    /// slot change additionally replaces the reminder schedule wholesale
    /// from the new slot.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for an empty change,
    /// [`BookingError::Forbidden`] for other customers' appointments, and
    /// [`BookingError::SlotTaken`] when the new slot is occupied.
    pub async fn update(
        &self,
        id: Uuid,
        requester: &AuthUser,
        change: AppointmentChange,
    ) -> Result<AppointmentWithService, BookingError> {
        if change.is_empty() {
            return Err(BookingError::Validation(
                "update must set status or dateTime".to_string(),
            ));
        }
        self.load_owned(id, requester).await?;

        let reminders = change.date_time.map(|slot| reminder_plan(id, slot));
        let appointment = self
            .store
            .update_appointment(id, &change, reminders.as_deref())
            .await?;

        tracing::info!(
            appointment_id = %appointment.id,
            status = %appointment.status,
            rescheduled = change.date_time.is_some(),
            "appointment updated"
        );

        let service = self
            .store
            .service(appointment.service_id)
            .await?
            .ok_or(BookingError::NotFound("service"))?;
        Ok(AppointmentWithService {
            appointment,
            service,
        })
    }

    async fn load_owned(
        &self,
        id: Uuid,
        requester: &AuthUser,
    ) -> Result<Appointment, BookingError> {
        let appointment = self
            .store
            .appointment(id)
            .await?
            .ok_or(BookingError::AppointmentNotFound(id))?;
        if appointment.user_id != requester.user_id && !is_staff(&requester.role) {
            return Err(BookingError::Forbidden(
                "appointment belongs to another customer".to_string(),
            ));
        }
        Ok(appointment)
    }
}
