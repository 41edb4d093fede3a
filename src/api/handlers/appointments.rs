//! Appointment handlers: book, list, get, update, availability.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::dto::{
    AppointmentListQuery, AvailabilityQuery, AvailabilityResponse, CreateAppointmentRequest,
    UpdateAppointmentRequest,
};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::AppointmentWithService;
use crate::error::{BookingError, ErrorResponse};

/// `POST /appointments` - Book an appointment.
///
/// # Errors
///
/// Returns [`BookingError::SlotTaken`] when the slot is occupied.
#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Appointments",
    summary = "Book an appointment",
    description = "Books the given service at the exact slot for the authenticated customer. Creates the three reminder rows (48h, 24h, 1h before) atomically with the appointment.",
    security(("bearer_auth" = [])),
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentWithService),
        (status = 400, description = "Invalid request or slot taken", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown service", body = ErrorResponse),
    )
)]
pub async fn create_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let new = body.into_new_appointment(auth.user_id)?;
    let created = state.bookings.create(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /appointments` - List the caller's appointments.
///
/// # Errors
///
/// Returns [`BookingError::Persistence`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Appointments",
    summary = "List appointments",
    description = "Returns the authenticated customer's appointments with their services, ordered by slot ascending. Optional status and date-range filters.",
    security(("bearer_auth" = [])),
    params(AppointmentListQuery),
    responses(
        (status = 200, description = "Appointment list", body = Vec<AppointmentWithService>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AppointmentListQuery>,
) -> Result<impl IntoResponse, BookingError> {
    let appointments = state
        .bookings
        .list_for_user(auth.user_id, &query.into())
        .await?;
    Ok(Json(appointments))
}

/// `GET /appointments/availability` - Check a slot.
///
/// # Errors
///
/// Returns [`BookingError::Persistence`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/appointments/availability",
    tag = "Appointments",
    summary = "Check slot availability",
    description = "Whether the exact slot is free of pending or confirmed appointments.",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Availability", body = AvailabilityResponse),
    )
)]
pub async fn check_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, BookingError> {
    let available = state.bookings.is_slot_available(query.date_time).await?;
    Ok(Json(AvailabilityResponse { available }))
}

/// `GET /appointments/:id` - Get one appointment.
///
/// # Errors
///
/// Returns [`BookingError::Forbidden`] for another customer's
/// appointment.
#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    summary = "Get appointment",
    description = "Returns one appointment with its service. Customers see only their own; staff and admins see any.",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment", body = AppointmentWithService),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Another customer's appointment", body = ErrorResponse),
        (status = 404, description = "Unknown appointment", body = ErrorResponse),
    )
)]
pub async fn get_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, BookingError> {
    let appointment = state.bookings.get_for_user(id, &auth).await?;
    Ok(Json(appointment))
}

/// `PATCH /appointments/:id` - Update status and/or slot.
///
/// # Errors
///
/// Returns [`BookingError::SlotTaken`] when the new slot is occupied.
#[utoipa::path(
    patch,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    summary = "Update appointment",
    description = "Applies a partial update. A status is written verbatim; a new slot additionally rebuilds the reminder schedule from the new time.",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment id")),
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Updated appointment", body = AppointmentWithService),
        (status = 400, description = "Empty update or slot taken", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Another customer's appointment", body = ErrorResponse),
        (status = 404, description = "Unknown appointment", body = ErrorResponse),
    )
)]
pub async fn update_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAppointmentRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let updated = state.bookings.update(id, &auth, body.into()).await?;
    Ok(Json(updated))
}

/// Appointment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/appointments",
            get(list_appointments).post(create_appointment),
        )
        .route("/appointments/availability", get(check_availability))
        .route(
            "/appointments/{id}",
            get(get_appointment).patch(update_appointment),
        )
}
