//! Cron trigger for the batch reminder scheduler.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::app_state::AppState;
use crate::error::{BookingError, ErrorResponse};
use crate::service::CronOutcome;

/// `GET /cron/notifications` - Run the reminder scheduler.
///
/// Authenticated by the shared `CRON_SECRET`, not a user token: the
/// caller is the platform's cron runner. An empty configured secret
/// disables the endpoint entirely.
///
/// # Errors
///
/// Returns [`BookingError::Unauthorized`] for a missing or wrong secret.
#[utoipa::path(
    get,
    path = "/api/cron/notifications",
    tag = "Cron",
    summary = "Run the reminder scheduler",
    description = "Dispatches every due appointment reminder (attempted at most once per row) and sends birthday greetings for today, one per customer per year.",
    responses(
        (status = 200, description = "Run summary", body = CronOutcome),
        (status = 401, description = "Missing or wrong cron secret", body = ErrorResponse),
    )
)]
pub async fn run_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, BookingError> {
    let expected = &state.config.cron_secret;
    if expected.is_empty() {
        return Err(BookingError::Unauthorized(
            "cron endpoint is disabled".to_string(),
        ));
    }

    let presented = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| BookingError::Unauthorized("missing cron secret".to_string()))?;
    if presented != expected {
        return Err(BookingError::Unauthorized("wrong cron secret".to_string()));
    }

    let outcome = state.reminders.run(Utc::now()).await?;
    Ok(Json(outcome))
}

/// Cron routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/cron/notifications", get(run_notifications))
}
