//! Loyalty balance handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::{BookingError, ErrorResponse};
use crate::service::LoyaltySummary;

/// `GET /loyalty` - The caller's loyalty position.
///
/// # Errors
///
/// Returns [`BookingError::Persistence`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/loyalty",
    tag = "Loyalty",
    summary = "Get loyalty balance",
    description = "Returns the authenticated customer's points balance, lifetime total, visits, and ledger history. Customers who never earned points get a zeroed summary.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Loyalty summary", body = LoyaltySummary),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn get_loyalty(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, BookingError> {
    let summary = state.loyalty.summary(auth.user_id).await?;
    Ok(Json(summary))
}

/// Loyalty routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/loyalty", get(get_loyalty))
}
