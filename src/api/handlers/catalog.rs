//! Catalog handlers: services and coupons.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::RedeemCouponRequest;
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{Coupon, Service};
use crate::error::{BookingError, ErrorResponse};

/// `GET /services` - The bookable service catalog.
///
/// # Errors
///
/// Returns [`BookingError::Persistence`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Catalog",
    summary = "List services",
    description = "Returns every active service, ordered by category and name.",
    responses(
        (status = 200, description = "Service catalog", body = Vec<Service>),
    )
)]
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BookingError> {
    let services = state.store.active_services().await?;
    Ok(Json(services))
}

/// `GET /coupons` - The caller's currently-valid coupons.
///
/// # Errors
///
/// Returns [`BookingError::Persistence`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/coupons",
    tag = "Catalog",
    summary = "List granted coupons",
    description = "Returns the coupons granted to the authenticated customer that are active, inside their validity window, and under their usage limit.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Coupon list", body = Vec<Coupon>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn list_coupons(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, BookingError> {
    let now = Utc::now();
    let coupons: Vec<Coupon> = state
        .store
        .coupons_for_user(auth.user_id)
        .await?
        .into_iter()
        .filter(|c| c.is_valid(now))
        .collect();
    Ok(Json(coupons))
}

/// `POST /coupons/redeem` - Consume one use of a coupon.
///
/// # Errors
///
/// Returns [`BookingError::CouponInvalid`] for unknown, inactive,
/// expired, or exhausted codes.
#[utoipa::path(
    post,
    path = "/api/coupons/redeem",
    tag = "Catalog",
    summary = "Redeem a coupon",
    description = "Atomically consumes one use of the coupon if it is active, inside its validity window, and under its usage limit.",
    security(("bearer_auth" = [])),
    request_body = RedeemCouponRequest,
    responses(
        (status = 200, description = "Redeemed coupon", body = Coupon),
        (status = 400, description = "Coupon not valid", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn redeem_coupon(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<RedeemCouponRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let coupon = state
        .store
        .redeem_coupon(&body.code, Utc::now())
        .await?
        .ok_or_else(|| BookingError::CouponInvalid(body.code.clone()))?;

    tracing::info!(user_id = %auth.user_id, code = %coupon.code, "coupon redeemed");
    Ok(Json(coupon))
}

/// Catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(list_services))
        .route("/coupons", get(list_coupons))
        .route("/coupons/redeem", post(redeem_coupon))
}
