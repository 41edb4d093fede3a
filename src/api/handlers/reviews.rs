//! Review handlers: public listing and authenticated creation.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{CreateReviewRequest, ReviewListQuery};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::{Review, ReviewFilter};
use crate::error::{BookingError, ErrorResponse};

/// `GET /reviews` - List reviews.
///
/// # Errors
///
/// Returns [`BookingError::Persistence`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/reviews",
    tag = "Reviews",
    summary = "List reviews",
    description = "Returns reviews newest first, optionally narrowed to one service or one reviewer. Public: ratings are part of the catalog.",
    params(ReviewListQuery),
    responses(
        (status = 200, description = "Review list", body = Vec<Review>),
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<impl IntoResponse, BookingError> {
    let filter = ReviewFilter::from(query);
    let reviews = state.store.reviews(&filter).await?;
    Ok(Json(reviews))
}

/// `POST /reviews` - Leave a review.
///
/// # Errors
///
/// Returns [`BookingError::Validation`] for an out-of-range rating and
/// [`BookingError::NotFound`] for an unknown service.
#[utoipa::path(
    post,
    path = "/api/reviews",
    tag = "Reviews",
    summary = "Leave a review",
    description = "Records a 1-5 star review of a service for the authenticated customer, optionally tied to the appointment it came from.",
    security(("bearer_auth" = [])),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review recorded", body = Review),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown service", body = ErrorResponse),
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let new = body.into_new_review(auth.user_id)?;
    state
        .store
        .service(new.service_id)
        .await?
        .ok_or(BookingError::NotFound("service"))?;

    let review = state.store.insert_review(&new).await?;
    tracing::info!(user_id = %auth.user_id, service_id = %review.service_id, rating = review.rating, "review recorded");
    Ok((StatusCode::CREATED, Json(review)))
}

/// Review routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reviews", get(list_reviews).post(create_review))
}
