//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api`; the health check
//! stays at the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

use crate::app_state::AppState;

/// OpenAPI document for the gateway.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bloom Booking Gateway",
        description = "Appointments, payments, loyalty, and reminders for the Bloom salon & spa platform."
    ),
    paths(
        handlers::appointments::create_appointment,
        handlers::appointments::list_appointments,
        handlers::appointments::check_availability,
        handlers::appointments::get_appointment,
        handlers::appointments::update_appointment,
        handlers::payments::create_payment,
        handlers::payments::payment_webhook,
        handlers::cron::run_notifications,
        handlers::loyalty::get_loyalty,
        handlers::catalog::list_services,
        handlers::catalog::list_coupons,
        handlers::catalog::redeem_coupon,
        handlers::reviews::list_reviews,
        handlers::reviews::create_review,
        handlers::system::health_handler,
    ),
    components(schemas(
        crate::domain::Appointment,
        crate::domain::AppointmentStatus,
        crate::domain::AppointmentWithService,
        crate::domain::Coupon,
        crate::domain::DiscountType,
        crate::domain::LoyaltyTransaction,
        crate::domain::LoyaltyTransactionKind,
        crate::domain::Payment,
        crate::domain::PaymentMethod,
        crate::domain::PaymentStatus,
        crate::domain::Review,
        crate::domain::Service,
        crate::error::ErrorResponse,
        crate::service::CronOutcome,
        crate::service::LoyaltySummary,
        dto::AvailabilityResponse,
        dto::CreateAppointmentRequest,
        dto::CreatePaymentRequest,
        dto::CreateReviewRequest,
        dto::PaymentIntentResponse,
        dto::RedeemCouponRequest,
        dto::UpdateAppointmentRequest,
        dto::WebhookAck,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Appointments", description = "Booking and lifecycle"),
        (name = "Payments", description = "Payment creation and settlement"),
        (name = "Cron", description = "Scheduled jobs"),
        (name = "Loyalty", description = "Points and ledger"),
        (name = "Catalog", description = "Services and coupons"),
        (name = "Reviews", description = "Service feedback"),
        (name = "System", description = "Health"),
    )
)]
#[derive(Debug)]
pub struct ApiDoc;

/// Registers the `bearer_auth` security scheme referenced by handlers.
#[derive(Debug)]
struct BearerAuth;

impl utoipa::Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
