//! Request/response DTOs for the REST surface.
//!
//! Bodies use camelCase field names; enums keep their
//! SCREAMING_SNAKE_CASE wire form from the domain layer.

pub mod appointment_dto;
pub mod payment_dto;
pub mod review_dto;

pub use appointment_dto::{
    AppointmentListQuery, AvailabilityQuery, AvailabilityResponse, CreateAppointmentRequest,
    UpdateAppointmentRequest,
};
pub use payment_dto::{
    CreatePaymentRequest, PaymentIntentResponse, RedeemCouponRequest, WebhookAck,
};
pub use review_dto::{CreateReviewRequest, ReviewListQuery};
