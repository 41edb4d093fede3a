//! # bloom-gateway
//!
//! REST API gateway for the Bloom salon & spa booking platform:
//! appointments with slot-exclusive booking, payments with asynchronous
//! card settlement, loyalty accrual, and a batch reminder scheduler.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── BookingService / PaymentService /
//!     │   LoyaltyService / ReminderService (service/)
//!     │
//!     ├── Store gateway (persistence/) ── PostgreSQL
//!     └── PaymentProvider (provider/) ─── Stripe-compatible API
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod provider;
pub mod service;
