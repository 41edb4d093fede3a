//! REST endpoint handlers organized by resource.

pub mod appointments;
pub mod catalog;
pub mod cron;
pub mod loyalty;
pub mod payments;
pub mod reviews;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(appointments::routes())
        .merge(payments::routes())
        .merge(cron::routes())
        .merge(loyalty::routes())
        .merge(catalog::routes())
        .merge(reviews::routes())
}
