//! AfyaCare clinic server
//!
//! Role-scoped HTTP API for a small clinic: patients, appointments, medical
//! records, prescriptions, lab results, invoices and the nursing ward. Every
//! read and write passes through the [`auth_policy`] engine before it
//! reaches storage.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod render;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::ClinicConfig;
pub use error::*;
pub use server::ClinicServer;

use axum::{middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(server: ClinicServer) -> Router {
    let cors = middleware::create_cors_layer(&server.config.cors.allowed_origins);
    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(from_fn(middleware::request_timing_middleware)),
        )
        .with_state(server)
}
