//! HTTP API Layer
//!
//! REST surface for the claims exchange workflow using Axum. Only the
//! workflow action routes are exposed; entity CRUD is a library concern
//! and stays off the network surface.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod dto;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_coverage::CoverageStore;
use domain_exchange::SubmissionService;

use crate::config::ApiConfig;
use crate::handlers::{claims, communications, coverage, health};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The workflow orchestrator
    pub service: Arc<SubmissionService>,
    /// Direct store access for prior-authorization entry points
    pub coverage: Arc<dyn CoverageStore>,
    /// Readiness probe target (database in production, mock in tests)
    pub health: Arc<dyn HealthCheckable>,
    /// API configuration
    pub config: ApiConfig,
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no workflow state involved)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Claim workflow action routes
    let claims_routes = Router::new()
        .route("/:id/send", post(claims::send_claim))
        .route("/:id/status", post(claims::check_status))
        .route("/:id/poll", post(claims::poll_claim))
        .route(
            "/:id/communications",
            post(communications::send_communication).get(communications::list_communications),
        )
        .route(
            "/:id/communications/poll",
            post(communications::poll_communications),
        );

    // Coverage routes
    let coverage_routes = Router::new()
        .route("/eligibility", post(coverage::check_eligibility))
        .route("/priorauths", post(coverage::create_prior_auth))
        .route("/priorauths/:id", get(coverage::get_prior_auth))
        .route("/priorauths/:id/send", post(coverage::send_prior_auth))
        .route("/priorauths/:id/poll", post(coverage::poll_prior_auth));

    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .merge(coverage_routes);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
