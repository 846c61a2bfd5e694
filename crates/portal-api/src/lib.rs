//! JSON API for the city portal.
//!
//! Exposes an axum [`Router`] backed by any [`portal_core::store::PortalStore`].
//! Every handler is scoped to the tenant resolved from the request; admin
//! actions additionally require a signed session for that tenant. TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", portal_api::api_router(state.clone()))
//! ```

pub mod alerts;
pub mod auth;
pub mod context;
pub mod directory;
pub mod error;
pub mod payments;
pub mod projects;
pub mod requests;
pub mod tax;
pub mod token;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use chrono::Duration;
use portal_core::store::PortalStore;

pub use error::{ApiError, Success};
pub use token::SessionKeys;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all API handlers.
#[derive(Clone)]
pub struct ApiState<S> {
  pub store:       Arc<S>,
  pub keys:        Arc<SessionKeys>,
  pub session_ttl: Duration,
  /// Serve sample data where a demo deployment would otherwise be empty.
  pub local_mode:  bool,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: PortalStore + Clone + 'static,
{
  Router::new()
    // Tenant and session
    .route("/tenant", get(directory::tenant_profile))
    .route("/auth/login", post(auth::login::<S>))
    .route("/auth/logout", post(auth::logout))
    .route("/auth/session", get(auth::current))
    // Payments
    .route("/payments", post(payments::create_intent::<S>))
    .route("/payments/search", get(payments::search::<S>))
    .route("/payments/{id}", get(payments::get_one::<S>))
    .route("/payments/{id}/proof", post(payments::upload_proof::<S>))
    .route("/admin/payments", get(payments::list::<S>))
    .route("/admin/payments/{id}/approve", post(payments::approve::<S>))
    .route("/admin/payments/{id}/reject", post(payments::reject::<S>))
    // Projects, audits and the ledger
    .route("/projects", get(projects::list::<S>))
    .route("/projects/{id}/snapshots", get(projects::snapshots::<S>))
    .route("/admin/projects", get(projects::list::<S>).post(projects::create::<S>))
    .route("/admin/projects/{id}/publish", post(projects::publish::<S>))
    .route("/ledger", get(projects::ledger::<S>))
    // Services and requests
    .route("/services", get(requests::list_services::<S>))
    .route("/admin/services", post(requests::create_service::<S>))
    .route("/requests", get(requests::list::<S>).post(requests::submit::<S>))
    .route("/requests/{id}", get(requests::get_one::<S>))
    .route("/admin/requests/{id}/status", post(requests::update_status::<S>))
    // Directory
    .route("/directory/sections", get(directory::sections::<S>))
    .route("/directory/officials", get(directory::officials::<S>))
    .route("/directory/facilities", get(directory::facilities::<S>))
    .route("/directory/handbook", get(directory::handbook::<S>))
    .route("/directory/handbook/{slug}", get(directory::article::<S>))
    .route("/admin/directory/sections", post(directory::create_section::<S>))
    .route("/admin/directory/officials", post(directory::create_official::<S>))
    .route("/admin/directory/facilities", post(directory::create_facility::<S>))
    .route(
      "/admin/directory/facilities/{id}/status",
      post(directory::set_facility_status::<S>),
    )
    .route("/admin/directory/handbook", post(directory::create_article::<S>))
    // Suggestions
    .route("/suggestions", post(directory::suggest::<S>))
    .route("/admin/suggestions", get(directory::suggestions::<S>))
    .route("/admin/suggestions/{id}/approve", post(directory::approve_suggestion::<S>))
    .route("/admin/suggestions/{id}/reject", post(directory::reject_suggestion::<S>))
    // Tax roll and alerts
    .route("/tax/lookup", post(tax::lookup::<S>))
    .route("/alerts/active", get(alerts::active::<S>))
    .route("/admin/alerts", post(alerts::create::<S>))
    .with_state(state)
}
