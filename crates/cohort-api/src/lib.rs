//! JSON REST API for Cohort.
//!
//! Exposes an axum [`Router`] backed by any
//! [`cohort_core::store::AcceleratorStore`]. Tenant resolution, auth, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cohort_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod kanbans;
pub mod people;
pub mod programs;
pub mod startups;
pub mod tenants;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use cohort_core::store::AcceleratorStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: AcceleratorStore + 'static,
{
  Router::new()
    // Tenants
    .route("/tenants", get(tenants::list::<S>).post(tenants::create::<S>))
    .route("/tenants/{id}", get(tenants::get_one::<S>))
    // Experts & investors
    .route(
      "/experts",
      get(people::list_experts::<S>).post(people::create_expert::<S>),
    )
    .route(
      "/investors",
      get(people::list_investors::<S>).post(people::create_investor::<S>),
    )
    // Programs
    .route(
      "/programs",
      get(programs::list::<S>).post(programs::create::<S>),
    )
    .route(
      "/programs/{id}",
      get(programs::get_one::<S>).delete(programs::delete_one::<S>),
    )
    // Kanbans, cards, and rules
    .route("/kanbans", post(kanbans::create::<S>))
    .route(
      "/kanbans/{id}/cards",
      get(kanbans::list_cards::<S>).post(kanbans::create_card::<S>),
    )
    .route(
      "/cards/{id}/rules",
      get(kanbans::card_rules::<S>).put(kanbans::replace_rules::<S>),
    )
    // Startups
    .route(
      "/startups",
      get(startups::list::<S>).post(startups::create::<S>),
    )
    .route("/startups/{id}", get(startups::get_one::<S>))
    .route("/startups/{id}/enroll", post(startups::enroll::<S>))
    .route("/startups/{id}/blocks", put(startups::update_block::<S>))
    .route(
      "/startups/{id}/partners",
      get(startups::partners::<S>).put(startups::replace_partners::<S>),
    )
    .route(
      "/startups/{id}/service-products",
      get(startups::service_products::<S>)
        .put(startups::replace_service_products::<S>),
    )
    .route("/startups/{id}/card", put(startups::assign_card::<S>))
    .route(
      "/startups/{id}/placement",
      post(startups::recompute_placement::<S>),
    )
    .with_state(store)
}
