//! HTTP entry point for Cohort.
//!
//! Wires the JSON API, host-based tenant resolution, and the registry
//! reload boundary into one axum [`Router`] backed by any
//! [`AcceleratorStore`].

pub mod tenancy;

use std::{
  path::PathBuf,
  sync::{Arc, RwLock},
};

use axum::{
  Router, middleware,
  routing::{get, post},
};
use cohort_core::{
  resolver::{RegistrySnapshot, ResolverConfig},
  store::AcceleratorStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,

  /// The platform's own root domains, served unscoped.
  #[serde(default = "default_bare_domains")]
  pub bare_domains:      Vec<String>,
  /// Path prefixes that bypass tenant resolution entirely.
  #[serde(default = "default_excluded_prefixes")]
  pub excluded_prefixes: Vec<String>,
}

fn default_bare_domains() -> Vec<String> {
  vec!["localhost".into(), "127.0.0.1".into()]
}

fn default_excluded_prefixes() -> Vec<String> {
  vec!["/api".into(), "/internal".into(), "/health".into(), "/assets".into()]
}

impl ServerConfig {
  pub fn resolver_config(&self) -> ResolverConfig {
    ResolverConfig {
      bare_domains:      self.bare_domains.clone(),
      excluded_prefixes: self.excluded_prefixes.clone(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: AcceleratorStore> {
  pub store:    Arc<S>,
  /// Swapped atomically on reload; readers clone the inner `Arc`.
  pub registry: Arc<RwLock<Arc<RegistrySnapshot>>>,
  pub resolver: Arc<ResolverConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full server [`Router`].
///
/// `/api` and `/internal` sit inside the excluded prefixes, so the tenancy
/// middleware passes them straight through; every other path falls back to
/// the tenant front.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AcceleratorStore + Clone + 'static,
{
  Router::new()
    .route("/health", get(health))
    .route("/internal/registry/reload", post(tenancy::reload::<S>))
    .with_state(state.clone())
    .nest("/api", cohort_api::api_router(state.store.clone()))
    .fallback(tenancy::front)
    .layer(middleware::from_fn_with_state(
      state,
      tenancy::resolve_tenant::<S>,
    ))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }

// ─── Integration tests ────────────────────────────────────────────────────────
