//! Host-based tenant resolution middleware and the registry reload boundary.
//!
//! Every request outside the excluded path prefixes is classified against
//! the current [`RegistrySnapshot`]. The snapshot is an immutable `Arc`
//! swapped atomically by the reload endpoint; in-flight requests keep the
//! snapshot they started with.

use std::sync::{Arc, RwLock};

use axum::{
  Extension, Json,
  extract::{Request, State},
  http::{StatusCode, Uri, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use cohort_api::ApiError;
use cohort_core::{
  resolver::{RegistrySnapshot, Resolution, resolve},
  store::AcceleratorStore,
};
use serde_json::json;

use crate::AppState;

/// Read the current snapshot, surviving a poisoned lock (the data is a
/// plain `Arc` swap, never left half-written).
pub fn current_snapshot(
  registry: &RwLock<Arc<RegistrySnapshot>>,
) -> Arc<RegistrySnapshot> {
  registry
    .read()
    .unwrap_or_else(|poisoned| poisoned.into_inner())
    .clone()
}

// ─── Middleware ──────────────────────────────────────────────────────────────

/// Classify the request's `Host` header and either reject it, pass it
/// through, or rewrite its path into the tenant's namespace.
pub async fn resolve_tenant<S>(
  State(state): State<AppState<S>>,
  mut req: Request,
  next: Next,
) -> Response
where
  S: AcceleratorStore + Clone + 'static,
{
  let host = req
    .headers()
    .get(header::HOST)
    .and_then(|v| v.to_str().ok())
    .unwrap_or("")
    .to_owned();
  let path = req.uri().path().to_owned();

  let snapshot = current_snapshot(&state.registry);
  let resolution = resolve(&host, &path, &snapshot, &state.resolver);

  match resolution {
    // Unknown or malformed host: an empty 404, deliberately content-free.
    Resolution::NotFound => StatusCode::NOT_FOUND.into_response(),
    Resolution::Scoped { subdomain, path } => {
      if let Some(rewritten) = rewrite_path(req.uri(), &path) {
        *req.uri_mut() = rewritten;
      }
      req
        .extensions_mut()
        .insert(Resolution::Scoped { subdomain, path });
      next.run(req).await
    }
    Resolution::PassThrough => {
      req.extensions_mut().insert(Resolution::PassThrough);
      next.run(req).await
    }
  }
}

/// Rebuild the request URI with `new_path`, preserving the query string.
fn rewrite_path(uri: &Uri, new_path: &str) -> Option<Uri> {
  let path_and_query = match uri.query() {
    Some(q) => format!("{new_path}?{q}"),
    None => new_path.to_owned(),
  };
  Uri::try_from(path_and_query).ok()
}

// ─── Front handlers ──────────────────────────────────────────────────────────

/// Fallback for everything that is not an API or internal route: the tenant
/// front (scoped hosts) or the unscoped landing (platform domains).
pub async fn front(resolution: Option<Extension<Resolution>>) -> Response {
  match resolution {
    Some(Extension(Resolution::Scoped { subdomain, path })) => Json(json!({
      "tenant": subdomain,
      "path":   path,
    }))
    .into_response(),
    Some(Extension(Resolution::PassThrough)) => {
      Json(json!({ "app": "cohort" })).into_response()
    }
    // NotFound never reaches here; a missing extension means the middleware
    // did not run for this route.
    _ => StatusCode::NOT_FOUND.into_response(),
  }
}

// ─── Reload boundary ─────────────────────────────────────────────────────────

/// `POST /internal/registry/reload` — rebuild the snapshot from the tenant
/// table and swap it in with a bumped version.
pub async fn reload<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: AcceleratorStore + Clone + 'static,
{
  let subdomains = state
    .store
    .tenant_subdomains()
    .await
    .map_err(ApiError::store)?;

  let mut guard = state
    .registry
    .write()
    .unwrap_or_else(|poisoned| poisoned.into_inner());
  let next = RegistrySnapshot::new(guard.version + 1, subdomains);
  let body = json!({
    "version":    next.version,
    "subdomains": next.len(),
  });
  *guard = Arc::new(next);
  tracing::info!(version = guard.version, count = guard.len(), "registry reloaded");

  Ok(Json(body))
}
