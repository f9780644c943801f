//! Handlers for `/tenants` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tenants` | All tenants |
//! | `GET`  | `/tenants/:id` | Single tenant |
//! | `POST` | `/tenants` | Body: [`NewTenant`]; returns 201 + stored tenant |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use cohort_core::{
  store::AcceleratorStore,
  tenant::{NewTenant, Tenant},
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /tenants`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Tenant>>, ApiError>
where
  S: AcceleratorStore,
{
  let tenants = store.list_tenants().await.map_err(ApiError::store)?;
  Ok(Json(tenants))
}

/// `GET /tenants/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Tenant>, ApiError>
where
  S: AcceleratorStore,
{
  let tenant = store
    .get_tenant(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("tenant {id} not found")))?;
  Ok(Json(tenant))
}

/// `POST /tenants` — returns 201 + the stored [`Tenant`].
///
/// Slug collisions (against any registered slug or admin slug) are reported
/// as 409 before the write is attempted.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewTenant>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcceleratorStore,
{
  body.validate()?;

  let taken = store.tenant_subdomains().await.map_err(ApiError::store)?;
  if taken.contains(&body.slug) || taken.contains(&body.admin_slug) {
    return Err(ApiError::Conflict(format!(
      "slug {:?} or {:?} is already registered",
      body.slug, body.admin_slug
    )));
  }

  let tenant = store.add_tenant(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(tenant)))
}
