//! Handlers for `/startups` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/startups` | `?tenant_id` required |
//! | `GET`  | `/startups/:id` | Single startup |
//! | `POST` | `/startups` | Body: [`NewStartup`]; returns 201 |
//! | `POST` | `/startups/:id/enroll` | Body: `{"program_id":"..."}` |
//! | `PUT`  | `/startups/:id/blocks` | Body: [`BlockUpdate`] (tagged by `block`) |
//! | `GET`/`PUT` | `/startups/:id/partners` | Whole-set replacement |
//! | `GET`/`PUT` | `/startups/:id/service-products` | Whole-set replacement |
//! | `PUT`  | `/startups/:id/card` | Manual card assignment |
//! | `POST` | `/startups/:id/placement` | Recompute rule-driven placement |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cohort_core::{
  placement::PlacementOutcome,
  startup::{BlockUpdate, NewStartup, Partner, Startup},
  store::AcceleratorStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// Existence guard shared by the mutation handlers, so an unknown startup id
/// surfaces as 404 rather than a backend error.
async fn ensure_startup<S>(store: &S, id: Uuid) -> Result<(), ApiError>
where
  S: AcceleratorStore,
{
  match store.get_startup(id).await.map_err(ApiError::store)? {
    Some(_) => Ok(()),
    None => Err(ApiError::NotFound(format!("startup {id} not found"))),
  }
}

// ─── CRUD ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub tenant_id: Uuid,
}

/// `GET /startups?tenant_id=<id>`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Startup>>, ApiError>
where
  S: AcceleratorStore,
{
  let startups = store
    .list_startups(params.tenant_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(startups))
}

/// `GET /startups/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Startup>, ApiError>
where
  S: AcceleratorStore,
{
  let startup = store
    .get_startup(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("startup {id} not found")))?;
  Ok(Json(startup))
}

/// `POST /startups` — returns 201 + the stored [`Startup`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewStartup>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcceleratorStore,
{
  let startup = store.add_startup(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(startup)))
}

// ─── Enrollment ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EnrollBody {
  pub program_id: Uuid,
}

/// `POST /startups/:id/enroll` — idempotent; returns 204.
pub async fn enroll<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<EnrollBody>,
) -> Result<StatusCode, ApiError>
where
  S: AcceleratorStore,
{
  ensure_startup(&*store, id).await?;
  store
    .get_program(body.program_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("program {} not found", body.program_id))
    })?;
  store
    .enroll(body.program_id, id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Attribute blocks ─────────────────────────────────────────────────────────

/// `PUT /startups/:id/blocks` — body is one tagged [`BlockUpdate`], e.g.
/// `{"block":"team","founders_count":2,...}`.
///
/// Applies the block write (stamping the startup stale), then immediately
/// recomputes rule-driven placement so the response reflects the startup's
/// post-update card.
pub async fn update_block<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<BlockUpdate>,
) -> Result<Json<Startup>, ApiError>
where
  S: AcceleratorStore,
{
  ensure_startup(&*store, id).await?;
  store
    .apply_block_update(id, body)
    .await
    .map_err(ApiError::store)?;
  store
    .recompute_placement(id)
    .await
    .map_err(ApiError::store)?;

  let startup = store
    .get_startup(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("startup {id} not found")))?;
  Ok(Json(startup))
}

// ─── Associations ─────────────────────────────────────────────────────────────

/// `GET /startups/:id/partners`
pub async fn partners<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Partner>>, ApiError>
where
  S: AcceleratorStore,
{
  let partners = store.partners(id).await.map_err(ApiError::store)?;
  Ok(Json(partners))
}

/// `PUT /startups/:id/partners` — replaces the whole set.
///
/// Association churn counts as an attribute mutation, so placement is
/// recomputed in-line just as for block updates.
pub async fn replace_partners<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<Vec<Partner>>,
) -> Result<StatusCode, ApiError>
where
  S: AcceleratorStore,
{
  ensure_startup(&*store, id).await?;
  store
    .replace_partners(id, body)
    .await
    .map_err(ApiError::store)?;
  store
    .recompute_placement(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /startups/:id/service-products`
pub async fn service_products<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: AcceleratorStore,
{
  let names = store.service_products(id).await.map_err(ApiError::store)?;
  Ok(Json(names))
}

/// `PUT /startups/:id/service-products` — body: a JSON array of names.
/// Recomputes placement in-line, as for partners.
pub async fn replace_service_products<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<Vec<String>>,
) -> Result<StatusCode, ApiError>
where
  S: AcceleratorStore,
{
  ensure_startup(&*store, id).await?;
  store
    .replace_service_products(id, body)
    .await
    .map_err(ApiError::store)?;
  store
    .recompute_placement(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Placement ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AssignBody {
  pub card_id: Uuid,
}

/// `PUT /startups/:id/card` — manual assignment; may target rule-less cards.
pub async fn assign_card<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AssignBody>,
) -> Result<StatusCode, ApiError>
where
  S: AcceleratorStore,
{
  ensure_startup(&*store, id).await?;
  store
    .get_card(body.card_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("card {} not found", body.card_id))
    })?;
  store
    .assign_card(id, body.card_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /startups/:id/placement` — recompute and return the outcome.
pub async fn recompute_placement<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PlacementOutcome>, ApiError>
where
  S: AcceleratorStore,
{
  ensure_startup(&*store, id).await?;
  let outcome = store
    .recompute_placement(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(outcome))
}
