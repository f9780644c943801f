//! Handlers for `/programs` endpoints.
//!
//! Deleting a program is a soft delete: the row stays for history and is
//! hidden from default listings.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cohort_core::{
  program::{NewProgram, Program},
  store::AcceleratorStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub tenant_id:       Uuid,
  /// If `true`, soft-deleted programs are included. Default `false`.
  #[serde(default)]
  pub include_deleted: bool,
}

/// `GET /programs?tenant_id=<id>[&include_deleted=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Program>>, ApiError>
where
  S: AcceleratorStore,
{
  let programs = store
    .list_programs(params.tenant_id, params.include_deleted)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(programs))
}

/// `GET /programs/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Program>, ApiError>
where
  S: AcceleratorStore,
{
  let program = store
    .get_program(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("program {id} not found")))?;
  Ok(Json(program))
}

/// `POST /programs` — returns 201 + the stored [`Program`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewProgram>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcceleratorStore,
{
  body.validate()?;
  let program = store.add_program(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(program)))
}

/// `DELETE /programs/:id` — soft delete; returns 204.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: AcceleratorStore,
{
  store
    .get_program(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("program {id} not found")))?;
  store
    .soft_delete_program(id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
