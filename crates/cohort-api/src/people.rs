//! Handlers for `/experts` and `/investors` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cohort_core::{
  people::{Expert, Investor, NewExpert, NewInvestor},
  store::AcceleratorStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub tenant_id: Uuid,
}

/// `GET /experts?tenant_id=<id>`
pub async fn list_experts<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Expert>>, ApiError>
where
  S: AcceleratorStore,
{
  let experts = store
    .list_experts(params.tenant_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(experts))
}

/// `POST /experts` — returns 201 + the stored [`Expert`].
pub async fn create_expert<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewExpert>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcceleratorStore,
{
  let expert = store.add_expert(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(expert)))
}

/// `GET /investors?tenant_id=<id>`
pub async fn list_investors<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Investor>>, ApiError>
where
  S: AcceleratorStore,
{
  let investors = store
    .list_investors(params.tenant_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(investors))
}

/// `POST /investors` — returns 201 + the stored [`Investor`].
pub async fn create_investor<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewInvestor>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcceleratorStore,
{
  let investor = store.add_investor(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(investor)))
}
