//! Handlers for `/kanbans` and `/cards` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/kanbans` | Body: [`NewKanban`]; returns 201 |
//! | `GET`  | `/kanbans/:id/cards` | Cards with rule sets, by position |
//! | `POST` | `/kanbans/:id/cards` | Body: `{"name":"..."}`; appended last |
//! | `GET`  | `/cards/:id/rules` | Current rule set |
//! | `PUT`  | `/cards/:id/rules` | Replace the whole rule set atomically |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use cohort_core::{
  kanban::{Kanban, KanbanCard, NewKanban},
  placement::CardRules,
  rule::{NewRule, Rule},
  store::AcceleratorStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Kanbans ──────────────────────────────────────────────────────────────────

/// `POST /kanbans` — returns 201 + the stored [`Kanban`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewKanban>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcceleratorStore,
{
  let kanban = store.add_kanban(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(kanban)))
}

// ─── Cards ────────────────────────────────────────────────────────────────────

/// `GET /kanbans/:id/cards` — ordered by ascending position.
pub async fn list_cards<S>(
  State(store): State<Arc<S>>,
  Path(kanban_id): Path<Uuid>,
) -> Result<Json<Vec<CardRules>>, ApiError>
where
  S: AcceleratorStore,
{
  let cards = store
    .list_cards(kanban_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(cards))
}

#[derive(Debug, Deserialize)]
pub struct NewCardBody {
  pub name: String,
}

/// `POST /kanbans/:id/cards` — returns 201 + the stored [`KanbanCard`].
pub async fn create_card<S>(
  State(store): State<Arc<S>>,
  Path(kanban_id): Path<Uuid>,
  Json(body): Json<NewCardBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcceleratorStore,
{
  store
    .get_kanban(kanban_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("kanban {kanban_id} not found"))
    })?;
  let card = store
    .add_card(kanban_id, body.name)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(card)))
}

// ─── Rules ────────────────────────────────────────────────────────────────────

/// `GET /cards/:id/rules`
pub async fn card_rules<S>(
  State(store): State<Arc<S>>,
  Path(card_id): Path<Uuid>,
) -> Result<Json<Vec<Rule>>, ApiError>
where
  S: AcceleratorStore,
{
  let rules = store.card_rules(card_id).await.map_err(ApiError::store)?;
  Ok(Json(rules))
}

/// `PUT /cards/:id/rules` — body: a JSON array of [`NewRule`].
///
/// Every rule is validated up front; a single bad rule rejects the whole
/// request and the card's current set is untouched. The replacement itself
/// is delete-all-then-insert in one backend transaction.
pub async fn replace_rules<S>(
  State(store): State<Arc<S>>,
  Path(card_id): Path<Uuid>,
  Json(body): Json<Vec<NewRule>>,
) -> Result<Json<Vec<Rule>>, ApiError>
where
  S: AcceleratorStore,
{
  store
    .get_card(card_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("card {card_id} not found")))?;
  for rule in &body {
    rule.validate()?;
  }
  let rules = store
    .replace_rules(card_id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rules))
}
