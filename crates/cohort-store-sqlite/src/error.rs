//! Error type for `cohort-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] cohort_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown discriminant: {0:?}")]
  UnknownDiscriminant(String),

  #[error("tenant not found: {0}")]
  TenantNotFound(uuid::Uuid),

  #[error("program not found: {0}")]
  ProgramNotFound(uuid::Uuid),

  #[error("kanban not found: {0}")]
  KanbanNotFound(uuid::Uuid),

  #[error("kanban card not found: {0}")]
  CardNotFound(uuid::Uuid),

  #[error("startup not found: {0}")]
  StartupNotFound(uuid::Uuid),

  #[error("slug already registered: {0:?}")]
  SlugTaken(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
