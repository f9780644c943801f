//! Error types for `cohort-core`.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("tenant not found: {0}")]
  TenantNotFound(Uuid),

  #[error("program not found: {0}")]
  ProgramNotFound(Uuid),

  #[error("kanban not found: {0}")]
  KanbanNotFound(Uuid),

  #[error("kanban card not found: {0}")]
  CardNotFound(Uuid),

  #[error("startup not found: {0}")]
  StartupNotFound(Uuid),

  #[error("slug already registered: {0:?}")]
  SlugTaken(String),

  #[error("invalid slug: {0:?}")]
  InvalidSlug(String),

  #[error("program must end strictly after it starts ({starts_on} → {ends_on})")]
  InvalidProgramWindow {
    starts_on: NaiveDate,
    ends_on:   NaiveDate,
  },

  #[error("rule options must be a non-empty list")]
  EmptyRuleOptions,

  #[error("{comparison} expects {expected} operand(s), got {got}")]
  RuleOperandCount {
    comparison: &'static str,
    expected:   usize,
    got:        usize,
  },

  #[error("operand {0:?} is not a number")]
  NonNumericOperand(String),

  #[error("operand {0:?} is not a boolean (expected \"true\" or \"false\")")]
  NonBooleanOperand(String),

  #[error("attribute {key} is {expected}, not {got}")]
  RuleTypeMismatch {
    key:      &'static str,
    expected: &'static str,
    got:      &'static str,
  },

  #[error("{comparison} is not applicable to {field_type} fields")]
  UnsupportedComparison {
    comparison: &'static str,
    field_type: &'static str,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
