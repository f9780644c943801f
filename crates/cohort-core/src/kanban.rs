//! Kanban boards and their ordered cards (pipeline stages).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pipeline board belonging to a program. In practice each program has one
/// primary kanban; the model allows several.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kanban {
  pub kanban_id:  Uuid,
  pub program_id: Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::AcceleratorStore::add_kanban`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewKanban {
  pub program_id: Uuid,
  pub name:       String,
}

/// A stage/column on a kanban. `position` establishes a stable manual
/// ordering; new cards are appended at `max(position) + 1` (0 when the board
/// is empty).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KanbanCard {
  pub card_id:   Uuid,
  pub kanban_id: Uuid,
  pub name:      String,
  pub position:  i64,
}
