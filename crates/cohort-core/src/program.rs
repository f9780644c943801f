//! Program — a time-boxed accelerator cohort owned by a tenant.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// An accelerator cohort. Soft-deleted programs are flagged, never removed;
/// historical participation queries must exclude them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
  pub program_id: Uuid,
  pub tenant_id:  Uuid,
  pub name:       String,
  pub starts_on:  NaiveDate,
  /// Strictly after `starts_on`.
  pub ends_on:    NaiveDate,
  pub deleted:    bool,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::AcceleratorStore::add_program`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewProgram {
  pub tenant_id: Uuid,
  pub name:      String,
  pub starts_on: NaiveDate,
  pub ends_on:   NaiveDate,
}

impl NewProgram {
  /// The program window must end strictly after it starts.
  pub fn validate(&self) -> Result<()> {
    if self.ends_on > self.starts_on {
      Ok(())
    } else {
      Err(Error::InvalidProgramWindow {
        starts_on: self.starts_on,
        ends_on:   self.ends_on,
      })
    }
  }
}
