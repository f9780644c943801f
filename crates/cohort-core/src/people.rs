//! Experts and investors — routine per-tenant records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A mentor or domain expert attached to a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expert {
  pub expert_id:   Uuid,
  pub tenant_id:   Uuid,
  pub name:        String,
  pub email:       String,
  pub specialties: Vec<String>,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::AcceleratorStore::add_expert`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpert {
  pub tenant_id:   Uuid,
  pub name:        String,
  pub email:       String,
  #[serde(default)]
  pub specialties: Vec<String>,
}

/// An investor attached to a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investor {
  pub investor_id: Uuid,
  pub tenant_id:   Uuid,
  pub name:        String,
  pub email:       String,
  /// Free-text investment thesis.
  pub thesis:      Option<String>,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::AcceleratorStore::add_investor`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewInvestor {
  pub tenant_id: Uuid,
  pub name:      String,
  pub email:     String,
  pub thesis:    Option<String>,
}
