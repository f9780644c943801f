//! Tenant — an isolated customer namespace, identified by a unique subdomain
//! slug plus a distinct admin slug for back-office access.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A customer organization. Owns programs, startups, experts, and investors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
  pub tenant_id:  Uuid,
  pub name:       String,
  /// Public subdomain label, unique across all tenants.
  pub slug:       String,
  /// Back-office subdomain label, unique across all tenants.
  pub admin_slug: String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::AcceleratorStore::add_tenant`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewTenant {
  pub name:       String,
  pub slug:       String,
  pub admin_slug: String,
}

impl NewTenant {
  /// Reject structurally invalid slugs before any write.
  ///
  /// A slug is a non-empty lowercase label of `[a-z0-9-]`, no leading or
  /// trailing hyphen, so it can appear verbatim as a subdomain label.
  pub fn validate(&self) -> Result<()> {
    validate_slug(&self.slug)?;
    validate_slug(&self.admin_slug)?;
    if self.slug == self.admin_slug {
      return Err(Error::InvalidSlug(self.admin_slug.clone()));
    }
    Ok(())
  }
}

fn validate_slug(slug: &str) -> Result<()> {
  let well_formed = !slug.is_empty()
    && !slug.starts_with('-')
    && !slug.ends_with('-')
    && slug
      .chars()
      .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
  if well_formed {
    Ok(())
  } else {
    Err(Error::InvalidSlug(slug.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tenant(slug: &str, admin: &str) -> NewTenant {
    NewTenant {
      name:       "Acme Accelerator".into(),
      slug:       slug.into(),
      admin_slug: admin.into(),
    }
  }

  #[test]
  fn accepts_well_formed_slugs() {
    assert!(tenant("acme", "acme-admin").validate().is_ok());
    assert!(tenant("a1-b2", "x9").validate().is_ok());
  }

  #[test]
  fn rejects_bad_slugs() {
    assert!(tenant("", "admin").validate().is_err());
    assert!(tenant("Acme", "admin").validate().is_err());
    assert!(tenant("-acme", "admin").validate().is_err());
    assert!(tenant("acme-", "admin").validate().is_err());
    assert!(tenant("ac me", "admin").validate().is_err());
  }

  #[test]
  fn rejects_identical_slug_and_admin_slug() {
    assert!(tenant("acme", "acme").validate().is_err());
  }
}
