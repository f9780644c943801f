//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, calendar dates as ISO 8601
//! (`YYYY-MM-DD`, which also compares correctly as text in CHECK
//! constraints). String lists are stored as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use cohort_core::{
  kanban::{Kanban, KanbanCard},
  people::{Expert, Investor},
  program::Program,
  rule::{AttributeKey, Comparison, FieldType, Rule},
  startup::{Startup, StartupAttributes},
  tenant::Tenant,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> / NaiveDate ───────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── String lists ────────────────────────────────────────────────────────────

pub fn encode_strings(v: &[String]) -> Result<String> {
  Ok(serde_json::to_string(v)?)
}

pub fn decode_strings(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Rule discriminants ──────────────────────────────────────────────────────

pub fn decode_attribute_key(s: &str) -> Result<AttributeKey> {
  AttributeKey::from_discriminant(s)
    .ok_or_else(|| Error::UnknownDiscriminant(s.to_owned()))
}

pub fn decode_field_type(s: &str) -> Result<FieldType> {
  FieldType::from_discriminant(s)
    .ok_or_else(|| Error::UnknownDiscriminant(s.to_owned()))
}

pub fn decode_comparison(s: &str) -> Result<Comparison> {
  Comparison::from_discriminant(s)
    .ok_or_else(|| Error::UnknownDiscriminant(s.to_owned()))
}

/// Lift a decode failure into a rusqlite error so it can cross a
/// `conn.call` closure boundary (and abort an open transaction).
pub fn in_row<T>(res: Result<T>) -> rusqlite::Result<T> {
  res.map_err(|e| {
    rusqlite::Error::FromSqlConversionFailure(
      0,
      rusqlite::types::Type::Text,
      Box::new(e),
    )
  })
}

// ─── Raw row types ───────────────────────────────────────────────────────────

pub struct RawTenant {
  pub tenant_id:  String,
  pub name:       String,
  pub slug:       String,
  pub admin_slug: String,
  pub created_at: String,
}

impl RawTenant {
  pub fn into_tenant(self) -> Result<Tenant> {
    Ok(Tenant {
      tenant_id:  decode_uuid(&self.tenant_id)?,
      name:       self.name,
      slug:       self.slug,
      admin_slug: self.admin_slug,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawExpert {
  pub expert_id:   String,
  pub tenant_id:   String,
  pub name:        String,
  pub email:       String,
  pub specialties: String,
  pub created_at:  String,
}

impl RawExpert {
  pub fn into_expert(self) -> Result<Expert> {
    Ok(Expert {
      expert_id:   decode_uuid(&self.expert_id)?,
      tenant_id:   decode_uuid(&self.tenant_id)?,
      name:        self.name,
      email:       self.email,
      specialties: decode_strings(&self.specialties)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawInvestor {
  pub investor_id: String,
  pub tenant_id:   String,
  pub name:        String,
  pub email:       String,
  pub thesis:      Option<String>,
  pub created_at:  String,
}

impl RawInvestor {
  pub fn into_investor(self) -> Result<Investor> {
    Ok(Investor {
      investor_id: decode_uuid(&self.investor_id)?,
      tenant_id:   decode_uuid(&self.tenant_id)?,
      name:        self.name,
      email:       self.email,
      thesis:      self.thesis,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawProgram {
  pub program_id: String,
  pub tenant_id:  String,
  pub name:       String,
  pub starts_on:  String,
  pub ends_on:    String,
  pub deleted:    bool,
  pub created_at: String,
}

impl RawProgram {
  pub fn into_program(self) -> Result<Program> {
    Ok(Program {
      program_id: decode_uuid(&self.program_id)?,
      tenant_id:  decode_uuid(&self.tenant_id)?,
      name:       self.name,
      starts_on:  decode_date(&self.starts_on)?,
      ends_on:    decode_date(&self.ends_on)?,
      deleted:    self.deleted,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawKanban {
  pub kanban_id:  String,
  pub program_id: String,
  pub name:       String,
  pub created_at: String,
}

impl RawKanban {
  pub fn into_kanban(self) -> Result<Kanban> {
    Ok(Kanban {
      kanban_id:  decode_uuid(&self.kanban_id)?,
      program_id: decode_uuid(&self.program_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawCard {
  pub card_id:   String,
  pub kanban_id: String,
  pub name:      String,
  pub position:  i64,
}

impl RawCard {
  pub fn into_card(self) -> Result<KanbanCard> {
    Ok(KanbanCard {
      card_id:   decode_uuid(&self.card_id)?,
      kanban_id: decode_uuid(&self.kanban_id)?,
      name:      self.name,
      position:  self.position,
    })
  }
}

pub struct RawRule {
  pub rule_id:    String,
  pub card_id:    String,
  pub program_id: String,
  pub key:        String,
  pub field_type: String,
  pub comparison: String,
  pub options:    String,
}

impl RawRule {
  pub fn into_rule(self) -> Result<Rule> {
    Ok(Rule {
      rule_id:    decode_uuid(&self.rule_id)?,
      card_id:    decode_uuid(&self.card_id)?,
      program_id: decode_uuid(&self.program_id)?,
      key:        decode_attribute_key(&self.key)?,
      field_type: decode_field_type(&self.field_type)?,
      comparison: decode_comparison(&self.comparison)?,
      options:    decode_strings(&self.options)?,
    })
  }
}

// ─── Startup rows ────────────────────────────────────────────────────────────

/// Column list shared by every startup SELECT; must match
/// [`RawStartup::from_row`] positionally.
pub const STARTUP_COLUMNS: &str = "startup_id, tenant_id, name, card_id, \
   was_processed, profile_filled_percentage, fully_completed_profile, \
   profile_updated, created_at, updated_at, \
   vertical, foundation_year, city, employees, \
   founders_count, has_technical_founder, team_description, \
   product_stage, business_model, target_market, \
   is_deep_tech, technology_readiness_level, \
   is_incorporated, has_cap_table, governance_notes, \
   monthly_revenue, total_raised, seeking_investment, \
   pitch, website, logo_asset";

pub struct RawStartup {
  pub startup_id: String,
  pub tenant_id:  String,
  pub name:       String,
  pub card_id:    Option<String>,
  pub was_processed: bool,
  pub profile_filled_percentage: i64,
  pub fully_completed_profile:   bool,
  pub profile_updated: bool,
  pub created_at: String,
  pub updated_at: String,
  pub attributes: StartupAttributes,
}

impl RawStartup {
  /// Read one row produced by a `SELECT {STARTUP_COLUMNS}` query.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      startup_id: row.get(0)?,
      tenant_id:  row.get(1)?,
      name:       row.get(2)?,
      card_id:    row.get(3)?,
      was_processed: row.get(4)?,
      profile_filled_percentage: row.get(5)?,
      fully_completed_profile:   row.get(6)?,
      profile_updated: row.get(7)?,
      created_at: row.get(8)?,
      updated_at: row.get(9)?,
      attributes: StartupAttributes {
        vertical:        row.get(10)?,
        foundation_year: row.get(11)?,
        city:            row.get(12)?,
        employees:       row.get(13)?,
        founders_count:        row.get(14)?,
        has_technical_founder: row.get(15)?,
        team_description:      row.get(16)?,
        product_stage:  row.get(17)?,
        business_model: row.get(18)?,
        target_market:  row.get(19)?,
        is_deep_tech:               row.get(20)?,
        technology_readiness_level: row.get(21)?,
        is_incorporated:  row.get(22)?,
        has_cap_table:    row.get(23)?,
        governance_notes: row.get(24)?,
        monthly_revenue:    row.get(25)?,
        total_raised:       row.get(26)?,
        seeking_investment: row.get(27)?,
        pitch:      row.get(28)?,
        website:    row.get(29)?,
        logo_asset: row.get(30)?,
      },
    })
  }

  pub fn into_startup(self) -> Result<Startup> {
    Ok(Startup {
      startup_id: decode_uuid(&self.startup_id)?,
      tenant_id:  decode_uuid(&self.tenant_id)?,
      name:       self.name,
      card_id:    self.card_id.as_deref().map(decode_uuid).transpose()?,
      was_processed: self.was_processed,
      profile_filled_percentage: self.profile_filled_percentage as u8,
      fully_completed_profile:   self.fully_completed_profile,
      profile_updated: self.profile_updated,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      attributes: self.attributes,
    })
  }
}
