//! Startup — the entity moved through kanban pipelines.
//!
//! A startup's profile is split into independently-updatable attribute
//! blocks. Each block update is a partial mutation: it writes only that
//! block's fields and always resets `was_processed` so downstream
//! recomputation (placement, profile completion) knows the entity is stale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rule::{AttributeKey, AttributeValue};

// ─── Entity ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Startup {
  pub startup_id: Uuid,
  pub tenant_id:  Uuid,
  pub name:       String,
  /// Current kanban card assignment, if any.
  pub card_id:    Option<Uuid>,
  /// Cleared on every attribute mutation; set once placement has run.
  pub was_processed: bool,
  /// Derived ratio of filled required attributes, 0–100.
  pub profile_filled_percentage: u8,
  pub fully_completed_profile:   bool,
  /// Latched on the first 100% transition; never re-fires, never clears.
  pub profile_updated: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub attributes: StartupAttributes,
}

/// Input to [`crate::store::AcceleratorStore::add_startup`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewStartup {
  pub tenant_id: Uuid,
  pub name:      String,
}

// ─── Attribute blocks ────────────────────────────────────────────────────────

/// The full attribute set, all optional until the corresponding block form
/// has been submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartupAttributes {
  // General data
  pub vertical:        Option<String>,
  pub foundation_year: Option<i64>,
  pub city:            Option<String>,
  pub employees:       Option<i64>,

  // Team
  pub founders_count:        Option<i64>,
  pub has_technical_founder: Option<bool>,
  pub team_description:      Option<String>,

  // Product / service
  pub product_stage:  Option<String>,
  pub business_model: Option<String>,
  pub target_market:  Option<String>,

  // Deep tech
  pub is_deep_tech:               Option<bool>,
  pub technology_readiness_level: Option<i64>,

  // Governance
  pub is_incorporated:  Option<bool>,
  pub has_cap_table:    Option<bool>,
  pub governance_notes: Option<String>,

  // Market / finance
  pub monthly_revenue:    Option<f64>,
  pub total_raised:       Option<f64>,
  pub seeking_investment: Option<bool>,

  // Profile
  pub pitch:      Option<String>,
  pub website:    Option<String>,
  /// Object-storage key of the uploaded logo; the asset itself is external.
  pub logo_asset: Option<String>,
}

impl StartupAttributes {
  /// The typed value of one rule-visible attribute, `None` if unfilled.
  pub fn get(&self, key: AttributeKey) -> Option<AttributeValue> {
    use AttributeValue::{Flag, Number, Text};
    match key {
      AttributeKey::Vertical => self.vertical.clone().map(Text),
      AttributeKey::FoundationYear => {
        self.foundation_year.map(|v| Number(v as f64))
      }
      AttributeKey::City => self.city.clone().map(Text),
      AttributeKey::Employees => self.employees.map(|v| Number(v as f64)),
      AttributeKey::FoundersCount => {
        self.founders_count.map(|v| Number(v as f64))
      }
      AttributeKey::HasTechnicalFounder => self.has_technical_founder.map(Flag),
      AttributeKey::ProductStage => self.product_stage.clone().map(Text),
      AttributeKey::BusinessModel => self.business_model.clone().map(Text),
      AttributeKey::TargetMarket => self.target_market.clone().map(Text),
      AttributeKey::IsDeepTech => self.is_deep_tech.map(Flag),
      AttributeKey::TechnologyReadinessLevel => {
        self.technology_readiness_level.map(|v| Number(v as f64))
      }
      AttributeKey::IsIncorporated => self.is_incorporated.map(Flag),
      AttributeKey::HasCapTable => self.has_cap_table.map(Flag),
      AttributeKey::MonthlyRevenue => self.monthly_revenue.map(Number),
      AttributeKey::TotalRaised => self.total_raised.map(Number),
      AttributeKey::SeekingInvestment => self.seeking_investment.map(Flag),
    }
  }

  /// Profile completion as a 0–100 percentage over the required set:
  /// every rule-visible attribute plus the pitch.
  pub fn completion_percentage(&self) -> u8 {
    let total = AttributeKey::ALL.len() + 1;
    let mut filled = AttributeKey::ALL
      .iter()
      .filter(|key| self.get(**key).is_some())
      .count();
    if self.pitch.is_some() {
      filled += 1;
    }
    ((filled * 100) / total) as u8
  }
}

// ─── Block updates ───────────────────────────────────────────────────────────

/// A partial-entity mutation: exactly one block's fields, written wholesale.
///
/// Applying any variant stamps `was_processed = false` and `updated_at`; the
/// store recomputes completion and placement afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum BlockUpdate {
  GeneralData {
    vertical:        Option<String>,
    foundation_year: Option<i64>,
    city:            Option<String>,
    employees:       Option<i64>,
  },
  Team {
    founders_count:        Option<i64>,
    has_technical_founder: Option<bool>,
    team_description:      Option<String>,
  },
  ProductService {
    product_stage:  Option<String>,
    business_model: Option<String>,
    target_market:  Option<String>,
  },
  DeepTech {
    is_deep_tech:               Option<bool>,
    technology_readiness_level: Option<i64>,
  },
  Governance {
    is_incorporated:  Option<bool>,
    has_cap_table:    Option<bool>,
    governance_notes: Option<String>,
  },
  MarketFinance {
    monthly_revenue:    Option<f64>,
    total_raised:       Option<f64>,
    seeking_investment: Option<bool>,
  },
  Profile {
    pitch:      Option<String>,
    website:    Option<String>,
    logo_asset: Option<String>,
  },
}

impl BlockUpdate {
  /// Write this block's fields over `attrs`, leaving other blocks untouched.
  pub fn apply(&self, attrs: &mut StartupAttributes) {
    match self.clone() {
      Self::GeneralData { vertical, foundation_year, city, employees } => {
        attrs.vertical = vertical;
        attrs.foundation_year = foundation_year;
        attrs.city = city;
        attrs.employees = employees;
      }
      Self::Team {
        founders_count,
        has_technical_founder,
        team_description,
      } => {
        attrs.founders_count = founders_count;
        attrs.has_technical_founder = has_technical_founder;
        attrs.team_description = team_description;
      }
      Self::ProductService { product_stage, business_model, target_market } => {
        attrs.product_stage = product_stage;
        attrs.business_model = business_model;
        attrs.target_market = target_market;
      }
      Self::DeepTech { is_deep_tech, technology_readiness_level } => {
        attrs.is_deep_tech = is_deep_tech;
        attrs.technology_readiness_level = technology_readiness_level;
      }
      Self::Governance { is_incorporated, has_cap_table, governance_notes } => {
        attrs.is_incorporated = is_incorporated;
        attrs.has_cap_table = has_cap_table;
        attrs.governance_notes = governance_notes;
      }
      Self::MarketFinance {
        monthly_revenue,
        total_raised,
        seeking_investment,
      } => {
        attrs.monthly_revenue = monthly_revenue;
        attrs.total_raised = total_raised;
        attrs.seeking_investment = seeking_investment;
      }
      Self::Profile { pitch, website, logo_asset } => {
        attrs.pitch = pitch;
        attrs.website = website;
        attrs.logo_asset = logo_asset;
      }
    }
  }
}

// ─── Associations ────────────────────────────────────────────────────────────

/// A partner organisation attached to a startup. The whole set is replaced
/// (delete-then-recreate) on each update; rows are never diffed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
  pub name:  String,
  pub email: Option<String>,
  pub role:  Option<String>,
}
