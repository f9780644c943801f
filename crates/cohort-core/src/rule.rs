//! Declarative placement rules.
//!
//! A rule names one startup attribute, a comparison operator, and a
//! non-empty ordered list of operand strings. Attribute keys form a closed
//! enum over the startup schema — never an arbitrary string looked up at
//! evaluation time — and the operator set is likewise closed.
//!
//! Evaluation is deliberately forgiving: any operator/operand mismatch or
//! unparsable operand makes that rule evaluate to "not satisfied" instead of
//! erroring, so one malformed rule cannot block placement for a whole board.
//! Structural validation is strict, but happens synchronously at
//! creation/edit time, before any write.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, startup::StartupAttributes};

// ─── Attribute schema ────────────────────────────────────────────────────────

/// The closed set of startup attributes a rule may inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKey {
  Vertical,
  FoundationYear,
  City,
  Employees,
  FoundersCount,
  HasTechnicalFounder,
  ProductStage,
  BusinessModel,
  TargetMarket,
  IsDeepTech,
  TechnologyReadinessLevel,
  IsIncorporated,
  HasCapTable,
  MonthlyRevenue,
  TotalRaised,
  SeekingInvestment,
}

impl AttributeKey {
  pub const ALL: [AttributeKey; 16] = [
    Self::Vertical,
    Self::FoundationYear,
    Self::City,
    Self::Employees,
    Self::FoundersCount,
    Self::HasTechnicalFounder,
    Self::ProductStage,
    Self::BusinessModel,
    Self::TargetMarket,
    Self::IsDeepTech,
    Self::TechnologyReadinessLevel,
    Self::IsIncorporated,
    Self::HasCapTable,
    Self::MonthlyRevenue,
    Self::TotalRaised,
    Self::SeekingInvestment,
  ];

  /// The discriminant string stored in the `key` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Vertical => "vertical",
      Self::FoundationYear => "foundation_year",
      Self::City => "city",
      Self::Employees => "employees",
      Self::FoundersCount => "founders_count",
      Self::HasTechnicalFounder => "has_technical_founder",
      Self::ProductStage => "product_stage",
      Self::BusinessModel => "business_model",
      Self::TargetMarket => "target_market",
      Self::IsDeepTech => "is_deep_tech",
      Self::TechnologyReadinessLevel => "technology_readiness_level",
      Self::IsIncorporated => "is_incorporated",
      Self::HasCapTable => "has_cap_table",
      Self::MonthlyRevenue => "monthly_revenue",
      Self::TotalRaised => "total_raised",
      Self::SeekingInvestment => "seeking_investment",
    }
  }

  pub fn from_discriminant(s: &str) -> Option<Self> {
    Self::ALL.iter().copied().find(|k| k.discriminant() == s)
  }

  /// The natural field type of this attribute in the startup schema.
  pub fn field_type(self) -> FieldType {
    match self {
      Self::Vertical | Self::City | Self::TargetMarket => FieldType::Text,
      Self::ProductStage | Self::BusinessModel => FieldType::Choice,
      Self::FoundationYear
      | Self::Employees
      | Self::FoundersCount
      | Self::TechnologyReadinessLevel
      | Self::MonthlyRevenue
      | Self::TotalRaised => FieldType::Number,
      Self::HasTechnicalFounder
      | Self::IsDeepTech
      | Self::IsIncorporated
      | Self::HasCapTable
      | Self::SeekingInvestment => FieldType::Flag,
    }
  }
}

/// How a rule's operand strings are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
  Text,
  Number,
  Flag,
  /// An enumerated-list field; compared like text.
  Choice,
}

impl FieldType {
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Text => "text",
      Self::Number => "number",
      Self::Flag => "flag",
      Self::Choice => "choice",
    }
  }

  pub fn from_discriminant(s: &str) -> Option<Self> {
    match s {
      "text" => Some(Self::Text),
      "number" => Some(Self::Number),
      "flag" => Some(Self::Flag),
      "choice" => Some(Self::Choice),
      _ => None,
    }
  }
}

/// A typed attribute value drawn from a startup's current snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
  Text(String),
  Number(f64),
  Flag(bool),
}

// ─── Comparison operators ────────────────────────────────────────────────────

/// The closed operator set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
  Equals,
  NotEquals,
  Contains,
  GreaterThan,
  LessThan,
  InRange,
  OneOf,
}

impl Comparison {
  pub fn discriminant(self) -> &'static str {
    match self {
      Self::Equals => "equals",
      Self::NotEquals => "not_equals",
      Self::Contains => "contains",
      Self::GreaterThan => "greater_than",
      Self::LessThan => "less_than",
      Self::InRange => "in_range",
      Self::OneOf => "one_of",
    }
  }

  pub fn from_discriminant(s: &str) -> Option<Self> {
    match s {
      "equals" => Some(Self::Equals),
      "not_equals" => Some(Self::NotEquals),
      "contains" => Some(Self::Contains),
      "greater_than" => Some(Self::GreaterThan),
      "less_than" => Some(Self::LessThan),
      "in_range" => Some(Self::InRange),
      "one_of" => Some(Self::OneOf),
      _ => None,
    }
  }
}

// ─── Rule ────────────────────────────────────────────────────────────────────

/// A persisted rule attached to a kanban card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
  pub rule_id:    Uuid,
  pub card_id:    Uuid,
  pub program_id: Uuid,
  pub key:        AttributeKey,
  pub field_type: FieldType,
  pub comparison: Comparison,
  /// Always non-empty, even for single-value comparisons.
  pub options:    Vec<String>,
}

/// Input to [`crate::store::AcceleratorStore::replace_rules`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewRule {
  pub key:        AttributeKey,
  pub field_type: FieldType,
  pub comparison: Comparison,
  pub options:    Vec<String>,
}

impl NewRule {
  /// Structural validation, run synchronously before any write.
  pub fn validate(&self) -> Result<()> {
    if self.options.is_empty() {
      return Err(Error::EmptyRuleOptions);
    }

    // The declared field type must match the attribute's schema type.
    // Text and Choice are interchangeable; both compare as strings.
    let natural = self.key.field_type();
    let compatible = natural == self.field_type
      || matches!(
        (natural, self.field_type),
        (FieldType::Text, FieldType::Choice)
          | (FieldType::Choice, FieldType::Text)
      );
    if !compatible {
      return Err(Error::RuleTypeMismatch {
        key:      self.key.discriminant(),
        expected: natural.discriminant(),
        got:      self.field_type.discriminant(),
      });
    }

    match self.field_type {
      FieldType::Text | FieldType::Choice => match self.comparison {
        Comparison::Equals
        | Comparison::NotEquals
        | Comparison::Contains => self.expect_operands(1),
        Comparison::OneOf => Ok(()),
        other => Err(Error::UnsupportedComparison {
          comparison: other.discriminant(),
          field_type: self.field_type.discriminant(),
        }),
      },
      FieldType::Number => {
        match self.comparison {
          Comparison::Equals
          | Comparison::NotEquals
          | Comparison::GreaterThan
          | Comparison::LessThan => self.expect_operands(1)?,
          Comparison::InRange => self.expect_operands(2)?,
          Comparison::OneOf => {}
          Comparison::Contains => {
            return Err(Error::UnsupportedComparison {
              comparison: Comparison::Contains.discriminant(),
              field_type: FieldType::Number.discriminant(),
            });
          }
        }
        for op in &self.options {
          if op.parse::<f64>().is_err() {
            return Err(Error::NonNumericOperand(op.clone()));
          }
        }
        Ok(())
      }
      FieldType::Flag => {
        match self.comparison {
          Comparison::Equals | Comparison::NotEquals => {
            self.expect_operands(1)?
          }
          other => {
            return Err(Error::UnsupportedComparison {
              comparison: other.discriminant(),
              field_type: FieldType::Flag.discriminant(),
            });
          }
        }
        match self.options[0].as_str() {
          "true" | "false" => Ok(()),
          other => Err(Error::NonBooleanOperand(other.to_owned())),
        }
      }
    }
  }

  fn expect_operands(&self, expected: usize) -> Result<()> {
    if self.options.len() == expected {
      Ok(())
    } else {
      Err(Error::RuleOperandCount {
        comparison: self.comparison.discriminant(),
        expected,
        got: self.options.len(),
      })
    }
  }
}

impl Rule {
  /// Whether the startup's current attributes satisfy this rule.
  ///
  /// Any mismatch — absent attribute, wrong value type for the declared
  /// field type, inapplicable operator, unparsable operand — is "not
  /// satisfied", never an error.
  pub fn is_satisfied(&self, attrs: &StartupAttributes) -> bool {
    let Some(value) = attrs.get(self.key) else {
      return false;
    };

    match self.field_type {
      FieldType::Text | FieldType::Choice => {
        let AttributeValue::Text(v) = value else {
          return false;
        };
        match self.comparison {
          Comparison::Equals => self.options.first().is_some_and(|o| *o == v),
          Comparison::NotEquals => {
            self.options.first().is_some_and(|o| *o != v)
          }
          Comparison::Contains => {
            self.options.first().is_some_and(|o| v.contains(o.as_str()))
          }
          Comparison::OneOf => self.options.iter().any(|o| *o == v),
          _ => false,
        }
      }
      FieldType::Number => {
        let AttributeValue::Number(v) = value else {
          return false;
        };
        let operand = |i: usize| -> Option<f64> {
          self.options.get(i).and_then(|o| o.parse().ok())
        };
        match self.comparison {
          Comparison::Equals => operand(0).is_some_and(|o| v == o),
          Comparison::NotEquals => operand(0).is_some_and(|o| v != o),
          Comparison::GreaterThan => operand(0).is_some_and(|o| v > o),
          Comparison::LessThan => operand(0).is_some_and(|o| v < o),
          Comparison::InRange => match (operand(0), operand(1)) {
            (Some(min), Some(max)) => min <= v && v <= max,
            _ => false,
          },
          Comparison::OneOf => self
            .options
            .iter()
            .any(|o| o.parse::<f64>().is_ok_and(|o| o == v)),
          Comparison::Contains => false,
        }
      }
      FieldType::Flag => {
        let AttributeValue::Flag(v) = value else {
          return false;
        };
        let operand = match self.options.first().map(String::as_str) {
          Some("true") => true,
          Some("false") => false,
          _ => return false,
        };
        match self.comparison {
          Comparison::Equals => v == operand,
          Comparison::NotEquals => v != operand,
          _ => false,
        }
      }
    }
  }
}
