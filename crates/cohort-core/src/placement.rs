//! The placement decision — pure, derived, never stored.
//!
//! Given a startup's current attributes and a program's ordered cards (with
//! their rule sets), the first card whose full rule set is satisfied wins.
//! Cards with no rules are skipped: an unconstrained card is reachable only
//! by manual placement, so an empty rule set never auto-matches.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{kanban::KanbanCard, rule::Rule, startup::StartupAttributes};

/// A card together with its rule set, as loaded for one placement pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRules {
  pub card:  KanbanCard,
  pub rules: Vec<Rule>,
}

/// The outcome of evaluating one startup against one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
  /// Move (or keep) the startup on this card.
  Card(Uuid),
  /// No card matched; the startup stays wherever it currently is.
  Unchanged,
}

/// The persisted result of one placement recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementOutcome {
  pub startup_id: Uuid,
  /// The assignment after recomputation (unchanged if nothing matched).
  pub card_id:    Option<Uuid>,
  /// Whether the assignment differs from the one before recomputation.
  pub changed:    bool,
}

/// Evaluate `cards` in ascending position order and return the first card
/// whose rules are all satisfied.
///
/// `cards` must already be ordered by position; the store's ordered range
/// scan provides that.
pub fn place(attrs: &StartupAttributes, cards: &[CardRules]) -> Placement {
  for entry in cards {
    if entry.rules.is_empty() {
      continue;
    }
    if entry.rules.iter().all(|rule| rule.is_satisfied(attrs)) {
      return Placement::Card(entry.card.card_id);
    }
  }
  Placement::Unchanged
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::rule::{AttributeKey, Comparison, FieldType};

  fn card(position: i64) -> KanbanCard {
    KanbanCard {
      card_id: Uuid::new_v4(),
      kanban_id: Uuid::new_v4(),
      name: format!("stage {position}"),
      position,
    }
  }

  fn vertical_rule(card_id: Uuid, vertical: &str) -> Rule {
    Rule {
      rule_id: Uuid::new_v4(),
      card_id,
      program_id: Uuid::new_v4(),
      key: AttributeKey::Vertical,
      field_type: FieldType::Text,
      comparison: Comparison::Equals,
      options: vec![vertical.to_owned()],
    }
  }

  fn employees_rule(card_id: Uuid, comparison: Comparison, ops: &[&str]) -> Rule {
    Rule {
      rule_id: Uuid::new_v4(),
      card_id,
      program_id: Uuid::new_v4(),
      key: AttributeKey::Employees,
      field_type: FieldType::Number,
      comparison,
      options: ops.iter().map(|s| s.to_string()).collect(),
    }
  }

  fn fintech() -> StartupAttributes {
    StartupAttributes {
      vertical: Some("fintech".into()),
      employees: Some(12),
      ..Default::default()
    }
  }

  #[test]
  fn first_matching_card_by_position_wins() {
    let c0 = card(0);
    let c1 = card(1);
    let cards = vec![
      CardRules {
        rules: vec![vertical_rule(c0.card_id, "fintech")],
        card:  c0.clone(),
      },
      CardRules {
        rules: vec![vertical_rule(c1.card_id, "fintech")],
        card:  c1,
      },
    ];

    assert_eq!(place(&fintech(), &cards), Placement::Card(c0.card_id));
  }

  #[test]
  fn empty_rule_cards_never_auto_match() {
    let c0 = card(0);
    let c1 = card(1);
    let cards = vec![
      CardRules {
        rules: vec![vertical_rule(c0.card_id, "fintech")],
        card:  c0.clone(),
      },
      // A trivially-true unconstrained card later on the board.
      CardRules { card: c1, rules: vec![] },
    ];

    assert_eq!(place(&fintech(), &cards), Placement::Card(c0.card_id));
  }

  #[test]
  fn board_of_only_unconstrained_cards_leaves_placement_unchanged() {
    let cards = vec![
      CardRules { card: card(0), rules: vec![] },
      CardRules { card: card(1), rules: vec![] },
    ];
    assert_eq!(place(&fintech(), &cards), Placement::Unchanged);
  }

  #[test]
  fn all_rules_must_hold() {
    let c0 = card(0);
    let cards = vec![CardRules {
      rules: vec![
        vertical_rule(c0.card_id, "fintech"),
        employees_rule(c0.card_id, Comparison::GreaterThan, &["50"]),
      ],
      card:  c0,
    }];

    // vertical matches, headcount does not.
    assert_eq!(place(&fintech(), &cards), Placement::Unchanged);
  }

  #[test]
  fn no_match_means_unchanged() {
    let c0 = card(0);
    let cards = vec![CardRules {
      rules: vec![vertical_rule(c0.card_id, "healthtech")],
      card:  c0,
    }];
    assert_eq!(place(&fintech(), &cards), Placement::Unchanged);
  }

  #[test]
  fn healthtech_scenario() {
    let attrs = StartupAttributes {
      vertical: Some("healthtech".into()),
      employees: Some(12),
      ..Default::default()
    };
    let c0 = card(0);
    let cards = vec![CardRules {
      rules: vec![vertical_rule(c0.card_id, "healthtech")],
      card:  c0.clone(),
    }];
    assert_eq!(place(&attrs, &cards), Placement::Card(c0.card_id));
  }

  #[test]
  fn malformed_rule_only_disables_its_card() {
    let c0 = card(0);
    let c1 = card(1);
    let cards = vec![
      CardRules {
        // Unparsable numeric operand; must not propagate as an error.
        rules: vec![employees_rule(
          c0.card_id,
          Comparison::GreaterThan,
          &["many"],
        )],
        card:  c0,
      },
      CardRules {
        rules: vec![vertical_rule(c1.card_id, "fintech")],
        card:  c1.clone(),
      },
    ];

    assert_eq!(place(&fintech(), &cards), Placement::Card(c1.card_id));
  }

  #[test]
  fn pure_evaluation_is_idempotent() {
    let c0 = card(0);
    let cards = vec![CardRules {
      rules: vec![vertical_rule(c0.card_id, "fintech")],
      card:  c0,
    }];
    let attrs = fintech();
    assert_eq!(place(&attrs, &cards), place(&attrs, &cards));
  }
}
