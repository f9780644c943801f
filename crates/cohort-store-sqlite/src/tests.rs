//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use cohort_core::{
  kanban::NewKanban,
  program::NewProgram,
  rule::{AttributeKey, Comparison, FieldType, NewRule},
  startup::{BlockUpdate, NewStartup, Partner},
  store::AcceleratorStore,
  tenant::NewTenant,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn tenant(slug: &str) -> NewTenant {
  NewTenant {
    name:       format!("{slug} org"),
    slug:       slug.into(),
    admin_slug: format!("{slug}-admin"),
  }
}

fn program(tenant_id: Uuid) -> NewProgram {
  NewProgram {
    tenant_id,
    name: "Batch 1".into(),
    starts_on: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
    ends_on: NaiveDate::from_ymd_opt(2026, 6, 15).unwrap(),
  }
}

fn vertical_rule(vertical: &str) -> NewRule {
  NewRule {
    key:        AttributeKey::Vertical,
    field_type: FieldType::Text,
    comparison: Comparison::Equals,
    options:    vec![vertical.into()],
  }
}

/// Tenant → program → kanban, returning all three ids.
async fn seed_board(s: &SqliteStore) -> (Uuid, Uuid, Uuid) {
  let t = s.add_tenant(tenant("acme")).await.unwrap();
  let p = s.add_program(program(t.tenant_id)).await.unwrap();
  let k = s
    .add_kanban(NewKanban {
      program_id: p.program_id,
      name:       "pipeline".into(),
    })
    .await
    .unwrap();
  (t.tenant_id, p.program_id, k.kanban_id)
}

// ─── Tenants ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_tenant() {
  let s = store().await;

  let t = s.add_tenant(tenant("acme")).await.unwrap();
  let fetched = s.get_tenant(t.tenant_id).await.unwrap().unwrap();
  assert_eq!(fetched.slug, "acme");
  assert_eq!(fetched.admin_slug, "acme-admin");
}

#[tokio::test]
async fn duplicate_slug_is_rejected() {
  let s = store().await;
  s.add_tenant(tenant("acme")).await.unwrap();

  let err = s.add_tenant(tenant("acme")).await.unwrap_err();
  assert!(matches!(err, Error::SlugTaken(_)));
}

#[tokio::test]
async fn tenant_subdomains_cover_both_slugs() {
  let s = store().await;
  s.add_tenant(tenant("acme")).await.unwrap();
  s.add_tenant(tenant("orbital")).await.unwrap();

  let mut subdomains = s.tenant_subdomains().await.unwrap();
  subdomains.sort();
  assert_eq!(subdomains, vec![
    "acme",
    "acme-admin",
    "orbital",
    "orbital-admin"
  ]);
}

// ─── Programs ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn program_window_must_end_after_start() {
  let s = store().await;
  let t = s.add_tenant(tenant("acme")).await.unwrap();

  let mut bad = program(t.tenant_id);
  bad.ends_on = bad.starts_on;
  let err = s.add_program(bad).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(cohort_core::Error::InvalidProgramWindow { .. })
  ));
}

#[tokio::test]
async fn soft_deleted_programs_are_excluded_from_listings() {
  let s = store().await;
  let t = s.add_tenant(tenant("acme")).await.unwrap();
  let p1 = s.add_program(program(t.tenant_id)).await.unwrap();
  let p2 = s.add_program(program(t.tenant_id)).await.unwrap();

  s.soft_delete_program(p1.program_id).await.unwrap();

  let active = s.list_programs(t.tenant_id, false).await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].program_id, p2.program_id);

  // The row survives; historical queries can still reach it.
  let all = s.list_programs(t.tenant_id, true).await.unwrap();
  assert_eq!(all.len(), 2);
  let deleted = s.get_program(p1.program_id).await.unwrap().unwrap();
  assert!(deleted.deleted);
}

// ─── Cards ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cards_are_appended_at_max_position_plus_one() {
  let s = store().await;
  let (_, _, kanban_id) = seed_board(&s).await;

  let c0 = s.add_card(kanban_id, "applied".into()).await.unwrap();
  let c1 = s.add_card(kanban_id, "screening".into()).await.unwrap();
  let c2 = s.add_card(kanban_id, "accepted".into()).await.unwrap();

  assert_eq!(c0.position, 0);
  assert_eq!(c1.position, 1);
  assert_eq!(c2.position, 2);

  let cards = s.list_cards(kanban_id).await.unwrap();
  let names: Vec<_> = cards.iter().map(|c| c.card.name.as_str()).collect();
  assert_eq!(names, vec!["applied", "screening", "accepted"]);
}

#[tokio::test]
async fn add_card_to_missing_kanban_fails() {
  let s = store().await;
  let err = s.add_card(Uuid::new_v4(), "x".into()).await.unwrap_err();
  assert!(matches!(err, Error::KanbanNotFound(_)));
}

#[tokio::test]
async fn kanban_and_card_lookups() {
  let s = store().await;
  let (_, _, kanban_id) = seed_board(&s).await;
  let card = s.add_card(kanban_id, "screening".into()).await.unwrap();

  let kanban = s.get_kanban(kanban_id).await.unwrap().unwrap();
  assert_eq!(kanban.name, "pipeline");
  let fetched = s.get_card(card.card_id).await.unwrap().unwrap();
  assert_eq!(fetched.kanban_id, kanban_id);
  assert_eq!(fetched.position, 0);

  assert!(s.get_kanban(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.get_card(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Rule replacement ────────────────────────────────────────────────────────

#[tokio::test]
async fn replace_rules_roundtrip() {
  let s = store().await;
  let (_, program_id, kanban_id) = seed_board(&s).await;
  let card = s.add_card(kanban_id, "fintech".into()).await.unwrap();

  let stored = s
    .replace_rules(card.card_id, vec![vertical_rule("fintech")])
    .await
    .unwrap();
  assert_eq!(stored.len(), 1);
  assert_eq!(stored[0].program_id, program_id);

  let fetched = s.card_rules(card.card_id).await.unwrap();
  assert_eq!(fetched.len(), 1);
  assert_eq!(fetched[0].key, AttributeKey::Vertical);
  assert_eq!(fetched[0].options, vec!["fintech"]);
}

#[tokio::test]
async fn replace_rules_replaces_the_whole_set() {
  let s = store().await;
  let (_, _, kanban_id) = seed_board(&s).await;
  let card = s.add_card(kanban_id, "stage".into()).await.unwrap();

  s.replace_rules(card.card_id, vec![
    vertical_rule("fintech"),
    vertical_rule("healthtech"),
  ])
  .await
  .unwrap();

  s.replace_rules(card.card_id, vec![vertical_rule("agtech")])
    .await
    .unwrap();

  let rules = s.card_rules(card.card_id).await.unwrap();
  assert_eq!(rules.len(), 1);
  assert_eq!(rules[0].options, vec!["agtech"]);
}

#[tokio::test]
async fn failed_replacement_leaves_prior_rules_intact() {
  let s = store().await;
  let (_, _, kanban_id) = seed_board(&s).await;
  let card = s.add_card(kanban_id, "stage".into()).await.unwrap();

  s.replace_rules(card.card_id, vec![vertical_rule("fintech")])
    .await
    .unwrap();

  // An empty options list violates the schema CHECK after the delete-all
  // has already run inside the transaction; the whole unit must roll back.
  let bad = NewRule {
    key:        AttributeKey::Vertical,
    field_type: FieldType::Text,
    comparison: Comparison::Equals,
    options:    vec![],
  };
  let result = s
    .replace_rules(card.card_id, vec![vertical_rule("healthtech"), bad])
    .await;
  assert!(result.is_err());

  let rules = s.card_rules(card.card_id).await.unwrap();
  assert_eq!(rules.len(), 1);
  assert_eq!(rules[0].options, vec!["fintech"]);
}

#[tokio::test]
async fn replace_rules_on_missing_card_fails() {
  let s = store().await;
  let err = s
    .replace_rules(Uuid::new_v4(), vec![vertical_rule("fintech")])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CardNotFound(_)));
}

// ─── Block updates ───────────────────────────────────────────────────────────

#[tokio::test]
async fn block_update_writes_its_block_and_stamps_stale() {
  let s = store().await;
  let t = s.add_tenant(tenant("acme")).await.unwrap();
  let st = s
    .add_startup(NewStartup {
      tenant_id: t.tenant_id,
      name:      "Ledgerly".into(),
    })
    .await
    .unwrap();

  let before = s.get_startup(st.startup_id).await.unwrap().unwrap();

  let updated = s
    .apply_block_update(st.startup_id, BlockUpdate::GeneralData {
      vertical:        Some("fintech".into()),
      foundation_year: Some(2023),
      city:            Some("Porto".into()),
      employees:       Some(8),
    })
    .await
    .unwrap();

  assert_eq!(updated.attributes.vertical.as_deref(), Some("fintech"));
  assert!(!updated.was_processed);
  assert!(updated.updated_at >= before.updated_at);
}

#[tokio::test]
async fn block_update_leaves_other_blocks_untouched() {
  let s = store().await;
  let t = s.add_tenant(tenant("acme")).await.unwrap();
  let st = s
    .add_startup(NewStartup {
      tenant_id: t.tenant_id,
      name:      "Ledgerly".into(),
    })
    .await
    .unwrap();

  s.apply_block_update(st.startup_id, BlockUpdate::GeneralData {
    vertical:        Some("fintech".into()),
    foundation_year: None,
    city:            None,
    employees:       Some(8),
  })
  .await
  .unwrap();

  let updated = s
    .apply_block_update(st.startup_id, BlockUpdate::Team {
      founders_count:        Some(2),
      has_technical_founder: Some(true),
      team_description:      None,
    })
    .await
    .unwrap();

  assert_eq!(updated.attributes.vertical.as_deref(), Some("fintech"));
  assert_eq!(updated.attributes.employees, Some(8));
  assert_eq!(updated.attributes.founders_count, Some(2));
}

#[tokio::test]
async fn block_update_on_missing_startup_fails() {
  let s = store().await;
  let err = s
    .apply_block_update(Uuid::new_v4(), BlockUpdate::DeepTech {
      is_deep_tech:               Some(true),
      technology_readiness_level: Some(4),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::StartupNotFound(_)));
}

#[tokio::test]
async fn profile_updated_latches_on_first_full_completion() {
  let s = store().await;
  let t = s.add_tenant(tenant("acme")).await.unwrap();
  let st = s
    .add_startup(NewStartup {
      tenant_id: t.tenant_id,
      name:      "Ledgerly".into(),
    })
    .await
    .unwrap();
  let id = st.startup_id;

  let partial = s
    .apply_block_update(id, BlockUpdate::GeneralData {
      vertical:        Some("fintech".into()),
      foundation_year: Some(2023),
      city:            Some("Porto".into()),
      employees:       Some(8),
    })
    .await
    .unwrap();
  assert!(partial.profile_filled_percentage > 0);
  assert!(partial.profile_filled_percentage < 100);
  assert!(!partial.fully_completed_profile);
  assert!(!partial.profile_updated);

  // Fill every remaining required block.
  s.apply_block_update(id, BlockUpdate::Team {
    founders_count:        Some(2),
    has_technical_founder: Some(true),
    team_description:      None,
  })
  .await
  .unwrap();
  s.apply_block_update(id, BlockUpdate::ProductService {
    product_stage:  Some("mvp".into()),
    business_model: Some("saas".into()),
    target_market:  Some("smb".into()),
  })
  .await
  .unwrap();
  s.apply_block_update(id, BlockUpdate::DeepTech {
    is_deep_tech:               Some(false),
    technology_readiness_level: Some(5),
  })
  .await
  .unwrap();
  s.apply_block_update(id, BlockUpdate::Governance {
    is_incorporated:  Some(true),
    has_cap_table:    Some(true),
    governance_notes: None,
  })
  .await
  .unwrap();
  s.apply_block_update(id, BlockUpdate::MarketFinance {
    monthly_revenue:    Some(3_500.0),
    total_raised:       Some(100_000.0),
    seeking_investment: Some(true),
  })
  .await
  .unwrap();
  let complete = s
    .apply_block_update(id, BlockUpdate::Profile {
      pitch:      Some("bookkeeping for micro-SaaS".into()),
      website:    None,
      logo_asset: None,
    })
    .await
    .unwrap();

  assert_eq!(complete.profile_filled_percentage, 100);
  assert!(complete.fully_completed_profile);
  assert!(complete.profile_updated);

  // Dropping back below 100% clears the completion flag but not the
  // one-time latch.
  let regressed = s
    .apply_block_update(id, BlockUpdate::Profile {
      pitch:      None,
      website:    None,
      logo_asset: None,
    })
    .await
    .unwrap();
  assert!(!regressed.fully_completed_profile);
  assert!(regressed.profile_updated);
}

// ─── Associations ────────────────────────────────────────────────────────────

#[tokio::test]
async fn partners_are_replaced_wholesale() {
  let s = store().await;
  let t = s.add_tenant(tenant("acme")).await.unwrap();
  let st = s
    .add_startup(NewStartup {
      tenant_id: t.tenant_id,
      name:      "Ledgerly".into(),
    })
    .await
    .unwrap();

  let first = vec![
    Partner {
      name:  "AWS Activate".into(),
      email: None,
      role:  Some("cloud credits".into()),
    },
    Partner {
      name:  "Stripe Atlas".into(),
      email: None,
      role:  None,
    },
  ];
  s.replace_partners(st.startup_id, first).await.unwrap();

  let second = vec![Partner {
    name:  "Notion for Startups".into(),
    email: None,
    role:  None,
  }];
  s.replace_partners(st.startup_id, second.clone())
    .await
    .unwrap();

  assert_eq!(s.partners(st.startup_id).await.unwrap(), second);

  let startup = s.get_startup(st.startup_id).await.unwrap().unwrap();
  assert!(!startup.was_processed);
}

#[tokio::test]
async fn service_products_are_replaced_wholesale() {
  let s = store().await;
  let t = s.add_tenant(tenant("acme")).await.unwrap();
  let st = s
    .add_startup(NewStartup {
      tenant_id: t.tenant_id,
      name:      "Ledgerly".into(),
    })
    .await
    .unwrap();

  s.replace_service_products(st.startup_id, vec![
    "invoicing".into(),
    "payroll".into(),
  ])
  .await
  .unwrap();
  s.replace_service_products(st.startup_id, vec!["invoicing".into()])
    .await
    .unwrap();

  assert_eq!(s.service_products(st.startup_id).await.unwrap(), vec![
    "invoicing"
  ]);
}

// ─── Placement ───────────────────────────────────────────────────────────────

/// Board with three cards: fintech (pos 0), healthtech (pos 1), and an
/// unconstrained backlog card (pos 2). Returns the card ids in that order.
async fn seed_ruled_board(s: &SqliteStore) -> (Uuid, Uuid, Uuid, Uuid, Uuid) {
  let (tenant_id, program_id, kanban_id) = seed_board(s).await;
  let fintech = s.add_card(kanban_id, "fintech".into()).await.unwrap();
  let health = s.add_card(kanban_id, "healthtech".into()).await.unwrap();
  let backlog = s.add_card(kanban_id, "backlog".into()).await.unwrap();

  s.replace_rules(fintech.card_id, vec![vertical_rule("fintech")])
    .await
    .unwrap();
  s.replace_rules(health.card_id, vec![vertical_rule("healthtech")])
    .await
    .unwrap();

  (
    tenant_id,
    program_id,
    fintech.card_id,
    health.card_id,
    backlog.card_id,
  )
}

async fn seed_enrolled_startup(
  s: &SqliteStore,
  tenant_id: Uuid,
  program_id: Uuid,
) -> Uuid {
  let st = s
    .add_startup(NewStartup {
      tenant_id,
      name: "Ledgerly".into(),
    })
    .await
    .unwrap();
  s.enroll(program_id, st.startup_id).await.unwrap();
  st.startup_id
}

#[tokio::test]
async fn placement_assigns_first_matching_card() {
  let s = store().await;
  let (tenant_id, program_id, fintech_card, _, _) = seed_ruled_board(&s).await;
  let id = seed_enrolled_startup(&s, tenant_id, program_id).await;

  s.apply_block_update(id, BlockUpdate::GeneralData {
    vertical:        Some("fintech".into()),
    foundation_year: None,
    city:            None,
    employees:       Some(12),
  })
  .await
  .unwrap();

  let outcome = s.recompute_placement(id).await.unwrap();
  assert_eq!(outcome.card_id, Some(fintech_card));
  assert!(outcome.changed);

  let startup = s.get_startup(id).await.unwrap().unwrap();
  assert_eq!(startup.card_id, Some(fintech_card));
  assert!(startup.was_processed);
}

#[tokio::test]
async fn placement_never_auto_matches_unconstrained_cards() {
  let s = store().await;
  let (tenant_id, program_id, _, _, backlog_card) = seed_ruled_board(&s).await;
  let id = seed_enrolled_startup(&s, tenant_id, program_id).await;

  // No attributes filled: no ruled card matches, and the rule-less backlog
  // card must not catch the startup either.
  let outcome = s.recompute_placement(id).await.unwrap();
  assert_eq!(outcome.card_id, None);
  assert!(!outcome.changed);
  assert_ne!(outcome.card_id, Some(backlog_card));
}

#[tokio::test]
async fn placement_keeps_current_card_when_nothing_matches() {
  let s = store().await;
  let (tenant_id, program_id, fintech_card, _, _) = seed_ruled_board(&s).await;
  let id = seed_enrolled_startup(&s, tenant_id, program_id).await;

  s.apply_block_update(id, BlockUpdate::GeneralData {
    vertical:        Some("fintech".into()),
    foundation_year: None,
    city:            None,
    employees:       None,
  })
  .await
  .unwrap();
  s.recompute_placement(id).await.unwrap();

  // The vertical moves off the board entirely; no regression to unranked.
  s.apply_block_update(id, BlockUpdate::GeneralData {
    vertical:        Some("agtech".into()),
    foundation_year: None,
    city:            None,
    employees:       None,
  })
  .await
  .unwrap();
  let outcome = s.recompute_placement(id).await.unwrap();

  assert_eq!(outcome.card_id, Some(fintech_card));
  assert!(!outcome.changed);
}

#[tokio::test]
async fn placement_is_idempotent() {
  let s = store().await;
  let (tenant_id, program_id, fintech_card, _, _) = seed_ruled_board(&s).await;
  let id = seed_enrolled_startup(&s, tenant_id, program_id).await;

  s.apply_block_update(id, BlockUpdate::GeneralData {
    vertical:        Some("fintech".into()),
    foundation_year: None,
    city:            None,
    employees:       None,
  })
  .await
  .unwrap();

  let first = s.recompute_placement(id).await.unwrap();
  let second = s.recompute_placement(id).await.unwrap();

  assert_eq!(first.card_id, Some(fintech_card));
  assert!(first.changed);
  assert_eq!(second.card_id, Some(fintech_card));
  assert!(!second.changed);
}

#[tokio::test]
async fn manual_assignment_reaches_unconstrained_cards() {
  let s = store().await;
  let (tenant_id, program_id, _, _, backlog_card) = seed_ruled_board(&s).await;
  let id = seed_enrolled_startup(&s, tenant_id, program_id).await;

  s.assign_card(id, backlog_card).await.unwrap();
  let startup = s.get_startup(id).await.unwrap().unwrap();
  assert_eq!(startup.card_id, Some(backlog_card));

  // With no matching ruled card, recomputation leaves the manual choice.
  let outcome = s.recompute_placement(id).await.unwrap();
  assert_eq!(outcome.card_id, Some(backlog_card));
  assert!(!outcome.changed);
}

#[tokio::test]
async fn recomputation_moves_startup_off_manual_card_when_rules_match() {
  let s = store().await;
  let (tenant_id, program_id, _, health_card, backlog_card) =
    seed_ruled_board(&s).await;
  let id = seed_enrolled_startup(&s, tenant_id, program_id).await;

  s.assign_card(id, backlog_card).await.unwrap();
  s.apply_block_update(id, BlockUpdate::GeneralData {
    vertical:        Some("healthtech".into()),
    foundation_year: None,
    city:            None,
    employees:       Some(12),
  })
  .await
  .unwrap();

  let outcome = s.recompute_placement(id).await.unwrap();
  assert_eq!(outcome.card_id, Some(health_card));
  assert!(outcome.changed);
}

#[tokio::test]
async fn unenrolled_startup_recomputes_against_empty_board() {
  let s = store().await;
  let t = s.add_tenant(tenant("acme")).await.unwrap();
  let st = s
    .add_startup(NewStartup {
      tenant_id: t.tenant_id,
      name:      "Ledgerly".into(),
    })
    .await
    .unwrap();

  let outcome = s.recompute_placement(st.startup_id).await.unwrap();
  assert_eq!(outcome.card_id, None);
  assert!(!outcome.changed);

  let startup = s.get_startup(st.startup_id).await.unwrap().unwrap();
  assert!(startup.was_processed);
}

#[tokio::test]
async fn soft_deleted_program_stops_driving_placement() {
  let s = store().await;
  let (tenant_id, program_id, fintech_card, _, _) = seed_ruled_board(&s).await;
  let id = seed_enrolled_startup(&s, tenant_id, program_id).await;

  s.apply_block_update(id, BlockUpdate::GeneralData {
    vertical:        Some("fintech".into()),
    foundation_year: None,
    city:            None,
    employees:       None,
  })
  .await
  .unwrap();
  s.recompute_placement(id).await.unwrap();

  s.soft_delete_program(program_id).await.unwrap();

  // The board is gone from the startup's perspective; the assignment is
  // left where it was.
  s.apply_block_update(id, BlockUpdate::GeneralData {
    vertical:        Some("healthtech".into()),
    foundation_year: None,
    city:            None,
    employees:       None,
  })
  .await
  .unwrap();
  let outcome = s.recompute_placement(id).await.unwrap();
  assert_eq!(outcome.card_id, Some(fintech_card));
  assert!(!outcome.changed);
}
