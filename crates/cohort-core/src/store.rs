//! The `AcceleratorStore` trait.
//!
//! Implemented by storage backends (e.g. `cohort-store-sqlite`). Higher
//! layers (`cohort-api`, the server) depend on this abstraction, not on any
//! concrete backend.
//!
//! Multi-statement write operations (rule replacement, block updates,
//! placement recomputation, association replace-sets) are transactional at
//! the backend: they commit or roll back as a unit, and no partial state is
//! ever observable to concurrent readers.

use std::future::Future;

use uuid::Uuid;

use crate::{
  kanban::{Kanban, KanbanCard, NewKanban},
  people::{Expert, Investor, NewExpert, NewInvestor},
  placement::{CardRules, PlacementOutcome},
  program::{NewProgram, Program},
  rule::{NewRule, Rule},
  startup::{BlockUpdate, NewStartup, Partner, Startup},
  tenant::{NewTenant, Tenant},
};

/// Abstraction over an accelerator-platform storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AcceleratorStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Tenants ───────────────────────────────────────────────────────────

  /// Create a tenant. Fails if the slug or admin slug is already taken.
  fn add_tenant(
    &self,
    input: NewTenant,
  ) -> impl Future<Output = Result<Tenant, Self::Error>> + Send + '_;

  fn get_tenant(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Tenant>, Self::Error>> + Send + '_;

  fn list_tenants(
    &self,
  ) -> impl Future<Output = Result<Vec<Tenant>, Self::Error>> + Send + '_;

  /// All registered subdomain labels (slugs and admin slugs), for building
  /// a [`crate::resolver::RegistrySnapshot`] on the reload boundary.
  fn tenant_subdomains(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Experts & investors ───────────────────────────────────────────────

  fn add_expert(
    &self,
    input: NewExpert,
  ) -> impl Future<Output = Result<Expert, Self::Error>> + Send + '_;

  fn list_experts(
    &self,
    tenant_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Expert>, Self::Error>> + Send + '_;

  fn add_investor(
    &self,
    input: NewInvestor,
  ) -> impl Future<Output = Result<Investor, Self::Error>> + Send + '_;

  fn list_investors(
    &self,
    tenant_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Investor>, Self::Error>> + Send + '_;

  // ── Programs ──────────────────────────────────────────────────────────

  fn add_program(
    &self,
    input: NewProgram,
  ) -> impl Future<Output = Result<Program, Self::Error>> + Send + '_;

  fn get_program(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Program>, Self::Error>> + Send + '_;

  /// Programs for a tenant. Soft-deleted programs are excluded unless
  /// `include_deleted` is set.
  fn list_programs(
    &self,
    tenant_id: Uuid,
    include_deleted: bool,
  ) -> impl Future<Output = Result<Vec<Program>, Self::Error>> + Send + '_;

  /// Flag a program as deleted. The row is never removed.
  fn soft_delete_program(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Kanbans & cards ───────────────────────────────────────────────────

  fn add_kanban(
    &self,
    input: NewKanban,
  ) -> impl Future<Output = Result<Kanban, Self::Error>> + Send + '_;

  fn get_kanban(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Kanban>, Self::Error>> + Send + '_;

  /// Append a card at `max(position) + 1` (0 on an empty board).
  fn add_card(
    &self,
    kanban_id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<KanbanCard, Self::Error>> + Send + '_;

  fn get_card(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<KanbanCard>, Self::Error>> + Send + '_;

  /// Cards with their rule sets, ordered by ascending position.
  fn list_cards(
    &self,
    kanban_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CardRules>, Self::Error>> + Send + '_;

  // ── Rules ─────────────────────────────────────────────────────────────

  /// Atomically replace a card's rule set: delete-all, then insert the new
  /// set, in one transaction. A failure partway leaves the prior set
  /// intact.
  fn replace_rules(
    &self,
    card_id: Uuid,
    rules: Vec<NewRule>,
  ) -> impl Future<Output = Result<Vec<Rule>, Self::Error>> + Send + '_;

  fn card_rules(
    &self,
    card_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Rule>, Self::Error>> + Send + '_;

  // ── Startups ──────────────────────────────────────────────────────────

  fn add_startup(
    &self,
    input: NewStartup,
  ) -> impl Future<Output = Result<Startup, Self::Error>> + Send + '_;

  fn get_startup(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Startup>, Self::Error>> + Send + '_;

  fn list_startups(
    &self,
    tenant_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Startup>, Self::Error>> + Send + '_;

  /// Enroll a startup in a program. Idempotent.
  fn enroll(
    &self,
    program_id: Uuid,
    startup_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Apply one attribute-block mutation: write the block's fields, stamp
  /// `was_processed = false` and `updated_at`, and recompute profile
  /// completion — all in one transaction. Returns the updated startup.
  fn apply_block_update(
    &self,
    startup_id: Uuid,
    update: BlockUpdate,
  ) -> impl Future<Output = Result<Startup, Self::Error>> + Send + '_;

  /// Replace the whole partner set (delete-then-recreate, one transaction).
  fn replace_partners(
    &self,
    startup_id: Uuid,
    partners: Vec<Partner>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn partners(
    &self,
    startup_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Partner>, Self::Error>> + Send + '_;

  /// Replace the whole service/product set (delete-then-recreate, one
  /// transaction).
  fn replace_service_products(
    &self,
    startup_id: Uuid,
    names: Vec<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn service_products(
    &self,
    startup_id: Uuid,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Placement ─────────────────────────────────────────────────────────

  /// Manual override: assign a startup to any card, including rule-less
  /// ones.
  fn assign_card(
    &self,
    startup_id: Uuid,
    card_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Recompute the startup's card assignment from its enrolled program's
  /// primary kanban and mark it processed, in one transaction. Idempotent:
  /// re-running with an unchanged snapshot re-asserts the same state.
  fn recompute_placement(
    &self,
    startup_id: Uuid,
  ) -> impl Future<Output = Result<PlacementOutcome, Self::Error>> + Send + '_;
}
