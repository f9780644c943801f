//! [`SqliteStore`] — the SQLite implementation of [`AcceleratorStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use cohort_core::{
  kanban::{Kanban, KanbanCard, NewKanban},
  people::{Expert, Investor, NewExpert, NewInvestor},
  placement::{CardRules, Placement, PlacementOutcome, place},
  program::{NewProgram, Program},
  rule::{NewRule, Rule},
  startup::{BlockUpdate, NewStartup, Partner, Startup},
  store::AcceleratorStore,
  tenant::{NewTenant, Tenant},
};

use crate::{
  Error, Result,
  encode::{
    RawCard, RawExpert, RawInvestor, RawKanban, RawProgram, RawRule,
    RawStartup, RawTenant, STARTUP_COLUMNS, decode_uuid, encode_date,
    encode_dt, encode_strings, encode_uuid, in_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An accelerator store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Read one startup row inside an open transaction or connection.
fn select_raw_startup(
  conn: &rusqlite::Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawStartup>> {
  conn
    .query_row(
      &format!("SELECT {STARTUP_COLUMNS} FROM startups WHERE startup_id = ?1"),
      rusqlite::params![id_str],
      RawStartup::from_row,
    )
    .optional()
}

/// Map a UNIQUE-constraint failure to a slug conflict.
fn map_slug_conflict(err: tokio_rusqlite::Error, slug: &str) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
    e,
    _,
  )) = &err
    && e.code == rusqlite::ErrorCode::ConstraintViolation
  {
    return Error::SlugTaken(slug.to_owned());
  }
  Error::Database(err)
}

// ─── AcceleratorStore impl ───────────────────────────────────────────────────

impl AcceleratorStore for SqliteStore {
  type Error = Error;

  // ── Tenants ───────────────────────────────────────────────────────────────

  async fn add_tenant(&self, input: NewTenant) -> Result<Tenant> {
    let tenant = Tenant {
      tenant_id:  Uuid::new_v4(),
      name:       input.name,
      slug:       input.slug,
      admin_slug: input.admin_slug,
      created_at: Utc::now(),
    };

    let id_str    = encode_uuid(tenant.tenant_id);
    let at_str    = encode_dt(tenant.created_at);
    let name      = tenant.name.clone();
    let slug      = tenant.slug.clone();
    let admin     = tenant.admin_slug.clone();
    let slug_copy = tenant.slug.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tenants (tenant_id, name, slug, admin_slug, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, slug, admin, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| map_slug_conflict(e, &slug_copy))?;

    Ok(tenant)
  }

  async fn get_tenant(&self, id: Uuid) -> Result<Option<Tenant>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawTenant> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT tenant_id, name, slug, admin_slug, created_at
               FROM tenants WHERE tenant_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawTenant {
                  tenant_id:  row.get(0)?,
                  name:       row.get(1)?,
                  slug:       row.get(2)?,
                  admin_slug: row.get(3)?,
                  created_at: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTenant::into_tenant).transpose()
  }

  async fn list_tenants(&self) -> Result<Vec<Tenant>> {
    let raws: Vec<RawTenant> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT tenant_id, name, slug, admin_slug, created_at
           FROM tenants ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawTenant {
              tenant_id:  row.get(0)?,
              name:       row.get(1)?,
              slug:       row.get(2)?,
              admin_slug: row.get(3)?,
              created_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTenant::into_tenant).collect()
  }

  async fn tenant_subdomains(&self) -> Result<Vec<String>> {
    let subdomains: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT slug FROM tenants UNION SELECT admin_slug FROM tenants",
        )?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(subdomains)
  }

  // ── Experts & investors ───────────────────────────────────────────────────

  async fn add_expert(&self, input: NewExpert) -> Result<Expert> {
    let expert = Expert {
      expert_id:   Uuid::new_v4(),
      tenant_id:   input.tenant_id,
      name:        input.name,
      email:       input.email,
      specialties: input.specialties,
      created_at:  Utc::now(),
    };

    let id_str     = encode_uuid(expert.expert_id);
    let tenant_str = encode_uuid(expert.tenant_id);
    let at_str     = encode_dt(expert.created_at);
    let name       = expert.name.clone();
    let email      = expert.email.clone();
    let specs      = encode_strings(&expert.specialties)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO experts (expert_id, tenant_id, name, email, specialties, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, tenant_str, name, email, specs, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(expert)
  }

  async fn list_experts(&self, tenant_id: Uuid) -> Result<Vec<Expert>> {
    let tenant_str = encode_uuid(tenant_id);

    let raws: Vec<RawExpert> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT expert_id, tenant_id, name, email, specialties, created_at
           FROM experts WHERE tenant_id = ?1 ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![tenant_str], |row| {
            Ok(RawExpert {
              expert_id:   row.get(0)?,
              tenant_id:   row.get(1)?,
              name:        row.get(2)?,
              email:       row.get(3)?,
              specialties: row.get(4)?,
              created_at:  row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawExpert::into_expert).collect()
  }

  async fn add_investor(&self, input: NewInvestor) -> Result<Investor> {
    let investor = Investor {
      investor_id: Uuid::new_v4(),
      tenant_id:   input.tenant_id,
      name:        input.name,
      email:       input.email,
      thesis:      input.thesis,
      created_at:  Utc::now(),
    };

    let id_str     = encode_uuid(investor.investor_id);
    let tenant_str = encode_uuid(investor.tenant_id);
    let at_str     = encode_dt(investor.created_at);
    let name       = investor.name.clone();
    let email      = investor.email.clone();
    let thesis     = investor.thesis.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO investors (investor_id, tenant_id, name, email, thesis, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, tenant_str, name, email, thesis, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(investor)
  }

  async fn list_investors(&self, tenant_id: Uuid) -> Result<Vec<Investor>> {
    let tenant_str = encode_uuid(tenant_id);

    let raws: Vec<RawInvestor> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT investor_id, tenant_id, name, email, thesis, created_at
           FROM investors WHERE tenant_id = ?1 ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![tenant_str], |row| {
            Ok(RawInvestor {
              investor_id: row.get(0)?,
              tenant_id:   row.get(1)?,
              name:        row.get(2)?,
              email:       row.get(3)?,
              thesis:      row.get(4)?,
              created_at:  row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawInvestor::into_investor).collect()
  }

  // ── Programs ──────────────────────────────────────────────────────────────

  async fn add_program(&self, input: NewProgram) -> Result<Program> {
    input.validate().map_err(Error::Core)?;

    let program = Program {
      program_id: Uuid::new_v4(),
      tenant_id:  input.tenant_id,
      name:       input.name,
      starts_on:  input.starts_on,
      ends_on:    input.ends_on,
      deleted:    false,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(program.program_id);
    let tenant_str = encode_uuid(program.tenant_id);
    let name       = program.name.clone();
    let starts_str = encode_date(program.starts_on);
    let ends_str   = encode_date(program.ends_on);
    let at_str     = encode_dt(program.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO programs (program_id, tenant_id, name, starts_on, ends_on, deleted, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
          rusqlite::params![id_str, tenant_str, name, starts_str, ends_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(program)
  }

  async fn get_program(&self, id: Uuid) -> Result<Option<Program>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawProgram> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT program_id, tenant_id, name, starts_on, ends_on, deleted, created_at
               FROM programs WHERE program_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawProgram {
                  program_id: row.get(0)?,
                  tenant_id:  row.get(1)?,
                  name:       row.get(2)?,
                  starts_on:  row.get(3)?,
                  ends_on:    row.get(4)?,
                  deleted:    row.get(5)?,
                  created_at: row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProgram::into_program).transpose()
  }

  async fn list_programs(
    &self,
    tenant_id: Uuid,
    include_deleted: bool,
  ) -> Result<Vec<Program>> {
    let tenant_str = encode_uuid(tenant_id);

    let raws: Vec<RawProgram> = self
      .conn
      .call(move |conn| {
        let sql = if include_deleted {
          "SELECT program_id, tenant_id, name, starts_on, ends_on, deleted, created_at
           FROM programs WHERE tenant_id = ?1 ORDER BY created_at"
        } else {
          "SELECT program_id, tenant_id, name, starts_on, ends_on, deleted, created_at
           FROM programs WHERE tenant_id = ?1 AND deleted = 0 ORDER BY created_at"
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(rusqlite::params![tenant_str], |row| {
            Ok(RawProgram {
              program_id: row.get(0)?,
              tenant_id:  row.get(1)?,
              name:       row.get(2)?,
              starts_on:  row.get(3)?,
              ends_on:    row.get(4)?,
              deleted:    row.get(5)?,
              created_at: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProgram::into_program).collect()
  }

  async fn soft_delete_program(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE programs SET deleted = 1 WHERE program_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::ProgramNotFound(id));
    }
    Ok(())
  }

  // ── Kanbans & cards ───────────────────────────────────────────────────────

  async fn add_kanban(&self, input: NewKanban) -> Result<Kanban> {
    let kanban = Kanban {
      kanban_id:  Uuid::new_v4(),
      program_id: input.program_id,
      name:       input.name,
      created_at: Utc::now(),
    };

    let id_str      = encode_uuid(kanban.kanban_id);
    let program_str = encode_uuid(kanban.program_id);
    let name        = kanban.name.clone();
    let at_str      = encode_dt(kanban.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO kanbans (kanban_id, program_id, name, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, program_str, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(kanban)
  }

  async fn get_kanban(&self, id: Uuid) -> Result<Option<Kanban>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawKanban> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT kanban_id, program_id, name, created_at
               FROM kanbans WHERE kanban_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawKanban {
                  kanban_id:  row.get(0)?,
                  program_id: row.get(1)?,
                  name:       row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawKanban::into_kanban).transpose()
  }

  async fn get_card(&self, id: Uuid) -> Result<Option<KanbanCard>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCard> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT card_id, kanban_id, name, position
               FROM kanban_cards WHERE card_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawCard {
                  card_id:   row.get(0)?,
                  kanban_id: row.get(1)?,
                  name:      row.get(2)?,
                  position:  row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCard::into_card).transpose()
  }

  async fn add_card(&self, kanban_id: Uuid, name: String) -> Result<KanbanCard> {
    let card_id    = Uuid::new_v4();
    let card_str   = encode_uuid(card_id);
    let kanban_str = encode_uuid(kanban_id);
    let name_copy  = name.clone();

    // Appending must read and write the position counter atomically.
    let position: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM kanbans WHERE kanban_id = ?1",
            rusqlite::params![kanban_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }

        let position: i64 = tx.query_row(
          "SELECT COALESCE(MAX(position) + 1, 0) FROM kanban_cards WHERE kanban_id = ?1",
          rusqlite::params![kanban_str],
          |row| row.get(0),
        )?;

        tx.execute(
          "INSERT INTO kanban_cards (card_id, kanban_id, name, position)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![card_str, kanban_str, name_copy, position],
        )?;

        tx.commit()?;
        Ok(Some(position))
      })
      .await?;

    let position = position.ok_or(Error::KanbanNotFound(kanban_id))?;
    Ok(KanbanCard { card_id, kanban_id, name, position })
  }

  async fn list_cards(&self, kanban_id: Uuid) -> Result<Vec<CardRules>> {
    let kanban_str = encode_uuid(kanban_id);

    let raws: Vec<(RawCard, Vec<RawRule>)> = self
      .conn
      .call(move |conn| {
        let mut card_stmt = conn.prepare(
          "SELECT card_id, kanban_id, name, position
           FROM kanban_cards WHERE kanban_id = ?1 ORDER BY position",
        )?;
        let cards = card_stmt
          .query_map(rusqlite::params![kanban_str], |row| {
            Ok(RawCard {
              card_id:   row.get(0)?,
              kanban_id: row.get(1)?,
              name:      row.get(2)?,
              position:  row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut rule_stmt = conn.prepare(
          "SELECT rule_id, card_id, program_id, key, field_type, comparison, options
           FROM rules WHERE card_id = ?1",
        )?;
        let mut out = Vec::with_capacity(cards.len());
        for card in cards {
          let rules = rule_stmt
            .query_map(rusqlite::params![card.card_id.clone()], |row| {
              Ok(RawRule {
                rule_id:    row.get(0)?,
                card_id:    row.get(1)?,
                program_id: row.get(2)?,
                key:        row.get(3)?,
                field_type: row.get(4)?,
                comparison: row.get(5)?,
                options:    row.get(6)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          out.push((card, rules));
        }
        Ok(out)
      })
      .await?;

    raws
      .into_iter()
      .map(|(card, rules)| {
        Ok(CardRules {
          card:  card.into_card()?,
          rules: rules
            .into_iter()
            .map(RawRule::into_rule)
            .collect::<Result<Vec<_>>>()?,
        })
      })
      .collect()
  }

  // ── Rules ─────────────────────────────────────────────────────────────────

  async fn replace_rules(
    &self,
    card_id: Uuid,
    rules: Vec<NewRule>,
  ) -> Result<Vec<Rule>> {
    let card_str = encode_uuid(card_id);

    // Pre-assign ids and pre-encode rows so the transaction closure is pure
    // SQL. Validation is the caller's job; the schema CHECK on options is
    // the in-transaction backstop.
    let ids: Vec<Uuid> = rules.iter().map(|_| Uuid::new_v4()).collect();
    let mut encoded = Vec::with_capacity(rules.len());
    for (id, rule) in ids.iter().zip(&rules) {
      encoded.push((
        encode_uuid(*id),
        rule.key.discriminant().to_owned(),
        rule.field_type.discriminant().to_owned(),
        rule.comparison.discriminant().to_owned(),
        encode_strings(&rule.options)?,
      ));
    }

    let card_for_tx = card_str.clone();
    let program_str: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let program_id: Option<String> = tx
          .query_row(
            "SELECT k.program_id
             FROM kanban_cards c
             JOIN kanbans k ON k.kanban_id = c.kanban_id
             WHERE c.card_id = ?1",
            rusqlite::params![card_for_tx],
            |row| row.get(0),
          )
          .optional()?;
        let Some(program_id) = program_id else {
          return Ok(None);
        };

        tx.execute(
          "DELETE FROM rules WHERE card_id = ?1",
          rusqlite::params![card_for_tx],
        )?;

        {
          let mut stmt = tx.prepare(
            "INSERT INTO rules (rule_id, card_id, program_id, key, field_type, comparison, options)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          )?;
          for (rule_id, key, field_type, comparison, options) in &encoded {
            stmt.execute(rusqlite::params![
              rule_id,
              card_for_tx,
              program_id,
              key,
              field_type,
              comparison,
              options,
            ])?;
          }
        }

        tx.commit()?;
        Ok(Some(program_id))
      })
      .await?;

    let program_id =
      decode_uuid(&program_str.ok_or(Error::CardNotFound(card_id))?)?;

    Ok(
      ids
        .into_iter()
        .zip(rules)
        .map(|(rule_id, r)| Rule {
          rule_id,
          card_id,
          program_id,
          key: r.key,
          field_type: r.field_type,
          comparison: r.comparison,
          options: r.options,
        })
        .collect(),
    )
  }

  async fn card_rules(&self, card_id: Uuid) -> Result<Vec<Rule>> {
    let card_str = encode_uuid(card_id);

    let raws: Vec<RawRule> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT rule_id, card_id, program_id, key, field_type, comparison, options
           FROM rules WHERE card_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![card_str], |row| {
            Ok(RawRule {
              rule_id:    row.get(0)?,
              card_id:    row.get(1)?,
              program_id: row.get(2)?,
              key:        row.get(3)?,
              field_type: row.get(4)?,
              comparison: row.get(5)?,
              options:    row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRule::into_rule).collect()
  }

  // ── Startups ──────────────────────────────────────────────────────────────

  async fn add_startup(&self, input: NewStartup) -> Result<Startup> {
    let now = Utc::now();
    let startup = Startup {
      startup_id: Uuid::new_v4(),
      tenant_id:  input.tenant_id,
      name:       input.name,
      card_id:    None,
      was_processed: false,
      profile_filled_percentage: 0,
      fully_completed_profile:   false,
      profile_updated: false,
      created_at: now,
      updated_at: now,
      attributes: Default::default(),
    };

    let id_str     = encode_uuid(startup.startup_id);
    let tenant_str = encode_uuid(startup.tenant_id);
    let name       = startup.name.clone();
    let at_str     = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO startups (startup_id, tenant_id, name, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![id_str, tenant_str, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(startup)
  }

  async fn get_startup(&self, id: Uuid) -> Result<Option<Startup>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawStartup> = self
      .conn
      .call(move |conn| Ok(select_raw_startup(conn, &id_str)?))
      .await?;

    raw.map(RawStartup::into_startup).transpose()
  }

  async fn list_startups(&self, tenant_id: Uuid) -> Result<Vec<Startup>> {
    let tenant_str = encode_uuid(tenant_id);

    let raws: Vec<RawStartup> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {STARTUP_COLUMNS} FROM startups
           WHERE tenant_id = ?1 ORDER BY created_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![tenant_str], RawStartup::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStartup::into_startup).collect()
  }

  async fn enroll(&self, program_id: Uuid, startup_id: Uuid) -> Result<()> {
    let program_str = encode_uuid(program_id);
    let startup_str = encode_uuid(startup_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO enrollments (program_id, startup_id) VALUES (?1, ?2)",
          rusqlite::params![program_str, startup_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn apply_block_update(
    &self,
    startup_id: Uuid,
    update: BlockUpdate,
  ) -> Result<Startup> {
    let id_str  = encode_uuid(startup_id);
    let now_str = encode_dt(Utc::now());

    let raw: Option<RawStartup> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(raw) = select_raw_startup(&tx, &id_str)? else {
          return Ok(None);
        };

        let mut attrs = raw.attributes;
        update.apply(&mut attrs);

        // Write only the mutated block's columns.
        match &update {
          BlockUpdate::GeneralData { .. } => tx.execute(
            "UPDATE startups SET vertical = ?1, foundation_year = ?2, city = ?3, employees = ?4
             WHERE startup_id = ?5",
            rusqlite::params![
              attrs.vertical,
              attrs.foundation_year,
              attrs.city,
              attrs.employees,
              id_str
            ],
          )?,
          BlockUpdate::Team { .. } => tx.execute(
            "UPDATE startups SET founders_count = ?1, has_technical_founder = ?2, team_description = ?3
             WHERE startup_id = ?4",
            rusqlite::params![
              attrs.founders_count,
              attrs.has_technical_founder,
              attrs.team_description,
              id_str
            ],
          )?,
          BlockUpdate::ProductService { .. } => tx.execute(
            "UPDATE startups SET product_stage = ?1, business_model = ?2, target_market = ?3
             WHERE startup_id = ?4",
            rusqlite::params![
              attrs.product_stage,
              attrs.business_model,
              attrs.target_market,
              id_str
            ],
          )?,
          BlockUpdate::DeepTech { .. } => tx.execute(
            "UPDATE startups SET is_deep_tech = ?1, technology_readiness_level = ?2
             WHERE startup_id = ?3",
            rusqlite::params![
              attrs.is_deep_tech,
              attrs.technology_readiness_level,
              id_str
            ],
          )?,
          BlockUpdate::Governance { .. } => tx.execute(
            "UPDATE startups SET is_incorporated = ?1, has_cap_table = ?2, governance_notes = ?3
             WHERE startup_id = ?4",
            rusqlite::params![
              attrs.is_incorporated,
              attrs.has_cap_table,
              attrs.governance_notes,
              id_str
            ],
          )?,
          BlockUpdate::MarketFinance { .. } => tx.execute(
            "UPDATE startups SET monthly_revenue = ?1, total_raised = ?2, seeking_investment = ?3
             WHERE startup_id = ?4",
            rusqlite::params![
              attrs.monthly_revenue,
              attrs.total_raised,
              attrs.seeking_investment,
              id_str
            ],
          )?,
          BlockUpdate::Profile { .. } => tx.execute(
            "UPDATE startups SET pitch = ?1, website = ?2, logo_asset = ?3
             WHERE startup_id = ?4",
            rusqlite::params![attrs.pitch, attrs.website, attrs.logo_asset, id_str],
          )?,
        };

        // Every block update stamps the entity stale and recomputes the
        // derived completion state. The one-time profile_updated flag
        // latches on the first 100% transition.
        let pct = attrs.completion_percentage();
        let fully = pct == 100;
        let updated_flag = raw.profile_updated || fully;
        tx.execute(
          "UPDATE startups
           SET was_processed = 0, updated_at = ?1,
               profile_filled_percentage = ?2,
               fully_completed_profile = ?3,
               profile_updated = ?4
           WHERE startup_id = ?5",
          rusqlite::params![now_str, pct as i64, fully, updated_flag, id_str],
        )?;

        let updated = select_raw_startup(&tx, &id_str)?;
        tx.commit()?;
        Ok(updated)
      })
      .await?;

    raw
      .ok_or(Error::StartupNotFound(startup_id))?
      .into_startup()
  }

  async fn replace_partners(
    &self,
    startup_id: Uuid,
    partners: Vec<Partner>,
  ) -> Result<()> {
    let id_str  = encode_uuid(startup_id);
    let now_str = encode_dt(Utc::now());

    let found: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Association churn counts as an attribute mutation.
        let affected = tx.execute(
          "UPDATE startups SET was_processed = 0, updated_at = ?1 WHERE startup_id = ?2",
          rusqlite::params![now_str, id_str],
        )?;
        if affected == 0 {
          return Ok(false);
        }

        tx.execute(
          "DELETE FROM startup_partners WHERE startup_id = ?1",
          rusqlite::params![id_str],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO startup_partners (startup_id, name, email, role)
             VALUES (?1, ?2, ?3, ?4)",
          )?;
          for partner in &partners {
            stmt.execute(rusqlite::params![
              id_str,
              partner.name,
              partner.email,
              partner.role
            ])?;
          }
        }

        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::StartupNotFound(startup_id));
    }
    Ok(())
  }

  async fn partners(&self, startup_id: Uuid) -> Result<Vec<Partner>> {
    let id_str = encode_uuid(startup_id);

    let partners: Vec<Partner> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT name, email, role FROM startup_partners
           WHERE startup_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(Partner {
              name:  row.get(0)?,
              email: row.get(1)?,
              role:  row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(partners)
  }

  async fn replace_service_products(
    &self,
    startup_id: Uuid,
    names: Vec<String>,
  ) -> Result<()> {
    let id_str  = encode_uuid(startup_id);
    let now_str = encode_dt(Utc::now());

    let found: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let affected = tx.execute(
          "UPDATE startups SET was_processed = 0, updated_at = ?1 WHERE startup_id = ?2",
          rusqlite::params![now_str, id_str],
        )?;
        if affected == 0 {
          return Ok(false);
        }

        tx.execute(
          "DELETE FROM startup_service_products WHERE startup_id = ?1",
          rusqlite::params![id_str],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO startup_service_products (startup_id, name) VALUES (?1, ?2)",
          )?;
          for name in &names {
            stmt.execute(rusqlite::params![id_str, name])?;
          }
        }

        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::StartupNotFound(startup_id));
    }
    Ok(())
  }

  async fn service_products(&self, startup_id: Uuid) -> Result<Vec<String>> {
    let id_str = encode_uuid(startup_id);

    let names: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT name FROM startup_service_products
           WHERE startup_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }

  // ── Placement ─────────────────────────────────────────────────────────────

  async fn assign_card(&self, startup_id: Uuid, card_id: Uuid) -> Result<()> {
    let startup_str = encode_uuid(startup_id);
    let card_str    = encode_uuid(card_id);

    let (card_exists, affected): (bool, usize) = self
      .conn
      .call(move |conn| {
        let card_exists: bool = conn
          .query_row(
            "SELECT 1 FROM kanban_cards WHERE card_id = ?1",
            rusqlite::params![card_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !card_exists {
          return Ok((false, 0));
        }

        let affected = conn.execute(
          "UPDATE startups SET card_id = ?1 WHERE startup_id = ?2",
          rusqlite::params![card_str, startup_str],
        )?;
        Ok((true, affected))
      })
      .await?;

    if !card_exists {
      return Err(Error::CardNotFound(card_id));
    }
    if affected == 0 {
      return Err(Error::StartupNotFound(startup_id));
    }
    Ok(())
  }

  async fn recompute_placement(
    &self,
    startup_id: Uuid,
  ) -> Result<PlacementOutcome> {
    let id_str = encode_uuid(startup_id);

    let result: Option<(Option<String>, bool)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(raw) = select_raw_startup(&tx, &id_str)? else {
          return Ok(None);
        };

        // The startup's enrolled (non-deleted) program's primary kanban:
        // the earliest-created board. No enrollment means no cards, which
        // leaves the current assignment in place.
        let kanban_id: Option<String> = tx
          .query_row(
            "SELECT k.kanban_id
             FROM enrollments e
             JOIN programs p ON p.program_id = e.program_id AND p.deleted = 0
             JOIN kanbans  k ON k.program_id = p.program_id
             WHERE e.startup_id = ?1
             ORDER BY k.created_at, k.kanban_id
             LIMIT 1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;

        let mut cards: Vec<CardRules> = Vec::new();
        if let Some(kanban_str) = kanban_id {
          let raw_cards = {
            let mut stmt = tx.prepare(
              "SELECT card_id, kanban_id, name, position
               FROM kanban_cards WHERE kanban_id = ?1 ORDER BY position",
            )?;
            stmt
              .query_map(rusqlite::params![kanban_str], |row| {
                Ok(RawCard {
                  card_id:   row.get(0)?,
                  kanban_id: row.get(1)?,
                  name:      row.get(2)?,
                  position:  row.get(3)?,
                })
              })?
              .collect::<rusqlite::Result<Vec<_>>>()?
          };

          let mut rule_stmt = tx.prepare(
            "SELECT rule_id, card_id, program_id, key, field_type, comparison, options
             FROM rules WHERE card_id = ?1",
          )?;
          for raw_card in raw_cards {
            let raw_rules = rule_stmt
              .query_map(rusqlite::params![raw_card.card_id.clone()], |row| {
                Ok(RawRule {
                  rule_id:    row.get(0)?,
                  card_id:    row.get(1)?,
                  program_id: row.get(2)?,
                  key:        row.get(3)?,
                  field_type: row.get(4)?,
                  comparison: row.get(5)?,
                  options:    row.get(6)?,
                })
              })?
              .collect::<rusqlite::Result<Vec<_>>>()?;

            let card = in_row(raw_card.into_card())?;
            let rules = raw_rules
              .into_iter()
              .map(|r| in_row(r.into_rule()))
              .collect::<rusqlite::Result<Vec<_>>>()?;
            cards.push(CardRules { card, rules });
          }
          drop(rule_stmt);
        }

        let new_card = match place(&raw.attributes, &cards) {
          Placement::Card(id) => Some(encode_uuid(id)),
          Placement::Unchanged => raw.card_id.clone(),
        };
        let changed = new_card != raw.card_id;

        tx.execute(
          "UPDATE startups SET card_id = ?1, was_processed = 1 WHERE startup_id = ?2",
          rusqlite::params![new_card, id_str],
        )?;

        tx.commit()?;
        Ok(Some((new_card, changed)))
      })
      .await?;

    let (card_str, changed) =
      result.ok_or(Error::StartupNotFound(startup_id))?;
    Ok(PlacementOutcome {
      startup_id,
      card_id: card_str.as_deref().map(decode_uuid).transpose()?,
      changed,
    })
  }
}
