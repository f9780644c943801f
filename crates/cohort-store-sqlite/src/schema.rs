//! SQL schema for the Cohort SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS tenants (
    tenant_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    slug        TEXT NOT NULL UNIQUE,
    admin_slug  TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS experts (
    expert_id   TEXT PRIMARY KEY,
    tenant_id   TEXT NOT NULL REFERENCES tenants(tenant_id),
    name        TEXT NOT NULL,
    email       TEXT NOT NULL,
    specialties TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS investors (
    investor_id TEXT PRIMARY KEY,
    tenant_id   TEXT NOT NULL REFERENCES tenants(tenant_id),
    name        TEXT NOT NULL,
    email       TEXT NOT NULL,
    thesis      TEXT,
    created_at  TEXT NOT NULL
);

-- Programs are soft-deleted only; the row is never removed.
CREATE TABLE IF NOT EXISTS programs (
    program_id  TEXT PRIMARY KEY,
    tenant_id   TEXT NOT NULL REFERENCES tenants(tenant_id),
    name        TEXT NOT NULL,
    starts_on   TEXT NOT NULL,   -- ISO 8601 date
    ends_on     TEXT NOT NULL,   -- ISO 8601 date; strictly after starts_on
    deleted     INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    CHECK (ends_on > starts_on)
);

CREATE TABLE IF NOT EXISTS kanbans (
    kanban_id   TEXT PRIMARY KEY,
    program_id  TEXT NOT NULL REFERENCES programs(program_id),
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS kanban_cards (
    card_id     TEXT PRIMARY KEY,
    kanban_id   TEXT NOT NULL REFERENCES kanbans(kanban_id),
    name        TEXT NOT NULL,
    position    INTEGER NOT NULL
);

-- Rule sets are replaced wholesale (delete-all-then-recreate) inside one
-- transaction; the options CHECK is the in-transaction backstop against an
-- empty operand list.
CREATE TABLE IF NOT EXISTS rules (
    rule_id     TEXT PRIMARY KEY,
    card_id     TEXT NOT NULL REFERENCES kanban_cards(card_id),
    program_id  TEXT NOT NULL REFERENCES programs(program_id),
    key         TEXT NOT NULL,   -- AttributeKey discriminant
    field_type  TEXT NOT NULL,   -- FieldType discriminant
    comparison  TEXT NOT NULL,   -- Comparison discriminant
    options     TEXT NOT NULL,   -- JSON array of operand strings
    CHECK (options <> '[]')
);

CREATE TABLE IF NOT EXISTS startups (
    startup_id                 TEXT PRIMARY KEY,
    tenant_id                  TEXT NOT NULL REFERENCES tenants(tenant_id),
    name                       TEXT NOT NULL,
    card_id                    TEXT REFERENCES kanban_cards(card_id),
    was_processed              INTEGER NOT NULL DEFAULT 0,
    profile_filled_percentage  INTEGER NOT NULL DEFAULT 0,
    fully_completed_profile    INTEGER NOT NULL DEFAULT 0,
    profile_updated            INTEGER NOT NULL DEFAULT 0,
    created_at                 TEXT NOT NULL,
    updated_at                 TEXT NOT NULL,

    -- general data
    vertical                   TEXT,
    foundation_year            INTEGER,
    city                       TEXT,
    employees                  INTEGER,
    -- team
    founders_count             INTEGER,
    has_technical_founder      INTEGER,
    team_description           TEXT,
    -- product / service
    product_stage              TEXT,
    business_model             TEXT,
    target_market              TEXT,
    -- deep tech
    is_deep_tech               INTEGER,
    technology_readiness_level INTEGER,
    -- governance
    is_incorporated            INTEGER,
    has_cap_table              INTEGER,
    governance_notes           TEXT,
    -- market / finance
    monthly_revenue            REAL,
    total_raised               REAL,
    seeking_investment         INTEGER,
    -- profile
    pitch                      TEXT,
    website                    TEXT,
    logo_asset                 TEXT
);

CREATE TABLE IF NOT EXISTS enrollments (
    program_id  TEXT NOT NULL REFERENCES programs(program_id),
    startup_id  TEXT NOT NULL REFERENCES startups(startup_id),
    PRIMARY KEY (program_id, startup_id)
);

-- Association rows are replaced wholesale on each update, never diffed.
CREATE TABLE IF NOT EXISTS startup_partners (
    startup_id  TEXT NOT NULL REFERENCES startups(startup_id),
    name        TEXT NOT NULL,
    email       TEXT,
    role        TEXT
);

CREATE TABLE IF NOT EXISTS startup_service_products (
    startup_id  TEXT NOT NULL REFERENCES startups(startup_id),
    name        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS programs_tenant_idx    ON programs(tenant_id);
CREATE INDEX IF NOT EXISTS kanbans_program_idx    ON kanbans(program_id);
CREATE INDEX IF NOT EXISTS cards_kanban_idx       ON kanban_cards(kanban_id, position);
CREATE INDEX IF NOT EXISTS rules_card_idx         ON rules(card_id);
CREATE INDEX IF NOT EXISTS startups_tenant_idx    ON startups(tenant_id);
CREATE INDEX IF NOT EXISTS enrollments_startup_idx ON enrollments(startup_id);
CREATE INDEX IF NOT EXISTS partners_startup_idx   ON startup_partners(startup_id);
CREATE INDEX IF NOT EXISTS products_startup_idx   ON startup_service_products(startup_id);

PRAGMA user_version = 1;
";
