//! SQL schema for the portal SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS tenants (
    tenant_id           TEXT PRIMARY KEY,
    subdomain           TEXT NOT NULL UNIQUE,
    name                TEXT NOT NULL,
    logo_url            TEXT,
    primary_color       TEXT,
    bank_name           TEXT,
    bank_account_name   TEXT,
    bank_account_number TEXT,
    moncash_number      TEXT,
    mayor_name          TEXT,
    mayor_photo_url     TEXT,
    mayor_message       TEXT,
    created_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    tenant_id     TEXT NOT NULL REFERENCES tenants(tenant_id),
    email         TEXT NOT NULL,   -- stored lowercased
    name          TEXT NOT NULL,
    role          TEXT NOT NULL,   -- 'admin' | 'staff' | 'citizen'
    section_id    TEXT,
    password_hash TEXT NOT NULL,
    UNIQUE (tenant_id, email)
);

CREATE TABLE IF NOT EXISTS services (
    service_id    TEXT PRIMARY KEY,
    tenant_id     TEXT NOT NULL REFERENCES tenants(tenant_id),
    service_code  TEXT NOT NULL,
    service_name  TEXT NOT NULL,
    description   TEXT,
    group_name    TEXT,
    UNIQUE (tenant_id, service_code)
);

-- Service requests are never deleted.
CREATE TABLE IF NOT EXISTS service_requests (
    request_id      TEXT PRIMARY KEY,
    tenant_id       TEXT NOT NULL REFERENCES tenants(tenant_id),
    service_code    TEXT NOT NULL,
    description     TEXT NOT NULL,
    lat             REAL,
    long            REAL,
    address         TEXT,
    email           TEXT,
    first_name      TEXT,
    last_name       TEXT,
    phone           TEXT,
    status          TEXT NOT NULL DEFAULT 'open',
    status_notes    TEXT,
    idempotency_key TEXT NOT NULL,
    requested_at    TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    UNIQUE (tenant_id, idempotency_key)
);

-- Payment records are the financial audit trail; never deleted.
-- Amounts are decimal text (e.g. '250.00').
CREATE TABLE IF NOT EXISTS payment_records (
    payment_id       TEXT PRIMARY KEY,
    tenant_id        TEXT NOT NULL REFERENCES tenants(tenant_id),
    email            TEXT NOT NULL,
    amount           TEXT NOT NULL,
    currency         TEXT NOT NULL,
    payment_method   TEXT NOT NULL,  -- 'moncash' | 'wire_transfer'
    payment_type     TEXT NOT NULL,
    reference_id     TEXT,
    memo_code        TEXT NOT NULL,
    proof_url        TEXT,
    status           TEXT NOT NULL DEFAULT 'pending_upload',
    quittance_id     TEXT,
    verified_at      TEXT,
    verified_by      TEXT,
    admin_notes      TEXT,
    is_public_ledger INTEGER NOT NULL DEFAULT 0,
    is_public        INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL,
    CHECK (is_public_ledger = 0 OR status = 'verified'),
    CHECK ((quittance_id IS NULL) = (status != 'verified'))
);

CREATE UNIQUE INDEX IF NOT EXISTS payment_quittance_idx
    ON payment_records(tenant_id, quittance_id) WHERE quittance_id IS NOT NULL;

CREATE TABLE IF NOT EXISTS projects (
    project_id     TEXT PRIMARY KEY,
    tenant_id      TEXT NOT NULL REFERENCES tenants(tenant_id),
    code           TEXT NOT NULL,
    title          TEXT NOT NULL,
    description    TEXT,
    target_amount  TEXT NOT NULL,
    current_raised TEXT NOT NULL DEFAULT '0.00',
    created_at     TEXT NOT NULL,
    UNIQUE (tenant_id, code)
);

-- Append-only: no UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS audit_snapshots (
    snapshot_id     TEXT PRIMARY KEY,
    tenant_id       TEXT NOT NULL REFERENCES tenants(tenant_id),
    project_id      TEXT NOT NULL REFERENCES projects(project_id),
    snapshot_total  TEXT NOT NULL,
    new_funds_added TEXT NOT NULL,
    payment_count   INTEGER NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS communal_sections (
    section_id TEXT PRIMARY KEY,
    tenant_id  TEXT NOT NULL REFERENCES tenants(tenant_id),
    name       TEXT NOT NULL,
    code       TEXT NOT NULL,
    population INTEGER,
    area_km2   REAL,
    UNIQUE (tenant_id, code)
);

CREATE TABLE IF NOT EXISTS officials (
    official_id   TEXT PRIMARY KEY,
    tenant_id     TEXT NOT NULL REFERENCES tenants(tenant_id),
    name          TEXT NOT NULL,
    title         TEXT NOT NULL,
    office        TEXT NOT NULL,
    section_id    TEXT REFERENCES communal_sections(section_id),
    email         TEXT,
    phone         TEXT,
    photo_url     TEXT,
    display_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS facilities (
    facility_id TEXT PRIMARY KEY,
    tenant_id   TEXT NOT NULL REFERENCES tenants(tenant_id),
    name        TEXT NOT NULL,
    category    TEXT NOT NULL,
    address     TEXT,
    lat         REAL,
    long        REAL,
    section_id  TEXT REFERENCES communal_sections(section_id),
    phone       TEXT,
    status      TEXT NOT NULL DEFAULT 'operational',
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS handbook_articles (
    article_id TEXT PRIMARY KEY,
    tenant_id  TEXT NOT NULL REFERENCES tenants(tenant_id),
    slug       TEXT NOT NULL,
    title      TEXT NOT NULL,
    category   TEXT,
    body       TEXT NOT NULL,
    published  INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL,
    UNIQUE (tenant_id, slug)
);

CREATE TABLE IF NOT EXISTS facility_suggestions (
    suggestion_id   TEXT PRIMARY KEY,
    tenant_id       TEXT NOT NULL REFERENCES tenants(tenant_id),
    name            TEXT NOT NULL,
    category        TEXT NOT NULL,
    address         TEXT,
    lat             REAL,
    long            REAL,
    submitter_email TEXT,
    status          TEXT NOT NULL DEFAULT 'pending',
    facility_id     TEXT REFERENCES facilities(facility_id),
    created_at      TEXT NOT NULL,
    reviewed_at     TEXT
);

CREATE TABLE IF NOT EXISTS events (
    event_id  TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(tenant_id),
    title     TEXT NOT NULL,
    body      TEXT,
    severity  TEXT NOT NULL,
    starts_at TEXT NOT NULL,
    ends_at   TEXT
);

CREATE TABLE IF NOT EXISTS tax_records (
    record_id      TEXT PRIMARY KEY,
    tenant_id      TEXT NOT NULL REFERENCES tenants(tenant_id),
    parcel_number  TEXT NOT NULL,
    nif            TEXT NOT NULL,
    nif_normalized TEXT NOT NULL,
    owner_name     TEXT NOT NULL,
    address        TEXT,
    assessed_value TEXT NOT NULL,
    amount_due     TEXT NOT NULL,
    fiscal_year    INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS users_tenant_idx        ON users(tenant_id);
CREATE INDEX IF NOT EXISTS services_tenant_idx     ON services(tenant_id);
CREATE INDEX IF NOT EXISTS requests_tenant_idx     ON service_requests(tenant_id);
CREATE INDEX IF NOT EXISTS payments_tenant_idx     ON payment_records(tenant_id);
CREATE INDEX IF NOT EXISTS payments_email_idx      ON payment_records(tenant_id, email);
CREATE INDEX IF NOT EXISTS payments_memo_idx       ON payment_records(tenant_id, memo_code);
CREATE INDEX IF NOT EXISTS projects_tenant_idx     ON projects(tenant_id);
CREATE INDEX IF NOT EXISTS snapshots_tenant_idx    ON audit_snapshots(tenant_id);
CREATE INDEX IF NOT EXISTS snapshots_project_idx   ON audit_snapshots(project_id);
CREATE INDEX IF NOT EXISTS sections_tenant_idx     ON communal_sections(tenant_id);
CREATE INDEX IF NOT EXISTS officials_tenant_idx    ON officials(tenant_id);
CREATE INDEX IF NOT EXISTS facilities_tenant_idx   ON facilities(tenant_id);
CREATE INDEX IF NOT EXISTS articles_tenant_idx     ON handbook_articles(tenant_id);
CREATE INDEX IF NOT EXISTS suggestions_tenant_idx  ON facility_suggestions(tenant_id);
CREATE INDEX IF NOT EXISTS events_tenant_idx       ON events(tenant_id);
CREATE INDEX IF NOT EXISTS tax_records_tenant_idx  ON tax_records(tenant_id);

PRAGMA user_version = 1;
";
