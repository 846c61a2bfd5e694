//! Column lists and row mappers, one pair per table.
//!
//! Each `*_COLUMNS` constant is the exact select list its mapper expects, so
//! queries are written as `SELECT {COLUMNS} FROM ...`.

use portal_core::{
  alert::Event,
  directory::{CommunalSection, Facility, FacilitySuggestion, HandbookArticle, Official},
  payment::{MemoCode, PaymentRecord, QuittanceId},
  project::{AuditSnapshot, Project},
  request::{Contact, Location, Service, ServiceRequest},
  session::User,
  tax::TaxRecord,
  tenant::{Branding, MayorProfile, PaymentRouting, Tenant},
};
use rusqlite::Row;

use crate::encode::{
  get_amount, get_bool, get_dt, get_opt_dt, get_opt_uuid, get_parsed, get_uuid,
};

// ─── Tenants and users ───────────────────────────────────────────────────────

pub const TENANT_COLUMNS: &str = "tenant_id, subdomain, name, logo_url, primary_color, \
  bank_name, bank_account_name, bank_account_number, moncash_number, \
  mayor_name, mayor_photo_url, mayor_message, created_at";

pub fn tenant(row: &Row<'_>) -> rusqlite::Result<Tenant> {
  Ok(Tenant {
    tenant_id:  get_uuid(row, 0)?,
    subdomain:  row.get(1)?,
    name:       row.get(2)?,
    branding:   Branding {
      logo_url:      row.get(3)?,
      primary_color: row.get(4)?,
    },
    routing:    PaymentRouting {
      bank_name:           row.get(5)?,
      bank_account_name:   row.get(6)?,
      bank_account_number: row.get(7)?,
      moncash_number:      row.get(8)?,
    },
    mayor:      MayorProfile {
      mayor_name:      row.get(9)?,
      mayor_photo_url: row.get(10)?,
      mayor_message:   row.get(11)?,
    },
    created_at: get_dt(row, 12)?,
  })
}

pub const USER_COLUMNS: &str =
  "user_id, tenant_id, email, name, role, section_id, password_hash";

pub fn user(row: &Row<'_>) -> rusqlite::Result<User> {
  Ok(User {
    user_id:       get_uuid(row, 0)?,
    tenant_id:     get_uuid(row, 1)?,
    email:         row.get(2)?,
    name:          row.get(3)?,
    role:          get_parsed(row, 4)?,
    section_id:    get_opt_uuid(row, 5)?,
    password_hash: row.get(6)?,
  })
}

// ─── Payments ────────────────────────────────────────────────────────────────

pub const PAYMENT_COLUMNS: &str = "payment_id, tenant_id, email, amount, currency, \
  payment_method, payment_type, reference_id, memo_code, proof_url, status, \
  quittance_id, verified_at, verified_by, admin_notes, is_public_ledger, \
  is_public, created_at";

pub fn payment(row: &Row<'_>) -> rusqlite::Result<PaymentRecord> {
  Ok(PaymentRecord {
    payment_id:       get_uuid(row, 0)?,
    tenant_id:        get_uuid(row, 1)?,
    email:            row.get(2)?,
    amount:           get_amount(row, 3)?,
    currency:         get_parsed(row, 4)?,
    method:           get_parsed(row, 5)?,
    payment_type:     row.get(6)?,
    reference_id:     row.get(7)?,
    memo_code:        MemoCode::normalized(&row.get::<_, String>(8)?),
    proof_url:        row.get(9)?,
    status:           get_parsed(row, 10)?,
    quittance_id:     row.get::<_, Option<String>>(11)?.map(QuittanceId::from_stored),
    verified_at:      get_opt_dt(row, 12)?,
    verified_by:      get_opt_uuid(row, 13)?,
    admin_notes:      row.get(14)?,
    is_public_ledger: get_bool(row, 15)?,
    is_public:        get_bool(row, 16)?,
    created_at:       get_dt(row, 17)?,
  })
}

// ─── Projects and snapshots ──────────────────────────────────────────────────

pub const PROJECT_COLUMNS: &str = "project_id, tenant_id, code, title, description, \
  target_amount, current_raised, created_at";

pub fn project(row: &Row<'_>) -> rusqlite::Result<Project> {
  Ok(Project {
    project_id:     get_uuid(row, 0)?,
    tenant_id:      get_uuid(row, 1)?,
    code:           row.get(2)?,
    title:          row.get(3)?,
    description:    row.get(4)?,
    target_amount:  get_amount(row, 5)?,
    current_raised: get_amount(row, 6)?,
    created_at:     get_dt(row, 7)?,
  })
}

pub const SNAPSHOT_COLUMNS: &str = "snapshot_id, tenant_id, project_id, snapshot_total, \
  new_funds_added, payment_count, created_at";

pub fn snapshot(row: &Row<'_>) -> rusqlite::Result<AuditSnapshot> {
  Ok(AuditSnapshot {
    snapshot_id:     get_uuid(row, 0)?,
    tenant_id:       get_uuid(row, 1)?,
    project_id:      get_uuid(row, 2)?,
    snapshot_total:  get_amount(row, 3)?,
    new_funds_added: get_amount(row, 4)?,
    payment_count:   row.get(5)?,
    created_at:      get_dt(row, 6)?,
  })
}

// ─── Services and requests ───────────────────────────────────────────────────

pub const SERVICE_COLUMNS: &str =
  "service_id, tenant_id, service_code, service_name, description, group_name";

pub fn service(row: &Row<'_>) -> rusqlite::Result<Service> {
  Ok(Service {
    service_id:   get_uuid(row, 0)?,
    tenant_id:    get_uuid(row, 1)?,
    service_code: row.get(2)?,
    service_name: row.get(3)?,
    description:  row.get(4)?,
    group:        row.get(5)?,
  })
}

pub const REQUEST_COLUMNS: &str = "request_id, tenant_id, service_code, description, \
  lat, long, address, email, first_name, last_name, phone, status, status_notes, \
  idempotency_key, requested_at, updated_at";

pub fn service_request(row: &Row<'_>) -> rusqlite::Result<ServiceRequest> {
  Ok(ServiceRequest {
    request_id:      get_uuid(row, 0)?,
    tenant_id:       get_uuid(row, 1)?,
    service_code:    row.get(2)?,
    description:     row.get(3)?,
    location:        Location {
      lat:     row.get(4)?,
      long:    row.get(5)?,
      address: row.get(6)?,
    },
    contact:         Contact {
      email:      row.get(7)?,
      first_name: row.get(8)?,
      last_name:  row.get(9)?,
      phone:      row.get(10)?,
    },
    status:          get_parsed(row, 11)?,
    status_notes:    row.get(12)?,
    idempotency_key: row.get(13)?,
    requested_at:    get_dt(row, 14)?,
    updated_at:      get_dt(row, 15)?,
  })
}

// ─── Directory ───────────────────────────────────────────────────────────────

pub const SECTION_COLUMNS: &str = "section_id, tenant_id, name, code, population, area_km2";

pub fn section(row: &Row<'_>) -> rusqlite::Result<CommunalSection> {
  Ok(CommunalSection {
    section_id: get_uuid(row, 0)?,
    tenant_id:  get_uuid(row, 1)?,
    name:       row.get(2)?,
    code:       row.get(3)?,
    population: row.get(4)?,
    area_km2:   row.get(5)?,
  })
}

pub const OFFICIAL_COLUMNS: &str = "official_id, tenant_id, name, title, office, \
  section_id, email, phone, photo_url, display_order";

pub fn official(row: &Row<'_>) -> rusqlite::Result<Official> {
  Ok(Official {
    official_id:   get_uuid(row, 0)?,
    tenant_id:     get_uuid(row, 1)?,
    name:          row.get(2)?,
    title:         row.get(3)?,
    office:        get_parsed(row, 4)?,
    section_id:    get_opt_uuid(row, 5)?,
    email:         row.get(6)?,
    phone:         row.get(7)?,
    photo_url:     row.get(8)?,
    display_order: row.get(9)?,
  })
}

pub const FACILITY_COLUMNS: &str = "facility_id, tenant_id, name, category, address, \
  lat, long, section_id, phone, status, updated_at";

pub fn facility(row: &Row<'_>) -> rusqlite::Result<Facility> {
  Ok(Facility {
    facility_id: get_uuid(row, 0)?,
    tenant_id:   get_uuid(row, 1)?,
    name:        row.get(2)?,
    category:    row.get(3)?,
    address:     row.get(4)?,
    lat:         row.get(5)?,
    long:        row.get(6)?,
    section_id:  get_opt_uuid(row, 7)?,
    phone:       row.get(8)?,
    status:      get_parsed(row, 9)?,
    updated_at:  get_dt(row, 10)?,
  })
}

pub const ARTICLE_COLUMNS: &str =
  "article_id, tenant_id, slug, title, category, body, published, updated_at";

pub fn article(row: &Row<'_>) -> rusqlite::Result<HandbookArticle> {
  Ok(HandbookArticle {
    article_id: get_uuid(row, 0)?,
    tenant_id:  get_uuid(row, 1)?,
    slug:       row.get(2)?,
    title:      row.get(3)?,
    category:   row.get(4)?,
    body:       row.get(5)?,
    published:  get_bool(row, 6)?,
    updated_at: get_dt(row, 7)?,
  })
}

pub const SUGGESTION_COLUMNS: &str = "suggestion_id, tenant_id, name, category, address, \
  lat, long, submitter_email, status, facility_id, created_at, reviewed_at";

pub fn suggestion(row: &Row<'_>) -> rusqlite::Result<FacilitySuggestion> {
  Ok(FacilitySuggestion {
    suggestion_id:   get_uuid(row, 0)?,
    tenant_id:       get_uuid(row, 1)?,
    name:            row.get(2)?,
    category:        row.get(3)?,
    address:         row.get(4)?,
    lat:             row.get(5)?,
    long:            row.get(6)?,
    submitter_email: row.get(7)?,
    status:          get_parsed(row, 8)?,
    facility_id:     get_opt_uuid(row, 9)?,
    created_at:      get_dt(row, 10)?,
    reviewed_at:     get_opt_dt(row, 11)?,
  })
}

// ─── Events and tax roll ─────────────────────────────────────────────────────

pub const EVENT_COLUMNS: &str =
  "event_id, tenant_id, title, body, severity, starts_at, ends_at";

pub fn event(row: &Row<'_>) -> rusqlite::Result<Event> {
  Ok(Event {
    event_id:  get_uuid(row, 0)?,
    tenant_id: get_uuid(row, 1)?,
    title:     row.get(2)?,
    body:      row.get(3)?,
    severity:  get_parsed(row, 4)?,
    starts_at: get_dt(row, 5)?,
    ends_at:   get_opt_dt(row, 6)?,
  })
}

pub const TAX_COLUMNS: &str = "record_id, parcel_number, nif, owner_name, address, \
  assessed_value, amount_due, fiscal_year";

pub fn tax_record(row: &Row<'_>) -> rusqlite::Result<TaxRecord> {
  Ok(TaxRecord {
    record_id:      get_uuid(row, 0)?,
    parcel_number:  row.get(1)?,
    nif:            row.get(2)?,
    owner_name:     row.get(3)?,
    address:        row.get(4)?,
    assessed_value: get_amount(row, 5)?,
    amount_due:     get_amount(row, 6)?,
    fiscal_year:    row.get(7)?,
  })
}
