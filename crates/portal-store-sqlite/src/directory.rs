//! Communal sections, officials, facilities, handbook articles and facility
//! suggestions.

use chrono::Utc;
use portal_core::{
  Error as CoreError,
  directory::{
    CommunalSection, Facility, FacilityFilter, FacilityStatus, FacilitySuggestion,
    HandbookArticle, NewCommunalSection, NewFacility, NewFacilitySuggestion, NewHandbookArticle,
    NewOfficial, Official, SuggestionDecision, SuggestionStatus,
  },
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use uuid::Uuid;

use crate::{
  encode::{encode_dt, encode_uuid},
  error::{on_unique, refuse},
  rows::{self, ARTICLE_COLUMNS, FACILITY_COLUMNS, OFFICIAL_COLUMNS, SECTION_COLUMNS, SUGGESTION_COLUMNS},
};

/// A section reference must name a section of the same tenant.
fn ensure_section(
  conn: &Connection,
  tenant_id: Uuid,
  section_id: Option<Uuid>,
) -> tokio_rusqlite::Result<()> {
  let Some(section_id) = section_id else {
    return Ok(());
  };
  let found = conn
    .query_row(
      "SELECT 1 FROM communal_sections WHERE tenant_id = ?1 AND section_id = ?2",
      params![encode_uuid(tenant_id), encode_uuid(section_id)],
      |_| Ok(()),
    )
    .optional()?;
  match found {
    Some(()) => Ok(()),
    None => Err(refuse(CoreError::validation("section_id", "unknown communal section"))),
  }
}

// ─── Sections ────────────────────────────────────────────────────────────────

pub fn create_section(
  conn: &Connection,
  tenant_id: Uuid,
  input: NewCommunalSection,
) -> tokio_rusqlite::Result<CommunalSection> {
  if input.name.trim().is_empty() || input.code.trim().is_empty() {
    return Err(refuse(CoreError::validation("name", "name and code are required")));
  }
  let section = CommunalSection {
    section_id: Uuid::new_v4(),
    tenant_id,
    name:       input.name.trim().to_owned(),
    code:       input.code.trim().to_owned(),
    population: input.population,
    area_km2:   input.area_km2,
  };

  conn
    .execute(
      "INSERT INTO communal_sections (section_id, tenant_id, name, code, population, area_km2)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      params![
        encode_uuid(section.section_id),
        encode_uuid(tenant_id),
        section.name,
        section.code,
        section.population,
        section.area_km2,
      ],
    )
    .map_err(on_unique("section code"))?;

  Ok(section)
}

pub fn list_sections(
  conn: &Connection,
  tenant_id: Uuid,
) -> tokio_rusqlite::Result<Vec<CommunalSection>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {SECTION_COLUMNS} FROM communal_sections WHERE tenant_id = ?1 ORDER BY code"
  ))?;
  let rows = stmt
    .query_map(params![encode_uuid(tenant_id)], rows::section)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

// ─── Officials ───────────────────────────────────────────────────────────────

pub fn create_official(
  conn: &Connection,
  tenant_id: Uuid,
  input: NewOfficial,
) -> tokio_rusqlite::Result<Official> {
  if input.name.trim().is_empty() {
    return Err(refuse(CoreError::validation("name", "must not be empty")));
  }
  ensure_section(conn, tenant_id, input.section_id)?;
  let official = Official {
    official_id:   Uuid::new_v4(),
    tenant_id,
    name:          input.name,
    title:         input.title,
    office:        input.office,
    section_id:    input.section_id,
    email:         input.email,
    phone:         input.phone,
    photo_url:     input.photo_url,
    display_order: input.display_order,
  };

  conn.execute(
    "INSERT INTO officials (
       official_id, tenant_id, name, title, office, section_id,
       email, phone, photo_url, display_order
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    params![
      encode_uuid(official.official_id),
      encode_uuid(tenant_id),
      official.name,
      official.title,
      official.office.to_string(),
      official.section_id.map(encode_uuid),
      official.email,
      official.phone,
      official.photo_url,
      official.display_order,
    ],
  )?;

  Ok(official)
}

pub fn list_officials(conn: &Connection, tenant_id: Uuid) -> tokio_rusqlite::Result<Vec<Official>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {OFFICIAL_COLUMNS} FROM officials
     WHERE tenant_id = ?1
     ORDER BY display_order, name"
  ))?;
  let rows = stmt
    .query_map(params![encode_uuid(tenant_id)], rows::official)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

// ─── Facilities ──────────────────────────────────────────────────────────────

pub fn create_facility(
  conn: &Connection,
  tenant_id: Uuid,
  input: NewFacility,
) -> tokio_rusqlite::Result<Facility> {
  if input.name.trim().is_empty() || input.category.trim().is_empty() {
    return Err(refuse(CoreError::validation("name", "name and category are required")));
  }
  ensure_section(conn, tenant_id, input.section_id)?;
  let facility = Facility {
    facility_id: Uuid::new_v4(),
    tenant_id,
    name:        input.name,
    category:    input.category.trim().to_ascii_lowercase(),
    address:     input.address,
    lat:         input.lat,
    long:        input.long,
    section_id:  input.section_id,
    phone:       input.phone,
    status:      input.status.unwrap_or(FacilityStatus::Operational),
    updated_at:  Utc::now(),
  };
  insert_facility(conn, &facility)?;
  Ok(facility)
}

fn insert_facility(conn: &Connection, facility: &Facility) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO facilities (
       facility_id, tenant_id, name, category, address, lat, long,
       section_id, phone, status, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    params![
      encode_uuid(facility.facility_id),
      encode_uuid(facility.tenant_id),
      facility.name,
      facility.category,
      facility.address,
      facility.lat,
      facility.long,
      facility.section_id.map(encode_uuid),
      facility.phone,
      facility.status.to_string(),
      encode_dt(facility.updated_at),
    ],
  )?;
  Ok(())
}

pub fn list_facilities(
  conn: &Connection,
  tenant_id: Uuid,
  filter: FacilityFilter,
) -> tokio_rusqlite::Result<Vec<Facility>> {
  let status = filter.status.map(|s| s.to_string());
  let category = filter.category.map(|c| c.trim().to_ascii_lowercase());
  let mut stmt = conn.prepare(&format!(
    "SELECT {FACILITY_COLUMNS} FROM facilities
     WHERE tenant_id = ?1
       AND (?2 IS NULL OR status = ?2)
       AND (?3 IS NULL OR category = ?3)
     ORDER BY name"
  ))?;
  let rows = stmt
    .query_map(params![encode_uuid(tenant_id), status, category], rows::facility)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn get_facility(
  conn: &Connection,
  tenant_id: Uuid,
  facility_id: Uuid,
) -> rusqlite::Result<Option<Facility>> {
  conn
    .query_row(
      &format!(
        "SELECT {FACILITY_COLUMNS} FROM facilities
         WHERE tenant_id = ?1 AND facility_id = ?2"
      ),
      params![encode_uuid(tenant_id), encode_uuid(facility_id)],
      rows::facility,
    )
    .optional()
}

pub fn set_facility_status(
  conn: &Connection,
  tenant_id: Uuid,
  facility_id: Uuid,
  status: FacilityStatus,
) -> tokio_rusqlite::Result<Facility> {
  let changed = conn.execute(
    "UPDATE facilities SET status = ?3, updated_at = ?4
     WHERE tenant_id = ?1 AND facility_id = ?2",
    params![
      encode_uuid(tenant_id),
      encode_uuid(facility_id),
      status.to_string(),
      encode_dt(Utc::now()),
    ],
  )?;
  if changed == 0 {
    return Err(refuse(CoreError::RecordNotFound));
  }
  get_facility(conn, tenant_id, facility_id)?.ok_or_else(|| refuse(CoreError::RecordNotFound))
}

// ─── Handbook ────────────────────────────────────────────────────────────────

pub fn create_article(
  conn: &Connection,
  tenant_id: Uuid,
  input: NewHandbookArticle,
) -> tokio_rusqlite::Result<HandbookArticle> {
  let input = input.validated().map_err(refuse)?;
  let article = HandbookArticle {
    article_id: Uuid::new_v4(),
    tenant_id,
    slug:       input.slug,
    title:      input.title,
    category:   input.category,
    body:       input.body,
    published:  input.published,
    updated_at: Utc::now(),
  };

  conn
    .execute(
      "INSERT INTO handbook_articles (
         article_id, tenant_id, slug, title, category, body, published, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
      params![
        encode_uuid(article.article_id),
        encode_uuid(tenant_id),
        article.slug,
        article.title,
        article.category,
        article.body,
        article.published,
        encode_dt(article.updated_at),
      ],
    )
    .map_err(on_unique("article slug"))?;

  Ok(article)
}

pub fn list_articles(
  conn: &Connection,
  tenant_id: Uuid,
  include_unpublished: bool,
) -> tokio_rusqlite::Result<Vec<HandbookArticle>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {ARTICLE_COLUMNS} FROM handbook_articles
     WHERE tenant_id = ?1 AND (?2 OR published = 1)
     ORDER BY category, title"
  ))?;
  let rows = stmt
    .query_map(params![encode_uuid(tenant_id), include_unpublished], rows::article)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Published articles only.
pub fn article_by_slug(
  conn: &Connection,
  tenant_id: Uuid,
  slug: String,
) -> tokio_rusqlite::Result<Option<HandbookArticle>> {
  Ok(
    conn
      .query_row(
        &format!(
          "SELECT {ARTICLE_COLUMNS} FROM handbook_articles
           WHERE tenant_id = ?1 AND slug = ?2 AND published = 1"
        ),
        params![encode_uuid(tenant_id), slug.trim().to_ascii_lowercase()],
        rows::article,
      )
      .optional()?,
  )
}

// ─── Suggestions ─────────────────────────────────────────────────────────────

pub fn submit_suggestion(
  conn: &Connection,
  tenant_id: Uuid,
  input: NewFacilitySuggestion,
) -> tokio_rusqlite::Result<FacilitySuggestion> {
  let input = input.validated().map_err(refuse)?;
  let suggestion = FacilitySuggestion {
    suggestion_id:   Uuid::new_v4(),
    tenant_id,
    name:            input.name,
    category:        input.category.trim().to_ascii_lowercase(),
    address:         input.address,
    lat:             input.lat,
    long:            input.long,
    submitter_email: input.submitter_email.map(|e| e.trim().to_ascii_lowercase()),
    status:          SuggestionStatus::Pending,
    facility_id:     None,
    created_at:      Utc::now(),
    reviewed_at:     None,
  };

  conn.execute(
    "INSERT INTO facility_suggestions (
       suggestion_id, tenant_id, name, category, address, lat, long,
       submitter_email, status, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    params![
      encode_uuid(suggestion.suggestion_id),
      encode_uuid(tenant_id),
      suggestion.name,
      suggestion.category,
      suggestion.address,
      suggestion.lat,
      suggestion.long,
      suggestion.submitter_email,
      suggestion.status.to_string(),
      encode_dt(suggestion.created_at),
    ],
  )?;

  Ok(suggestion)
}

pub fn list_suggestions(
  conn: &Connection,
  tenant_id: Uuid,
  status: Option<SuggestionStatus>,
) -> tokio_rusqlite::Result<Vec<FacilitySuggestion>> {
  let status = status.map(|s| s.to_string());
  let mut stmt = conn.prepare(&format!(
    "SELECT {SUGGESTION_COLUMNS} FROM facility_suggestions
     WHERE tenant_id = ?1 AND (?2 IS NULL OR status = ?2)
     ORDER BY created_at DESC, rowid DESC"
  ))?;
  let rows = stmt
    .query_map(params![encode_uuid(tenant_id), status], rows::suggestion)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn get_suggestion(
  conn: &Connection,
  tenant_id: Uuid,
  suggestion_id: Uuid,
) -> rusqlite::Result<Option<FacilitySuggestion>> {
  conn
    .query_row(
      &format!(
        "SELECT {SUGGESTION_COLUMNS} FROM facility_suggestions
         WHERE tenant_id = ?1 AND suggestion_id = ?2"
      ),
      params![encode_uuid(tenant_id), encode_uuid(suggestion_id)],
      rows::suggestion,
    )
    .optional()
}

pub fn review_suggestion(
  conn: &mut Connection,
  tenant_id: Uuid,
  suggestion_id: Uuid,
  decision: SuggestionDecision,
) -> tokio_rusqlite::Result<FacilitySuggestion> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let current = get_suggestion(&tx, tenant_id, suggestion_id)?
    .ok_or_else(|| refuse(CoreError::RecordNotFound))?;

  let (status, facility_id) = match decision {
    SuggestionDecision::Approve => (SuggestionStatus::Approved, Some(Uuid::new_v4())),
    SuggestionDecision::Reject => (SuggestionStatus::Rejected, None),
  };
  if current.status != SuggestionStatus::Pending {
    return Err(refuse(CoreError::transition(current.status, status)));
  }

  let now = Utc::now();
  if let Some(facility_id) = facility_id {
    insert_facility(&tx, &Facility {
      facility_id,
      tenant_id,
      name: current.name.clone(),
      category: current.category.clone(),
      address: current.address.clone(),
      lat: current.lat,
      long: current.long,
      section_id: None,
      phone: None,
      status: FacilityStatus::Operational,
      updated_at: now,
    })?;
  }

  tx.execute(
    "UPDATE facility_suggestions SET status = ?3, facility_id = ?4, reviewed_at = ?5
     WHERE tenant_id = ?1 AND suggestion_id = ?2",
    params![
      encode_uuid(tenant_id),
      encode_uuid(suggestion_id),
      status.to_string(),
      facility_id.map(encode_uuid),
      encode_dt(now),
    ],
  )?;
  tx.commit()?;

  Ok(FacilitySuggestion {
    status,
    facility_id,
    reviewed_at: Some(now),
    ..current
  })
}
