//! [`SqliteStore`]: the SQLite implementation of [`PortalStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use portal_core::{
  alert::{Event, NewEvent},
  directory::{
    CommunalSection, Facility, FacilityFilter, FacilityStatus, FacilitySuggestion,
    HandbookArticle, NewCommunalSection, NewFacility, NewFacilitySuggestion,
    NewHandbookArticle, NewOfficial, Official, SuggestionDecision, SuggestionStatus,
  },
  payment::{NewPayment, PaymentRecord, PaymentSearch, PaymentStatus},
  project::{AuditSnapshot, NewProject, Project, PublicLedger, PublishOutcome},
  request::{NewService, NewServiceRequest, RequestStatus, Service, ServiceRequest, Submission},
  session::{NewUser, User},
  store::PortalStore,
  tax::{NewTaxRecord, TaxRecord, TaxSearchKind},
  tenant::{NewTenant, Tenant},
};
use uuid::Uuid;

use crate::{
  Error, Result, audit, directory, events, payments, requests, schema::SCHEMA, tax, tenants,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A portal store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
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

  /// Open an in-memory store, useful for tests and local mode.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open the store named by a `DATABASE_URL`.
  ///
  /// Accepts `sqlite::memory:`, `sqlite://<path>`, `sqlite:<path>` or a bare
  /// filesystem path.
  pub async fn connect(database_url: &str) -> Result<Self> {
    let url = database_url.trim();
    if url.is_empty() {
      return Err(Error::DatabaseUrl(database_url.to_owned()));
    }
    if url == "sqlite::memory:" || url == ":memory:" {
      return Self::open_in_memory().await;
    }
    let path = url
      .strip_prefix("sqlite://")
      .or_else(|| url.strip_prefix("sqlite:"))
      .unwrap_or(url);
    if path.is_empty() || path.contains("://") {
      return Err(Error::DatabaseUrl(database_url.to_owned()));
    }
    Self::open(path).await
  }

  /// Flush and close the underlying connection.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
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

// ─── PortalStore impl ────────────────────────────────────────────────────────

impl PortalStore for SqliteStore {
  type Error = Error;

  // ── Tenants and users ─────────────────────────────────────────────────

  async fn create_tenant(&self, input: NewTenant) -> Result<Tenant> {
    Ok(self.conn.call(move |conn| tenants::create_tenant(conn, input)).await?)
  }

  async fn tenant_by_subdomain(&self, subdomain: String) -> Result<Option<Tenant>> {
    Ok(self.conn.call(move |conn| tenants::by_subdomain(conn, subdomain)).await?)
  }

  async fn create_user(&self, tenant_id: Uuid, input: NewUser) -> Result<User> {
    Ok(
      self
        .conn
        .call(move |conn| tenants::create_user(conn, tenant_id, input))
        .await?,
    )
  }

  async fn user_by_email(&self, tenant_id: Uuid, email: String) -> Result<Option<User>> {
    Ok(
      self
        .conn
        .call(move |conn| tenants::user_by_email(conn, tenant_id, email))
        .await?,
    )
  }

  // ── Payments ──────────────────────────────────────────────────────────

  async fn create_payment(&self, tenant_id: Uuid, input: NewPayment) -> Result<PaymentRecord> {
    Ok(
      self
        .conn
        .call(move |conn| payments::insert(conn, tenant_id, input))
        .await?,
    )
  }

  async fn get_payment(&self, tenant_id: Uuid, payment_id: Uuid) -> Result<Option<PaymentRecord>> {
    Ok(
      self
        .conn
        .call(move |conn| payments::get(conn, tenant_id, payment_id))
        .await?,
    )
  }

  async fn upload_proof(
    &self,
    tenant_id: Uuid,
    payment_id: Uuid,
    proof_url: String,
  ) -> Result<PaymentRecord> {
    Ok(
      self
        .conn
        .call(move |conn| payments::upload_proof(conn, tenant_id, payment_id, proof_url))
        .await?,
    )
  }

  async fn search_payments(
    &self,
    tenant_id: Uuid,
    search: PaymentSearch,
  ) -> Result<Vec<PaymentRecord>> {
    Ok(
      self
        .conn
        .call(move |conn| payments::search(conn, tenant_id, search))
        .await?,
    )
  }

  async fn list_payments(
    &self,
    tenant_id: Uuid,
    status: Option<PaymentStatus>,
  ) -> Result<Vec<PaymentRecord>> {
    Ok(
      self
        .conn
        .call(move |conn| payments::list(conn, tenant_id, status))
        .await?,
    )
  }

  async fn approve_payment(
    &self,
    tenant_id: Uuid,
    payment_id: Uuid,
    verified_by: Uuid,
  ) -> Result<PaymentRecord> {
    Ok(
      self
        .conn
        .call(move |conn| payments::approve(conn, tenant_id, payment_id, verified_by))
        .await?,
    )
  }

  async fn reject_payment(
    &self,
    tenant_id: Uuid,
    payment_id: Uuid,
    reason: String,
  ) -> Result<PaymentRecord> {
    Ok(
      self
        .conn
        .call(move |conn| payments::reject(conn, tenant_id, payment_id, reason))
        .await?,
    )
  }

  // ── Projects and audits ───────────────────────────────────────────────

  async fn create_project(&self, tenant_id: Uuid, input: NewProject) -> Result<Project> {
    Ok(
      self
        .conn
        .call(move |conn| audit::create_project(conn, tenant_id, input))
        .await?,
    )
  }

  async fn get_project(&self, tenant_id: Uuid, project_id: Uuid) -> Result<Option<Project>> {
    Ok(
      self
        .conn
        .call(move |conn| audit::get_project(conn, tenant_id, project_id))
        .await?,
    )
  }

  async fn list_projects(&self, tenant_id: Uuid) -> Result<Vec<Project>> {
    Ok(self.conn.call(move |conn| audit::list_projects(conn, tenant_id)).await?)
  }

  async fn publish_audit(&self, tenant_id: Uuid, project_id: Uuid) -> Result<PublishOutcome> {
    Ok(
      self
        .conn
        .call(move |conn| audit::publish(conn, tenant_id, project_id))
        .await?,
    )
  }

  async fn list_snapshots(&self, tenant_id: Uuid, project_id: Uuid) -> Result<Vec<AuditSnapshot>> {
    Ok(
      self
        .conn
        .call(move |conn| audit::list_snapshots(conn, tenant_id, project_id))
        .await?,
    )
  }

  async fn public_ledger(&self, tenant_id: Uuid) -> Result<PublicLedger> {
    Ok(self.conn.call(move |conn| audit::public_ledger(conn, tenant_id)).await?)
  }

  // ── Services and service requests ─────────────────────────────────────

  async fn create_service(&self, tenant_id: Uuid, input: NewService) -> Result<Service> {
    Ok(
      self
        .conn
        .call(move |conn| requests::create_service(conn, tenant_id, input))
        .await?,
    )
  }

  async fn list_services(&self, tenant_id: Uuid) -> Result<Vec<Service>> {
    Ok(self.conn.call(move |conn| requests::list_services(conn, tenant_id)).await?)
  }

  async fn submit_service_request(
    &self,
    tenant_id: Uuid,
    input: NewServiceRequest,
  ) -> Result<Submission> {
    Ok(
      self
        .conn
        .call(move |conn| requests::submit(conn, tenant_id, input))
        .await?,
    )
  }

  async fn get_service_request(
    &self,
    tenant_id: Uuid,
    request_id: Uuid,
  ) -> Result<Option<ServiceRequest>> {
    Ok(
      self
        .conn
        .call(move |conn| requests::get(conn, tenant_id, request_id))
        .await?,
    )
  }

  async fn list_service_requests(
    &self,
    tenant_id: Uuid,
    status: Option<RequestStatus>,
  ) -> Result<Vec<ServiceRequest>> {
    Ok(
      self
        .conn
        .call(move |conn| requests::list(conn, tenant_id, status))
        .await?,
    )
  }

  async fn update_service_request_status(
    &self,
    tenant_id: Uuid,
    request_id: Uuid,
    status: RequestStatus,
    notes: Option<String>,
  ) -> Result<ServiceRequest> {
    Ok(
      self
        .conn
        .call(move |conn| requests::update_status(conn, tenant_id, request_id, status, notes))
        .await?,
    )
  }

  // ── Directory ─────────────────────────────────────────────────────────

  async fn create_section(
    &self,
    tenant_id: Uuid,
    input: NewCommunalSection,
  ) -> Result<CommunalSection> {
    Ok(
      self
        .conn
        .call(move |conn| directory::create_section(conn, tenant_id, input))
        .await?,
    )
  }

  async fn list_sections(&self, tenant_id: Uuid) -> Result<Vec<CommunalSection>> {
    Ok(self.conn.call(move |conn| directory::list_sections(conn, tenant_id)).await?)
  }

  async fn create_official(&self, tenant_id: Uuid, input: NewOfficial) -> Result<Official> {
    Ok(
      self
        .conn
        .call(move |conn| directory::create_official(conn, tenant_id, input))
        .await?,
    )
  }

  async fn list_officials(&self, tenant_id: Uuid) -> Result<Vec<Official>> {
    Ok(self.conn.call(move |conn| directory::list_officials(conn, tenant_id)).await?)
  }

  async fn create_facility(&self, tenant_id: Uuid, input: NewFacility) -> Result<Facility> {
    Ok(
      self
        .conn
        .call(move |conn| directory::create_facility(conn, tenant_id, input))
        .await?,
    )
  }

  async fn list_facilities(&self, tenant_id: Uuid, filter: FacilityFilter) -> Result<Vec<Facility>> {
    Ok(
      self
        .conn
        .call(move |conn| directory::list_facilities(conn, tenant_id, filter))
        .await?,
    )
  }

  async fn set_facility_status(
    &self,
    tenant_id: Uuid,
    facility_id: Uuid,
    status: FacilityStatus,
  ) -> Result<Facility> {
    Ok(
      self
        .conn
        .call(move |conn| directory::set_facility_status(conn, tenant_id, facility_id, status))
        .await?,
    )
  }

  async fn create_article(
    &self,
    tenant_id: Uuid,
    input: NewHandbookArticle,
  ) -> Result<HandbookArticle> {
    Ok(
      self
        .conn
        .call(move |conn| directory::create_article(conn, tenant_id, input))
        .await?,
    )
  }

  async fn list_articles(
    &self,
    tenant_id: Uuid,
    include_unpublished: bool,
  ) -> Result<Vec<HandbookArticle>> {
    Ok(
      self
        .conn
        .call(move |conn| directory::list_articles(conn, tenant_id, include_unpublished))
        .await?,
    )
  }

  async fn article_by_slug(&self, tenant_id: Uuid, slug: String) -> Result<Option<HandbookArticle>> {
    Ok(
      self
        .conn
        .call(move |conn| directory::article_by_slug(conn, tenant_id, slug))
        .await?,
    )
  }

  async fn submit_suggestion(
    &self,
    tenant_id: Uuid,
    input: NewFacilitySuggestion,
  ) -> Result<FacilitySuggestion> {
    Ok(
      self
        .conn
        .call(move |conn| directory::submit_suggestion(conn, tenant_id, input))
        .await?,
    )
  }

  async fn list_suggestions(
    &self,
    tenant_id: Uuid,
    status: Option<SuggestionStatus>,
  ) -> Result<Vec<FacilitySuggestion>> {
    Ok(
      self
        .conn
        .call(move |conn| directory::list_suggestions(conn, tenant_id, status))
        .await?,
    )
  }

  async fn review_suggestion(
    &self,
    tenant_id: Uuid,
    suggestion_id: Uuid,
    decision: SuggestionDecision,
  ) -> Result<FacilitySuggestion> {
    Ok(
      self
        .conn
        .call(move |conn| directory::review_suggestion(conn, tenant_id, suggestion_id, decision))
        .await?,
    )
  }

  // ── Tax roll ──────────────────────────────────────────────────────────

  async fn add_tax_record(&self, tenant_id: Uuid, input: NewTaxRecord) -> Result<TaxRecord> {
    Ok(self.conn.call(move |conn| tax::add(conn, tenant_id, input)).await?)
  }

  async fn tax_lookup(
    &self,
    tenant_id: Uuid,
    kind: TaxSearchKind,
    query: String,
  ) -> Result<Vec<TaxRecord>> {
    Ok(
      self
        .conn
        .call(move |conn| tax::lookup(conn, tenant_id, kind, query))
        .await?,
    )
  }

  // ── Events ────────────────────────────────────────────────────────────

  async fn create_event(&self, tenant_id: Uuid, input: NewEvent) -> Result<Event> {
    Ok(self.conn.call(move |conn| events::create(conn, tenant_id, input)).await?)
  }

  async fn active_alert(&self, tenant_id: Uuid, now: DateTime<Utc>) -> Result<Option<Event>> {
    Ok(
      self
        .conn
        .call(move |conn| events::active_alert(conn, tenant_id, now))
        .await?,
    )
  }
}
