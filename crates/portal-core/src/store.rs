//! The `PortalStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `portal-store-sqlite`).
//! Higher layers (`portal-api`, `portal-server`) depend on this abstraction,
//! not on any concrete backend.
//!
//! Every method that touches tenant data takes the `tenant_id` as its first
//! argument. A record that exists under another tenant is reported exactly
//! like a missing one.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
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
  tax::{NewTaxRecord, TaxRecord, TaxSearchKind},
  tenant::{NewTenant, Tenant},
};

/// Lets callers recover a domain refusal from a backend error.
pub trait DomainError {
  fn domain(&self) -> Option<&crate::Error>;
}

/// Abstraction over a portal storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PortalStore: Send + Sync {
  type Error: std::error::Error + DomainError + Send + Sync + 'static;

  // ── Tenants and users ─────────────────────────────────────────────────

  fn create_tenant(
    &self,
    input: NewTenant,
  ) -> impl Future<Output = Result<Tenant, Self::Error>> + Send + '_;

  fn tenant_by_subdomain(
    &self,
    subdomain: String,
  ) -> impl Future<Output = Result<Option<Tenant>, Self::Error>> + Send + '_;

  fn create_user(
    &self,
    tenant_id: Uuid,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Emails compare case-insensitively.
  fn user_by_email(
    &self,
    tenant_id: Uuid,
    email: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Payments ──────────────────────────────────────────────────────────

  /// Insert a record in `pending_upload`.
  fn create_payment(
    &self,
    tenant_id: Uuid,
    input: NewPayment,
  ) -> impl Future<Output = Result<PaymentRecord, Self::Error>> + Send + '_;

  fn get_payment(
    &self,
    tenant_id: Uuid,
    payment_id: Uuid,
  ) -> impl Future<Output = Result<Option<PaymentRecord>, Self::Error>> + Send + '_;

  /// Attach a proof URL and move `pending_upload → pending_review`.
  fn upload_proof(
    &self,
    tenant_id: Uuid,
    payment_id: Uuid,
    proof_url: String,
  ) -> impl Future<Output = Result<PaymentRecord, Self::Error>> + Send + '_;

  /// Exact email or memo match, newest first.
  fn search_payments(
    &self,
    tenant_id: Uuid,
    search: PaymentSearch,
  ) -> impl Future<Output = Result<Vec<PaymentRecord>, Self::Error>> + Send + '_;

  fn list_payments(
    &self,
    tenant_id: Uuid,
    status: Option<PaymentStatus>,
  ) -> impl Future<Output = Result<Vec<PaymentRecord>, Self::Error>> + Send + '_;

  /// Move `pending_review → verified`, assigning a fresh quittance ID.
  ///
  /// Fails with `RecordNotFound` for missing or foreign records and with
  /// `AlreadyVerified` if the record is verified; the existing quittance is
  /// left untouched.
  fn approve_payment(
    &self,
    tenant_id: Uuid,
    payment_id: Uuid,
    verified_by: Uuid,
  ) -> impl Future<Output = Result<PaymentRecord, Self::Error>> + Send + '_;

  /// Move `pending_review → rejected`, storing `reason` in the admin notes.
  fn reject_payment(
    &self,
    tenant_id: Uuid,
    payment_id: Uuid,
    reason: String,
  ) -> impl Future<Output = Result<PaymentRecord, Self::Error>> + Send + '_;

  // ── Projects and audits ───────────────────────────────────────────────

  fn create_project(
    &self,
    tenant_id: Uuid,
    input: NewProject,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  fn get_project(
    &self,
    tenant_id: Uuid,
    project_id: Uuid,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  fn list_projects(
    &self,
    tenant_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + '_;

  /// Fold verified, unpublished payments referencing the project into its
  /// total, flag them public, and append one snapshot. Atomic.
  fn publish_audit(
    &self,
    tenant_id: Uuid,
    project_id: Uuid,
  ) -> impl Future<Output = Result<PublishOutcome, Self::Error>> + Send + '_;

  /// Oldest first.
  fn list_snapshots(
    &self,
    tenant_id: Uuid,
    project_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AuditSnapshot>, Self::Error>> + Send + '_;

  fn public_ledger(
    &self,
    tenant_id: Uuid,
  ) -> impl Future<Output = Result<PublicLedger, Self::Error>> + Send + '_;

  // ── Services and service requests ─────────────────────────────────────

  fn create_service(
    &self,
    tenant_id: Uuid,
    input: NewService,
  ) -> impl Future<Output = Result<Service, Self::Error>> + Send + '_;

  fn list_services(
    &self,
    tenant_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Service>, Self::Error>> + Send + '_;

  /// Insert a request unless `(tenant_id, idempotency_key)` already exists,
  /// in which case the existing row is returned with `created = false`.
  fn submit_service_request(
    &self,
    tenant_id: Uuid,
    input: NewServiceRequest,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  fn get_service_request(
    &self,
    tenant_id: Uuid,
    request_id: Uuid,
  ) -> impl Future<Output = Result<Option<ServiceRequest>, Self::Error>> + Send + '_;

  fn list_service_requests(
    &self,
    tenant_id: Uuid,
    status: Option<RequestStatus>,
  ) -> impl Future<Output = Result<Vec<ServiceRequest>, Self::Error>> + Send + '_;

  fn update_service_request_status(
    &self,
    tenant_id: Uuid,
    request_id: Uuid,
    status: RequestStatus,
    notes: Option<String>,
  ) -> impl Future<Output = Result<ServiceRequest, Self::Error>> + Send + '_;

  // ── Directory ─────────────────────────────────────────────────────────

  fn create_section(
    &self,
    tenant_id: Uuid,
    input: NewCommunalSection,
  ) -> impl Future<Output = Result<CommunalSection, Self::Error>> + Send + '_;

  fn list_sections(
    &self,
    tenant_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CommunalSection>, Self::Error>> + Send + '_;

  fn create_official(
    &self,
    tenant_id: Uuid,
    input: NewOfficial,
  ) -> impl Future<Output = Result<Official, Self::Error>> + Send + '_;

  /// Ordered by `display_order`, then name.
  fn list_officials(
    &self,
    tenant_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Official>, Self::Error>> + Send + '_;

  fn create_facility(
    &self,
    tenant_id: Uuid,
    input: NewFacility,
  ) -> impl Future<Output = Result<Facility, Self::Error>> + Send + '_;

  fn list_facilities(
    &self,
    tenant_id: Uuid,
    filter: FacilityFilter,
  ) -> impl Future<Output = Result<Vec<Facility>, Self::Error>> + Send + '_;

  fn set_facility_status(
    &self,
    tenant_id: Uuid,
    facility_id: Uuid,
    status: FacilityStatus,
  ) -> impl Future<Output = Result<Facility, Self::Error>> + Send + '_;

  fn create_article(
    &self,
    tenant_id: Uuid,
    input: NewHandbookArticle,
  ) -> impl Future<Output = Result<HandbookArticle, Self::Error>> + Send + '_;

  fn list_articles(
    &self,
    tenant_id: Uuid,
    include_unpublished: bool,
  ) -> impl Future<Output = Result<Vec<HandbookArticle>, Self::Error>> + Send + '_;

  fn article_by_slug(
    &self,
    tenant_id: Uuid,
    slug: String,
  ) -> impl Future<Output = Result<Option<HandbookArticle>, Self::Error>> + Send + '_;

  fn submit_suggestion(
    &self,
    tenant_id: Uuid,
    input: NewFacilitySuggestion,
  ) -> impl Future<Output = Result<FacilitySuggestion, Self::Error>> + Send + '_;

  fn list_suggestions(
    &self,
    tenant_id: Uuid,
    status: Option<SuggestionStatus>,
  ) -> impl Future<Output = Result<Vec<FacilitySuggestion>, Self::Error>> + Send + '_;

  /// Approving creates a facility from the suggestion in the same
  /// transaction. Only `pending` suggestions can be reviewed.
  fn review_suggestion(
    &self,
    tenant_id: Uuid,
    suggestion_id: Uuid,
    decision: SuggestionDecision,
  ) -> impl Future<Output = Result<FacilitySuggestion, Self::Error>> + Send + '_;

  // ── Tax roll ──────────────────────────────────────────────────────────

  fn add_tax_record(
    &self,
    tenant_id: Uuid,
    input: NewTaxRecord,
  ) -> impl Future<Output = Result<TaxRecord, Self::Error>> + Send + '_;

  fn tax_lookup(
    &self,
    tenant_id: Uuid,
    kind: TaxSearchKind,
    query: String,
  ) -> impl Future<Output = Result<Vec<TaxRecord>, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  fn create_event(
    &self,
    tenant_id: Uuid,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// The newest emergency whose window contains `now`.
  fn active_alert(
    &self,
    tenant_id: Uuid,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;
}
