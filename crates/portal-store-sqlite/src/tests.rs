//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Datelike as _, Duration, Utc};
use portal_core::{
  Amount, Error as CoreError,
  alert::{NewEvent, Severity},
  directory::{
    FacilityFilter, FacilityStatus, NewCommunalSection, NewFacility, NewFacilitySuggestion,
    NewHandbookArticle, NewOfficial, Office, SuggestionDecision, SuggestionStatus,
  },
  payment::{
    Currency, MemoCode, NewPayment, PaymentIntent, PaymentMethod, PaymentRecord, PaymentSearch,
    PaymentStatus, QuittanceId,
  },
  project::{NewProject, PublishOutcome},
  request::{Contact, Location, NewService, NewServiceRequest, RequestStatus},
  session::{NewUser, Role},
  store::{DomainError as _, PortalStore},
  tax::{NewTaxRecord, TaxSearchKind},
  tenant::{NewTenant, Tenant},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn tenant(s: &SqliteStore, subdomain: &str) -> Tenant {
  s.create_tenant(NewTenant::new(subdomain, subdomain.to_uppercase()))
    .await
    .unwrap()
}

fn intent(amount: &str, payment_type: &str) -> PaymentIntent {
  PaymentIntent {
    email:        "Payer@Example.ht".into(),
    amount:       amount.parse().unwrap(),
    currency:     Currency::Htg,
    method:       PaymentMethod::WireTransfer,
    payment_type: payment_type.into(),
    reference_id: None,
  }
  .validated()
  .unwrap()
}

async fn payment(s: &SqliteStore, t: &Tenant, amount: &str, memo: &str) -> PaymentRecord {
  s.create_payment(t.tenant_id, NewPayment {
    intent:    intent(amount, "donation"),
    memo_code: MemoCode::normalized(memo),
  })
  .await
  .unwrap()
}

/// Create a payment and walk it to `verified`.
async fn verified(s: &SqliteStore, t: &Tenant, amount: &str, memo: &str) -> PaymentRecord {
  let p = payment(s, t, amount, memo).await;
  s.upload_proof(t.tenant_id, p.payment_id, "https://files.example/proof.png".into())
    .await
    .unwrap();
  s.approve_payment(t.tenant_id, p.payment_id, Uuid::new_v4())
    .await
    .unwrap()
}

async fn project(s: &SqliteStore, t: &Tenant, code: &str) -> portal_core::project::Project {
  s.create_project(t.tenant_id, NewProject {
    code:          code.into(),
    title:         "Marché public".into(),
    description:   None,
    target_amount: Amount::from_units(1000),
  })
  .await
  .unwrap()
}

fn domain(e: &Error) -> &CoreError { e.domain().expect("domain error") }

// ─── Tenants and users ───────────────────────────────────────────────────────

#[tokio::test]
async fn tenant_lookup_by_subdomain() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;

  let found = s.tenant_by_subdomain("JACMEL".into()).await.unwrap().unwrap();
  assert_eq!(found.tenant_id, t.tenant_id);
  assert!(s.tenant_by_subdomain("pap".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_subdomain_conflicts() {
  let s = store().await;
  tenant(&s, "jacmel").await;
  let err = s
    .create_tenant(NewTenant::new("jacmel", "Again"))
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::Conflict(_)));
}

#[tokio::test]
async fn users_are_found_by_email_case_insensitively() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let other = tenant(&s, "pap").await;
  s.create_user(t.tenant_id, NewUser {
    email:         "Admin@Jacmel.ht".into(),
    name:          "Admin".into(),
    role:          Role::Admin,
    section_id:    None,
    password_hash: "$argon2id$stub".into(),
  })
  .await
  .unwrap();

  let user = s
    .user_by_email(t.tenant_id, "ADMIN@jacmel.ht".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(user.email, "admin@jacmel.ht");
  assert!(
    s.user_by_email(other.tenant_id, "admin@jacmel.ht".into())
      .await
      .unwrap()
      .is_none()
  );
}

// ─── Payments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_payment_waits_for_upload() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let p = s
    .create_payment(t.tenant_id, NewPayment {
      intent:    intent("100.00", "property_tax"),
      memo_code: MemoCode::generate(&t.subdomain, "property_tax", None),
    })
    .await
    .unwrap();

  assert_eq!(p.status, PaymentStatus::PendingUpload);
  assert_eq!(p.email, "payer@example.ht");
  assert!(p.memo_code.as_str().starts_with("JAC-PRO-"));
  assert!(p.quittance_id.is_none());

  let fetched = s.get_payment(t.tenant_id, p.payment_id).await.unwrap().unwrap();
  assert_eq!(fetched.amount, Amount::from_units(100));
  assert_eq!(fetched.memo_code, p.memo_code);
}

#[tokio::test]
async fn upload_then_approve_assigns_quittance() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let p = payment(&s, &t, "100.00", "JAC-PRO-0042").await;

  let reviewed = s
    .upload_proof(t.tenant_id, p.payment_id, "https://files.example/r.jpg".into())
    .await
    .unwrap();
  assert_eq!(reviewed.status, PaymentStatus::PendingReview);
  assert_eq!(reviewed.proof_url.as_deref(), Some("https://files.example/r.jpg"));

  let admin = Uuid::new_v4();
  let approved = s.approve_payment(t.tenant_id, p.payment_id, admin).await.unwrap();
  assert_eq!(approved.status, PaymentStatus::Verified);
  assert_eq!(approved.verified_by, Some(admin));
  assert!(approved.verified_at.is_some());
  let quittance = approved.quittance_id.unwrap();
  assert!(QuittanceId::is_well_formed(quittance.as_str()));
  assert!(quittance.as_str().starts_with(&format!("QT-{}-", Utc::now().year())));
}

#[tokio::test]
async fn approving_twice_keeps_the_first_quittance() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let p = verified(&s, &t, "50.00", "JAC-PRO-0001").await;

  let err = s
    .approve_payment(t.tenant_id, p.payment_id, Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::AlreadyVerified(id) if *id == p.payment_id));

  let after = s.get_payment(t.tenant_id, p.payment_id).await.unwrap().unwrap();
  assert_eq!(after.quittance_id, p.quittance_id);
  assert_eq!(after.verified_at, p.verified_at);
}

#[tokio::test]
async fn approve_requires_review_first() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let p = payment(&s, &t, "50.00", "JAC-PRO-0002").await;

  let err = s
    .approve_payment(t.tenant_id, p.payment_id, Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::InvalidTransition { .. }));
}

#[tokio::test]
async fn proof_upload_only_from_pending_upload() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let p = payment(&s, &t, "50.00", "JAC-PRO-0003").await;
  s.upload_proof(t.tenant_id, p.payment_id, "a".into()).await.unwrap();

  let err = s
    .upload_proof(t.tenant_id, p.payment_id, "b".into())
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::InvalidTransition { .. }));
}

#[tokio::test]
async fn rejection_is_terminal() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let p = payment(&s, &t, "50.00", "JAC-PRO-0004").await;
  s.upload_proof(t.tenant_id, p.payment_id, "a".into()).await.unwrap();

  let rejected = s
    .reject_payment(t.tenant_id, p.payment_id, "blurry receipt".into())
    .await
    .unwrap();
  assert_eq!(rejected.status, PaymentStatus::Rejected);
  assert_eq!(rejected.admin_notes.as_deref(), Some("blurry receipt"));
  assert!(rejected.quittance_id.is_none());

  let err = s
    .approve_payment(t.tenant_id, p.payment_id, Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::InvalidTransition { .. }));
}

#[tokio::test]
async fn foreign_payments_look_missing() {
  let s = store().await;
  let jacmel = tenant(&s, "jacmel").await;
  let pap = tenant(&s, "pap").await;
  let p = payment(&s, &jacmel, "50.00", "JAC-PRO-0005").await;
  s.upload_proof(jacmel.tenant_id, p.payment_id, "a".into()).await.unwrap();

  assert!(s.get_payment(pap.tenant_id, p.payment_id).await.unwrap().is_none());
  let err = s
    .approve_payment(pap.tenant_id, p.payment_id, Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::RecordNotFound));

  let untouched = s.get_payment(jacmel.tenant_id, p.payment_id).await.unwrap().unwrap();
  assert_eq!(untouched.status, PaymentStatus::PendingReview);
}

#[tokio::test]
async fn quittances_are_unique_per_tenant() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let mut pending = Vec::new();
  for i in 0..40 {
    let p = payment(&s, &t, "1.00", &format!("JAC-PRO-{i:04}")).await;
    s.upload_proof(t.tenant_id, p.payment_id, "https://files.example/proof.png".into())
      .await
      .unwrap();
    pending.push(p.payment_id);
  }

  let mut approvals = tokio::task::JoinSet::new();
  for id in pending {
    let s = s.clone();
    let tenant_id = t.tenant_id;
    approvals.spawn(async move { s.approve_payment(tenant_id, id, Uuid::new_v4()).await });
  }

  let mut seen = std::collections::HashSet::new();
  while let Some(joined) = approvals.join_next().await {
    let p = joined.unwrap().unwrap();
    assert_eq!(p.status, PaymentStatus::Verified);
    let q = p.quittance_id.unwrap();
    assert!(QuittanceId::is_well_formed(q.as_str()));
    assert!(seen.insert(q.as_str().to_owned()), "duplicate {q}");
  }
  assert_eq!(seen.len(), 40);
}

#[tokio::test]
async fn racing_approvals_verify_once() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let p = payment(&s, &t, "50.00", "JAC-PRO-0099").await;
  s.upload_proof(t.tenant_id, p.payment_id, "https://files.example/proof.png".into())
    .await
    .unwrap();

  let (a, b) = tokio::join!(
    s.approve_payment(t.tenant_id, p.payment_id, Uuid::new_v4()),
    s.approve_payment(t.tenant_id, p.payment_id, Uuid::new_v4()),
  );
  let (won, lost) = match (a, b) {
    (Ok(won), Err(lost)) | (Err(lost), Ok(won)) => (won, lost),
    other => panic!("expected one approval to win: {other:?}"),
  };
  assert!(matches!(domain(&lost), CoreError::AlreadyVerified(id) if *id == p.payment_id));
  let stored = s.get_payment(t.tenant_id, p.payment_id).await.unwrap().unwrap();
  assert_eq!(stored.quittance_id, won.quittance_id);
}

#[tokio::test]
async fn search_matches_email_or_memo_newest_first() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let first = payment(&s, &t, "10.00", "JAC-DON-1111").await;
  let second = payment(&s, &t, "20.00", "JAC-DON-2222").await;

  let by_email = s
    .search_payments(t.tenant_id, PaymentSearch::new("PAYER@example.ht").unwrap())
    .await
    .unwrap();
  assert_eq!(
    by_email.iter().map(|p| p.payment_id).collect::<Vec<_>>(),
    vec![second.payment_id, first.payment_id]
  );

  let by_memo = s
    .search_payments(t.tenant_id, PaymentSearch::new("jac-don-1111").unwrap())
    .await
    .unwrap();
  assert_eq!(by_memo.len(), 1);
  assert_eq!(by_memo[0].payment_id, first.payment_id);
}

#[tokio::test]
async fn list_payments_filters_by_status() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  payment(&s, &t, "10.00", "JAC-DON-0001").await;
  let p = payment(&s, &t, "10.00", "JAC-DON-0002").await;
  s.upload_proof(t.tenant_id, p.payment_id, "a".into()).await.unwrap();

  assert_eq!(s.list_payments(t.tenant_id, None).await.unwrap().len(), 2);
  let review = s
    .list_payments(t.tenant_id, Some(PaymentStatus::PendingReview))
    .await
    .unwrap();
  assert_eq!(review.len(), 1);
  assert_eq!(review[0].payment_id, p.payment_id);
}

// ─── Audit publication ───────────────────────────────────────────────────────

#[tokio::test]
async fn publish_folds_verified_payments_into_the_project() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let proj = project(&s, &t, "ABC123").await;
  let p = verified(&s, &t, "250.00", "JAC-DON-ABC123").await;

  let outcome = s.publish_audit(t.tenant_id, proj.project_id).await.unwrap();
  let PublishOutcome::Published { snapshot, payment_ids } = outcome else {
    panic!("expected a snapshot");
  };
  assert_eq!(payment_ids, vec![p.payment_id]);
  assert_eq!(snapshot.new_funds_added, Amount::from_units(250));
  assert_eq!(snapshot.snapshot_total, Amount::from_units(250));
  assert_eq!(snapshot.payment_count, 1);

  let proj = s.get_project(t.tenant_id, proj.project_id).await.unwrap().unwrap();
  assert_eq!(proj.current_raised, Amount::from_units(250));
  let p = s.get_payment(t.tenant_id, p.payment_id).await.unwrap().unwrap();
  assert!(p.is_public_ledger);
  assert!(p.is_public);
}

#[tokio::test]
async fn publishing_again_is_a_no_op() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let proj = project(&s, &t, "ABC123").await;
  verified(&s, &t, "250.00", "JAC-DON-ABC123").await;
  s.publish_audit(t.tenant_id, proj.project_id).await.unwrap();

  let again = s.publish_audit(t.tenant_id, proj.project_id).await.unwrap();
  assert!(matches!(
    again,
    PublishOutcome::NothingToPublish { current_raised } if current_raised == Amount::from_units(250)
  ));
  assert_eq!(
    s.list_snapshots(t.tenant_id, proj.project_id).await.unwrap().len(),
    1
  );
}

#[tokio::test]
async fn publish_ignores_partial_code_matches() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let short = project(&s, &t, "ABC").await;
  verified(&s, &t, "100.00", "JAC-DON-ABC123").await;
  verified(&s, &t, "100.00", "JAC-DON-XABC").await;

  let outcome = s.publish_audit(t.tenant_id, short.project_id).await.unwrap();
  assert!(matches!(outcome, PublishOutcome::NothingToPublish { .. }));
}

#[tokio::test]
async fn publish_does_not_claim_a_longer_dashed_code() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let road = project(&s, &t, "ROAD").await;
  let road_2025 = project(&s, &t, "ROAD-2025").await;
  let memo = MemoCode::generate("jacmel", "donation", Some("road-2025"));
  verified(&s, &t, "100.00", memo.as_str()).await;

  let outcome = s.publish_audit(t.tenant_id, road.project_id).await.unwrap();
  assert!(matches!(outcome, PublishOutcome::NothingToPublish { .. }), "{memo}");

  let outcome = s.publish_audit(t.tenant_id, road_2025.project_id).await.unwrap();
  let snapshot = outcome.snapshot().unwrap();
  assert_eq!(snapshot.new_funds_added, Amount::from_units(100));
  assert_eq!(snapshot.payment_count, 1);
}

#[tokio::test]
async fn publish_ignores_the_random_suffix() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let numeric = project(&s, &t, "0042").await;
  verified(&s, &t, "500.00", "JAC-PRO-0042").await;

  let outcome = s.publish_audit(t.tenant_id, numeric.project_id).await.unwrap();
  assert!(matches!(outcome, PublishOutcome::NothingToPublish { .. }));

  verified(&s, &t, "20.00", "JAC-DON-0042-1234").await;
  let outcome = s.publish_audit(t.tenant_id, numeric.project_id).await.unwrap();
  assert_eq!(outcome.snapshot().unwrap().new_funds_added, Amount::from_units(20));
}

#[tokio::test]
async fn publish_skips_unverified_payments() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let proj = project(&s, &t, "ROUTE-7").await;
  payment(&s, &t, "75.00", "JAC-DON-ROUTE-7").await;
  verified(&s, &t, "25.50", "JAC-DON-ROUTE-7-0001").await;

  let outcome = s.publish_audit(t.tenant_id, proj.project_id).await.unwrap();
  let snapshot = outcome.snapshot().unwrap();
  assert_eq!(snapshot.new_funds_added, "25.50".parse::<Amount>().unwrap());
  assert_eq!(snapshot.payment_count, 1);
}

#[tokio::test]
async fn publish_for_foreign_project_is_not_found() {
  let s = store().await;
  let jacmel = tenant(&s, "jacmel").await;
  let pap = tenant(&s, "pap").await;
  let proj = project(&s, &jacmel, "ABC123").await;

  let err = s.publish_audit(pap.tenant_id, proj.project_id).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::RecordNotFound));
}

#[tokio::test]
async fn public_ledger_shows_only_published_payments() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let proj = project(&s, &t, "ABC123").await;
  let published = verified(&s, &t, "250.00", "JAC-DON-ABC123").await;
  verified(&s, &t, "80.00", "JAC-DON-OTHER").await;
  s.publish_audit(t.tenant_id, proj.project_id).await.unwrap();

  let ledger = s.public_ledger(t.tenant_id).await.unwrap();
  assert_eq!(ledger.projects.len(), 1);
  assert_eq!(ledger.entries.len(), 1);
  assert_eq!(ledger.entries[0].payment_id, published.payment_id);
  assert!(ledger.latest_snapshot.is_some());
}

// ─── Service requests ────────────────────────────────────────────────────────

fn report(key: &str) -> NewServiceRequest {
  NewServiceRequest {
    service_code:    "pothole".into(),
    description:     "Large hole on Rue du Commerce".into(),
    location:        Location { lat: Some(18.23), long: Some(-72.53), address: None },
    contact:         Contact { email: Some("citizen@example.ht".into()), ..Default::default() },
    idempotency_key: key.into(),
  }
}

async fn with_pothole(s: &SqliteStore, t: &Tenant) {
  s.create_service(t.tenant_id, NewService {
    service_code: "pothole".into(),
    service_name: "Pothole".into(),
    description:  None,
    group:        Some("roads".into()),
  })
  .await
  .unwrap();
}

#[tokio::test]
async fn repeated_submission_returns_the_original() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  with_pothole(&s, &t).await;

  let first = s.submit_service_request(t.tenant_id, report("k-1")).await.unwrap();
  assert!(first.created);
  assert_eq!(first.request.status, RequestStatus::Open);

  let mut retry = report("k-1");
  retry.description = "different text".into();
  let second = s.submit_service_request(t.tenant_id, retry).await.unwrap();
  assert!(!second.created);
  assert_eq!(second.request.request_id, first.request.request_id);
  assert_eq!(second.request.description, first.request.description);

  assert_eq!(s.list_service_requests(t.tenant_id, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn idempotency_keys_are_per_tenant() {
  let s = store().await;
  let jacmel = tenant(&s, "jacmel").await;
  let pap = tenant(&s, "pap").await;
  with_pothole(&s, &jacmel).await;
  with_pothole(&s, &pap).await;

  let a = s.submit_service_request(jacmel.tenant_id, report("same")).await.unwrap();
  let b = s.submit_service_request(pap.tenant_id, report("same")).await.unwrap();
  assert!(a.created && b.created);
  assert_ne!(a.request.request_id, b.request.request_id);
}

#[tokio::test]
async fn unknown_service_is_rejected() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let err = s.submit_service_request(t.tenant_id, report("k")).await.unwrap_err();
  assert!(matches!(domain(&err), CoreError::Validation { field: "service_code", .. }));
}

#[tokio::test]
async fn closed_requests_stay_closed() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  with_pothole(&s, &t).await;
  let sub = s.submit_service_request(t.tenant_id, report("k")).await.unwrap();
  let id = sub.request.request_id;

  let closed = s
    .update_service_request_status(t.tenant_id, id, RequestStatus::Closed, Some("filled".into()))
    .await
    .unwrap();
  assert_eq!(closed.status, RequestStatus::Closed);
  assert_eq!(closed.status_notes.as_deref(), Some("filled"));

  let err = s
    .update_service_request_status(t.tenant_id, id, RequestStatus::Open, None)
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::InvalidTransition { .. }));
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn officials_reference_sections_of_the_same_tenant() {
  let s = store().await;
  let jacmel = tenant(&s, "jacmel").await;
  let pap = tenant(&s, "pap").await;
  let section = s
    .create_section(pap.tenant_id, NewCommunalSection {
      name:       "1ère Section".into(),
      code:       "S1".into(),
      population: None,
      area_km2:   None,
    })
    .await
    .unwrap();

  let official = |section_id| NewOfficial {
    name: "Marie Joseph".into(),
    title: "CASEC".into(),
    office: Office::Casec,
    section_id,
    email: None,
    phone: None,
    photo_url: None,
    display_order: 0,
  };

  let err = s
    .create_official(jacmel.tenant_id, official(Some(section.section_id)))
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::Validation { field: "section_id", .. }));

  s.create_official(pap.tenant_id, official(Some(section.section_id)))
    .await
    .unwrap();
  assert_eq!(s.list_officials(pap.tenant_id).await.unwrap().len(), 1);
  assert!(s.list_officials(jacmel.tenant_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn facilities_filter_by_status() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let clinic = s
    .create_facility(t.tenant_id, NewFacility {
      name:       "Clinique Saint-Michel".into(),
      category:   "Health".into(),
      address:    None,
      lat:        None,
      long:       None,
      section_id: None,
      phone:      None,
      status:     None,
    })
    .await
    .unwrap();
  assert_eq!(clinic.status, FacilityStatus::Operational);
  assert_eq!(clinic.category, "health");

  s.set_facility_status(t.tenant_id, clinic.facility_id, FacilityStatus::Closed)
    .await
    .unwrap();
  let closed = s
    .list_facilities(t.tenant_id, FacilityFilter {
      status:   Some(FacilityStatus::Closed),
      category: None,
    })
    .await
    .unwrap();
  assert_eq!(closed.len(), 1);
  let open = s
    .list_facilities(t.tenant_id, FacilityFilter {
      status:   Some(FacilityStatus::Operational),
      category: None,
    })
    .await
    .unwrap();
  assert!(open.is_empty());
}

#[tokio::test]
async fn unpublished_articles_are_hidden() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  s.create_article(t.tenant_id, NewHandbookArticle {
    slug:      "Birth-Certificate".into(),
    title:     "Birth certificate".into(),
    category:  None,
    body:      "Bring two witnesses.".into(),
    published: false,
  })
  .await
  .unwrap();

  assert!(s.list_articles(t.tenant_id, false).await.unwrap().is_empty());
  assert_eq!(s.list_articles(t.tenant_id, true).await.unwrap().len(), 1);
  assert!(
    s.article_by_slug(t.tenant_id, "birth-certificate".into())
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn approving_a_suggestion_creates_a_facility() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let sug = s
    .submit_suggestion(t.tenant_id, NewFacilitySuggestion {
      name:            "Borne fontaine".into(),
      category:        "water".into(),
      address:         Some("Place d'Armes".into()),
      lat:             None,
      long:            None,
      submitter_email: None,
    })
    .await
    .unwrap();
  assert_eq!(sug.status, SuggestionStatus::Pending);

  let reviewed = s
    .review_suggestion(t.tenant_id, sug.suggestion_id, SuggestionDecision::Approve)
    .await
    .unwrap();
  assert_eq!(reviewed.status, SuggestionStatus::Approved);
  let facility_id = reviewed.facility_id.unwrap();
  let facilities = s
    .list_facilities(t.tenant_id, FacilityFilter::default())
    .await
    .unwrap();
  assert_eq!(facilities.len(), 1);
  assert_eq!(facilities[0].facility_id, facility_id);

  let err = s
    .review_suggestion(t.tenant_id, sug.suggestion_id, SuggestionDecision::Reject)
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), CoreError::InvalidTransition { .. }));
}

// ─── Tax roll and alerts ─────────────────────────────────────────────────────

#[tokio::test]
async fn tax_lookup_by_parcel_and_nif() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let other = tenant(&s, "pap").await;
  s.add_tax_record(t.tenant_id, NewTaxRecord {
    parcel_number:  "JAC-00123".into(),
    nif:            "003-124-567-8".into(),
    owner_name:     "Jean Baptiste".into(),
    address:        None,
    assessed_value: Amount::from_units(500_000),
    amount_due:     Amount::from_units(5_000),
    fiscal_year:    2025,
  })
  .await
  .unwrap();

  let by_parcel = s
    .tax_lookup(t.tenant_id, TaxSearchKind::Parcel, "jac-00123".into())
    .await
    .unwrap();
  assert_eq!(by_parcel.len(), 1);
  let by_nif = s
    .tax_lookup(t.tenant_id, TaxSearchKind::Nif, "0031245678".into())
    .await
    .unwrap();
  assert_eq!(by_nif.len(), 1);
  assert!(
    s.tax_lookup(other.tenant_id, TaxSearchKind::Nif, "0031245678".into())
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn active_alert_is_the_current_emergency() {
  let s = store().await;
  let t = tenant(&s, "jacmel").await;
  let now = Utc::now();
  s.create_event(t.tenant_id, NewEvent {
    title:     "Carnaval".into(),
    body:      None,
    severity:  Severity::Info,
    starts_at: Some(now - Duration::hours(1)),
    ends_at:   None,
  })
  .await
  .unwrap();
  s.create_event(t.tenant_id, NewEvent {
    title:     "Old flood".into(),
    body:      None,
    severity:  Severity::Emergency,
    starts_at: Some(now - Duration::days(3)),
    ends_at:   Some(now - Duration::days(2)),
  })
  .await
  .unwrap();
  assert!(s.active_alert(t.tenant_id, now).await.unwrap().is_none());

  let storm = s
    .create_event(t.tenant_id, NewEvent {
      title:     "Cyclone warning".into(),
      body:      Some("Shelters are open.".into()),
      severity:  Severity::Emergency,
      starts_at: Some(now - Duration::minutes(5)),
      ends_at:   Some(now + Duration::hours(6)),
    })
    .await
    .unwrap();
  let active = s.active_alert(t.tenant_id, now).await.unwrap().unwrap();
  assert_eq!(active.event_id, storm.event_id);
}

// ─── Connection URLs ─────────────────────────────────────────────────────────

#[tokio::test]
async fn connect_accepts_memory_url() {
  let s = SqliteStore::connect("sqlite::memory:").await.unwrap();
  tenant(&s, "demo").await;
  s.close().await.unwrap();
}

#[tokio::test]
async fn connect_rejects_other_schemes() {
  let err = SqliteStore::connect("postgres://localhost/portal").await.err().unwrap();
  assert!(matches!(err, Error::DatabaseUrl(_)));
}
