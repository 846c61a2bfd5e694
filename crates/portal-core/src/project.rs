//! Projects, audit snapshots and the public ledger.
//!
//! A project's `current_raised` is only ever advanced by publishing an audit,
//! which folds verified payments into the total and appends exactly one
//! [`AuditSnapshot`]. Snapshots are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  amount::Amount,
  payment::{MemoCode, PaymentRecord, QuittanceId},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
  pub project_id:     Uuid,
  pub tenant_id:      Uuid,
  /// Matched against memo code segments during reconciliation.
  pub code:           String,
  pub title:          String,
  pub description:    Option<String>,
  pub target_amount:  Amount,
  pub current_raised: Amount,
  pub created_at:     DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
  pub code:          String,
  pub title:         String,
  pub description:   Option<String>,
  pub target_amount: Amount,
}

impl NewProject {
  pub fn validated(mut self) -> Result<Self> {
    self.code = self.code.trim().to_ascii_uppercase();
    if self.code.is_empty()
      || !self.code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
      || self.code.starts_with('-')
      || self.code.ends_with('-')
    {
      return Err(Error::validation("code", "letters, digits and inner dashes only"));
    }
    if self.title.trim().is_empty() {
      return Err(Error::validation("title", "must not be empty"));
    }
    if self.target_amount.cents() < 0 {
      return Err(Error::validation("target_amount", "must not be negative"));
    }
    Ok(self)
  }
}

/// Immutable evidence of one reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSnapshot {
  pub snapshot_id:     Uuid,
  pub tenant_id:       Uuid,
  pub project_id:      Uuid,
  /// `current_raised` after this run.
  pub snapshot_total:  Amount,
  pub new_funds_added: Amount,
  pub payment_count:   u32,
  pub created_at:      DateTime<Utc>,
}

/// Result of [`crate::store::PortalStore::publish_audit`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
  /// No verified, unpublished payments referenced the project.
  NothingToPublish { current_raised: Amount },
  Published {
    snapshot:     AuditSnapshot,
    payment_ids:  Vec<Uuid>,
  },
}

impl PublishOutcome {
  pub fn snapshot(&self) -> Option<&AuditSnapshot> {
    match self {
      Self::Published { snapshot, .. } => Some(snapshot),
      Self::NothingToPublish { .. } => None,
    }
  }
}

/// Pages whose cached copies go stale when an audit is published.
pub const AUDIT_VIEWS: [&str; 3] = ["/admin/finance", "/transparency", "/donate"];

/// A published payment as shown on the transparency page. No payer details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
  pub payment_id:   Uuid,
  pub memo_code:    MemoCode,
  pub amount:       Amount,
  pub payment_type: String,
  pub quittance_id: Option<QuittanceId>,
  pub verified_at:  Option<DateTime<Utc>>,
}

impl From<PaymentRecord> for LedgerEntry {
  fn from(p: PaymentRecord) -> Self {
    Self {
      payment_id:   p.payment_id,
      memo_code:    p.memo_code,
      amount:       p.amount,
      payment_type: p.payment_type,
      quittance_id: p.quittance_id,
      verified_at:  p.verified_at,
    }
  }
}

/// The public transparency view for one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicLedger {
  pub projects:        Vec<Project>,
  pub entries:         Vec<LedgerEntry>,
  pub latest_snapshot: Option<AuditSnapshot>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn project(code: &str) -> NewProject {
    NewProject {
      code:          code.into(),
      title:         "Road repair".into(),
      description:   None,
      target_amount: Amount::from_units(1000),
    }
  }

  #[test]
  fn codes_are_uppercased() {
    assert_eq!(project(" abc123 ").validated().unwrap().code, "ABC123");
    assert_eq!(project("road-2025").validated().unwrap().code, "ROAD-2025");
  }

  #[test]
  fn codes_reject_separators_at_edges() {
    for bad in ["", "-ABC", "ABC-", "AB C", "AB_C"] {
      assert!(project(bad).validated().is_err(), "{bad:?}");
    }
  }
}
