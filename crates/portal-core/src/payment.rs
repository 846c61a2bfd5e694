//! Payment records, memo codes and quittance identifiers.
//!
//! A payment record is a citizen's declared intent to pay. It moves through a
//! fixed lifecycle and is never deleted; the rows are the financial audit
//! trail.
//!
//! ```text
//! pending_upload --upload proof--> pending_review --approve--> verified
//!                                                  \--reject---> rejected
//! ```

use chrono::{DateTime, Datelike, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, amount::Amount};

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
  PendingUpload,
  PendingReview,
  Verified,
  Rejected,
}

impl PaymentStatus {
  pub fn is_terminal(self) -> bool { matches!(self, Self::Verified | Self::Rejected) }

  /// Validate a move from `self` to `to` for payment `id`.
  ///
  /// Leaving `verified` is always refused with [`Error::AlreadyVerified`], so
  /// a quittance is never issued twice.
  pub fn check_transition(self, to: Self, id: Uuid) -> Result<()> {
    use PaymentStatus::*;
    match (self, to) {
      (Verified, _) => Err(Error::AlreadyVerified(id)),
      (PendingUpload, PendingReview)
      | (PendingReview, Verified)
      | (PendingReview, Rejected) => Ok(()),
      (from, to) => Err(Error::transition(from, to)),
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
  Moncash,
  WireTransfer,
}

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display,
  EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
  #[default]
  Htg,
  Usd,
}

// ─── Memo codes ──────────────────────────────────────────────────────────────

/// The reference a payer writes on a transfer: `{TEN}-{TYP}[-{REF}]-{NNNN}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoCode(String);

impl MemoCode {
  /// Generate a memo code with four digits from the OS RNG.
  pub fn generate(subdomain: &str, payment_type: &str, reference: Option<&str>) -> Self {
    Self::generate_with(subdomain, payment_type, reference, &mut OsRng)
  }

  pub fn generate_with(
    subdomain: &str,
    payment_type: &str,
    reference: Option<&str>,
    rng: &mut impl RngCore,
  ) -> Self {
    let mut segments = vec![prefix3(subdomain), prefix3(payment_type)];
    if let Some(reference) = reference.map(normalize_code).filter(|r| !r.is_empty()) {
      segments.push(reference);
    }
    segments.push(four_digits(rng));
    Self(segments.join("-"))
  }

  /// Wrap a memo typed by a payer or admin, uppercased.
  pub fn normalized(raw: &str) -> Self { Self(raw.trim().to_ascii_uppercase()) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// The project reference a memo carries: everything between the
  /// `TEN-TYP` prefix and the trailing four-digit suffix, if any.
  ///
  /// `JAC-DON-ROAD-2025-8883` carries `ROAD-2025`; `JAC-PRO-0042` carries
  /// nothing.
  pub fn reference(&self) -> Option<String> {
    let memo = self.0.to_ascii_uppercase();
    let mut segments: Vec<&str> = memo.split('-').skip(2).collect();
    if segments.last().is_some_and(|s| is_suffix(s)) {
      segments.pop();
    }
    let reference = segments.join("-");
    (!reference.is_empty()).then_some(reference)
  }

  /// Whether this memo's reference is exactly `code`.
  ///
  /// `JAC-DON-ABC123` references `ABC123` but not `ABC` or `BC123`.
  pub fn references(&self, code: &str) -> bool {
    let code = normalize_code(code);
    !code.is_empty() && self.reference().is_some_and(|r| r == code)
  }
}

impl std::fmt::Display for MemoCode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

fn prefix3(s: &str) -> String {
  s.chars()
    .filter(char::is_ascii_alphanumeric)
    .take(3)
    .collect::<String>()
    .to_ascii_uppercase()
}

fn normalize_code(s: &str) -> String {
  s.trim()
    .chars()
    .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
    .collect::<String>()
    .trim_matches('-')
    .to_ascii_uppercase()
}

fn is_suffix(segment: &str) -> bool {
  segment.len() == 4 && segment.bytes().all(|b| b.is_ascii_digit())
}

fn four_digits(rng: &mut impl RngCore) -> String { format!("{:04}", rng.next_u32() % 10_000) }

// ─── Quittance ───────────────────────────────────────────────────────────────

/// Official receipt number, `QT-{year}-{NNNN}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuittanceId(String);

impl QuittanceId {
  pub fn random(at: DateTime<Utc>) -> Self { Self::generate_with(at, &mut OsRng) }

  pub fn generate_with(at: DateTime<Utc>, rng: &mut impl RngCore) -> Self {
    Self(format!("QT-{}-{}", at.year(), four_digits(rng)))
  }

  pub fn from_stored(s: String) -> Self { Self(s) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn is_well_formed(s: &str) -> bool {
    let mut parts = s.split('-');
    matches!(
      (parts.next(), parts.next(), parts.next(), parts.next()),
      (Some("QT"), Some(year), Some(n), None)
        if year.len() == 4
          && year.bytes().all(|b| b.is_ascii_digit())
          && n.len() == 4
          && n.bytes().all(|b| b.is_ascii_digit())
    )
  }
}

impl std::fmt::Display for QuittanceId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
  pub payment_id:       Uuid,
  pub tenant_id:        Uuid,
  pub email:            String,
  pub amount:           Amount,
  pub currency:         Currency,
  pub method:           PaymentMethod,
  pub payment_type:     String,
  pub reference_id:     Option<String>,
  pub memo_code:        MemoCode,
  pub proof_url:        Option<String>,
  pub status:           PaymentStatus,
  /// Assigned once, when the record becomes `verified`.
  pub quittance_id:     Option<QuittanceId>,
  pub verified_at:      Option<DateTime<Utc>>,
  pub verified_by:      Option<Uuid>,
  pub admin_notes:      Option<String>,
  /// Only ever `true` for `verified` records.
  pub is_public_ledger: bool,
  /// Older flag kept in step with `is_public_ledger`.
  pub is_public:        bool,
  pub created_at:       DateTime<Utc>,
}

/// What a citizen declares when starting a payment.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
  pub email:        String,
  pub amount:       Amount,
  #[serde(default)]
  pub currency:     Currency,
  pub method:       PaymentMethod,
  pub payment_type: String,
  pub reference_id: Option<String>,
}

impl PaymentIntent {
  /// Check the fields and normalise the email and payment type.
  pub fn validated(mut self) -> Result<Self> {
    self.email = self.email.trim().to_ascii_lowercase();
    if self.email.is_empty() || !self.email.contains('@') {
      return Err(Error::validation("email", "a valid email address is required"));
    }
    if !self.amount.is_positive() {
      return Err(Error::validation("amount", "must be greater than zero"));
    }
    self.payment_type = self.payment_type.trim().to_ascii_lowercase();
    if self.payment_type.is_empty()
      || !self.payment_type.chars().all(|c| c.is_ascii_lowercase() || c == '_')
    {
      return Err(Error::validation("payment_type", "expected a snake_case payment type"));
    }
    self.reference_id = self
      .reference_id
      .map(|r| r.trim().to_owned())
      .filter(|r| !r.is_empty());
    Ok(self)
  }
}

/// Input to [`crate::store::PortalStore::create_payment`].
#[derive(Debug, Clone)]
pub struct NewPayment {
  pub intent:    PaymentIntent,
  pub memo_code: MemoCode,
}

/// A lookup typed into the public "find my payment" box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSearch {
  pub email: String,
  pub memo:  MemoCode,
}

impl PaymentSearch {
  pub fn new(query: &str) -> Option<Self> {
    let query = query.trim();
    if query.is_empty() {
      return None;
    }
    Some(Self {
      email: query.to_ascii_lowercase(),
      memo:  MemoCode::normalized(query),
    })
  }
}
