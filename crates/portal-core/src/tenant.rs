//! Tenants and host-based tenant resolution.
//!
//! A tenant is a municipality. Every request is bound to exactly one tenant,
//! chosen by the subdomain of its `Host` header. Resolution never fails: any
//! host that cannot be read confidently maps to [`DEFAULT_SUBDOMAIN`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subdomain used whenever the host carries no usable tenant label.
pub const DEFAULT_SUBDOMAIN: &str = "demo";

/// Header through which the resolved subdomain travels to handlers.
pub const TENANT_HEADER: &str = "x-tenant-subdomain";

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Map a `Host` header value to a tenant subdomain.
///
/// - `jacmel.localhost:3000` → `jacmel`
/// - `localhost:3000`, `localhost` → `demo`
/// - `jacmel.portal.ht` → `jacmel`
/// - `portal.ht` → `demo`
pub fn resolve_subdomain(host: &str) -> String {
  let hostname = strip_port(host.trim()).to_ascii_lowercase();
  let labels: Vec<&str> = hostname.split('.').collect();

  let candidate = if hostname.contains("localhost") {
    match labels.as_slice() {
      [first, _, ..] if *first != "localhost" => Some(*first),
      _ => None,
    }
  } else if labels.len() <= 2 {
    None
  } else {
    Some(labels[0])
  };

  match candidate {
    Some(label) if !label.is_empty() => label.to_owned(),
    _ => DEFAULT_SUBDOMAIN.to_owned(),
  }
}

fn strip_port(host: &str) -> &str {
  // Bracketed IPv6 literals keep their colons.
  if let Some(rest) = host.strip_prefix('[') {
    return rest.split(']').next().unwrap_or_default();
  }
  host.split(':').next().unwrap_or_default()
}

// ─── Tenant ──────────────────────────────────────────────────────────────────

/// Visual identity shown on the tenant's pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
  pub logo_url:      Option<String>,
  pub primary_color: Option<String>,
}

/// Where citizens send money: bank wire and MonCash details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRouting {
  pub bank_name:           Option<String>,
  pub bank_account_name:   Option<String>,
  pub bank_account_number: Option<String>,
  pub moncash_number:      Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MayorProfile {
  pub mayor_name:      Option<String>,
  pub mayor_photo_url: Option<String>,
  pub mayor_message:   Option<String>,
}

/// A municipality. Created by admin tooling, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
  pub tenant_id:  Uuid,
  pub subdomain:  String,
  pub name:       String,
  pub branding:   Branding,
  pub routing:    PaymentRouting,
  pub mayor:      MayorProfile,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::PortalStore::create_tenant`].
#[derive(Debug, Clone, Default)]
pub struct NewTenant {
  pub subdomain: String,
  pub name:      String,
  pub branding:  Branding,
  pub routing:   PaymentRouting,
  pub mayor:     MayorProfile,
}

impl NewTenant {
  pub fn new(subdomain: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      subdomain: subdomain.into(),
      name: name.into(),
      ..Default::default()
    }
  }
}
