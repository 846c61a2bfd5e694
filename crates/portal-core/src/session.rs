//! Users, roles and session claims.
//!
//! A [`Session`] is a capability scoped to one tenant and one role. Its claims
//! are trusted once the signature checks out; privileged writes still verify
//! the target record's tenant in the store before mutating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, tenant::Tenant};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  Admin,
  Staff,
  Citizen,
}

impl Role {
  pub fn is_staff(self) -> bool { matches!(self, Self::Admin | Self::Staff) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub tenant_id:  Uuid,
  pub email:      String,
  pub name:       String,
  pub role:       Role,
  pub section_id: Option<Uuid>,
  /// Argon2 PHC string.
  #[serde(skip_serializing)]
  pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub name:          String,
  pub role:          Role,
  pub section_id:    Option<Uuid>,
  pub password_hash: String,
}

/// Claims carried by a signed session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
  pub id:                  Uuid,
  pub role:                Role,
  pub tenant_id:           Uuid,
  pub communal_section_id: Option<Uuid>,
  #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
  pub expires_at:          DateTime<Utc>,
}

impl Session {
  pub fn for_user(user: &User, expires_at: DateTime<Utc>) -> Self {
    Self {
      id: user.user_id,
      role: user.role,
      tenant_id: user.tenant_id,
      communal_section_id: user.section_id,
      expires_at,
    }
  }

  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { self.expires_at <= now }

  /// Require an admin of `tenant`.
  pub fn require_admin(&self, tenant: &Tenant) -> Result<()> {
    if self.role != Role::Admin || self.tenant_id != tenant.tenant_id {
      return Err(Error::Unauthorized);
    }
    Ok(())
  }

  /// Require an admin or staff member of `tenant`.
  pub fn require_staff(&self, tenant: &Tenant) -> Result<()> {
    if !self.role.is_staff() || self.tenant_id != tenant.tenant_id {
      return Err(Error::Unauthorized);
    }
    Ok(())
  }
}
