//! Tenants and their staff accounts.

use chrono::Utc;
use portal_core::{
  Error as CoreError,
  session::{NewUser, User},
  tenant::{NewTenant, Tenant},
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  encode::{encode_dt, encode_uuid},
  error::{on_unique, refuse},
  rows::{self, TENANT_COLUMNS, USER_COLUMNS},
};

pub fn create_tenant(conn: &Connection, input: NewTenant) -> tokio_rusqlite::Result<Tenant> {
  let subdomain = input.subdomain.trim().to_ascii_lowercase();
  if subdomain.is_empty()
    || !subdomain.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
  {
    return Err(refuse(CoreError::validation("subdomain", "letters, digits and dashes only")));
  }
  let tenant = Tenant {
    tenant_id:  Uuid::new_v4(),
    subdomain,
    name:       input.name,
    branding:   input.branding,
    routing:    input.routing,
    mayor:      input.mayor,
    created_at: Utc::now(),
  };

  conn
    .execute(
      "INSERT INTO tenants (
         tenant_id, subdomain, name, logo_url, primary_color,
         bank_name, bank_account_name, bank_account_number, moncash_number,
         mayor_name, mayor_photo_url, mayor_message, created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
      params![
        encode_uuid(tenant.tenant_id),
        tenant.subdomain,
        tenant.name,
        tenant.branding.logo_url,
        tenant.branding.primary_color,
        tenant.routing.bank_name,
        tenant.routing.bank_account_name,
        tenant.routing.bank_account_number,
        tenant.routing.moncash_number,
        tenant.mayor.mayor_name,
        tenant.mayor.mayor_photo_url,
        tenant.mayor.mayor_message,
        encode_dt(tenant.created_at),
      ],
    )
    .map_err(on_unique("subdomain"))?;

  Ok(tenant)
}

pub fn by_subdomain(conn: &Connection, subdomain: String) -> tokio_rusqlite::Result<Option<Tenant>> {
  Ok(
    conn
      .query_row(
        &format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE subdomain = ?1"),
        params![subdomain.trim().to_ascii_lowercase()],
        rows::tenant,
      )
      .optional()?,
  )
}

pub fn create_user(
  conn: &Connection,
  tenant_id: Uuid,
  input: NewUser,
) -> tokio_rusqlite::Result<User> {
  let email = input.email.trim().to_ascii_lowercase();
  if !email.contains('@') {
    return Err(refuse(CoreError::validation("email", "a valid email address is required")));
  }
  let user = User {
    user_id: Uuid::new_v4(),
    tenant_id,
    email,
    name: input.name,
    role: input.role,
    section_id: input.section_id,
    password_hash: input.password_hash,
  };

  conn
    .execute(
      "INSERT INTO users (user_id, tenant_id, email, name, role, section_id, password_hash)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      params![
        encode_uuid(user.user_id),
        encode_uuid(tenant_id),
        user.email,
        user.name,
        user.role.to_string(),
        user.section_id.map(encode_uuid),
        user.password_hash,
      ],
    )
    .map_err(on_unique("user email"))?;

  Ok(user)
}

pub fn user_by_email(
  conn: &Connection,
  tenant_id: Uuid,
  email: String,
) -> tokio_rusqlite::Result<Option<User>> {
  Ok(
    conn
      .query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE tenant_id = ?1 AND email = ?2"),
        params![encode_uuid(tenant_id), email.trim().to_ascii_lowercase()],
        rows::user,
      )
      .optional()?,
  )
}
