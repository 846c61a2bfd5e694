//! Staff login, logout and session introspection.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Body: `{"email":"...","password":"..."}`; sets the session cookie |
//! | `POST` | `/auth/logout` | Clears the cookie |
//! | `GET`  | `/auth/session` | Current claims or `null` |

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  Json,
  extract::State,
  http::{HeaderValue, header},
  response::{IntoResponse, Response},
};
use chrono::Utc;
use portal_core::{Error as CoreError, session::Session, store::PortalStore};
use serde::{Deserialize, Serialize};

use crate::{
  ApiState,
  context::{MaybeSession, TenantContext},
  error::{ApiError, Success},
  token::SESSION_COOKIE,
};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginReply {
  pub token:   String,
  pub session: Session,
}

/// Check a password against an argon2 PHC string.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

fn session_cookie(token: &str, max_age: i64) -> Option<HeaderValue> {
  HeaderValue::from_str(&format!(
    "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
  ))
  .ok()
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<ApiState<S>>,
  TenantContext(tenant): TenantContext,
  Json(body): Json<LoginBody>,
) -> Result<Response, ApiError>
where
  S: PortalStore + Clone + 'static,
{
  let user = state
    .store
    .user_by_email(tenant.tenant_id, body.email.clone())
    .await
    .map_err(ApiError::store)?;
  let Some(user) = user.filter(|u| verify_password(&body.password, &u.password_hash)) else {
    tracing::warn!(tenant = %tenant.subdomain, email = %body.email, "login failed");
    return Err(CoreError::Unauthorized.into());
  };

  let session = Session::for_user(&user, Utc::now() + state.session_ttl);
  let token = state
    .keys
    .sign(&session)
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  tracing::info!(tenant = %tenant.subdomain, user = %user.user_id, role = %user.role, "login");

  let mut resp = Success::ok(LoginReply { token: token.clone(), session }).into_response();
  if let Some(cookie) = session_cookie(&token, state.session_ttl.num_seconds()) {
    resp.headers_mut().insert(header::SET_COOKIE, cookie);
  }
  Ok(resp)
}

/// `POST /auth/logout`
pub async fn logout() -> Response {
  let mut resp = Success::ok(()).into_response();
  if let Some(cookie) = session_cookie("", 0) {
    resp.headers_mut().insert(header::SET_COOKIE, cookie);
  }
  resp
}

/// `GET /auth/session`
pub async fn current(MaybeSession(session): MaybeSession) -> Success<Option<Session>> {
  Success::ok(session)
}
