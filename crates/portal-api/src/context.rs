//! Request extractors: the resolved tenant and the caller's session.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::Utc;
use portal_core::{
  Error as CoreError,
  session::Session,
  store::PortalStore,
  tenant::{TENANT_HEADER, Tenant, resolve_subdomain},
};

use crate::{ApiState, error::ApiError, token::SESSION_COOKIE};

// ─── Tenant ──────────────────────────────────────────────────────────────────

/// The tenant every query of this request is scoped to.
///
/// Read from the propagated `x-tenant-subdomain` header; when the router runs
/// without the resolving middleware the `Host` header is resolved directly.
#[derive(Debug, Clone)]
pub struct TenantContext(pub Tenant);

pub(crate) fn subdomain_of(headers: &HeaderMap) -> String {
  if let Some(sub) = headers.get(TENANT_HEADER).and_then(|v| v.to_str().ok()) {
    return sub.to_owned();
  }
  let host = headers
    .get(header::HOST)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default();
  resolve_subdomain(host)
}

impl<S> FromRequestParts<ApiState<S>> for TenantContext
where
  S: PortalStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    let subdomain = subdomain_of(&parts.headers);
    let tenant = state
      .store
      .tenant_by_subdomain(subdomain.clone())
      .await
      .map_err(ApiError::store)?
      .ok_or(CoreError::TenantNotFound(subdomain))?;
    Ok(TenantContext(tenant))
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Pull the raw token from the session cookie or an `Authorization: Bearer`
/// header, in that order.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
  let from_cookie = headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == SESSION_COOKIE)
    .map(|(_, value)| value.to_owned());
  from_cookie.or_else(|| {
    headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.strip_prefix("Bearer "))
      .map(|t| t.trim().to_owned())
  })
}

/// The caller's verified session, if any.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

impl<S> FromRequestParts<ApiState<S>> for MaybeSession
where
  S: PortalStore + Clone + 'static,
{
  type Rejection = std::convert::Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    let session = session_token(&parts.headers)
      .and_then(|token| state.keys.verify(&token, Utc::now()));
    Ok(MaybeSession(session))
  }
}

/// A verified session; rejects with 401 otherwise. Role and tenant checks are
/// left to the handler, which knows what the action requires.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Session);

impl<S> FromRequestParts<ApiState<S>> for Authenticated
where
  S: PortalStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    let MaybeSession(session) = MaybeSession::from_request_parts(parts, state)
      .await
      .unwrap_or_else(|never| match never {});
    match session {
      Some(s) => Ok(Authenticated(s)),
      None => {
        tracing::warn!(path = %parts.uri.path(), "missing or invalid session");
        Err(CoreError::Unauthorized.into())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  #[test]
  fn cookie_wins_over_bearer() {
    let mut h = HeaderMap::new();
    h.insert(header::COOKIE, HeaderValue::from_static("theme=dark; portal_session=abc.def"));
    h.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer other"));
    assert_eq!(session_token(&h).as_deref(), Some("abc.def"));
  }

  #[test]
  fn bearer_is_used_without_cookie() {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok.sig"));
    assert_eq!(session_token(&h).as_deref(), Some("tok.sig"));
    assert!(session_token(&HeaderMap::new()).is_none());
  }

  #[test]
  fn propagated_header_beats_host() {
    let mut h = HeaderMap::new();
    h.insert(header::HOST, HeaderValue::from_static("jacmel.portal.ht"));
    assert_eq!(subdomain_of(&h), "jacmel");
    h.insert(TENANT_HEADER, HeaderValue::from_static("pap"));
    assert_eq!(subdomain_of(&h), "pap");
  }
}
