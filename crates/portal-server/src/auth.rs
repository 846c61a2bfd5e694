//! Admin-area guard.
//!
//! Paths under `/admin`, `/{locale}/admin` and `/api/admin` need a valid
//! session. Pages redirect to the login form with the original target as
//! `callbackUrl`; the API answers 401 JSON. Role and tenant checks happen in
//! the handlers.

use axum::{
  extract::{Request, State},
  http::Uri,
  middleware::Next,
  response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use portal_api::{ApiError, context::session_token};
use portal_core::{Error as CoreError, store::PortalStore};

use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminArea {
  Page,
  Api,
}

/// Classify `path`; `None` for public paths.
pub fn admin_area(path: &str) -> Option<AdminArea> {
  let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
  match segments.as_slice() {
    ["api", "admin", ..] => Some(AdminArea::Api),
    ["api", ..] => None,
    ["admin", ..] | [_, "admin", ..] => Some(AdminArea::Page),
    _ => None,
  }
}

/// `/login?callbackUrl=<percent-encoded path and query>`
pub fn login_location(uri: &Uri) -> String {
  let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
  format!("/login?callbackUrl={}", urlencoding::encode(target))
}

pub async fn admin_guard<S>(State(state): State<AppState<S>>, req: Request, next: Next) -> Response
where
  S: PortalStore + Clone + 'static,
{
  let Some(area) = admin_area(req.uri().path()) else {
    return next.run(req).await;
  };
  let session = session_token(req.headers()).and_then(|t| state.keys.verify(&t, Utc::now()));
  if session.is_some() {
    return next.run(req).await;
  }

  tracing::warn!(path = %req.uri().path(), "admin area requested without a session");
  match area {
    AdminArea::Api => ApiError::from(CoreError::Unauthorized).into_response(),
    AdminArea::Page => Redirect::to(&login_location(req.uri())).into_response(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classifies_admin_paths() {
    assert_eq!(admin_area("/admin"), Some(AdminArea::Page));
    assert_eq!(admin_area("/admin/finance"), Some(AdminArea::Page));
    assert_eq!(admin_area("/fr/admin/finance"), Some(AdminArea::Page));
    assert_eq!(admin_area("/api/admin/payments"), Some(AdminArea::Api));
  }

  #[test]
  fn public_paths_pass() {
    for path in ["/", "/pay", "/fr/pay", "/api/payments", "/api/ledger", "/administration", "/fr/pay/admin"] {
      assert_eq!(admin_area(path), None, "{path}");
    }
  }

  #[test]
  fn callback_keeps_path_and_query() {
    let uri: Uri = "/fr/admin/finance?tab=audit".parse().unwrap();
    assert_eq!(
      login_location(&uri),
      "/login?callbackUrl=%2Ffr%2Fadmin%2Ffinance%3Ftab%3Daudit"
    );
  }
}
