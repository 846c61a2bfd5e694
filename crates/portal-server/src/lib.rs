//! HTTP front for the city portal.
//!
//! Wraps the [`portal_api`] router with tenant resolution, the admin-area
//! guard, request tracing and a page fallback, and owns the server
//! configuration.

pub mod auth;
pub mod error;
pub mod pages;
pub mod tenant;

pub use error::Error;

use std::{path::Path, sync::Arc};

use axum::{Router, middleware, routing::get};
use chrono::Duration;
use portal_api::{ApiState, SessionKeys};
use portal_core::{
  store::PortalStore,
  tenant::{DEFAULT_SUBDOMAIN, NewTenant, Tenant},
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tower_http::trace::TraceLayer;

/// Shortest `AUTH_SECRET` accepted outside local mode.
pub const MIN_SECRET_LEN: usize = 32;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_host() -> String { "0.0.0.0".to_owned() }

fn default_port() -> u16 { 3000 }

fn default_session_ttl_hours() -> i64 { 12 }

/// Runtime server configuration.
///
/// Sources, later ones winning: the TOML file, `PORTAL_*` variables, then the
/// unprefixed `DATABASE_URL`, `ENABLE_LOCAL_MODE` and `AUTH_SECRET`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  pub database_url:      Option<String>,
  #[serde(default)]
  pub enable_local_mode: bool,
  pub auth_secret:       Option<String>,
  #[serde(default = "default_session_ttl_hours")]
  pub session_ttl_hours: i64,
  /// Apex domain tenants hang off, e.g. `portal.ht`. Informational.
  pub root_domain:       Option<String>,
}

impl ServerConfig {
  pub fn load(path: &Path, env: &config::Map<String, String>) -> Result<Self, Error> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("PORTAL")
          .try_parsing(true)
          .source(Some(env.clone())),
      )
      .set_override_option("database_url", env.get("DATABASE_URL").cloned())?
      .set_override_option("enable_local_mode", env.get("ENABLE_LOCAL_MODE").cloned())?
      .set_override_option("auth_secret", env.get("AUTH_SECRET").cloned())?
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn database_url(&self) -> Result<&str, Error> {
    self
      .database_url
      .as_deref()
      .map(str::trim)
      .filter(|url| !url.is_empty())
      .ok_or(Error::MissingDatabaseUrl)
  }

  /// Key material for session signing. Local mode derives a development
  /// secret when none (or a short one) is configured.
  pub fn session_secret(&self) -> Result<Vec<u8>, Error> {
    match self.auth_secret.as_deref().filter(|s| !s.is_empty()) {
      Some(secret) if secret.len() >= MIN_SECRET_LEN => Ok(secret.as_bytes().to_vec()),
      Some(secret) if !self.enable_local_mode => Err(Error::WeakSecret {
        len: secret.len(),
        min: MIN_SECRET_LEN,
      }),
      None if !self.enable_local_mode => Err(Error::MissingSecret),
      _ => {
        tracing::warn!("no usable AUTH_SECRET; using a derived development secret (local mode)");
        let seed = format!("portal-local:{}", self.database_url.as_deref().unwrap_or_default());
        Ok(Sha256::digest(seed.as_bytes()).to_vec())
      }
    }
  }

  pub fn session_ttl(&self) -> Duration { Duration::hours(self.session_ttl_hours.max(1)) }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the server's own middleware and handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub keys:   Arc<SessionKeys>,
  pub config: Arc<ServerConfig>,
}

impl<S> AppState<S> {
  pub fn api_state(&self) -> ApiState<S> {
    ApiState {
      store:       Arc::clone(&self.store),
      keys:        Arc::clone(&self.keys),
      session_ttl: self.config.session_ttl(),
      local_mode:  self.config.enable_local_mode,
    }
  }
}

/// Make sure the `demo` tenant exists; local mode serves it for bare hosts.
pub async fn ensure_demo_tenant<S: PortalStore>(store: &S) -> Result<Tenant, S::Error> {
  if let Some(tenant) = store.tenant_by_subdomain(DEFAULT_SUBDOMAIN.to_owned()).await? {
    return Ok(tenant);
  }
  let tenant = store
    .create_tenant(NewTenant::new(DEFAULT_SUBDOMAIN, "Demo City"))
    .await?;
  tracing::info!(tenant = %tenant.tenant_id, "seeded demo tenant");
  Ok(tenant)
}

// ─── Router ───────────────────────────────────────────────────────────────────

async fn health() -> &'static str { "ok" }

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PortalStore + Clone + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest_service("/api", portal_api::api_router(state.api_state()))
    .fallback(pages::fallback::<S>)
    .layer(middleware::from_fn_with_state(state.clone(), auth::admin_guard::<S>))
    .layer(middleware::from_fn(tenant::resolve_tenant))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use chrono::Utc;
  use portal_core::session::{NewUser, Role, Session};
  use portal_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;

  fn test_config() -> ServerConfig {
    ServerConfig {
      host:              "127.0.0.1".to_string(),
      port:              3000,
      database_url:      Some("sqlite::memory:".to_string()),
      enable_local_mode: false,
      auth_secret:       Some("x".repeat(MIN_SECRET_LEN)),
      session_ttl_hours: 12,
      root_domain:       Some("portal.ht".to_string()),
    }
  }

  async fn make_state() -> AppState<SqliteStore> {
    let config = test_config();
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:  Arc::new(store),
      keys:   Arc::new(SessionKeys::new(&config.session_secret().unwrap()).unwrap()),
      config: Arc::new(config),
    }
  }

  async fn oneshot_raw(
    state:   AppState<SqliteStore>,
    method:  &str,
    uri:     &str,
    headers: Vec<(header::HeaderName, &str)>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::empty()).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  fn env(pairs: &[(&str, &str)]) -> config::Map<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  // ── Routing ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_needs_no_tenant() {
    let state = make_state().await;
    let resp = oneshot_raw(state, "GET", "/health", vec![(header::HOST, "nowhere.portal.ht")]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "ok");
  }

  #[tokio::test]
  async fn unknown_tenant_page_is_html_404() {
    let state = make_state().await;
    let resp = oneshot_raw(state, "GET", "/fr/pay", vec![(header::HOST, "nowhere.portal.ht")]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap().to_owned();
    assert!(ct.starts_with("text/html"), "content-type: {ct}");
    assert!(body_text(resp).await.contains("Tenant not found"));
  }

  #[tokio::test]
  async fn unknown_tenant_api_is_json_404() {
    let state = make_state().await;
    let resp = oneshot_raw(state, "GET", "/api/tenant", vec![(header::HOST, "nowhere.portal.ht")]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(body["error"], "Tenant not found");
  }

  #[tokio::test]
  async fn client_tenant_header_is_overwritten() {
    let state = make_state().await;
    state.store.create_tenant(NewTenant::new("jacmel", "Jacmel")).await.unwrap();
    state.store.create_tenant(NewTenant::new("pap", "Port-au-Prince")).await.unwrap();

    let resp = oneshot_raw(
      state,
      "GET",
      "/api/tenant",
      vec![
        (header::HOST, "jacmel.portal.ht"),
        (header::HeaderName::from_static("x-tenant-subdomain"), "pap"),
      ],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(body["data"]["subdomain"], "jacmel");
  }

  #[tokio::test]
  async fn bare_localhost_is_the_demo_tenant() {
    let state = make_state().await;
    ensure_demo_tenant(state.store.as_ref()).await.unwrap();
    let resp = oneshot_raw(state, "GET", "/api/tenant", vec![(header::HOST, "localhost:3000")]).await;
    let body: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(body["data"]["subdomain"], "demo");
  }

  // ── Admin guard ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_page_redirects_to_login() {
    let state = make_state().await;
    let resp = oneshot_raw(
      state,
      "GET",
      "/fr/admin/finance?tab=audit",
      vec![(header::HOST, "jacmel.portal.ht")],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
      resp.headers().get(header::LOCATION).unwrap(),
      "/login?callbackUrl=%2Ffr%2Fadmin%2Ffinance%3Ftab%3Daudit"
    );
  }

  #[tokio::test]
  async fn admin_api_without_session_is_401_json() {
    let state = make_state().await;
    let resp = oneshot_raw(
      state,
      "GET",
      "/api/admin/payments",
      vec![(header::HOST, "jacmel.portal.ht")],
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unauthorized");
  }

  #[tokio::test]
  async fn valid_session_passes_the_guard() {
    let state = make_state().await;
    let tenant = state.store.create_tenant(NewTenant::new("jacmel", "Jacmel")).await.unwrap();
    let user = state
      .store
      .create_user(tenant.tenant_id, NewUser {
        email:         "maire@jacmel.ht".into(),
        name:          "Maire".into(),
        role:          Role::Admin,
        section_id:    None,
        password_hash: String::new(),
      })
      .await
      .unwrap();
    let token = state
      .keys
      .sign(&Session::for_user(&user, Utc::now() + Duration::hours(1)))
      .unwrap();
    let cookie = format!("{}={token}", portal_api::token::SESSION_COOKIE);

    let resp = oneshot_raw(
      state,
      "GET",
      "/admin/finance",
      vec![(header::HOST, "jacmel.portal.ht"), (header::COOKIE, cookie.as_str())],
    )
    .await;
    assert_ne!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Configuration ───────────────────────────────────────────────────────────

  #[test]
  fn config_defaults_and_overrides() {
    let path = Path::new("/nonexistent/portal.toml");
    let cfg = ServerConfig::load(path, &env(&[
      ("DATABASE_URL", "sqlite://portal.db"),
      ("PORTAL_PORT", "8080"),
      ("PORTAL_DATABASE_URL", "sqlite://ignored.db"),
      ("ENABLE_LOCAL_MODE", "true"),
    ]))
    .unwrap();
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.database_url().unwrap(), "sqlite://portal.db");
    assert!(cfg.enable_local_mode);
    assert_eq!(cfg.session_ttl(), Duration::hours(12));
  }

  #[test]
  fn missing_database_url_fails() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/portal.toml"), &env(&[])).unwrap();
    assert!(matches!(cfg.database_url(), Err(Error::MissingDatabaseUrl)));
  }

  #[test]
  fn secret_rules() {
    let mut cfg = test_config();
    assert_eq!(cfg.session_secret().unwrap().len(), MIN_SECRET_LEN);

    cfg.auth_secret = Some("short".into());
    assert!(matches!(cfg.session_secret(), Err(Error::WeakSecret { len: 5, .. })));

    cfg.auth_secret = None;
    assert!(matches!(cfg.session_secret(), Err(Error::MissingSecret)));

    cfg.enable_local_mode = true;
    let derived = cfg.session_secret().unwrap();
    assert_eq!(derived.len(), 32);
    assert_eq!(derived, cfg.session_secret().unwrap());
  }

  #[tokio::test]
  async fn demo_tenant_seed_is_idempotent() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let first = ensure_demo_tenant(&store).await.unwrap();
    let second = ensure_demo_tenant(&store).await.unwrap();
    assert_eq!(first.tenant_id, second.tenant_id);
    assert_eq!(first.subdomain, DEFAULT_SUBDOMAIN);
  }
}
