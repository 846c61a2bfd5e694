//! portal server binary.
//!
//! Reads `portal.toml` (or the path given with `--config`) plus the
//! environment, opens the SQLite store named by `DATABASE_URL`, and serves the
//! portal over HTTP until Ctrl-C or SIGTERM.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for seeding a staff account:
//!
//! ```
//! cargo run -p portal-server --bin server -- --hash-password
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use portal_api::SessionKeys;
use portal_server::{AppState, ServerConfig, ensure_demo_tenant};
use portal_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Haiti city portal server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "portal.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let env: config::Map<String, String> = std::env::vars().collect();
  let server_cfg = ServerConfig::load(&cli.config, &env)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;
  let database_url = server_cfg.database_url()?.to_owned();
  let secret = server_cfg.session_secret()?;
  let keys = SessionKeys::new(&secret).map_err(|e| anyhow::anyhow!("invalid session key: {e}"))?;

  let store = SqliteStore::connect(&database_url)
    .await
    .with_context(|| format!("failed to open store at {database_url:?}"))?;
  if server_cfg.enable_local_mode {
    tracing::warn!("local mode enabled: sample data is served where tables are empty");
    ensure_demo_tenant(&store)
      .await
      .context("failed to seed the demo tenant")?;
  }

  let state = AppState {
    store:  Arc::new(store.clone()),
    keys:   Arc::new(keys),
    config: Arc::new(server_cfg.clone()),
  };

  let app = portal_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  store.close().await.context("failed to close the store")?;
  tracing::info!("store closed, bye");
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };
  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => {}
    () = terminate => {}
  }
  tracing::info!("shutdown requested");
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
