//! HTTP server assembly for the student roster.
//!
//! Holds the runtime configuration, opens the store, and wraps the
//! [`roster_api`] router with CORS, request tracing and a JSON 404 fallback.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{
  Json, Router,
  http::{
    HeaderValue, Method, StatusCode, Uri,
    header::{AUTHORIZATION, CONTENT_TYPE, InvalidHeaderValue},
  },
  routing::get,
};
use config::{ConfigError, Environment, File, Source};
use roster_core::{Argon2Hasher, CredentialHasher, Roster, StudentStore};
use roster_store_sqlite::SqliteStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROSTER_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite file; `:memory:` for a throwaway in-memory database.
  pub store_path: PathBuf,
  pub hashing:    HashingConfig,
  pub cors:       CorsConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       3000,
      store_path: PathBuf::from("roster.db"),
      hashing:    HashingConfig::default(),
      cors:       CorsConfig::default(),
    }
  }
}

/// argon2id work factor. Fixed for the lifetime of the process.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct HashingConfig {
  pub memory_kib:  u32,
  pub iterations:  u32,
  pub parallelism: u32,
}

impl Default for HashingConfig {
  fn default() -> Self {
    Self {
      memory_kib:  19 * 1024,
      iterations:  2,
      parallelism: 1,
    }
  }
}

impl HashingConfig {
  pub fn hasher(&self) -> roster_core::Result<Argon2Hasher> {
    Argon2Hasher::new(self.memory_kib, self.iterations, self.parallelism)
  }
}

/// Cross-origin access for browser clients served from another origin.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CorsConfig {
  pub enabled:         bool,
  /// Exact origins allowed to call the API. Empty allows any origin.
  pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
  fn default() -> Self {
    Self {
      enabled:         true,
      allowed_origins: Vec::new(),
    }
  }
}

impl CorsConfig {
  /// The layer to install, or `None` when CORS is disabled.
  pub fn layer(&self) -> Result<Option<CorsLayer>, InvalidHeaderValue> {
    if !self.enabled {
      return Ok(None);
    }
    let origin = if self.allowed_origins.is_empty() {
      AllowOrigin::any()
    } else {
      let origins = self
        .allowed_origins
        .iter()
        .map(|o| HeaderValue::from_str(o))
        .collect::<Result<Vec<_>, _>>()?;
      AllowOrigin::list(origins)
    };
    let layer = CorsLayer::new()
      .allow_origin(origin)
      .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
      .allow_headers([CONTENT_TYPE, AUTHORIZATION]);
    Ok(Some(layer))
  }
}

/// `ROSTER_*` variables; nested keys use `__`, e.g. `ROSTER_HASHING__ITERATIONS`.
pub fn env_source() -> Environment {
  Environment::with_prefix("ROSTER")
    .prefix_separator("_")
    .separator("__")
}

/// Load the configuration file at `path` (optional) under [`env_source`].
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
  read_config(File::from(path).required(false), env_source())
}

/// Layer `env` over `file` and deserialise, filling gaps with defaults.
pub fn read_config<F>(file: F, env: Environment) -> Result<ServerConfig, ConfigError>
where
  F: Source + Send + Sync + 'static,
{
  config::Config::builder()
    .add_source(file)
    .add_source(env)
    .build()?
    .try_deserialize()
}

// ─── Store ────────────────────────────────────────────────────────────────────

/// Open the configured store, expanding a leading `~/`.
pub async fn open_store(path: &Path) -> roster_store_sqlite::Result<SqliteStore> {
  if path == Path::new(":memory:") {
    return SqliteStore::open_in_memory().await;
  }
  SqliteStore::open(expand_tilde(path)).await
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: the API under `/api`, a banner at `/`,
/// and a JSON 404 for everything else.
pub fn app<S, H>(roster: Arc<Roster<S, H>>, cors: Option<CorsLayer>) -> Router
where
  S: StudentStore + 'static,
  H: CredentialHasher + 'static,
{
  let router = Router::new()
    .route("/", get(|| async { "Student roster API" }))
    .nest("/api", roster_api::api_router(roster))
    .fallback(not_found);
  let router = match cors {
    Some(cors) => router.layer(cors),
    None => router,
  };
  router.layer(TraceLayer::new_for_http())
}

async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
  (
    StatusCode::NOT_FOUND,
    Json(json!({
      "error": format!("invalid path: {uri}"),
      "kind":  "not_found",
    })),
  )
}
