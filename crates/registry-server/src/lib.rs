//! HTTP server wiring for the property registry.
//!
//! Loads [`ServerConfig`], and wraps the [`registry_api`] router with a request
//! deadline, CORS and request tracing. The binary in `main.rs` only parses arguments, opens the
//! store and serves.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::{Router, http::HeaderValue};
use registry_api::{ApiConfig, DEFAULT_BODY_LIMIT};
use registry_core::store::RecordStore;
use serde::Deserialize;
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  timeout::TimeoutLayer,
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment. Every key is optional.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Origins allowed by CORS. Empty (or containing `*`) allows any origin.
  pub trusted_origins:    Vec<String>,
  pub body_limit:         usize,
  pub store_timeout_ms:   u64,
  /// Whole-request deadline; slower requests get `408 Request Timeout`.
  pub request_timeout_ms: u64,
  pub validate_iin:       bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               "0.0.0.0".to_string(),
      port:               4000,
      store_path:         PathBuf::from("registry.db"),
      trusted_origins:    Vec::new(),
      body_limit:         DEFAULT_BODY_LIMIT,
      store_timeout_ms:   5_000,
      request_timeout_ms: 30_000,
      validate_iin:       true,
    }
  }
}

impl ServerConfig {
  /// Layer, lowest precedence first: built-in defaults, the TOML file at
  /// `path` (if present), `REGISTRY_*` variables, then the bare `PORT` and
  /// `DATABASE_URL` variables used by hosting platforms.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    let port = std::env::var("PORT").ok().and_then(|raw| {
      raw
        .parse::<u16>()
        .inspect_err(|e| tracing::warn!(%raw, error = %e, "ignoring PORT"))
        .ok()
    });
    let database_url = std::env::var("DATABASE_URL")
      .ok()
      .filter(|url| !url.is_empty())
      .map(|url| strip_sqlite_scheme(&url).to_owned());

    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("REGISTRY")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("trusted_origins"),
      )
      .set_override_option("port", port.map(i64::from))?
      .set_override_option("store_path", database_url)?
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The store path with a leading `~/` expanded.
  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn api_config(&self) -> ApiConfig {
    ApiConfig {
      body_limit:    self.body_limit,
      store_timeout: Duration::from_millis(self.store_timeout_ms),
      validate_iin:  self.validate_iin,
    }
  }
}

/// Accept `sqlite://path` as well as a bare path.
fn strip_sqlite_scheme(url: &str) -> &str {
  url.strip_prefix("sqlite://").unwrap_or(url)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// CORS policy: any method and header, origins from `trusted_origins`.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
  let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
    AllowOrigin::any()
  } else {
    AllowOrigin::list(origins.iter().filter_map(|origin| {
      HeaderValue::from_str(origin)
        .inspect_err(|_| tracing::warn!(%origin, "ignoring malformed trusted origin"))
        .ok()
    }))
  };

  CorsLayer::new()
    .allow_origin(allow_origin)
    .allow_methods(Any)
    .allow_headers(Any)
}

pub fn timeout_layer(config: &ServerConfig) -> TimeoutLayer {
  TimeoutLayer::new(Duration::from_millis(config.request_timeout_ms))
}

/// The full application: API routes plus request deadline, CORS and
/// per-request tracing.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: RecordStore + 'static,
{
  registry_api::api_router(store, config.api_config())
    .layer(timeout_layer(config))
    .layer(cors_layer(&config.trusted_origins))
    .layer(TraceLayer::new_for_http())
}
