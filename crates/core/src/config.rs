//! Layered application configuration.
//!
//! Values come from, in increasing precedence: built-in defaults,
//! `config/default.toml`, `config/{ARKAIOS_ENV}.toml`, `config/local.toml`,
//! `ARKAIOS__SECTION__KEY` environment variables and finally the well-known
//! platform variables (`KV_REST_API_URL`, `REDIS_URL`, ...).

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::Result;

/// Alternate names under which a Redis connection string may be provided.
pub const REDIS_URL_VARS: [&str; 3] = ["REDIS_URL", "KV_REDIS_URL", "VERCEL_REDIS_URL"];

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub autopilot: AutopilotConfig,
    pub identity: IdentityConfig,
    pub logging: LoggingConfig,
    pub deployment: DeploymentConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8787,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// REST key-value endpoint, e.g. `https://example.upstash.io`.
    pub rest_kv_url: Option<String>,
    /// Bearer token for the REST key-value endpoint.
    pub rest_kv_token: Option<Secret<String>>,
    /// Redis connection string.
    pub redis_url: Option<String>,
    /// Directory holding the filesystem fallback files.
    pub file_dir: PathBuf,
    /// File name prefix for the filesystem fallback files.
    pub file_prefix: String,
    /// Set to false to never touch the local filesystem.
    pub filesystem_enabled: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            rest_kv_url: None,
            rest_kv_token: None,
            redis_url: None,
            file_dir: std::env::temp_dir(),
            file_prefix: "arkaios_".into(),
            filesystem_enabled: true,
        }
    }
}

impl StoreConfig {
    /// REST-KV endpoint and token, only when both are configured.
    pub fn rest_kv_credentials(&self) -> Option<(&str, &Secret<String>)> {
        let url = self.rest_kv_url.as_deref().filter(|u| !u.trim().is_empty())?;
        let token = self
            .rest_kv_token
            .as_ref()
            .filter(|t| !t.expose_secret().trim().is_empty())?;
        Some((url, token))
    }

    /// Redis connection string, when configured.
    pub fn redis_connection(&self) -> Option<&str> {
        self.redis_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AutopilotConfig {
    /// Value reported when no backend has ever been written.
    pub default_enabled: bool,
    /// Emergency marker file written on force stop.
    pub stop_marker_path: Option<PathBuf>,
    /// Optional JSON policy file mirrored on every change.
    pub policy_path: Option<PathBuf>,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            default_enabled: true,
            stop_marker_path: None,
            policy_path: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IdentityConfig {
    pub tokeninfo_url: String,
    /// Expected `aud` claim. Unchecked when unset.
    pub audience: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            tokeninfo_url: "https://oauth2.googleapis.com/tokeninfo".into(),
            audience: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
    pub filter: Option<String>,
}

/// Build/deployment information echoed in response metadata.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DeploymentConfig {
    pub env: Option<String>,
    pub git_commit_sha: Option<String>,
    pub git_commit_message: Option<String>,
    pub git_branch: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let env = std::env::var("ARKAIOS_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map ARKAIOS__SERVER__PORT=3000 to server.port
            .add_source(
                Environment::with_prefix("ARKAIOS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: AppConfig = s.try_deserialize()?;
        cfg.apply_platform_env(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Overlay the well-known platform variables on top of the layered config.
    ///
    /// Empty values count as unset.
    pub fn apply_platform_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("KV_REST_API_URL") {
            self.store.rest_kv_url = Some(url.trim_end_matches('/').to_string());
        }
        if let Some(token) = get("KV_REST_API_TOKEN") {
            self.store.rest_kv_token = Some(Secret::new(token));
        }
        if let Some(url) = REDIS_URL_VARS.iter().find_map(|name| get(name)) {
            self.store.redis_url = Some(url);
        }
        if let Some(dir) = get("AUTOPILOT_FILE_DIR") {
            self.store.file_dir = PathBuf::from(dir);
        }

        match get("AUTOPILOT_ENABLED").as_deref() {
            Some("true") => self.autopilot.default_enabled = true,
            Some("false") => self.autopilot.default_enabled = false,
            _ => {}
        }
        if let Some(path) = get("AUTOPILOT_STOP_FILE") {
            self.autopilot.stop_marker_path = Some(PathBuf::from(path));
        }
        if let Some(path) = get("AUTOPILOT_POLICY_FILE") {
            self.autopilot.policy_path = Some(PathBuf::from(path));
        }

        if let Some(aud) = get("GOOGLE_OAUTH_CLIENT_ID").or_else(|| get("VITE_GOOGLE_OAUTH_CLIENT_ID")) {
            self.identity.audience = Some(aud);
        }

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT")
            .or_else(|| get("AUTOPILOT_PORT"))
            .and_then(|p| p.parse().ok())
        {
            self.server.port = port;
        }

        if let Some(v) = get("VERCEL_ENV") {
            self.deployment.env = Some(v);
        }
        if let Some(v) = get("VERCEL_GIT_COMMIT_SHA") {
            self.deployment.git_commit_sha = Some(v);
        }
        if let Some(v) = get("VERCEL_GIT_COMMIT_MESSAGE") {
            self.deployment.git_commit_message = Some(v);
        }
        if let Some(v) = get("VERCEL_GIT_COMMIT_REF") {
            self.deployment.git_branch = Some(v);
        }
    }
}
