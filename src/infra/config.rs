//! Centralized configuration (environment variables + defaults).
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. Every variable has a default, so an empty environment yields a
//! working local setup.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context};

use crate::app::certificate_service::DEFAULT_ISSUER;
use crate::crypto::TokenCodec;

/// Which `CertificateApi` implementation clients use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process store, lost when the process exits.
    Memory,
    /// JSON snapshot file private to this client.
    Local,
    /// The HTTP API server.
    Remote,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Local => "local",
            BackendKind::Remote => "remote",
        }
    }
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mock" => Ok(BackendKind::Memory),
            "local" | "local-storage" => Ok(BackendKind::Local),
            "remote" | "http" => Ok(BackendKind::Remote),
            other => Err(anyhow!("expected memory, local or remote, got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
    /// JSON when stderr is not a terminal.
    Auto,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "auto" => Ok(LogFormat::Auto),
            other => Err(anyhow!("expected text, json or auto, got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: BackendKind,
    /// Base URL of the API server for the remote backend.
    pub api_url: String,
    pub local_db_path: PathBuf,
    pub session_path: PathBuf,
    /// HS256 key; `None` means a random key per process.
    pub token_secret: Option<String>,
    pub token_ttl_secs: i64,
    pub default_issuer: String,
    /// Require bearer tokens with a suitable role on issue and verify.
    pub enforce_roles: bool,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            backend: BackendKind::Local,
            api_url: "http://localhost:4000".to_string(),
            local_db_path: PathBuf::from("acadi-mockdb.json"),
            session_path: PathBuf::from("acadi-auth.json"),
            token_secret: None,
            token_ttl_secs: 3600,
            default_issuer: DEFAULT_ISSUER.to_string(),
            enforce_roles: false,
            log_format: LogFormat::Auto,
        }
    }
}

impl Config {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Config::default();

        if let Some(v) = get("HOST") {
            cfg.host = v;
        }
        if let Some(v) = get("PORT") {
            cfg.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = get("CERT_BACKEND") {
            cfg.backend = parse_var("CERT_BACKEND", &v)?;
        }
        if let Some(v) = get("CERT_API_URL") {
            cfg.api_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("CERT_LOCAL_DB") {
            cfg.local_db_path = PathBuf::from(v);
        }
        if let Some(v) = get("CERT_SESSION_FILE") {
            cfg.session_path = PathBuf::from(v);
        }
        cfg.token_secret = get("CERT_TOKEN_SECRET");
        if let Some(v) = get("CERT_TOKEN_TTL_SECS") {
            cfg.token_ttl_secs = parse_var::<u32>("CERT_TOKEN_TTL_SECS", &v)?.max(1) as i64;
        }
        if let Some(v) = get("CERT_DEFAULT_ISSUER") {
            cfg.default_issuer = v;
        }
        if let Some(v) = get("CERT_ENFORCE_ROLES") {
            cfg.enforce_roles = parse_bool("CERT_ENFORCE_ROLES", &v)?;
        }
        if let Some(v) = get("LOG_FORMAT") {
            cfg.log_format = parse_var("LOG_FORMAT", &v)?;
        }
        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Token codec keyed by `CERT_TOKEN_SECRET`, or by a per-process random key.
    pub fn token_codec(&self) -> TokenCodec {
        match &self.token_secret {
            Some(secret) => TokenCodec::new(secret.as_bytes(), self.token_ttl_secs),
            None => TokenCodec::with_random_key(self.token_ttl_secs),
        }
    }
}

fn parse_var<T>(name: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow!("{}", e))
        .with_context(|| format!("{} has an invalid value '{}'", name, raw))
}

fn parse_bool(name: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("{} must be a boolean, got '{}'", name, raw)),
    }
}
