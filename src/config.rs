//! Configuration loading with env-var overrides.
//!
//! Reads the file given on the command line, else the one named by
//! `ARCANA_CONFIG`, else `config/default.toml`, then applies `ARCANA_BIND` and
//! `ARCANA_LOG_LEVEL` env overrides. Secrets never come from TOML:
//! `LLM_API_KEY`, `WEB_APP_USERNAME` and `WEB_APP_PASSWORD` are read from the
//! environment only.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;
use crate::logger;

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the HTTP listener to.
    pub bind: String,
}

/// OpenAI / OpenAI-compatible provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model (or deployment) name passed in the request body.
    pub model: String,
    /// Sampling temperature (ignored for models that forbid it).
    pub temperature: f32,
    /// TCP connect timeout. Streams themselves are not time-limited.
    pub connect_timeout_seconds: u64,
    /// Header carrying the API key instead of `Authorization: Bearer`
    /// (e.g. `api-key` for Azure).
    pub api_key_header: Option<String>,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"openai"`, `"dummy"`, `"none"`).
    /// Maps to `default` in `[llm]` TOML.
    pub provider: String,
    /// Config for the OpenAI-compatible provider (`[llm.openai]`).
    pub openai: OpenAiConfig,
}

impl LlmConfig {
    /// Model identifier handed to the provider on every request.
    pub fn model(&self) -> &str {
        &self.openai.model
    }
}

/// Grounding-context retrieval configuration.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Directory of `.md` / `.txt` documents. `None` disables retrieval.
    pub docs_dir: Option<PathBuf>,
    /// Maximum number of passages joined into the context.
    pub top_k: usize,
    /// Upper bound on the context length in characters.
    pub max_chars: usize,
}

/// HTTP Basic credentials guarding the pages and the chat endpoint.
///
/// Built once at startup; the auth decision is a pure function of this value.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub require_auth: bool,
    pub username: String,
    pub password: String,
}

impl AuthConfig {
    /// Auth is required only when both credentials are present and non-empty.
    pub fn from_credentials(username: Option<String>, password: Option<String>) -> Self {
        match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => {
                Self { require_auth: true, username: u, password: p }
            }
            _ => Self::disabled(),
        }
    }

    pub fn disabled() -> Self {
        Self { require_auth: false, username: String::new(), password: String::new() }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("require_auth", &self.require_auth)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// Append logs to this file instead of stderr (`APP_LOG_FILE`).
    pub log_file: Option<PathBuf>,
    pub server: ServerConfig,
    pub llm: LlmConfig,
    /// API key from `LLM_API_KEY` env var, `None` for keyless local models.
    pub llm_api_key: Option<String>,
    pub retrieval: RetrievalConfig,
    pub auth: AuthConfig,
}

/// Values normally taken from the environment. Tests fill this in directly
/// instead of mutating env vars.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub bind: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    pub llm_api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            bind: env::var("ARCANA_BIND").ok(),
            log_level: env::var("ARCANA_LOG_LEVEL").ok(),
            log_file: env::var("APP_LOG_FILE").ok().filter(|s| !s.is_empty()),
            llm_api_key: env::var("LLM_API_KEY").ok().filter(|s| !s.is_empty()),
            username: env::var("WEB_APP_USERNAME").ok(),
            password: env::var("WEB_APP_PASSWORD").ok(),
        }
    }
}

/// Raw TOML shape: `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    retrieval: RawRetrieval,
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default = "default_bind")]
    bind: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { bind: default_bind(), log_level: default_log_level() }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_temperature")]
    temperature: f32,
    #[serde(default = "default_connect_timeout_seconds")]
    connect_timeout_seconds: u64,
    #[serde(default)]
    api_key_header: Option<String>,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            api_key_header: None,
        }
    }
}

#[derive(Deserialize)]
struct RawRetrieval {
    #[serde(default)]
    docs_dir: Option<String>,
    #[serde(default = "default_top_k")]
    top_k: usize,
    #[serde(default = "default_max_chars")]
    max_chars: usize,
}

impl Default for RawRetrieval {
    fn default() -> Self {
        Self { docs_dir: None, top_k: default_top_k(), max_chars: default_max_chars() }
    }
}

fn default_bind() -> String { "127.0.0.1:8000".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_llm_provider() -> String { "dummy".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "gpt-4o-mini".to_string() }
fn default_openai_temperature() -> f32 { 0.2 }
fn default_connect_timeout_seconds() -> u64 { 10 }
fn default_top_k() -> usize { 3 }
fn default_max_chars() -> usize { 4000 }

/// Load config from `config_path`, else `ARCANA_CONFIG`, else
/// `config/default.toml`, then apply env-var overrides.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let path = match config_path {
        Some(p) => p.to_string(),
        None => env::var("ARCANA_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string()),
    };
    load_from(Path::new(&path), EnvOverrides::from_env())
}

/// Loader with an explicit path and overrides.
///
/// A missing file is an error; an empty file yields all defaults.
pub fn load_from(path: &Path, overrides: EnvOverrides) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    resolve(parsed, overrides)
}

fn resolve(parsed: RawConfig, overrides: EnvOverrides) -> Result<Config, AppError> {
    if parsed.retrieval.top_k == 0 {
        return Err(AppError::Config("retrieval.top_k must be >= 1".into()));
    }

    let log_level = overrides.log_level.unwrap_or(parsed.server.log_level);
    logger::parse_level(&log_level).map_err(|e| AppError::Config(e.to_string()))?;

    Ok(Config {
        log_level,
        log_file: overrides.log_file.map(|p| expand_home(&p)),
        server: ServerConfig { bind: overrides.bind.unwrap_or(parsed.server.bind) },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                connect_timeout_seconds: parsed.llm.openai.connect_timeout_seconds,
                api_key_header: parsed.llm.openai.api_key_header.filter(|h| !h.is_empty()),
            },
        },
        llm_api_key: overrides.llm_api_key,
        retrieval: RetrievalConfig {
            docs_dir: parsed
                .retrieval
                .docs_dir
                .filter(|d| !d.is_empty())
                .map(|d| expand_home(&d)),
            top_k: parsed.retrieval.top_k,
            max_chars: parsed.retrieval.max_chars,
        },
        auth: AuthConfig::from_credentials(overrides.username, overrides.password),
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

impl Config {
    /// Safe `Config` for tests: dummy LLM, no retrieval, no auth.
    pub fn test_default() -> Self {
        Self {
            log_level: "info".into(),
            log_file: None,
            server: ServerConfig { bind: "127.0.0.1:0".into() },
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    connect_timeout_seconds: 1,
                    api_key_header: None,
                },
            },
            llm_api_key: None,
            retrieval: RetrievalConfig { docs_dir: None, top_k: 3, max_chars: 4000 },
            auth: AuthConfig::disabled(),
        }
    }
}
