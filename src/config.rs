use crate::core::summary::SummaryThresholds;
use crate::models::{Category, Coupon};
use config::{Config, ConfigError, Environment, File};
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub firestore: FirestoreSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub admin: AdminSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    /// Partner offers shown next to each category
    #[serde(default)]
    pub coupons: BTreeMap<Category, Coupon>,
    /// Country display names keyed by ISO code
    #[serde(default)]
    pub countries: BTreeMap<String, String>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreSettings {
    #[serde(default = "default_firestore_endpoint")]
    pub endpoint: String,
    pub project_id: String,
    #[serde(default = "default_firestore_database")]
    pub database_id: String,
    /// OAuth access token for the REST API; requests are unauthenticated without it
    pub access_token: Option<String>,
    #[serde(default = "default_users_collection")]
    pub users_collection: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub timeout_secs: Option<u64>,
}

fn default_firestore_endpoint() -> String { "https://firestore.googleapis.com/v1".to_string() }
fn default_firestore_database() -> String { "(default)".to_string() }
fn default_users_collection() -> String { "users".to_string() }
fn default_page_size() -> u32 { 300 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub connection_timeout_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
    pub l1_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// `HS256` with `secret`, or `RS256` with `public_key_pem`
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
    /// Shared secret for HS256
    pub secret: Option<String>,
    /// PEM-encoded public key for RS256
    pub public_key_pem: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

fn default_algorithm() -> Algorithm { Algorithm::HS256 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminSettings {
    #[serde(default)]
    pub emails: Vec<String>,
}

impl AdminSettings {
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.emails.iter().any(|e| e.eq_ignore_ascii_case(email.trim()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_code_attempts")]
    pub code_generation_attempts: u32,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            code_generation_attempts: default_code_attempts(),
        }
    }
}

fn default_max_results() -> usize { 200 }
fn default_code_attempts() -> u32 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_strength_threshold")]
    pub strength_threshold: u8,
    #[serde(default = "default_growth_threshold")]
    pub growth_threshold: u8,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            strength_threshold: default_strength_threshold(),
            growth_threshold: default_growth_threshold(),
        }
    }
}

impl ScoringSettings {
    pub fn thresholds(&self) -> SummaryThresholds {
        SummaryThresholds {
            strength: self.strength_threshold,
            growth: self.growth_threshold,
        }
    }
}

fn default_strength_threshold() -> u8 { 70 }
fn default_growth_threshold() -> u8 { 40 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

fn environment() -> Environment {
    // e.g., TWINBER__SERVER__PORT -> server.port
    Environment::with_prefix("TWINBER")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TWINBER__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(environment())
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the conventional variables that deployments set without the prefix
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }
    if let Ok(project_id) = env::var("FIRESTORE_PROJECT_ID") {
        builder = builder.set_override("firestore.project_id", project_id)?;
    }
    if let Ok(token) = env::var("FIRESTORE_ACCESS_TOKEN") {
        builder = builder.set_override("firestore.access_token", token)?;
    }
    if let Ok(secret) = env::var("JWT_SECRET") {
        builder = builder.set_override("auth.secret", secret)?;
    }

    builder.build()
}
