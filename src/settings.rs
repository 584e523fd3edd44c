use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    Remote,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Display texts for the admin surface. Loaded once, never mutated.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AdminSiteConfig {
    #[serde(default = "default_site_header")]
    pub site_header: String,

    #[serde(default = "default_site_title")]
    pub site_title: String,

    #[serde(default = "default_index_title")]
    pub index_title: String,
}

impl Default for AdminSiteConfig {
    fn default() -> Self {
        AdminSiteConfig {
            site_header: default_site_header(),
            site_title: default_site_title(),
            index_title: default_index_title(),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    /// Comma-separated list of allowed origins.
    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: String,

    #[serde(default)]
    pub admin_token: String,

    #[serde(default = "default_storage")]
    pub storage_backend: StorageKind,

    #[serde(default = "default_media_root")]
    pub media_root: String,

    #[serde(default = "default_media_url")]
    pub media_url: String,

    #[serde(default)]
    pub remote_public_base_url: Option<String>,

    #[serde(default)]
    pub remote_upload_url: Option<String>,

    #[serde(default)]
    pub remote_api_token: Option<String>,

    /// Requests per client per hour on the public API. 0 disables limiting.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_hour: u64,

    #[serde(default)]
    pub trust_x_forwarded_for: bool,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    #[serde(default)]
    pub admin_site: AdminSiteConfig,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Portfolio-CMS".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_max_connections() -> u32 {
    10
}
fn default_cors_origins() -> String {
    "*".to_string()
}
fn default_storage() -> StorageKind {
    StorageKind::Local
}
fn default_media_root() -> String {
    "media".to_string()
}
fn default_media_url() -> String {
    "/media/".to_string()
}
fn default_rate_limit() -> u64 {
    100
}
fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}
fn default_site_header() -> String {
    "Siri Tech Portfolio Admin".to_string()
}
fn default_site_title() -> String {
    "Siri Tech Admin".to_string()
}
fn default_index_title() -> String {
    "Portfolio Management".to_string()
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;
        config.database_url = fill_or_env(config.database_url, "DATABASE_URL")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database_url.trim().is_empty() {
            errors.push("DATABASE_URL cannot be empty");
        }
        if self.admin_token.len() < 32 {
            errors.push("ADMIN_TOKEN must be at least 32 characters");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }
        if self.storage_backend == StorageKind::Remote {
            if self.remote_public_base_url.as_deref().is_none_or(|u| url::Url::parse(u).is_err()) {
                errors.push("REMOTE_PUBLIC_BASE_URL must be an absolute URL for remote storage");
            }
            if self.remote_upload_url.as_deref().is_none_or(|u| url::Url::parse(u).is_err()) {
                errors.push("REMOTE_UPLOAD_URL must be an absolute URL for remote storage");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn fill_or_env(current: String, env_key: &str) -> Result<String, ConfigError> {
    if current.trim().is_empty() {
        env::var(env_key).map_err(|_| ConfigError::Message(format!("{env_key} must be set")))
    } else {
        Ok(current)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else if self.len() < 32 {
            "[TOO_SHORT]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("database_url", &self.database_url.redact())
            .field("database_max_connections", &self.database_max_connections)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("admin_token", &self.admin_token.redact())
            .field("storage_backend", &self.storage_backend)
            .field("media_root", &self.media_root)
            .field("media_url", &self.media_url)
            .field("remote_public_base_url", &self.remote_public_base_url)
            .field("remote_upload_url", &self.remote_upload_url)
            .field("remote_api_token", &self.remote_api_token.as_ref().map(|t| t.redact()))
            .field("rate_limit_per_hour", &self.rate_limit_per_hour)
            .field("trust_x_forwarded_for", &self.trust_x_forwarded_for)
            .field("log_format", &self.log_format)
            .field("admin_site", &self.admin_site)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            database_url: String::new(),
            database_max_connections: default_max_connections(),
            cors_allowed_origins: default_cors_origins(),
            admin_token: String::new(),
            storage_backend: default_storage(),
            media_root: default_media_root(),
            media_url: default_media_url(),
            remote_public_base_url: None,
            remote_upload_url: None,
            remote_api_token: None,
            rate_limit_per_hour: default_rate_limit(),
            trust_x_forwarded_for: false,
            log_format: default_log_format(),
            admin_site: AdminSiteConfig::default(),
        }
    }
}
