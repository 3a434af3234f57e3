//! Application configuration.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Attachment storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Notifier configuration.
    #[serde(default)]
    pub notifier: NotifierConfig,
    /// Background job configuration.
    #[serde(default)]
    pub jobs: JobsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared key presented by trusted clients (web frontend backend,
    /// game server) when exchanging a verified external identity for a
    /// session token, or when submitting reports on a player's behalf.
    pub client_api_key: String,
}

/// Attachment storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory where attachment files are written.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Maximum accepted attachment size in megabytes.
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_file_size_mb: default_max_file_size_mb(),
        }
    }
}

/// Notifier configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifierConfig {
    /// Webhook URL for lifecycle notifications. None disables delivery.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Secret used to sign webhook payloads.
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

/// Background job configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    /// Interval between auto-assignment sweeps, in seconds.
    #[serde(default = "default_assign_sweep_secs")]
    pub assign_sweep_secs: u64,
    /// Interval between stale-report checks, in seconds.
    #[serde(default = "default_stale_check_secs")]
    pub stale_check_secs: u64,
    /// Age in hours after which a pending report is considered stale.
    #[serde(default = "default_stale_threshold_hours")]
    pub stale_threshold_hours: i64,
    /// Interval between digest generations, in seconds.
    #[serde(default = "default_digest_secs")]
    pub digest_secs: u64,
    /// Interval between audit retention purges, in seconds.
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
    /// Days to retain audit log records.
    #[serde(default = "default_audit_retention_days")]
    pub audit_retention_days: i64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            assign_sweep_secs: default_assign_sweep_secs(),
            stale_check_secs: default_stale_check_secs(),
            stale_threshold_hours: default_stale_threshold_hours(),
            digest_secs: default_digest_secs(),
            retention_secs: default_retention_secs(),
            audit_retention_days: default_audit_retention_days(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3001
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

const fn default_max_file_size_mb() -> u64 {
    10
}

const fn default_assign_sweep_secs() -> u64 {
    1800
}

const fn default_stale_check_secs() -> u64 {
    3600
}

const fn default_stale_threshold_hours() -> i64 {
    24
}

const fn default_digest_secs() -> u64 {
    86400
}

const fn default_retention_secs() -> u64 {
    86400
}

const fn default_audit_retention_days() -> i64 {
    90
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `REPORTD_ENV`)
    /// 3. Environment variables with `REPORTD_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("REPORTD_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("REPORTD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jobs_config_defaults() {
        let jobs = JobsConfig::default();
        assert_eq!(jobs.assign_sweep_secs, 1800);
        assert_eq!(jobs.stale_threshold_hours, 24);
        assert_eq!(jobs.audit_retention_days, 90);
    }

    #[test]
    fn test_storage_config_defaults() {
        let storage = StorageConfig::default();
        assert_eq!(storage.upload_dir, "./uploads");
        assert_eq!(storage.max_file_size_mb, 10);
    }
}
