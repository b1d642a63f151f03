//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Annual leave entitlements.
    #[serde(default)]
    pub leave_policy: LeavePolicyConfig,
    /// Certificate storage.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration as read from config sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    28_800 // one working day
}

/// Days granted per calendar year before any proration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LeavePolicyConfig {
    /// Paid leave days per full year.
    #[serde(default = "default_annual_paid_days")]
    pub annual_paid_days: i32,
    /// Sick leave days per full year.
    #[serde(default = "default_annual_sick_days")]
    pub annual_sick_days: i32,
}

impl Default for LeavePolicyConfig {
    fn default() -> Self {
        Self {
            annual_paid_days: default_annual_paid_days(),
            annual_sick_days: default_annual_sick_days(),
        }
    }
}

fn default_annual_paid_days() -> i32 {
    22
}

fn default_annual_sick_days() -> i32 {
    15
}

/// Where uploaded medical certificates live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// `local` or `s3`.
    #[serde(default = "default_storage_provider")]
    pub provider: String,
    /// Root directory for the `local` provider.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// S3 endpoint URL.
    pub endpoint: Option<String>,
    /// S3 bucket name.
    pub bucket: Option<String>,
    /// S3 access key ID.
    pub access_key_id: Option<String>,
    /// S3 secret access key.
    pub secret_access_key: Option<String>,
    /// S3 region.
    pub region: Option<String>,
    /// Maximum certificate size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            root: default_storage_root(),
            endpoint: None,
            bucket: None,
            access_key_id: None,
            secret_access_key: None,
            region: None,
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_storage_provider() -> String {
    "local".to_string()
}

fn default_storage_root() -> String {
    "./storage".to_string()
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, lowest precedence first: `config/default.toml`,
    /// `config/{RUN_MODE}.toml`, then `LEAVEDESK__SECTION__KEY` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEAVEDESK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("LEAVEDESK__DATABASE__URL", Some("postgres://localhost/leavedesk")),
                ("LEAVEDESK__JWT__SECRET", Some("s3cret")),
                ("RUN_MODE", Some("unit-test")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.database.url, "postgres://localhost/leavedesk");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.jwt.secret, "s3cret");
                assert_eq!(config.jwt.access_token_expiry_secs, 28_800);
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.leave_policy.annual_paid_days, 22);
                assert_eq!(config.leave_policy.annual_sick_days, 15);
                assert_eq!(config.storage.provider, "local");
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("LEAVEDESK__DATABASE__URL", None::<&str>),
                ("LEAVEDESK__JWT__SECRET", Some("s3cret")),
                ("RUN_MODE", Some("unit-test")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
