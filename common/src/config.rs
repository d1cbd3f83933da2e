// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; an empty URL selects the in-memory store
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_run_migrations() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl DatabaseConfig {
    /// True when no database is configured
    pub fn is_in_memory(&self) -> bool {
        self.url.trim().is_empty()
    }
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let defaults = Settings::default();

        let builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("database.url", defaults.database.url)?
            .set_default(
                "database.max_connections",
                defaults.database.max_connections as i64,
            )?
            .set_default(
                "database.min_connections",
                defaults.database.min_connections as i64,
            )?
            .set_default(
                "database.connect_timeout_seconds",
                defaults.database.connect_timeout_seconds as i64,
            )?
            .set_default("database.run_migrations", defaults.database.run_migrations)?
            .set_default("observability.log_level", defaults.observability.log_level)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if !self.database.is_in_memory() {
            if self.database.max_connections == 0 {
                return Err("Database max_connections must be greater than 0".to_string());
            }
            if self.database.min_connections > self.database.max_connections {
                return Err(
                    "Database min_connections cannot exceed max_connections".to_string(),
                );
            }
        }

        if self.observability.log_level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/jury".to_string(),
                max_connections: 10,
                min_connections: 2,
                connect_timeout_seconds: 30,
                run_migrations: true,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_catches_zero_port() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_catches_inverted_pool_bounds() {
        let mut settings = Settings::default();
        settings.database.min_connections = 20;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_in_memory_database_skips_pool_checks() {
        let mut settings = Settings::default();
        settings.database.url = String::new();
        settings.database.max_connections = 0;
        assert!(settings.database.is_in_memory());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            r#"
[server]
port = 9123

[database]
url = ""
"#,
        )
        .unwrap();

        let settings = Settings::load_from_path(dir.path()).unwrap();
        assert_eq!(settings.server.port, 9123);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert!(settings.database.is_in_memory());
        assert_eq!(settings.observability.log_level, "info");
    }
}
