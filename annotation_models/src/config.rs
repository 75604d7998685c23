//! Configuration handling for annotation model synthesis

use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::{Error, Result};

/// Load configuration from a TOML file
pub fn load_from_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    from_toml_str(&config_str)
}

/// Parse configuration from a TOML string
pub fn from_toml_str(config_str: &str) -> Result<Config> {
    toml::from_str(config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))
}

/// Represents the complete configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub schemas: SchemasConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    pub logging: Option<LoggingConfig>,
}

/// Database connection configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

/// Where annotation schemas come from
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SchemasConfig {
    /// Register the stock annotation schemas
    #[serde(default = "default_true")]
    pub include_builtin: bool,
    /// Glob patterns of TOML/YAML/JSON schema files
    #[serde(default)]
    pub paths: Vec<String>,
}

impl Default for SchemasConfig {
    fn default() -> Self {
        Self {
            include_builtin: true,
            paths: Vec::new(),
        }
    }
}

/// Which models to synthesize
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ModelsConfig {
    #[serde(default)]
    pub datasets: Vec<String>,
    #[serde(default)]
    pub include_root_entity: bool,
}

/// Naming conventions for generated constraints and indexes
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NamingConfig {
    #[serde(default = "default_index_pattern")]
    pub index_pattern: String,
    #[serde(default = "default_constraint_pattern")]
    pub constraint_pattern: String,
    #[serde(default = "default_max_identifier_length")]
    pub max_identifier_length: usize,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            index_pattern: default_index_pattern(),
            constraint_pattern: default_constraint_pattern(),
            max_identifier_length: default_max_identifier_length(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub stdout: bool,
}

fn default_true() -> bool {
    true
}

fn default_index_pattern() -> String {
    "ix_{table}_{column}".to_string()
}

fn default_constraint_pattern() -> String {
    "fk_{table}_{column}".to_string()
}

// PostgreSQL NAMEDATALEN - 1
fn default_max_identifier_length() -> usize {
    63
}

fn default_log_format() -> String {
    "text".to_string()
}
