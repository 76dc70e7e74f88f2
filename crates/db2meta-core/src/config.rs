//! Run configuration (config.json)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::dsn::Db2Dsn;

/// Driver key of the only supported catalog driver
pub const DEFAULT_DRIVER: &str = "db2";

/// ODBC driver name registered by the IBM Data Server Driver package
pub const DEFAULT_ODBC_DRIVER: &str = "IBM DB2 ODBC DRIVER";

/// Output field a catalog comment is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemarkTarget {
    /// Display name
    Alias,

    /// Free-text description
    Description,
}

/// Where catalog comments end up in the extracted records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemarkRouting {
    /// Copy the comment into `alias`
    pub alias: bool,

    /// Copy the comment into `description`
    pub description: bool,
}

impl RemarkRouting {
    /// Build routing from the configured targets
    pub fn from_targets(targets: &[RemarkTarget]) -> Self {
        Self {
            alias: targets.contains(&RemarkTarget::Alias),
            description: targets.contains(&RemarkTarget::Description),
        }
    }

    /// Copy `remark` into the enabled fields
    pub fn apply(&self, remark: &str, alias: &mut String, description: &mut String) {
        if self.alias {
            *alias = remark.to_string();
        }
        if self.description {
            *description = remark.to_string();
        }
    }
}

/// Main configuration structure
///
/// Keys missing from the file take their `Default` value, so the password
/// can be left out and supplied through the environment instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database server host
    pub hostname: String,

    /// Database name
    pub database: String,

    /// Database server port
    pub port: u16,

    /// User name
    #[serde(rename = "userid")]
    pub user_id: String,

    /// Password
    pub password: String,

    /// ISO 639-1 code written to every record
    pub lang: String,

    /// Comment routing targets
    pub remarks: Vec<RemarkTarget>,

    /// Output file
    #[serde(rename = "csvfile")]
    pub csv_file: PathBuf,

    /// Catalog schema selecting the dialect (SYSCAT, QSYS2, SYSIBM)
    #[serde(rename = "systemSchema")]
    pub system_schema: String,

    /// Owning schemas to extract. Empty means "discover first".
    #[serde(rename = "targetSchema")]
    pub target_schema: Vec<String>,

    /// Driver key used for dialect lookup
    pub driver: String,

    /// ODBC driver name placed in the connection string
    #[serde(rename = "odbcDriver")]
    pub odbc_driver: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            database: String::new(),
            port: 50000,
            user_id: String::new(),
            password: String::new(),
            lang: "ja".to_string(),
            remarks: Vec::new(),
            csv_file: PathBuf::from("metadata.csv"),
            system_schema: "SYSCAT".to_string(),
            target_schema: Vec::new(),
            driver: DEFAULT_DRIVER.to_string(),
            odbc_driver: DEFAULT_ODBC_DRIVER.to_string(),
        }
    }
}

impl Config {
    /// Load config from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;

        Self::from_json(&contents)
    }

    /// Load config from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save config as pretty-printed JSON
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(path, json)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Check values serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system_schema.trim().is_empty() {
            return Err(ConfigError::Invalid("systemSchema must not be empty".to_string()));
        }
        if self.target_schema.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid("targetSchema contains an empty name".to_string()));
        }
        Ok(())
    }

    /// Connection descriptor for this configuration
    pub fn dsn(&self) -> Db2Dsn {
        Db2Dsn {
            hostname: self.hostname.clone(),
            database: self.database.clone(),
            port: self.port,
            user_id: self.user_id.clone(),
            password: self.password.clone(),
            odbc_driver: self.odbc_driver.clone(),
        }
    }

    /// Comment routing derived from `remarks`
    pub fn remark_routing(&self) -> RemarkRouting {
        RemarkRouting::from_targets(&self.remarks)
    }

    /// Whether schemas still need to be discovered before extraction
    pub fn needs_schema_discovery(&self) -> bool {
        self.target_schema.is_empty()
    }
}

/// Quote names as a SQL `IN` list, doubling embedded single quotes
pub fn in_clause(names: &[String]) -> String {
    let quoted: Vec<String> = names
        .iter()
        .map(|name| format!("'{}'", name.replace('\'', "''")))
        .collect();
    format!("({})", quoted.join(", "))
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
