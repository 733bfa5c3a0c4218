//! Effective workspace settings with provenance
//!
//! The effective settings capture the merged configuration plus information
//! about where each layer came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;

/// Schema version for effective settings
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "wkld/effective_settings@1";

/// Settings file name at the workspace root
pub const SETTINGS_FILE: &str = "wkld.toml";

/// Origin of a settings layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    Workspace,
    Cli,
}

/// A contributing settings layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Effective settings with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveSettings {
    pub schema_version: u32,
    pub schema_id: String,

    /// When these settings were computed
    pub created_at: DateTime<Utc>,

    /// The merged settings object
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveSettings {
    /// Build effective settings from layers: builtin, then the workspace
    /// settings file if it exists, then CLI overrides.
    pub fn build(
        settings_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        // Layer 1: Built-in defaults
        layers.push(BuiltinDefaults::default().to_value());
        sources.push(ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        });

        // Layer 2: Workspace settings file
        if let Some(path) = settings_path {
            if path.exists() {
                let (value, digest) = Self::load_toml_file(path)?;
                layers.push(value);
                sources.push(ConfigSource {
                    origin: ConfigOrigin::Workspace,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                });
            }
        }

        // Layer 3: CLI overrides
        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        Self::validate_config(&merged)?;

        tracing::debug!(layers = sources.len(), "built effective settings");

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: merged,
            sources,
        })
    }

    /// Build settings for the workspace at `root`, reading `root/wkld.toml`.
    pub fn for_workspace(root: &Path, cli_overrides: Option<Value>) -> Result<Self, ConfigError> {
        Self::build(Some(&root.join(SETTINGS_FILE)), cli_overrides)
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((Self::toml_to_json(toml_value), digest))
    }

    /// Convert TOML Value to JSON Value
    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Self::toml_to_json).collect())
            }
            toml::Value::Table(table) => {
                let map: serde_json::Map<String, Value> = table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect();
                Value::Object(map)
            }
        }
    }

    /// Validate settings values
    fn validate_config(config: &Value) -> Result<(), ConfigError> {
        for key in ["registry", "image_tag", "default_env", "manifest_file"] {
            if let Some(v) = config.get(key) {
                if !v.is_string() {
                    return Err(ConfigError::ValidationError(format!(
                        "{} must be a string",
                        key
                    )));
                }
            }
        }

        if let Some(tags) = config.get("additional_tags") {
            let all_strings = tags
                .as_array()
                .map_or(false, |arr| arr.iter().all(Value::is_string));
            if !all_strings {
                return Err(ConfigError::ValidationError(
                    "additional_tags must be a list of strings".to_string(),
                ));
            }
        }

        // manifest_file is a bare file name
        match config.get("manifest_file").and_then(|v| v.as_str()) {
            Some(name) if !name.is_empty() && !name.contains(['/', '\\']) => {}
            _ => {
                return Err(ConfigError::ValidationError(
                    "manifest_file must be a non-empty file name".to_string(),
                ))
            }
        }

        if let Some(registry) = config.get("registry").and_then(|v| v.as_str()) {
            if registry.contains("://") || registry.ends_with('/') {
                return Err(ConfigError::ValidationError(
                    "registry must be a repository prefix without scheme or trailing '/'"
                        .to_string(),
                ));
            }
        }

        if let Some(tag) = config.get("image_tag").and_then(|v| v.as_str()) {
            if tag.contains(|c: char| c.is_whitespace() || c == ':') {
                return Err(ConfigError::ValidationError(
                    "image_tag must not contain whitespace or ':'".to_string(),
                ));
            }
        }

        if config
            .get("default_env")
            .and_then(|v| v.as_str())
            .map_or(true, str::is_empty)
        {
            return Err(ConfigError::ValidationError(
                "default_env must not be empty".to_string(),
            ));
        }

        if config
            .get("build")
            .and_then(|b| b.get("dockerfile_name"))
            .and_then(|v| v.as_str())
            .map_or(true, str::is_empty)
        {
            return Err(ConfigError::ValidationError(
                "build.dockerfile_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a settings value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get a settings value as string
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    /// Get a non-empty settings string
    fn get_non_empty(&self, path: &str) -> Option<&str> {
        self.get_str(path).filter(|s| !s.is_empty())
    }

    pub fn registry(&self) -> Option<&str> {
        self.get_non_empty("registry")
    }

    pub fn image_tag(&self) -> Option<&str> {
        self.get_non_empty("image_tag")
    }

    pub fn additional_tags(&self) -> Vec<String> {
        self.get("additional_tags")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn default_env(&self) -> &str {
        self.get_non_empty("default_env").unwrap_or("test")
    }

    pub fn manifest_file(&self) -> &str {
        self.get_non_empty("manifest_file")
            .unwrap_or(wkld_manifest::MANIFEST_FILE)
    }

    pub fn dockerfile_name(&self) -> &str {
        self.get_non_empty("build.dockerfile_name")
            .unwrap_or(wkld_build::DEFAULT_DOCKERFILE)
    }

    pub fn default_builder(&self) -> &str {
        self.get_non_empty("build.default_builder")
            .unwrap_or(wkld_manifest::DEFAULT_BUILDER)
    }

    /// Repository URI for the workload `name`: `<registry>/<name>`.
    pub fn repository_uri(&self, name: &str) -> Option<String> {
        self.registry().map(|registry| format!("{}/{}", registry, name))
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
