//! Workload manifests and their resolved form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ManifestError;
use crate::kind::WorkloadKind;
use crate::service::ServiceConfig;
use crate::validate::{validate_config, validate_name};

/// A workload manifest: identity, base configuration, and one overlay per
/// environment.
///
/// Name and kind are the workload's identity. The kind is carried by the
/// variant of `config`; overlays in `environments` always share it when the
/// manifest is decoded from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,

    /// Base, environment-independent configuration.
    pub config: ServiceConfig,

    /// Per-environment overlays keyed by environment name.
    pub environments: BTreeMap<String, ServiceConfig>,
}

#[derive(Deserialize)]
struct ManifestDocument {
    name: String,
    #[serde(rename = "type")]
    kind: WorkloadKind,
    #[serde(default)]
    environments: BTreeMap<String, serde_yaml::Value>,
    #[serde(flatten)]
    config: serde_yaml::Mapping,
}

impl Manifest {
    pub fn from_parts(name: impl Into<String>, config: ServiceConfig) -> Self {
        Self {
            name: name.into(),
            config,
            environments: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> WorkloadKind {
        self.config.kind()
    }

    /// Add or replace the overlay for `env`.
    pub fn with_environment(mut self, env: impl Into<String>, overlay: ServiceConfig) -> Self {
        self.environments.insert(env.into(), overlay);
        self
    }

    pub fn environment_names(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(String::as_str)
    }

    /// Decode a manifest document.
    ///
    /// The `type` key selects the config shape for the base and for every
    /// `environments.<env>` entry. The result is validated.
    pub fn from_yaml(s: &str) -> Result<Self, ManifestError> {
        let doc: ManifestDocument = serde_yaml::from_str(s)?;

        let config = ServiceConfig::from_yaml_value(doc.kind, serde_yaml::Value::Mapping(doc.config))
            .map_err(|source| ManifestError::Document {
                section: "base".to_string(),
                source,
            })?;

        let mut environments = BTreeMap::new();
        for (env, value) in doc.environments {
            let overlay = ServiceConfig::from_yaml_value(doc.kind, value).map_err(|source| {
                ManifestError::Document {
                    section: format!("environments.{}", env),
                    source,
                }
            })?;
            environments.insert(env, overlay);
        }

        let manifest = Self {
            name: doc.name,
            config,
            environments,
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read and decode a manifest file.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Validate the identity, the base, and every overlay.
    pub fn validate(&self) -> Result<(), ManifestError> {
        validate_name(&self.name)?;
        validate_config("", &self.config)?;
        for (env, overlay) in &self.environments {
            validate_config(&format!("environments.{}", env), overlay)?;
        }
        Ok(())
    }
}

/// A manifest after overlay resolution: no environments left, every field
/// either inherited from the base or taken from the chosen overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedManifest {
    pub name: String,

    #[serde(rename = "type")]
    kind: WorkloadKind,

    /// Environment the manifest was resolved for, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(flatten)]
    pub config: ServiceConfig,
}

impl ResolvedManifest {
    pub fn new(name: impl Into<String>, environment: Option<String>, config: ServiceConfig) -> Self {
        Self {
            name: name.into(),
            kind: config.kind(),
            environment,
            config,
        }
    }

    /// The base configuration of `manifest`, with no overlay applied.
    pub fn from_base(manifest: &Manifest) -> Self {
        Self::new(manifest.name.clone(), None, manifest.config.clone())
    }

    pub fn kind(&self) -> WorkloadKind {
        self.kind
    }
}
