//! Built-in workspace defaults (layer 1)
//!
//! Hardcoded defaults for all settings.

use serde::{Deserialize, Serialize};

use wkld_build::DEFAULT_DOCKERFILE;
use wkld_manifest::{DEFAULT_BUILDER, MANIFEST_FILE};

/// Built-in default settings values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Registry prefix images are pushed under (default: none)
    pub registry: String,

    /// Image tag (default: none, supplied per build)
    pub image_tag: String,

    /// Extra tags every built image is published under (default: none)
    pub additional_tags: Vec<String>,

    /// Environment used when none is given (default: "test")
    pub default_env: String,

    /// Manifest file name inside each workload directory (default: "manifest.yml")
    pub manifest_file: String,

    /// Dockerfile name written into new manifests (default: "Dockerfile")
    pub dockerfile_name: String,

    /// Buildpack builder for new manifests that ask for one
    pub default_builder: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            registry: String::new(),
            image_tag: String::new(),
            additional_tags: Vec::new(),
            default_env: "test".to_string(),
            manifest_file: MANIFEST_FILE.to_string(),
            dockerfile_name: DEFAULT_DOCKERFILE.to_string(),
            default_builder: DEFAULT_BUILDER.to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "registry": self.registry,
            "image_tag": self.image_tag,
            "additional_tags": self.additional_tags,
            "default_env": self.default_env,
            "manifest_file": self.manifest_file,
            "build": {
                "dockerfile_name": self.dockerfile_name,
                "default_builder": self.default_builder
            }
        })
    }
}
