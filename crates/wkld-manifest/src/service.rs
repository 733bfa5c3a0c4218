//! Service configuration sections.
//!
//! These types are used both for the base configuration and for each
//! environment overlay. An overlay is the same shape with most fields unset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::field::Field;
use crate::image::{Image, ImageWithPort, ImageWithPortAndHealthcheck};
use crate::kind::WorkloadKind;

/// Default task CPU units.
pub const DEFAULT_CPU: u32 = 256;
/// Default task memory in MiB.
pub const DEFAULT_MEMORY: u32 = 512;
/// Default number of tasks.
pub const DEFAULT_COUNT: u32 = 1;
/// Default load balancer health check path.
pub const DEFAULT_HEALTHCHECK_PATH: &str = "/";

/// Load balancer routing for a load balanced web service (`http:` section).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    /// Request path routed to the service.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub path: Field<String>,

    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub healthcheck: Field<String>,

    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub stickiness: Field<bool>,

    /// Container the load balancer routes traffic to.
    #[serde(
        default,
        rename = "targetContainer",
        skip_serializing_if = "Field::is_unset"
    )]
    pub target_container: Field<String>,
}

impl RoutingRule {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Task sizing and environment, inlined at the top level of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub cpu: Field<u32>,

    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub memory: Field<u32>,

    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub count: Field<u32>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,

    /// Secret name to parameter store key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub secrets: BTreeMap<String, String>,
}

impl TaskConfig {
    /// Task config with the built-in CPU, memory and count defaults.
    pub fn with_defaults() -> Self {
        Self {
            cpu: Field::new(DEFAULT_CPU),
            memory: Field::new(DEFAULT_MEMORY),
            count: Field::new(DEFAULT_COUNT),
            ..Default::default()
        }
    }
}

/// Firelens log routing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logging {
    /// Fluent Bit image override.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub image: Field<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub destination: BTreeMap<String, String>,

    #[serde(
        default,
        rename = "enableMetadata",
        skip_serializing_if = "Field::is_unset"
    )]
    pub enable_metadata: Field<bool>,

    #[serde(
        default,
        rename = "secretOptions",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub secret_options: BTreeMap<String, String>,

    #[serde(
        default,
        rename = "configFilePath",
        skip_serializing_if = "Field::is_unset"
    )]
    pub config_file: Field<String>,
}

/// A container running next to the main service container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarConfig {
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub port: Field<String>,

    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub image: Field<String>,

    #[serde(
        default,
        rename = "credentialsParameter",
        skip_serializing_if = "Field::is_unset"
    )]
    pub credentials_parameter: Field<String>,
}

/// Configuration of a load balanced web service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancedConfig {
    #[serde(default)]
    pub image: ImageWithPort,

    #[serde(default, skip_serializing_if = "RoutingRule::is_empty")]
    pub http: RoutingRule,

    #[serde(flatten)]
    pub task: TaskConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<Logging>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sidecars: BTreeMap<String, SidecarConfig>,
}

/// Configuration of a backend service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub image: ImageWithPortAndHealthcheck,

    #[serde(flatten)]
    pub task: TaskConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<Logging>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sidecars: BTreeMap<String, SidecarConfig>,
}

/// The mergeable part of a manifest, one variant per workload kind.
///
/// The same type describes a base configuration and an environment overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ServiceConfig {
    LoadBalanced(LoadBalancedConfig),
    Backend(BackendConfig),
}

impl ServiceConfig {
    /// An all-unset config of the given kind.
    pub fn empty(kind: WorkloadKind) -> Self {
        match kind {
            WorkloadKind::LoadBalancedWebService => {
                ServiceConfig::LoadBalanced(LoadBalancedConfig::default())
            }
            WorkloadKind::BackendService => ServiceConfig::Backend(BackendConfig::default()),
        }
    }

    pub fn kind(&self) -> WorkloadKind {
        match self {
            ServiceConfig::LoadBalanced(_) => WorkloadKind::LoadBalancedWebService,
            ServiceConfig::Backend(_) => WorkloadKind::BackendService,
        }
    }

    pub fn image(&self) -> &Image {
        match self {
            ServiceConfig::LoadBalanced(c) => &c.image.image,
            ServiceConfig::Backend(c) => &c.image.image,
        }
    }

    pub fn port(&self) -> &Field<u16> {
        match self {
            ServiceConfig::LoadBalanced(c) => &c.image.port,
            ServiceConfig::Backend(c) => &c.image.port,
        }
    }

    pub fn task(&self) -> &TaskConfig {
        match self {
            ServiceConfig::LoadBalanced(c) => &c.task,
            ServiceConfig::Backend(c) => &c.task,
        }
    }

    pub fn logging(&self) -> Option<&Logging> {
        match self {
            ServiceConfig::LoadBalanced(c) => c.logging.as_ref(),
            ServiceConfig::Backend(c) => c.logging.as_ref(),
        }
    }

    pub fn sidecars(&self) -> &BTreeMap<String, SidecarConfig> {
        match self {
            ServiceConfig::LoadBalanced(c) => &c.sidecars,
            ServiceConfig::Backend(c) => &c.sidecars,
        }
    }

    /// Routing rule, for kinds that sit behind a load balancer.
    pub fn http(&self) -> Option<&RoutingRule> {
        match self {
            ServiceConfig::LoadBalanced(c) => Some(&c.http),
            ServiceConfig::Backend(_) => None,
        }
    }

    /// Decode a document section into the shape used by `kind`.
    pub fn from_yaml_value(
        kind: WorkloadKind,
        value: serde_yaml::Value,
    ) -> Result<Self, serde_yaml::Error> {
        if value.is_null() {
            return Ok(Self::empty(kind));
        }
        Ok(match kind {
            WorkloadKind::LoadBalancedWebService => {
                ServiceConfig::LoadBalanced(serde_yaml::from_value(value)?)
            }
            WorkloadKind::BackendService => ServiceConfig::Backend(serde_yaml::from_value(value)?),
        })
    }
}
