//! Workload manifest model.
//!
//! A manifest describes a containerized workload once, as a base
//! configuration, plus per-environment overlays that override individual
//! fields. Every mergeable scalar is a tri-state [`Field`].

mod error;
mod field;
mod image;
mod kind;
mod manifest;
mod service;
pub mod validate;
mod workload;

pub use error::ManifestError;
pub use field::Field;
pub use image::{BuildSpec, ContainerHealthCheck, Image, ImageWithPort, ImageWithPortAndHealthcheck};
pub use kind::WorkloadKind;
pub use manifest::{Manifest, ResolvedManifest};
pub use service::{
    BackendConfig, LoadBalancedConfig, Logging, RoutingRule, ServiceConfig, SidecarConfig,
    TaskConfig, DEFAULT_COUNT, DEFAULT_CPU, DEFAULT_HEALTHCHECK_PATH, DEFAULT_MEMORY,
};
pub use workload::{
    default_http_path, BackendServiceProps, ExistingService, LoadBalancedWebServiceProps,
    ServiceProps, WorkloadProps, DEFAULT_BUILDER,
};

/// Default manifest file name inside a workload directory.
pub const MANIFEST_FILE: &str = "manifest.yml";
