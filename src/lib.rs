//! wkld - workload manifests with per-environment overrides
//!
//! A workload is described once as a base configuration in a YAML manifest.
//! Each environment may override individual fields. This crate resolves a
//! manifest for one environment, renders manifest documents, and derives the
//! arguments for building the workload's container image.
//!
//! The manifest model lives in `wkld-manifest`; build argument derivation in
//! `wkld-build`. Both are re-exported here.

pub mod config;
pub mod error;
pub mod render;
pub mod resolve;
pub mod workspace;

pub use error::{Error, Result};
pub use render::{template_for, RenderError, Renderer, TemplateRenderer};
pub use resolve::{apply_env, fingerprint, resolve, Merge, ResolveError};
pub use workspace::{Workspace, WorkloadEntry, WriteOutcome};

pub use wkld_build as build;
pub use wkld_manifest as manifest;
