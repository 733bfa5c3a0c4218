//! Override resolution
//!
//! Deep-merges a base service configuration with the overlay of one named
//! environment. Resolution only reads its inputs; each call builds a fresh
//! configuration, so one manifest can be resolved for several environments
//! from several threads at once.

mod merge;

pub use merge::Merge;

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use wkld_manifest::validate::validate_config;
use wkld_manifest::{Manifest, ManifestError, ResolvedManifest, ServiceConfig, WorkloadKind};

/// Resolution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Base and overlay describe different workload kinds.
    #[error("cannot merge {overlay} overlay at '{path}' into {base} base (environment '{env}')")]
    MergeConflict {
        env: String,
        path: String,
        base: WorkloadKind,
        overlay: WorkloadKind,
    },

    /// The merged configuration breaks a rule that each side passed alone,
    /// e.g. a buildpack base with a dockerfile overlay.
    #[error("invalid value for '{field}' after applying environment '{env}': {reason}")]
    Invalid {
        env: String,
        field: String,
        reason: String,
    },

    #[error("canonical JSON error: {0}")]
    Canonicalize(String),
}

/// Resolve `base` for `env`.
///
/// An environment without an overlay resolves to a copy of the base.
pub fn resolve(
    base: &ServiceConfig,
    overlays: &BTreeMap<String, ServiceConfig>,
    env: &str,
) -> Result<ServiceConfig, ResolveError> {
    let Some(overlay) = overlays.get(env) else {
        tracing::debug!(env, "no overlay for environment, using base");
        return Ok(base.clone());
    };

    tracing::trace!(env, kind = %base.kind(), "merging overlay");
    let resolved = merge_config(base, overlay, env)?;

    let prefix = format!("environments.{}", env);
    validate_config(&prefix, &resolved).map_err(|e| match e {
        ManifestError::Validation { field, reason } => ResolveError::Invalid {
            env: env.to_string(),
            field,
            reason,
        },
        other => ResolveError::Invalid {
            env: env.to_string(),
            field: prefix.clone(),
            reason: other.to_string(),
        },
    })?;
    Ok(resolved)
}

fn merge_config(
    base: &ServiceConfig,
    overlay: &ServiceConfig,
    env: &str,
) -> Result<ServiceConfig, ResolveError> {
    match (base, overlay) {
        (ServiceConfig::LoadBalanced(b), ServiceConfig::LoadBalanced(o)) => {
            Ok(ServiceConfig::LoadBalanced(b.merge(o)))
        }
        (ServiceConfig::Backend(b), ServiceConfig::Backend(o)) => {
            Ok(ServiceConfig::Backend(b.merge(o)))
        }
        _ => Err(ResolveError::MergeConflict {
            env: env.to_string(),
            path: format!("environments.{}", env),
            base: base.kind(),
            overlay: overlay.kind(),
        }),
    }
}

/// Resolve `manifest` for `env`, keeping its name and dropping the
/// remaining environments.
pub fn apply_env(manifest: &Manifest, env: &str) -> Result<ResolvedManifest, ResolveError> {
    let config = resolve(&manifest.config, &manifest.environments, env)?;
    Ok(ResolvedManifest::new(
        manifest.name.clone(),
        Some(env.to_string()),
        config,
    ))
}

/// SHA-256 hex digest of the canonical JSON (RFC 8785) form of `resolved`.
///
/// Equal resolved manifests always produce the same fingerprint.
pub fn fingerprint(resolved: &ResolvedManifest) -> Result<String, ResolveError> {
    let jcs_bytes = serde_json_canonicalizer::to_vec(resolved)
        .map_err(|e| ResolveError::Canonicalize(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&jcs_bytes);
    Ok(hex::encode(hasher.finalize()))
}
