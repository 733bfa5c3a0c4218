//! Build argument derivation.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use wkld_manifest::ResolvedManifest;

use crate::error::DeriveError;

/// Dockerfile name assumed when only a build context is given.
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

/// How the image gets built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// `docker build` with a Dockerfile.
    Dockerfile,
    /// `pack build` with a Cloud Native Buildpacks builder.
    Buildpack,
}

/// Target repository for the built image, supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRef {
    /// Repository URI, without a tag.
    pub registry_uri: String,
    /// Primary tag, usually a short commit ID.
    pub tag: String,
    pub additional_tags: Vec<String>,
}

impl ImageRef {
    pub fn new(registry_uri: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            registry_uri: registry_uri.into(),
            tag: tag.into(),
            additional_tags: Vec::new(),
        }
    }

    pub fn with_additional_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.additional_tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Parameters handed to the image build tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildArguments {
    pub registry_uri: String,
    pub image_tag: String,

    /// Absolute dockerfile path. `None` in buildpack mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dockerfile_path: Option<PathBuf>,

    pub context_dir: PathBuf,

    /// `--build-arg` values, iterated in lexicographic key order.
    pub build_args: BTreeMap<String, String>,

    pub additional_tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder_name: Option<String>,

    /// Builder environment, iterated in lexicographic key order.
    pub env: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cache_from: Vec<String>,
}

impl BuildArguments {
    pub fn mode(&self) -> BuildMode {
        if self.builder_name.is_some() {
            BuildMode::Buildpack
        } else {
            BuildMode::Dockerfile
        }
    }

    /// Build args as ordered key/value pairs.
    pub fn sorted_build_args(&self) -> Vec<(String, String)> {
        sorted_pairs(&self.build_args)
    }

    /// Builder environment as ordered key/value pairs.
    pub fn sorted_env(&self) -> Vec<(String, String)> {
        sorted_pairs(&self.env)
    }

    /// Every tag the image is published under: additional tags, then the
    /// primary tag.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.additional_tags
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.image_tag.as_str()))
    }
}

// BTreeMap iteration is already in lexicographic key order.
fn sorted_pairs(map: &BTreeMap<String, String>) -> Vec<(String, String)> {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

/// Derive build arguments for `resolved`, with paths anchored at
/// `workspace_root`.
///
/// A builder selects buildpack mode; the context then defaults to the
/// workspace root. Otherwise a dockerfile is required and the context
/// defaults to the dockerfile's directory.
pub fn derive(
    resolved: &ResolvedManifest,
    workspace_root: &Path,
    image: &ImageRef,
) -> Result<BuildArguments, DeriveError> {
    if image.registry_uri.is_empty() {
        return Err(DeriveError::Unresolved {
            field: "registry_uri",
        });
    }
    if image.tag.is_empty() {
        return Err(DeriveError::Unresolved { field: "image_tag" });
    }

    let source = resolved.config.image();
    if let Some(location) = source.location.non_empty() {
        return Err(DeriveError::Prebuilt {
            name: resolved.name.clone(),
            location: location.to_string(),
        });
    }

    let build = &source.build;
    let context = build.context.non_empty();
    let builder_name = build.builder.non_empty().map(str::to_string);

    let (dockerfile_path, context_dir) = if builder_name.is_some() {
        let context_dir = match context {
            Some(ctx) => workspace_root.join(ctx),
            None => workspace_root.to_path_buf(),
        };
        (None, context_dir)
    } else {
        let dockerfile = match (build.dockerfile.non_empty(), context) {
            (Some(df), _) => workspace_root.join(df),
            (None, Some(ctx)) => workspace_root.join(ctx).join(DEFAULT_DOCKERFILE),
            (None, None) => {
                return Err(DeriveError::Unresolved {
                    field: "image.build.dockerfile",
                })
            }
        };
        let context_dir = match context {
            Some(ctx) => workspace_root.join(ctx),
            None => dockerfile
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| workspace_root.to_path_buf()),
        };
        (Some(dockerfile), context_dir)
    };

    let args = BuildArguments {
        registry_uri: image.registry_uri.clone(),
        image_tag: image.tag.clone(),
        dockerfile_path,
        context_dir,
        build_args: build.args.clone(),
        additional_tags: image.additional_tags.clone(),
        builder_name,
        env: build.env.clone(),
        target: build.target.non_empty().map(str::to_string),
        cache_from: build.cache_from.value().cloned().unwrap_or_default(),
    };

    tracing::debug!(
        workload = %resolved.name,
        environment = resolved.environment.as_deref().unwrap_or("-"),
        mode = ?args.mode(),
        context = %args.context_dir.display(),
        "derived build arguments"
    );

    Ok(args)
}
