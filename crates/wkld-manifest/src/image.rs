//! Image and build sections of a service manifest.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::field::Field;

/// How the container image is built.
///
/// In a document, `build` is either a dockerfile path or a table:
///
/// ```yaml
/// image:
///   build: ./api/Dockerfile
/// # or
/// image:
///   build:
///     dockerfile: ./api/Dockerfile
///     context: ./api
///     args:
///       GO_VERSION: "1.21"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpec {
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub dockerfile: Field<String>,

    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub context: Field<String>,

    /// Multi-stage target.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub target: Field<String>,

    /// `ARG` values. Merged key by key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, String>,

    /// Images to use as cache sources. Replaced wholesale by an overlay.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub cache_from: Field<Vec<String>>,

    /// Buildpack builder image. Selects buildpack mode when set.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub builder: Field<String>,

    /// Environment passed to the buildpack builder. Merged key by key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl BuildSpec {
    /// Shorthand for a build that only names a dockerfile.
    pub fn dockerfile(path: impl Into<String>) -> Self {
        Self {
            dockerfile: Field::new(path.into()),
            ..Default::default()
        }
    }

    /// A buildpack build using `builder`.
    pub fn buildpack(builder: impl Into<String>) -> Self {
        Self {
            builder: Field::new(builder.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn deserialize_build<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BuildSpec, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BuildDocument {
        Shorthand(String),
        Detailed(BuildSpec),
    }

    Ok(match Option::<BuildDocument>::deserialize(deserializer)? {
        None => BuildSpec::default(),
        Some(BuildDocument::Shorthand(path)) => BuildSpec::dockerfile(path),
        Some(BuildDocument::Detailed(spec)) => spec,
    })
}

/// Where the image comes from: built locally or pulled from a location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    #[serde(
        default,
        deserialize_with = "deserialize_build",
        skip_serializing_if = "BuildSpec::is_empty"
    )]
    pub build: BuildSpec,

    /// Prebuilt image URI; no build happens when set.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub location: Field<String>,
}

/// Image section of a load balanced web service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageWithPort {
    #[serde(flatten)]
    pub image: Image,

    /// Container port receiving traffic.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub port: Field<u16>,
}

/// Image section of a backend service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageWithPortAndHealthcheck {
    #[serde(flatten)]
    pub image: Image,

    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub port: Field<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<ContainerHealthCheck>,
}

/// Container-level health check, usually lifted from a Dockerfile's
/// `HEALTHCHECK` instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerHealthCheck {
    /// Replaced wholesale by an overlay.
    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub command: Field<Vec<String>>,

    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub interval: Field<String>,

    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub retries: Field<u32>,

    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub timeout: Field<String>,

    #[serde(default, skip_serializing_if = "Field::is_unset")]
    pub start_period: Field<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_shorthand() {
        let image: Image = serde_yaml::from_str("build: ./api/Dockerfile").unwrap();
        assert_eq!(image.build.dockerfile, Field::new("./api/Dockerfile".to_string()));
        assert!(image.build.context.is_unset());
    }

    #[test]
    fn test_build_table() {
        let yaml = r#"
build:
  dockerfile: Dockerfile
  context: ./api
  args:
    B: "2"
    A: "1"
  cache_from: [base:latest]
"#;
        let image: Image = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(image.build.context, Field::new("./api".to_string()));
        assert_eq!(image.build.args.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(
            image.build.cache_from,
            Field::new(vec!["base:latest".to_string()])
        );
    }

    #[test]
    fn test_missing_build_is_empty() {
        let image: Image = serde_yaml::from_str("location: nginx:1.25").unwrap();
        assert!(image.build.is_empty());
        assert_eq!(image.location.non_empty(), Some("nginx:1.25"));
    }

    #[test]
    fn test_port_flattened_next_to_build() {
        let image: ImageWithPort = serde_yaml::from_str("build: Dockerfile\nport: 8080").unwrap();
        assert_eq!(image.port, Field::new(8080));
        assert_eq!(image.image.build.dockerfile.non_empty(), Some("Dockerfile"));
    }
}
