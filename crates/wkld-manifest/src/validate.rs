//! Validation of user-supplied manifest values.
//!
//! Validation runs on the base configuration and on each overlay separately
//! when a manifest is decoded, and again on every resolved configuration.
//! Errors carry the dotted field path.

use regex_lite::Regex;
use std::sync::OnceLock;

use crate::error::ManifestError;
use crate::field::Field;
use crate::image::BuildSpec;
use crate::service::ServiceConfig;

/// Maximum workload name length.
pub const MAX_NAME_LEN: usize = 255;

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z][a-z0-9\-]*$").expect("valid name pattern"))
}

/// Validate a workload name.
///
/// Names start with a lowercase letter, contain only lowercase letters,
/// digits and hyphens, and have no consecutive or trailing hyphens.
pub fn validate_name(name: &str) -> Result<(), ManifestError> {
    if name.is_empty() {
        return Err(ManifestError::validation("name", "value must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ManifestError::validation(
            "name",
            format!("value must not exceed {} characters", MAX_NAME_LEN),
        ));
    }
    if !name_pattern().is_match(name) || name.contains("--") || name.ends_with('-') {
        return Err(ManifestError::validation(
            "name",
            format!(
                "'{}' must start with a letter, contain only lower-case letters, numbers, and hyphens, and have no consecutive or trailing hyphen",
                name
            ),
        ));
    }
    Ok(())
}

/// Validate a container port.
pub fn validate_port(field: &str, port: u16) -> Result<(), ManifestError> {
    if port == 0 {
        return Err(ManifestError::validation(
            field,
            "port must be a number between 1 and 65535",
        ));
    }
    Ok(())
}

/// Validate one config section. `prefix` is empty for the base and
/// `environments.<env>` for an overlay.
pub fn validate_config(prefix: &str, config: &ServiceConfig) -> Result<(), ManifestError> {
    let path = |field: &str| {
        if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        }
    };

    if let Field::Value(port) = config.port() {
        validate_port(&path("image.port"), *port)?;
    }

    validate_build(&path("image.build"), &config.image().build)?;

    for name in config.sidecars().keys() {
        if name.trim().is_empty() {
            return Err(ManifestError::validation(
                path("sidecars"),
                "sidecar names must not be empty",
            ));
        }
    }

    Ok(())
}

fn validate_build(field: &str, build: &BuildSpec) -> Result<(), ManifestError> {
    if build.dockerfile.non_empty().is_some() && build.builder.non_empty().is_some() {
        return Err(ManifestError::validation(
            field,
            "cannot specify both dockerfile and buildpack builder",
        ));
    }
    if let Some(key) = build.args.keys().find(|k| k.is_empty()) {
        return Err(ManifestError::validation(
            format!("{}.args", field),
            format!("build argument name '{}' must not be empty", key),
        ));
    }
    Ok(())
}
