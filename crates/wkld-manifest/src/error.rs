//! Error types for manifest construction and decoding.

use std::io;

/// Errors raised before resolution ever runs.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// A field holds a value the model rejects. `field` is the dotted path,
    /// prefixed with `environments.<env>` for overlay entries.
    #[error("invalid value for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// A document section could not be decoded into the workload's shape.
    #[error("failed to decode '{section}': {source}")]
    Document {
        section: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("failed to read manifest: {0}")]
    Io(#[from] io::Error),

    #[error("unknown workload type '{0}'")]
    UnknownKind(String),
}

impl ManifestError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The field path implicated by a validation failure, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::Document { section, .. } => Some(section),
            _ => None,
        }
    }
}
