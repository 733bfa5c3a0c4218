//! Top-level error type

use std::io;

use crate::config::ConfigError;
use crate::render::RenderError;
use crate::resolve::ResolveError;
use crate::workspace::WorkspaceError;

/// Any failure surfaced by the `wkld` library or CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Manifest(#[from] wkld_manifest::ManifestError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Derive(#[from] wkld_build::DeriveError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("settings: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Manifest(_) | Error::Workspace(_) => 2,
            Error::Resolve(_) => 3,
            Error::Derive(_) => 4,
            Error::Config(_) => 5,
            Error::Render(_) | Error::Io(_) => 1,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
