//! Build argument derivation for resolved workload manifests.
//!
//! Turns a resolved manifest into the record an image build invoker needs
//! (dockerfile or buildpack mode, tags, ordered build args) and projects
//! that record into deterministic `docker`/`pack` command lines.

mod arguments;
mod command;
mod error;

pub use arguments::{derive, BuildArguments, BuildMode, ImageRef, DEFAULT_DOCKERFILE};
pub use command::{image_name, Command, BUILDPACK_STAGING_TAG};
pub use error::DeriveError;
