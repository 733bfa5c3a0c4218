//! Command-line projections of [`BuildArguments`].
//!
//! These produce the exact argv the image build invoker runs. Nothing here
//! spawns a process.

use serde::Serialize;
use std::fmt;

use crate::arguments::{BuildArguments, BuildMode};

/// Tag the buildpack builder writes before the image is retagged.
pub const BUILDPACK_STAGING_TAG: &str = "latest";

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub program: String,
    pub args: Vec<String>,
}

impl Command {
    fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn flag(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg.replace('\'', r"'\''"))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// `uri:tag`
pub fn image_name(uri: &str, tag: &str) -> String {
    format!("{}:{}", uri, tag)
}

impl BuildArguments {
    /// Commands that build and tag the image.
    ///
    /// Dockerfile mode is a single `docker build`. Buildpack mode runs
    /// `pack build` to a staging tag, then `docker tag` to the image tag.
    pub fn build_commands(&self) -> Vec<Command> {
        match self.mode() {
            BuildMode::Dockerfile => vec![self.docker_build()],
            BuildMode::Buildpack => {
                let staged = image_name(&self.registry_uri, BUILDPACK_STAGING_TAG);
                vec![
                    self.pack_build(&staged),
                    Command::new("docker")
                        .arg("tag")
                        .arg(staged)
                        .arg(image_name(&self.registry_uri, &self.image_tag)),
                ]
            }
        }
    }

    /// One `docker push` per published tag.
    pub fn push_commands(&self) -> Vec<Command> {
        self.tags()
            .map(|tag| {
                Command::new("docker")
                    .arg("push")
                    .arg(image_name(&self.registry_uri, tag))
            })
            .collect()
    }

    fn docker_build(&self) -> Command {
        let mut cmd = Command::new("docker").arg("build");
        for tag in self.tags() {
            cmd = cmd.flag("-t", image_name(&self.registry_uri, tag));
        }
        if let Some(target) = &self.target {
            cmd = cmd.flag("--target", target.as_str());
        }
        for source in &self.cache_from {
            cmd = cmd.flag("--cache-from", source.as_str());
        }
        for (key, value) in self.sorted_build_args() {
            cmd = cmd.flag("--build-arg", format!("{}={}", key, value));
        }
        cmd = cmd.arg(self.context_dir.to_string_lossy());
        if let Some(dockerfile) = &self.dockerfile_path {
            cmd = cmd.flag("-f", dockerfile.to_string_lossy());
        }
        cmd
    }

    fn pack_build(&self, staged: &str) -> Command {
        let mut cmd = Command::new("pack").arg("build").arg(staged);
        if let Some(builder) = &self.builder_name {
            cmd = cmd.flag("--builder", builder.as_str());
        }
        cmd = cmd.flag("--path", self.context_dir.to_string_lossy());
        for (key, value) in self.sorted_env() {
            cmd = cmd.flag("--env", format!("{}={}", key, value));
        }
        cmd
    }
}
