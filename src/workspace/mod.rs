//! Workspace layout
//!
//! A workspace is a directory holding one sub-directory per workload, each
//! with its manifest file:
//!
//! ```text
//! <root>/
//!   wkld.toml
//!   frontend/manifest.yml
//!   api/manifest.yml
//! ```

use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use wkld_manifest::{Manifest, WorkloadKind, MANIFEST_FILE};

/// Workspace errors
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("no manifest for workload '{name}' at {}", path.display())]
    NotFound { name: String, path: PathBuf },

    #[error("{}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: wkld_manifest::ManifestError,
    },
}

/// A manifest found on disk.
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WorkloadKind,
    pub path: PathBuf,
    pub environments: Vec<String>,
}

/// Outcome of writing a new manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    /// A manifest was already there and was left untouched.
    Exists,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    manifest_file: String,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest_file: MANIFEST_FILE.to_string(),
        }
    }

    /// Use `file_name` instead of `manifest.yml`.
    pub fn with_manifest_file(mut self, file_name: impl Into<String>) -> Self {
        self.manifest_file = file_name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<name>/<manifest file>`
    pub fn manifest_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join(&self.manifest_file)
    }

    /// Read and decode the manifest of workload `name`.
    ///
    /// Looks in `<root>/<name>` first, then for a discovered manifest whose
    /// `name` matches, so every name `discover` reports can be loaded.
    pub fn load(&self, name: &str) -> Result<Manifest, WorkspaceError> {
        let path = self.manifest_path(name);
        if path.is_file() {
            return Manifest::from_path(&path)
                .map_err(|source| WorkspaceError::Manifest { path, source });
        }

        let Some(entry) = self.discover()?.into_iter().find(|e| e.name == name) else {
            return Err(WorkspaceError::NotFound {
                name: name.to_string(),
                path,
            });
        };
        tracing::debug!(name, path = %entry.path.display(), "manifest found outside its named directory");
        Manifest::from_path(&entry.path).map_err(|source| WorkspaceError::Manifest {
            path: entry.path,
            source,
        })
    }

    /// Every decodable manifest one level below the root, sorted by
    /// workload name. Hidden directories are skipped.
    pub fn discover(&self) -> Result<Vec<WorkloadEntry>, WorkspaceError> {
        let mut entries = Vec::new();

        // The root itself may be hidden (temporary directories often are).
        let walker = WalkDir::new(&self.root)
            .max_depth(2)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(&e.file_name().to_string_lossy()));

        for entry in walker {
            let entry = entry?;
            if entry.depth() != 2
                || !entry.file_type().is_file()
                || entry.file_name() != self.manifest_file.as_str()
            {
                continue;
            }

            let path = entry.into_path();
            let manifest = Manifest::from_path(&path).map_err(|source| {
                WorkspaceError::Manifest {
                    path: path.clone(),
                    source,
                }
            })?;

            tracing::trace!(path = %path.display(), name = %manifest.name, "found manifest");
            entries.push(WorkloadEntry {
                kind: manifest.kind(),
                environments: manifest.environment_names().map(str::to_string).collect(),
                name: manifest.name,
                path,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Write a manifest for `name` unless one already exists.
    pub fn write_manifest(&self, name: &str, contents: &[u8]) -> Result<WriteOutcome, WorkspaceError> {
        let path = self.manifest_path(name);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!(path = %path.display(), "manifest exists, skipping");
                return Ok(WriteOutcome::Exists);
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(contents)?;
        Ok(WriteOutcome::Created)
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
