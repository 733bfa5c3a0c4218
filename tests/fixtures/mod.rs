//! Shared manifest fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use wkld::manifest::Manifest;

/// Directory holding the YAML fixtures
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Raw contents of a fixture document
pub fn read_fixture(file_name: &str) -> String {
    let path = fixtures_dir().join(file_name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e))
}

/// Load balanced web service with test, staging and prod overlays
pub fn frontend() -> Manifest {
    Manifest::from_path(&fixtures_dir().join("frontend.yml")).expect("frontend fixture decodes")
}

/// Buildpack backend service with prod and dev overlays
pub fn api() -> Manifest {
    Manifest::from_path(&fixtures_dir().join("api.yml")).expect("api fixture decodes")
}
