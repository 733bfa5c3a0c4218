//! Workspace settings
//!
//! Settings are merged in three layers:
//! 1. Built-in defaults
//! 2. Workspace settings file (`wkld.toml` at the workspace root)
//! 3. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::BuiltinDefaults;
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveSettings, SETTINGS_FILE};
pub use merge::{deep_merge, merge_layers};
