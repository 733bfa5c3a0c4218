//! Derivation errors.

/// Raised when a resolved manifest does not carry what derivation needs.
///
/// These are caller bugs: the manifest was expected to be fully resolved
/// before derivation. No defaults are substituted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeriveError {
    #[error("'{field}' must be resolved before deriving build arguments")]
    Unresolved { field: &'static str },

    #[error("workload '{name}' uses prebuilt image '{location}' and has nothing to build")]
    Prebuilt { name: String, location: String },
}
