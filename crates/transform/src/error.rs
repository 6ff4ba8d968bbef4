use kadi_core::Hash;
use thiserror::Error;

/// Data-contract violations found while transforming one weapon.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("item {item} has no socket block")]
    MissingSocketBlock { item: Hash },
    #[error("weapon {weapon}: intrinsic plug {plug} not found among weapon mods")]
    MissingIntrinsic { weapon: Hash, plug: Hash },
    #[error("weapon {weapon}: {kind} placeholder {plug} not found")]
    MissingPlaceholder { weapon: Hash, kind: &'static str, plug: Hash },
    #[error("mod {plug} has no perk reference")]
    MissingPerkReference { plug: Hash },
    #[error("mod {plug} references unknown sandbox perk {perk}")]
    UnknownSandboxPerk { plug: Hash, perk: Hash },
    #[error("weapon {weapon} is missing {field}")]
    MissingField { weapon: Hash, field: &'static str },
}

impl TransformError {
    /// Short stable label, used as a metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            TransformError::MissingSocketBlock { .. } => "missing_socket_block",
            TransformError::MissingIntrinsic { .. } => "missing_intrinsic",
            TransformError::MissingPlaceholder { .. } => "missing_placeholder",
            TransformError::MissingPerkReference { .. } => "missing_perk_reference",
            TransformError::UnknownSandboxPerk { .. } => "unknown_sandbox_perk",
            TransformError::MissingField { .. } => "missing_field",
        }
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("reading {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error("parsing table {table}: {source}")]
    Json { table: &'static str, #[source] source: serde_json::Error },
    #[error("manifest table {0} not found")]
    MissingTable(&'static str),
}
