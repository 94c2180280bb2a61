//! Error types for the core type layer

/// Errors raised while parsing or validating core values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    #[error("invalid hex length: {0} (expected 64)")]
    InvalidHexLength(usize),

    #[error("invalid hex character")]
    InvalidHex,

    #[error("invalid policy: majority {majority}, supermajority {super_majority} (must be within 0..=100)")]
    InvalidPolicy { majority: u32, super_majority: u32 },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TypesError {
    fn from(e: serde_json::Error) -> Self {
        TypesError::Serialization(e.to_string())
    }
}
