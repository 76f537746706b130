//! Member store errors.

use std::fmt;
use thiserror::Error;

/// The uniquely-keyed field a colliding insert hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Phone,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Email => write!(f, "email"),
            UniqueField::Phone => write!(f, "phone"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("A member with this {0} already exists")]
    UniqueViolation(UniqueField),

    #[error("{0}")]
    Unavailable(String),

    #[error("Member file version {found} is not supported (expected {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Member file is inconsistent: {0}")]
    Inconsistent(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether this error is the store rejecting a duplicate email or phone.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation(_))
    }
}
