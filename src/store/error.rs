//! Entity Store Errors
//!
//! Error types for entity store operations.

use crate::ledger::{KeyError, LedgerError};

/// Errors that can occur while loading or saving entities
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Ledger access failed
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Entity identifiers do not form a valid key
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Entity could not be encoded
    #[error("Failed to serialize {name}: {source}")]
    Serialize {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Stored bytes are not a valid entity
    #[error("Failed to deserialize {name} at {key:?}: {source}")]
    Deserialize {
        name: &'static str,
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Check if the failure was caused by malformed identifiers
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            StoreError::Key(_) | StoreError::Ledger(LedgerError::Key(_))
        )
    }
}
