//! Ledger Errors
//!
//! Error types for world state access and transaction commit.

use super::key::KeyError;

/// Errors that can occur while reading, writing or committing ledger state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Malformed key
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Notification emitted without a name
    #[error("event name must not be empty")]
    InvalidEventName,

    /// A key read during simulation changed before commit
    #[error("MVCC read conflict on {namespace}/{key:?}")]
    MvccReadConflict { namespace: String, key: String },

    /// A range scanned during simulation changed before commit
    #[error("phantom read conflict in {namespace} range [{start:?}, {end:?})")]
    PhantomReadConflict {
        namespace: String,
        start: String,
        end: String,
    },

    /// World state lock was poisoned by a panicking writer
    #[error("world state lock poisoned")]
    StatePoisoned,
}

impl LedgerError {
    /// Check if this error means the transaction lost a race and may be resubmitted
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            LedgerError::MvccReadConflict { .. } | LedgerError::PhantomReadConflict { .. }
        )
    }
}
