//! Contract Error Types
//!
//! Errors returned by the contract modules, and their encoding into the
//! invocation envelope. The same taxonomy is used whether an operation was
//! called by a client or by another module.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::{LedgerError, Response};
use crate::store::StoreError;

/// Error category, carried across module boundaries as a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    Conflict,
    InvalidState,
    PermissionDenied,
    DependencyFailure,
    Internal,
}

impl ErrorKind {
    /// Envelope status for this kind
    pub fn status(&self) -> i32 {
        match self {
            ErrorKind::InvalidArgument => 400,
            ErrorKind::PermissionDenied => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::AlreadyExists | ErrorKind::Conflict => 409,
            ErrorKind::InvalidState => 412,
            ErrorKind::Internal => 500,
            ErrorKind::DependencyFailure => 502,
        }
    }

    /// Decode the kind of a failed response.
    ///
    /// 409 decodes as `Conflict`; statuses with no kind of their own decode
    /// as `DependencyFailure`.
    pub fn from_status(status: i32) -> Self {
        match status {
            400 => ErrorKind::InvalidArgument,
            403 => ErrorKind::PermissionDenied,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            412 => ErrorKind::InvalidState,
            _ => ErrorKind::DependencyFailure,
        }
    }

    /// snake_case name, as used in error codes
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::DependencyFailure => "dependency_failure",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Errors raised by contract operations
#[derive(Debug, Error)]
pub enum ContractError {
    /// Malformed identifier, date, number or quantity
    #[error("{0}")]
    InvalidArgument(String),

    /// Referenced entity absent
    #[error("{0}")]
    NotFound(String),

    /// Entity identity already taken
    #[error("{0}")]
    AlreadyExists(String),

    /// Duplicate or exhausted resource
    #[error("{0}")]
    Conflict(String),

    /// Operation not permitted in the current lifecycle state
    #[error("{0}")]
    InvalidState(String),

    /// Caller identity does not match
    #[error("{0}")]
    PermissionDenied(String),

    /// A call into another module failed
    #[error("[{caller}] {target} call failed: {message}")]
    Dependency {
        caller: String,
        target: String,
        kind: ErrorKind,
        message: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ContractError {
    /// Build a dependency failure from the response of a nested call
    pub fn dependency(caller: &str, target: &str, response: &Response) -> Self {
        Self::Dependency {
            caller: caller.to_string(),
            target: target.to_string(),
            kind: ErrorKind::from_status(response.status),
            message: response.message.clone(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ContractError::NotFound(_) => ErrorKind::NotFound,
            ContractError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            ContractError::Conflict(_) => ErrorKind::Conflict,
            ContractError::InvalidState(_) => ErrorKind::InvalidState,
            ContractError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            ContractError::Dependency { kind, .. } => *kind,
            ContractError::Store(err) if err.is_key_error() => ErrorKind::InvalidArgument,
            ContractError::Ledger(LedgerError::Key(_)) => ErrorKind::InvalidArgument,
            ContractError::Store(_)
            | ContractError::Ledger(_)
            | ContractError::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// Encode as a failed response of `module`.
    ///
    /// Dependency failures already name the calling module and are not prefixed again.
    pub fn into_response(self, module: &str) -> Response {
        let status = self.kind().status();
        let message = match &self {
            ContractError::Dependency { .. } => self.to_string(),
            _ => format!("[{}] | {}", module, self),
        };
        Response::error(status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::KeyError;

    #[test]
    fn test_kind_status_round_trip() {
        for kind in [
            ErrorKind::InvalidArgument,
            ErrorKind::NotFound,
            ErrorKind::Conflict,
            ErrorKind::InvalidState,
            ErrorKind::PermissionDenied,
            ErrorKind::DependencyFailure,
        ] {
            assert_eq!(ErrorKind::from_status(kind.status()), kind);
        }
    }

    #[test]
    fn test_already_exists_decodes_as_conflict() {
        assert_eq!(ErrorKind::AlreadyExists.status(), 409);
        assert_eq!(ErrorKind::from_status(409), ErrorKind::Conflict);
    }

    #[test]
    fn test_unknown_status_decodes_as_dependency_failure() {
        assert_eq!(ErrorKind::from_status(500), ErrorKind::DependencyFailure);
        assert_eq!(ErrorKind::from_status(418), ErrorKind::DependencyFailure);
    }

    #[test]
    fn test_into_response_prefixes_module() {
        let response = ContractError::Conflict("section GA is full".to_string())
            .into_response("ticken-event");

        assert_eq!(response.status, 409);
        assert_eq!(response.message, "[ticken-event] | section GA is full");
    }

    #[test]
    fn test_dependency_keeps_remote_message_and_kind() {
        let remote = Response::error(409, "[ticken-event] | section GA is full");
        let err = ContractError::dependency("ticken-ticket", "ticken-event", &remote);

        assert_eq!(err.kind(), ErrorKind::Conflict);

        let response = err.into_response("ticken-ticket");
        assert_eq!(response.status, 409);
        assert_eq!(
            response.message,
            "[ticken-ticket] ticken-event call failed: [ticken-event] | section GA is full"
        );
    }

    #[test]
    fn test_key_errors_are_invalid_arguments() {
        let err = ContractError::from(LedgerError::Key(KeyError::EmptyObjectType));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = ContractError::from(LedgerError::StatePoisoned);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.into_response("m").status, 500);
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::PermissionDenied).unwrap(),
            "\"permission_denied\""
        );
        assert_eq!(ErrorKind::InvalidState.as_str(), "invalid_state");
    }
}
