//! Invocation envelope
//!
//! Status + payload pair returned by every module invocation, whether it comes
//! from a client or from another module inside the same transaction.

use serde::{Deserialize, Serialize};

/// Successful invocation
pub const OK: i32 = 200;

/// Statuses at or above this value are errors
pub const ERROR_THRESHOLD: i32 = 400;

/// Generic failure
pub const ERROR: i32 = 500;

/// Response of a module invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default)]
    pub payload: Vec<u8>,
}

impl Response {
    /// Successful response carrying a payload
    pub fn success(payload: Vec<u8>) -> Self {
        Self {
            status: OK,
            message: String::new(),
            payload,
        }
    }

    /// Failed response. Statuses below the error threshold are promoted to `ERROR`.
    pub fn error(status: i32, message: impl Into<String>) -> Self {
        Self {
            status: if status < ERROR_THRESHOLD { ERROR } else { status },
            message: message.into(),
            payload: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status < ERROR_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = Response::success(b"{}".to_vec());
        assert!(response.is_success());
        assert_eq!(response.status, OK);
        assert!(response.message.is_empty());
    }

    #[test]
    fn test_error_response_keeps_status() {
        let response = Response::error(409, "section GA is full");
        assert!(!response.is_success());
        assert_eq!(response.status, 409);
        assert_eq!(response.message, "section GA is full");
    }

    #[test]
    fn test_error_response_never_looks_successful() {
        let response = Response::error(OK, "misused");
        assert_eq!(response.status, ERROR);
        assert!(!response.is_success());
    }
}
