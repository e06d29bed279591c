//! Error handling module
//!
//! Gateway error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::ErrorKind;
use crate::ledger::{response, SubmitError};

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// A module operation failed; carries the envelope status and message
    #[error("{message}")]
    Contract { status: i32, message: String },

    #[error("Transaction {tx_id} lost a concurrent update; resubmit it")]
    MvccConflict { tx_id: String, details: String },

    // Server errors (5xx)
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Endorsement(response) => AppError::from(response),
            SubmitError::Rejected { tx_id, source } if source.is_conflict() => {
                AppError::MvccConflict {
                    tx_id,
                    details: source.to_string(),
                }
            }
            SubmitError::Rejected { tx_id, source } => {
                AppError::Internal(format!("transaction {} rejected: {}", tx_id, source))
            }
        }
    }
}

impl From<crate::ledger::Response> for AppError {
    fn from(response: crate::ledger::Response) -> Self {
        AppError::Contract {
            status: response.status,
            message: response.message,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::MissingHeader(header) => {
                (StatusCode::BAD_REQUEST, "missing_header", Some(header.clone()))
            }

            // Envelope status of the failed operation
            AppError::Contract { status, .. } => {
                let code = if *status == response::ERROR {
                    ErrorKind::Internal.as_str()
                } else {
                    ErrorKind::from_status(*status).as_str()
                };
                let http_status = u16::try_from(*status)
                    .ok()
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (http_status, code, None)
            }

            // 409 Conflict
            AppError::MvccConflict { details, .. } => {
                (StatusCode::CONFLICT, "mvcc_read_conflict", Some(details.clone()))
            }

            // 500 Internal Server Error
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LedgerError, Response as LedgerResponse};

    #[test]
    fn test_contract_failure_keeps_status() {
        let err = AppError::from(LedgerResponse::error(409, "[ticken-event] | section GA is full"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_mvcc_rejection_is_conflict() {
        let err = AppError::from(SubmitError::Rejected {
            tx_id: "abc".to_string(),
            source: LedgerError::MvccReadConflict {
                namespace: "ticken-event".to_string(),
                key: "e1".to_string(),
            },
        });
        assert!(matches!(err, AppError::MvccConflict { .. }));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_other_rejection_is_internal() {
        let err = AppError::from(SubmitError::Rejected {
            tx_id: "abc".to_string(),
            source: LedgerError::StatePoisoned,
        });
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
