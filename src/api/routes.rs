//! API Routes
//!
//! HTTP endpoint definitions. Transactions and queries name a deployed module,
//! one of its operations and the string arguments, exactly as they would be
//! submitted to the ledger.

use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::ClientIdentity;
use crate::error::{AppError, AppResult};
use crate::ledger::Ledger;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvocationRequest {
    pub module: String,
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl InvocationRequest {
    fn validate(&self) -> AppResult<()> {
        if self.module.trim().is_empty() {
            return Err(AppError::InvalidRequest("module must not be empty".to_string()));
        }
        if self.function.trim().is_empty() {
            return Err(AppError::InvalidRequest("function must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub tx_id: String,
    pub block_number: u64,
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub payload: serde_json::Value,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<Arc<Ledger>> {
    Router::new()
        .route("/transactions", post(submit_transaction))
        .route("/queries", post(evaluate_query))
}

// =========================================================================
// POST /transactions
// =========================================================================

/// Submit a transaction and wait for it to commit
async fn submit_transaction(
    State(ledger): State<Arc<Ledger>>,
    Extension(identity): Extension<ClientIdentity>,
    Json(request): Json<InvocationRequest>,
) -> AppResult<Json<TransactionResponse>> {
    request.validate()?;

    // the ledger is synchronous; keep it off the async workers
    let receipt = tokio::task::spawn_blocking(move || {
        ledger.submit(&identity, &request.module, &request.function, &request.args)
    })
    .await
    .map_err(|e| AppError::Internal(format!("transaction task failed: {}", e)))??;

    Ok(Json(TransactionResponse {
        tx_id: receipt.tx_id,
        block_number: receipt.block_number,
        payload: payload_json(&receipt.payload),
    }))
}

// =========================================================================
// POST /queries
// =========================================================================

/// Evaluate a read-only operation against committed state
async fn evaluate_query(
    State(ledger): State<Arc<Ledger>>,
    Extension(identity): Extension<ClientIdentity>,
    Json(request): Json<InvocationRequest>,
) -> AppResult<Json<QueryResponse>> {
    request.validate()?;

    let response = tokio::task::spawn_blocking(move || {
        ledger.evaluate(&identity, &request.module, &request.function, &request.args)
    })
    .await
    .map_err(|e| AppError::Internal(format!("query task failed: {}", e)))?;

    if !response.is_success() {
        return Err(AppError::from(response));
    }

    Ok(Json(QueryResponse {
        payload: payload_json(&response.payload),
    }))
}

/// Operation payloads are JSON; anything else is passed through as a string
fn payload_json(payload: &[u8]) -> serde_json::Value {
    if payload.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(payload).unwrap_or_else(|_| {
        serde_json::Value::String(String::from_utf8_lossy(payload).into_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_json() {
        assert_eq!(payload_json(b""), serde_json::Value::Null);
        assert_eq!(payload_json(b"true"), serde_json::Value::Bool(true));
        assert_eq!(payload_json(b"{\"a\":1}")["a"], 1);
        assert_eq!(payload_json(b"plain"), serde_json::Value::String("plain".to_string()));
    }

    #[test]
    fn test_request_validation() {
        let request = InvocationRequest {
            module: " ".to_string(),
            function: "GetEvent".to_string(),
            args: vec![],
        };
        assert!(matches!(request.validate(), Err(AppError::InvalidRequest(_))));
    }
}
