//! API Middleware
//!
//! Caller identity extraction and request logging.

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::domain::ClientIdentity;
use crate::error::AppError;

/// Header carrying the caller's organization (MSP) id
pub const MSP_ID_HEADER: &str = "x-msp-id";

/// Header carrying the caller's username
pub const USERNAME_HEADER: &str = "x-username";

// =========================================================================
// Identity Middleware
// =========================================================================

/// Build the caller's [`ClientIdentity`] from the identity headers
pub async fn identity_middleware(
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let msp_id = required_header(&headers, MSP_ID_HEADER)?;
    let username = required_header(&headers, USERNAME_HEADER)?;

    request
        .extensions_mut()
        .insert(ClientIdentity::new(msp_id, username));

    Ok(next.run(request).await)
}

fn required_header(headers: &HeaderMap, name: &'static str) -> Result<String, Response> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::MissingHeader(name.to_string()).into_response())
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let caller = request
        .headers()
        .get(USERNAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        caller = ?caller,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_required_header_trims() {
        let mut headers = HeaderMap::new();
        headers.insert(MSP_ID_HEADER, " Org1MSP ".parse().unwrap());

        assert_eq!(required_header(&headers, MSP_ID_HEADER).unwrap(), "Org1MSP");
    }

    #[test]
    fn test_required_header_missing_or_blank() {
        let mut headers = HeaderMap::new();
        headers.insert(USERNAME_HEADER, "  ".parse().unwrap());

        let missing = required_header(&headers, MSP_ID_HEADER).unwrap_err();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let blank = required_header(&headers, USERNAME_HEADER).unwrap_err();
        assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    }
}
