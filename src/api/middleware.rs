//! API Middleware
//!
//! API key authentication and request logging.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::domain::api_key::{hash_api_key, validate_api_key_format};
use crate::domain::OperationContext;

use super::AppState;

/// API Key authentication result
#[derive(Debug, Clone)]
pub struct AuthenticatedApiKey {
    pub id: Uuid,
    pub user_mail: String,
    pub key_prefix: String,
}

fn reject(status: StatusCode, error: &str, error_code: &str) -> Response {
    (
        status,
        Json(json!({
            "error": error,
            "error_code": error_code
        })),
    )
        .into_response()
}

/// First hop of `X-Forwarded-For`, if any
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

// =========================================================================
// API Key Authentication Middleware
// =========================================================================

/// Extract and validate API key from X-API-Key header
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let api_key = headers
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            reject(
                StatusCode::UNAUTHORIZED,
                "Missing X-API-Key header",
                "missing_api_key",
            )
        })?;

    // Malformed keys never reach the store
    if validate_api_key_format(api_key).is_err() {
        return Err(reject(
            StatusCode::UNAUTHORIZED,
            "Invalid or revoked API key",
            "invalid_api_key",
        ));
    }

    let record = match state.api_keys.find_active_by_hash(&hash_api_key(api_key)).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return Err(reject(
                StatusCode::UNAUTHORIZED,
                "Invalid or revoked API key",
                "invalid_api_key",
            ));
        }
        Err(e) => {
            tracing::error!("Storage error during API key validation: {}", e);
            return Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "database_error",
            ));
        }
    };

    // Extract correlation ID or generate new one
    let correlation_id = headers
        .get("X-Correlation-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let mut context = OperationContext::new()
        .with_api_key(record.id)
        .with_user_mail(record.user_mail.clone())
        .with_correlation_id(correlation_id);
    if let Some(ip) = client_ip(&headers) {
        context = context.with_client_ip(ip);
    }

    request.extensions_mut().insert(AuthenticatedApiKey {
        id: record.id,
        user_mail: record.user_mail,
        key_prefix: record.key_prefix,
    });
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &[
    "x-api-key",
    "authorization",
    "cookie",
    "set-cookie",
];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let headers = mask_headers_for_logging(request.headers());
    let correlation_id = request
        .headers()
        .get("X-Correlation-Id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        correlation_id = ?correlation_id,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %start.elapsed().as_millis(),
        correlation_id = ?correlation_id,
        "Request completed"
    );

    response
}
