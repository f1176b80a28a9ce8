//! Basic authentication middleware

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;

use super::credentials::CredentialService;

/// Authentication error response
#[derive(Debug)]
pub struct AuthError {
    pub status: StatusCode,
    pub error: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl AuthError {
    pub fn required() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "AUTH_REQUIRED",
            message: "Authentication required".to_string(),
        }
    }

    pub fn invalid() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "INVALID_CREDENTIALS",
            message: "Invalid username or password".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error,
            "code": self.code,
            "message": self.message,
        });
        let mut response = (self.status, Json(body)).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Basic realm=\"rately\""),
            );
        }
        response
    }
}

/// Shared auth state for middleware
#[derive(Clone)]
pub struct AuthState {
    pub credentials: CredentialService,
    /// When false, every request passes through unauthenticated
    pub enabled: bool,
}

/// Basic authentication middleware
///
/// Requires an `Authorization: Basic` header with credentials matching a
/// customer row. The verified customer is not injected anywhere; the
/// acting customer comes from the `UserId` header, matching clients that
/// authenticate as a service account.
pub async fn require_auth(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if !state.enabled {
        return Ok(next.run(request).await);
    }

    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AuthError::required)?;

    let (username, password) = decode_basic(header_value).ok_or_else(AuthError::invalid)?;

    if state.credentials.verify(&username, &password).await.is_none() {
        tracing::debug!(username = %username, "Rejected basic auth attempt");
        return Err(AuthError::invalid());
    }

    Ok(next.run(request).await)
}

/// Decode a `Basic base64(user:pass)` authorization header value
fn decode_basic(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?.trim();
    let decoded = BASE64.decode(encoded).ok()?;
    let pair = String::from_utf8(decoded).ok()?;
    // The password may itself contain a colon; split on the first only
    let (username, password) = pair.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(pair: &str) -> String {
        format!("Basic {}", BASE64.encode(pair))
    }

    #[test]
    fn test_decode_basic() {
        let (user, pass) = decode_basic(&encode("alice:wonderland")).unwrap();
        assert_eq!(user, "alice");
        assert_eq!(pass, "wonderland");
    }

    #[test]
    fn test_decode_basic_password_with_colon() {
        let (user, pass) = decode_basic(&encode("bob:p:ss:word")).unwrap();
        assert_eq!(user, "bob");
        assert_eq!(pass, "p:ss:word");
    }

    #[test]
    fn test_decode_rejects_other_schemes() {
        assert!(decode_basic("Bearer abc123").is_none());
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        assert!(decode_basic("Basic not-base64!!!").is_none());
    }

    #[test]
    fn test_decode_rejects_missing_colon() {
        assert!(decode_basic(&encode("alicewonderland")).is_none());
    }

    #[test]
    fn test_unauthorized_response_carries_challenge() {
        let response = AuthError::required().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}
