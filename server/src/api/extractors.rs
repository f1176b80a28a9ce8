//! Request extractors
//!
//! Every feedback endpoint acts on behalf of a customer identified by the
//! `UserId` header. The extractor rejects requests without a parseable id
//! before the handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::types::ApiError;
use crate::core::constants::USER_ID_HEADER;

/// The calling customer's id, taken from the `UserId` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub i64);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| {
                ApiError::bad_request(
                    "MISSING_USER_ID",
                    format!("The {} header is required", USER_ID_HEADER),
                )
            })?
            .to_str()
            .map_err(|_| invalid_user_id())?;

        let id: i64 = value.trim().parse().map_err(|_| invalid_user_id())?;
        Ok(Self(id))
    }
}

fn invalid_user_id() -> ApiError {
    ApiError::bad_request(
        "INVALID_USER_ID",
        format!("The {} header must be a numeric customer id", USER_ID_HEADER),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(request: Request<()>) -> Result<CallerId, ApiError> {
        let (mut parts, _) = request.into_parts();
        CallerId::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_parses_user_id_header() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "42")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.unwrap(), CallerId(42));
    }

    #[tokio::test]
    async fn test_missing_header() {
        let request = Request::builder().body(()).unwrap();
        let err = extract(request).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { code, .. } if code == "MISSING_USER_ID"));
    }

    #[tokio::test]
    async fn test_non_numeric_header() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "alice")
            .body(())
            .unwrap();
        let err = extract(request).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { code, .. } if code == "INVALID_USER_ID"));
    }

    #[tokio::test]
    async fn test_trims_whitespace() {
        let request = Request::builder()
            .header(USER_ID_HEADER, " 7 ")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.unwrap(), CallerId(7));
    }
}
