//! JSON body extractor with `AppError` rejections

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use shared::error::AppError;

/// Like `axum::Json`, but failures use the `ApiResponse` envelope
///
/// An empty body reads as the payload's `Default`, so missing fields are
/// reported by the service (`RequiredField`) rather than by the transport.
/// The Content-Type header is not checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::invalid_request(e.body_text()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        serde_json::from_slice(&body)
            .map(Self)
            .map_err(|e| AppError::invalid_request(format!("Invalid JSON body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use shared::error::ErrorCode;
    use shared::models::PlaceOrderRequest;

    async fn extract(body: &'static str) -> Result<PlaceOrderRequest, AppError> {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap();
        ApiJson::<PlaceOrderRequest>::from_request(req, &())
            .await
            .map(|ApiJson(v)| v)
    }

    #[tokio::test]
    async fn test_empty_body_is_default() {
        let req = extract("").await.unwrap();
        assert_eq!(req.table_id, None);
        assert!(req.items.is_empty());
    }

    #[tokio::test]
    async fn test_parses_without_content_type() {
        let req = extract(r#"{"table_id": 3}"#).await.unwrap();
        assert_eq!(req.table_id, Some(3));
    }

    #[tokio::test]
    async fn test_wrong_type_is_invalid_request() {
        let err = extract(r#"{"table_id": 3, "items": [{"item_id": 1, "quantity": "2"}]}"#)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert!(err.message.starts_with("Invalid JSON body"));
    }
}
