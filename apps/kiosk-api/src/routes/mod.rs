//! Route registration and middleware.

use axum::body::Bytes;
use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use serde::de::DeserializeOwned;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::AppState;

pub mod health;
pub mod menu;
pub mod orders;

/// Build a router with all routes registered (no middleware, no state).
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(menu::router())
        .merge(orders::router())
}

/// Build a fully configured application with all middleware and state.
pub fn build_app(state: AppState) -> Router {
    build_router()
        // CORS - all origins, methods and headers
        .layer(CorsLayer::permissive())
        // Every OPTIONS request answers 204
        .layer(middleware::from_fn(options_no_content))
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn options_no_content(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_options {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

/// Decodes a JSON request body.
///
/// Text that is not JSON at all is an internal error; JSON whose shape
/// doesn't fit `T` is a validation error. An empty body reads as `{}`.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    let value: serde_json::Value = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::Value::Object(Default::default())
    } else {
        serde_json::from_slice(body).map_err(|e| ApiError::internal(format!("malformed JSON: {e}")))?
    };

    serde_json::from_value(value).map_err(|e| ApiError::validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use kiosk_core::OrderRequest;

    #[test]
    fn test_parse_body_error_classes() {
        let err = parse_body::<OrderRequest>(&Bytes::from_static(b"{not json")).unwrap_err();
        assert_eq!(err.code, ErrorCode::Internal);

        let err = parse_body::<OrderRequest>(&Bytes::from_static(br#"{"items":"M1"}"#)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let empty = parse_body::<OrderRequest>(&Bytes::new()).unwrap();
        assert!(empty.items.is_empty());
    }
}
