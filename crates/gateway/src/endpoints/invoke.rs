//! # 任意のメソッド・パス — 関数呼び出し
//!
//! HTTPリクエストを関数の入力イベントに変換し、関数のレスポンスをHTTPレスポンスに戻す。

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tokenfn_types::{FunctionEvent, FunctionResponse, Headers};

use crate::config::GatewayState;

/// HTTPリクエストから関数の入力イベントを構築する。
///
/// - ASCIIで表現できないヘッダー値は捨てる
/// - 空のボディ、UTF-8でないボディは「ボディなし」として扱う
pub fn event_from_request(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
) -> FunctionEvent {
    let headers: Headers = headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
        .collect();

    let body = if body.is_empty() {
        None
    } else {
        std::str::from_utf8(body).ok().map(str::to_string)
    };

    FunctionEvent {
        http_method: method.as_str().to_string(),
        path: uri.path().to_string(),
        headers,
        body,
        is_base64_encoded: false,
    }
}

/// 関数のレスポンスをHTTPレスポンスとして返すためのラッパー。
pub struct FunctionHttpResponse(pub FunctionResponse);

impl IntoResponse for FunctionHttpResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.0.has_body() {
            (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                self.0.body,
            )
                .into_response()
        } else {
            status.into_response()
        }
    }
}

/// フォールバックハンドラ — 受け取ったリクエストをそのまま関数に渡す。
pub async fn handle_invoke(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> FunctionHttpResponse {
    let event = event_from_request(&method, &uri, &headers, &body);
    let response = state.function.handle(&event);
    tracing::info!(
        method = %event.http_method,
        path = %event.path,
        status = response.status_code,
        "関数を呼び出しました"
    );
    FunctionHttpResponse(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_event_from_request() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("x-binary", HeaderValue::from_bytes(b"\xff\xfe").unwrap());

        let uri: Uri = "/token?debug=1".parse().unwrap();
        let event = event_from_request(&Method::POST, &uri, &headers, br#"{"a":1}"#);

        assert_eq!(event.http_method, "POST");
        assert_eq!(event.path, "/token");
        assert_eq!(event.headers.get("content-type"), Some("application/json"));
        assert_eq!(event.headers.get("x-binary"), None);
        assert_eq!(event.body.as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_event_body_absent_or_invalid_utf8() {
        let uri: Uri = "/".parse().unwrap();
        let empty = event_from_request(&Method::GET, &uri, &HeaderMap::new(), b"");
        assert!(empty.body.is_none());

        let binary = event_from_request(&Method::POST, &uri, &HeaderMap::new(), b"\xff\x00");
        assert!(binary.body.is_none());
    }

    #[test]
    fn test_http_response_conversion() {
        let with_body = FunctionHttpResponse(FunctionResponse {
            body: "{\"token\":\"t\"}\n".to_string(),
            status_code: 201,
        })
        .into_response();
        assert_eq!(with_body.status(), StatusCode::CREATED);
        assert_eq!(
            with_body.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let empty = FunctionHttpResponse(FunctionResponse::empty(405)).into_response();
        assert_eq!(empty.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(empty.headers().get(header::CONTENT_TYPE).is_none());
    }
}
