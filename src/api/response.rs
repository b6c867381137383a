use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Serialize `body` as JSON and attach the length of the listed collection
/// as `X-Total-Count`.
pub fn with_total_count<T: Serialize>(body: T, count: usize) -> Response {
    let json = match serde_json::to_string(&body) {
        Ok(json) => json,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        "X-Total-Count",
        HeaderValue::from(count as u64),
    );

    (StatusCode::OK, headers, json).into_response()
}
