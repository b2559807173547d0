//! HTTP request handlers for the mock server.

pub mod builds;
pub mod localizations;
pub mod releases;

pub use builds::*;
pub use localizations::*;
pub use releases::*;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use url::Url;

use super::state::SharedState;

/// Records every request and enforces the required token, if any.
pub async fn record_and_authorize(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    {
        let mut state = state.write().await;
        state
            .requests
            .push(format!("{} {}", request.method(), request.uri().path()));

        if let Some(token) = &state.required_token {
            let expected = format!("Bearer {token}");
            let provided = request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok());
            if provided != Some(expected.as_str()) {
                return apple_error(
                    StatusCode::UNAUTHORIZED,
                    "NOT_AUTHORIZED",
                    "Authentication credentials are missing or invalid.",
                    "Provide a properly configured and signed bearer token.",
                );
            }
        }
    }
    next.run(request).await
}

/// App Store Connect style error document.
pub(crate) fn apple_error(status: StatusCode, code: &str, title: &str, detail: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "errors": [{
                "status": status.as_u16().to_string(),
                "code": code,
                "title": title,
                "detail": detail,
            }]
        })),
    )
        .into_response()
}

/// Google API style error document.
pub(crate) fn google_error(status: StatusCode, message: &str) -> Response {
    let reason = status
        .canonical_reason()
        .unwrap_or("UNKNOWN")
        .to_uppercase()
        .replace(' ', "_");
    (
        status,
        Json(serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": message,
                "status": reason,
            }
        })),
    )
        .into_response()
}

/// Look up the last value of a query parameter.
pub(crate) fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .rev()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Slice one page out of `items` starting at `offset`.
///
/// Returns the page and the offset of the next page, if any.
pub(crate) fn page<T: Clone>(items: &[&T], offset: usize, size: usize) -> (Vec<T>, Option<usize>) {
    let start = offset.min(items.len());
    let end = (start + size.max(1)).min(items.len());
    let next = (end < items.len()).then_some(end);
    (items[start..end].iter().map(|i| (*i).clone()).collect(), next)
}

/// Absolute `next` link repeating the request parameters with a new cursor.
pub(crate) fn next_link(
    base_url: &str,
    path: &str,
    params: &[(String, String)],
    cursor: usize,
) -> Option<String> {
    let mut url = Url::parse(base_url).ok()?.join(path).ok()?;
    {
        let mut query = url.query_pairs_mut();
        for (name, value) in params.iter().filter(|(k, _)| k != "cursor") {
            query.append_pair(name, value);
        }
        query.append_pair("cursor", &cursor.to_string());
    }
    Some(url.into())
}
