//! Firebase release endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use super::{google_error, page, param};
use crate::mock_server::state::SharedState;

const DEFAULT_PAGE_SIZE: usize = 25;
const MAX_PAGE_SIZE: usize = 100;

/// GET /projects/{project}/apps/{app}/releases
pub async fn list_releases(
    State(state): State<SharedState>,
    Path((project, app)): Path<(String, String)>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let state = state.read().await;

    if !state.releases.contains_key(&app) {
        return google_error(
            StatusCode::NOT_FOUND,
            &format!("App projects/{project}/apps/{app} not found"),
        );
    }

    let page_size = param(&params, "pageSize")
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = match param(&params, "pageToken") {
        None | Some("") => 0,
        Some(token) => match token.strip_prefix("offset-").and_then(|o| o.parse().ok()) {
            Some(offset) => offset,
            None => {
                return google_error(
                    StatusCode::BAD_REQUEST,
                    &format!("Request contains an invalid argument: page token '{token}'"),
                )
            }
        },
    };
    let newest_first = param(&params, "orderBy") != Some("createTime");

    let matching = state.list_releases(&app, newest_first);
    let (releases, next) = page(&matching, offset, page_size);

    let mut body = Map::new();
    if !releases.is_empty() {
        body.insert("releases".to_string(), json!(releases));
    }
    if let Some(next) = next {
        body.insert(
            "nextPageToken".to_string(),
            Value::String(format!("offset-{next}")),
        );
    }
    Json(Value::Object(body)).into_response()
}
