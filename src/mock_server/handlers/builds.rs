//! Build endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use super::{apple_error, next_link, page, param};
use crate::mock_server::state::SharedState;

const DEFAULT_LIMIT: usize = 50;

/// GET /builds/{id}
pub async fn get_build(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let state = state.read().await;
    match state.get_build(&id) {
        Some(build) => Json(json!({ "data": build })).into_response(),
        None => apple_error(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "The specified resource does not exist",
            &format!("There is no resource of type 'builds' with id '{id}'"),
        ),
    }
}

/// GET /builds
pub async fn list_builds(
    State(state): State<SharedState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let state = state.read().await;

    let limit = param(&params, "limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(DEFAULT_LIMIT);
    let offset = param(&params, "cursor")
        .and_then(|c| c.parse().ok())
        .unwrap_or(0);

    let mut matching = state.list_builds(param(&params, "filter[app]"), param(&params, "filter[version]"));
    match param(&params, "sort") {
        Some("uploadedDate") => matching.sort_by_key(|b| b.attributes.uploaded_date),
        Some("-uploadedDate") => {
            matching.sort_by_key(|b| b.attributes.uploaded_date);
            matching.reverse();
        }
        _ => {}
    }
    let (data, next) = page(&matching, offset, limit);

    let mut links = json!({ "self": format!("{}/builds", state.base_url) });
    if let Some(next) = next.and_then(|n| next_link(&state.base_url, "/builds", &params, n)) {
        links["next"] = Value::String(next);
    }

    Json(json!({
        "data": data,
        "links": links,
        "meta": { "paging": { "total": matching.len(), "limit": limit } }
    }))
    .into_response()
}
