//! Beta build localization endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{apple_error, next_link, page, param};
use crate::mock_server::state::SharedState;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

/// Body of a create or modify request.
#[derive(Debug, Deserialize)]
pub struct LocalizationDocument {
    pub data: LocalizationData,
}

#[derive(Debug, Deserialize)]
pub struct LocalizationData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub attributes: LocalizationAttributesInput,
    #[serde(default)]
    pub relationships: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizationAttributesInput {
    pub locale: Option<String>,
    pub whats_new: Option<String>,
}

fn invalid_entity(detail: &str) -> Response {
    apple_error(
        StatusCode::CONFLICT,
        "ENTITY_ERROR",
        "The provided entity is invalid.",
        detail,
    )
}

fn not_found(id: &str) -> Response {
    apple_error(
        StatusCode::NOT_FOUND,
        "NOT_FOUND",
        "The specified resource does not exist",
        &format!("There is no resource of type 'betaBuildLocalizations' with id '{id}'"),
    )
}

/// POST /betaBuildLocalizations
pub async fn create_localization(
    State(state): State<SharedState>,
    Json(document): Json<LocalizationDocument>,
) -> Response {
    let data = document.data;
    if data.resource_type != "betaBuildLocalizations" {
        return invalid_entity(&format!("Unexpected type '{}'", data.resource_type));
    }

    let build_id = data
        .relationships
        .as_ref()
        .and_then(|r| r.pointer("/build/data/id"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let Some(build_id) = build_id else {
        return invalid_entity("The relationship 'build' is required");
    };
    let Some(locale) = data.attributes.locale else {
        return invalid_entity("The attribute 'locale' is required");
    };

    let mut state = state.write().await;
    match state.create_localization(&build_id, &locale, data.attributes.whats_new) {
        Ok(localization) => (StatusCode::CREATED, Json(json!({ "data": localization }))).into_response(),
        Err(detail) => apple_error(StatusCode::CONFLICT, "ENTITY_ERROR.DUPLICATE", "Duplicate entity", &detail),
    }
}

/// GET /betaBuildLocalizations
pub async fn list_localizations(
    State(state): State<SharedState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let state = state.read().await;

    let limit = param(&params, "limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return apple_error(
            StatusCode::BAD_REQUEST,
            "PARAMETER_ERROR.INVALID",
            "A parameter has an invalid value",
            &format!("'{limit}' is not a valid value for 'limit'"),
        );
    }
    let offset = param(&params, "cursor")
        .and_then(|c| c.parse().ok())
        .unwrap_or(0);

    let matching = state.list_localizations(
        param(&params, "filter[build]"),
        param(&params, "filter[locale]"),
    );
    let total = matching.len();
    let (data, next) = page(&matching, offset, limit);

    let mut links = json!({ "self": format!("{}/betaBuildLocalizations", state.base_url) });
    if let Some(next) = next.and_then(|n| next_link(&state.base_url, "/betaBuildLocalizations", &params, n)) {
        links["next"] = Value::String(next);
    }

    Json(json!({
        "data": data,
        "links": links,
        "meta": { "paging": { "total": total, "limit": limit } }
    }))
    .into_response()
}

/// PATCH /betaBuildLocalizations/{id}
pub async fn update_localization(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(document): Json<LocalizationDocument>,
) -> Response {
    let data = document.data;
    if data.id.as_deref() != Some(id.as_str()) {
        return invalid_entity("The resource id in the body does not match the path");
    }

    let mut state = state.write().await;
    match state.update_localization(&id, data.attributes.whats_new) {
        Some(localization) => Json(json!({ "data": localization })).into_response(),
        None => not_found(&id),
    }
}

/// DELETE /betaBuildLocalizations/{id}
pub async fn delete_localization(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.write().await;
    if state.delete_localization(&id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(&id)
    }
}
