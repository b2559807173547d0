//! Execution tests for beta build localization operations.
//!
//! Uses wiremock to mock App Store Connect and count the requests each
//! operation issues.

use appdist::apple::{AppStoreConnectClient, BetaBuildLocalization, BetaBuildLocalizationFilter};
use appdist::AppDistError;
use serde_json::json;
use wiremock::matchers::{any, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn localization_json(id: &str, locale: &str, whats_new: &str) -> serde_json::Value {
    json!({
        "type": "betaBuildLocalizations",
        "id": id,
        "attributes": {
            "whatsNew": whats_new,
            "locale": locale
        },
        "links": {
            "self": format!("https://api.appstoreconnect.apple.com/v1/betaBuildLocalizations/{id}")
        }
    })
}

async fn mount_lookup(server: &MockServer, matches: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/betaBuildLocalizations"))
        .and(query_param("filter[build]", "123"))
        .and(query_param("filter[locale]", "en-US"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": matches,
            "links": {"self": format!("{}/betaBuildLocalizations", server.uri())}
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_no_mutation(server: &MockServer) {
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(server)
        .await;
}

/// Method and path of every received request, in arrival order.
async fn request_sequence(mock_server: &MockServer) -> Vec<String> {
    mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_sends_single_post_with_build_relationship() {
    let mock_server = MockServer::start().await;

    let expected_payload = json!({
        "data": {
            "type": "betaBuildLocalizations",
            "attributes": {
                "locale": "en-US",
                "whatsNew": "Fixed bugs"
            },
            "relationships": {
                "build": {
                    "data": {"id": "123", "type": "builds"}
                }
            }
        }
    });

    Mock::given(method("POST"))
        .and(path("/betaBuildLocalizations"))
        .and(body_json(&expected_payload))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": localization_json("loc-1", "en-US", "Fixed bugs")
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AppStoreConnectClient::new("test-token", &mock_server.uri()).unwrap();
    let created = client
        .beta_build_localizations()
        .create("123", "en-US", "Fixed bugs")
        .await
        .unwrap();

    assert!(created.is_created());
    assert_eq!(created.id, "loc-1");
    assert_eq!(created.attributes.locale.as_deref(), Some("en-US"));
    assert_eq!(created.attributes.whats_new.as_deref(), Some("Fixed bugs"));
}

#[tokio::test]
async fn test_create_with_wrong_resource_type_makes_no_request() {
    let mock_server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let not_a_build: BetaBuildLocalization =
        serde_json::from_value(localization_json("loc-1", "en-US", "Fixed bugs")).unwrap();

    let client = AppStoreConnectClient::new("test-token", &mock_server.uri()).unwrap();
    let err = client
        .beta_build_localizations()
        .create(&not_a_build, "en-US", "Fixed bugs")
        .await
        .unwrap_err();

    assert!(err.is_local_validation());
    assert!(matches!(
        err,
        AppDistError::WrongResourceType {
            expected: "builds",
            ..
        }
    ));
}

#[tokio::test]
async fn test_create_surfaces_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/betaBuildLocalizations"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "errors": [{
                "status": "409",
                "code": "ENTITY_ERROR.ATTRIBUTE.INVALID",
                "title": "An attribute value is invalid.",
                "detail": "'xx-XX' is not a valid locale"
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AppStoreConnectClient::new("test-token", &mock_server.uri()).unwrap();
    let err = client
        .beta_build_localizations()
        .create("123", "xx-XX", "Fixed bugs")
        .await
        .unwrap_err();

    match err {
        AppDistError::Api {
            message,
            status_code,
        } => {
            assert_eq!(status_code, Some(409));
            assert!(message.contains("not a valid locale"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// =============================================================================
// Modify
// =============================================================================

#[tokio::test]
async fn test_modify_looks_up_then_patches_once() {
    let mock_server = MockServer::start().await;
    mount_lookup(&mock_server, vec![localization_json("loc-1", "en-US", "Old notes")]).await;

    Mock::given(method("PATCH"))
        .and(path("/betaBuildLocalizations/loc-1"))
        .and(body_json(json!({
            "data": {
                "id": "loc-1",
                "type": "betaBuildLocalizations",
                "attributes": {"whatsNew": "New notes"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": localization_json("loc-1", "en-US", "New notes")
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AppStoreConnectClient::new("test-token", &mock_server.uri()).unwrap();
    let modified = client
        .beta_build_localizations()
        .modify("123", "en-US", "New notes")
        .await
        .unwrap();

    assert!(!modified.is_created());
    assert_eq!(modified.attributes.whats_new.as_deref(), Some("New notes"));
    assert_eq!(
        request_sequence(&mock_server).await,
        vec!["GET /betaBuildLocalizations", "PATCH /betaBuildLocalizations/loc-1"]
    );
}

#[tokio::test]
async fn test_modify_without_match_issues_no_patch() {
    let mock_server = MockServer::start().await;
    mount_lookup(&mock_server, vec![]).await;
    mount_no_mutation(&mock_server).await;

    let client = AppStoreConnectClient::new("test-token", &mock_server.uri()).unwrap();
    let err = client
        .beta_build_localizations()
        .modify("123", "en-US", "New notes")
        .await
        .unwrap_err();

    assert!(err.is_lookup_failure());
    assert!(matches!(
        err,
        AppDistError::NotFound {
            entity_type: "betaBuildLocalizations",
            ..
        }
    ));
}

#[tokio::test]
async fn test_modify_with_ambiguous_match_issues_no_patch() {
    let mock_server = MockServer::start().await;
    mount_lookup(
        &mock_server,
        vec![
            localization_json("loc-1", "en-US", "Notes"),
            localization_json("loc-2", "en-US", "Notes"),
        ],
    )
    .await;
    mount_no_mutation(&mock_server).await;

    let client = AppStoreConnectClient::new("test-token", &mock_server.uri()).unwrap();
    let err = client
        .beta_build_localizations()
        .modify("123", "en-US", "New notes")
        .await
        .unwrap_err();

    assert!(matches!(err, AppDistError::Ambiguous { .. }));
    assert_eq!(
        err.to_string(),
        "multiple betaBuildLocalizations match 'build 123 locale en-US', expected exactly one"
    );
}

#[tokio::test]
async fn test_modify_with_empty_locale_makes_no_request() {
    let mock_server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = AppStoreConnectClient::new("test-token", &mock_server.uri()).unwrap();
    let err = client
        .beta_build_localizations()
        .modify("123", "", "New notes")
        .await
        .unwrap_err();

    assert!(matches!(err, AppDistError::InvalidParameter(_)));
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_looks_up_then_deletes_once() {
    let mock_server = MockServer::start().await;
    mount_lookup(&mock_server, vec![localization_json("loc-1", "en-US", "Notes")]).await;

    Mock::given(method("DELETE"))
        .and(path("/betaBuildLocalizations/loc-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AppStoreConnectClient::new("test-token", &mock_server.uri()).unwrap();
    client
        .beta_build_localizations()
        .delete("123", "en-US")
        .await
        .unwrap();

    assert_eq!(
        request_sequence(&mock_server).await,
        vec!["GET /betaBuildLocalizations", "DELETE /betaBuildLocalizations/loc-1"]
    );
}

#[tokio::test]
async fn test_delete_without_match_issues_no_delete() {
    let mock_server = MockServer::start().await;
    mount_lookup(&mock_server, vec![]).await;
    mount_no_mutation(&mock_server).await;

    let client = AppStoreConnectClient::new("test-token", &mock_server.uri()).unwrap();
    let err = client
        .beta_build_localizations()
        .delete("123", "en-US")
        .await
        .unwrap_err();

    assert!(matches!(err, AppDistError::NotFound { .. }));
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn test_list_sends_only_populated_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/betaBuildLocalizations"))
        .and(query_param("filter[locale]", "de-DE"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [localization_json("loc-3", "de-DE", "Fehler behoben")],
            "links": {"self": format!("{}/betaBuildLocalizations", mock_server.uri())}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AppStoreConnectClient::new("test-token", &mock_server.uri()).unwrap();
    let filter = BetaBuildLocalizationFilter {
        locale: Some("de-DE".to_string()),
        ..Default::default()
    };
    let localizations = client
        .beta_build_localizations()
        .list(&filter)
        .unwrap()
        .collect_all()
        .await
        .unwrap();

    assert_eq!(localizations.len(), 1);
    assert_eq!(localizations[0].id, "loc-3");

    let requests = mock_server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default();
    assert!(!query.contains("filter%5Bbuild%5D"));
    assert!(!query.contains("filter[build]"));
}

#[tokio::test]
async fn test_unauthorized_is_authentication_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/betaBuildLocalizations"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": [{
                "status": "401",
                "code": "NOT_AUTHORIZED",
                "title": "Authentication credentials are missing or invalid."
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AppStoreConnectClient::new("expired-token", &mock_server.uri()).unwrap();
    let err = client
        .beta_build_localizations()
        .list(&BetaBuildLocalizationFilter::default())
        .unwrap()
        .collect_all()
        .await
        .unwrap_err();

    assert!(matches!(err, AppDistError::Authentication(_)));
}
