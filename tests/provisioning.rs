//! Tests for downloading signing files over HTTP blob storage.

use appdist::provisioning::{ProvisioningDirectories, SigningFiles};
use appdist::{AppDistError, BlobStorage, HttpBlobStorage, ManualProvisioning};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_object(server: &MockServer, name: &str, contents: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/{name}")))
        .and(header("authorization", "Bearer storage-token"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(contents.to_vec()))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_http_storage_writes_object_bytes() {
    let mock_server = MockServer::start().await;
    mount_object(&mock_server, "dist.p12", &[0x30, 0x82, 0x0a, 0x00]).await;

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("nested").join("certificate.p12");

    let storage = HttpBlobStorage::new("storage-token", &mock_server.uri()).unwrap();
    assert_ok!(storage.save_to_file("dist.p12", &destination).await);

    assert_eq!(std::fs::read(&destination).unwrap(), vec![0x30, 0x82, 0x0a, 0x00]);
}

#[tokio::test]
async fn test_http_storage_missing_object() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.p12"))
        .respond_with(ResponseTemplate::new(404).set_body_string("No such object"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("certificate.p12");

    let storage = HttpBlobStorage::new("storage-token", &mock_server.uri()).unwrap();
    let err = assert_err!(storage.save_to_file("missing.p12", &destination).await);

    match err {
        AppDistError::Api {
            message,
            status_code,
        } => {
            assert_eq!(message, "No such object");
            assert_eq!(status_code, Some(404));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!destination.exists());
}

#[tokio::test]
async fn test_fetch_signing_files_over_http() {
    let mock_server = MockServer::start().await;
    mount_object(&mock_server, "development.mobileprovision", b"profile").await;
    mount_object(&mock_server, "development.p12", b"certificate").await;
    mount_object(&mock_server, "development.password", b"hunter2").await;

    let dir = tempfile::tempdir().unwrap();
    let directories =
        ProvisioningDirectories::new(dir.path().join("profiles"), dir.path().join("certificates"));
    let storage = HttpBlobStorage::new("storage-token", &mock_server.uri()).unwrap();
    let provisioning = ManualProvisioning::new(storage, directories);

    let files = assert_ok!(
        provisioning
            .fetch_signing_files(
                &["development.mobileprovision".to_string()],
                "development.p12",
                Some("development.password"),
            )
            .await
    );

    let certificate = dir.path().join("certificates").join("certificate.p12");
    assert_eq!(
        files,
        SigningFiles {
            profiles: vec![dir.path().join("profiles").join("profile.mobileprovision")],
            certificate: certificate.clone(),
        }
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("certificates").join("certificate.p12.password"))
            .unwrap(),
        "hunter2"
    );
}

#[tokio::test]
async fn test_empty_certificate_name_downloads_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let storage = HttpBlobStorage::new("storage-token", &mock_server.uri()).unwrap();
    let provisioning = ManualProvisioning::new(
        storage,
        ProvisioningDirectories::new(dir.path().join("p"), dir.path().join("c")),
    );

    let err = assert_err!(
        provisioning
            .fetch_signing_files(&["profile".to_string()], "", None)
            .await
    );
    assert!(err.is_local_validation());
}
