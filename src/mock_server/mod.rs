//! Mock App Store Connect and Firebase App Distribution server for E2E
//! testing.
//!
//! Unlike wiremock, which mocks at the HTTP level per test, this server
//! keeps state across requests: a localization created with POST shows up
//! in the next listing and disappears after DELETE. Listings paginate with
//! real cursors, so multi-page walks can be exercised end to end.
//!
//! # Example
//!
//! ```ignore
//! use appdist::mock_server::MockServer;
//! use appdist::AppStoreConnectClient;
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = AppStoreConnectClient::new("test-token", server.url()).unwrap();
//!
//!     let localizations = client.beta_build_localizations();
//!     localizations.create("124", "en-US", "Fixed bugs").await.unwrap();
//!     localizations.delete("124", "en-US").await.unwrap();
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{
    DefaultScenario, Fixtures, DEFAULT_APP_ID, DEFAULT_FIREBASE_APP_ID, DEFAULT_PROJECT_NUMBER,
};
pub use server::MockServer;
pub use state::{MockState, SharedState};
