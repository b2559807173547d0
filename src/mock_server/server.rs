//! Mock App Store Connect and Firebase App Distribution server.
//!
//! Provides an axum-based HTTP server that simulates both APIs on one port.

use axum::{
    middleware,
    routing::{get, patch},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures, DEFAULT_FIREBASE_APP_ID};
use super::handlers;
use super::state::{MockState, SharedState};

/// A mock API server for testing.
///
/// The server runs in the background. Point both an
/// [`AppStoreConnectClient`](crate::AppStoreConnectClient) and a
/// [`FirebaseClient`](crate::FirebaseClient) at [`MockServer::url`].
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: SharedState,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(mut state: MockState) -> Self {
        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");
        let url = format!("http://{addr}");

        state.base_url = url.clone();
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url,
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Number of requests received for `method` and `path`.
    pub async fn request_count(&self, method: &str, path: &str) -> usize {
        self.state.read().await.request_count(method, path)
    }

    /// Shutdown the server.
    ///
    /// Aborts the server task and waits for it to finish.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    fn default_state() -> MockState {
        Self::state_from_scenario(Fixtures::default_scenario())
    }

    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new().with_app(DEFAULT_FIREBASE_APP_ID);

        for build in scenario.builds {
            state = state.with_build(build);
        }
        for localization in scenario.localizations {
            state = state.with_localization(localization);
        }
        for release in scenario.releases {
            state = state.with_release(DEFAULT_FIREBASE_APP_ID, release);
        }

        state
    }

    /// Create the axum router with all routes.
    fn create_router(state: SharedState) -> Router {
        Router::new()
            // App Store Connect
            .route(
                "/betaBuildLocalizations",
                get(handlers::list_localizations).post(handlers::create_localization),
            )
            .route(
                "/betaBuildLocalizations/:id",
                patch(handlers::update_localization).delete(handlers::delete_localization),
            )
            .route("/builds", get(handlers::list_builds))
            .route("/builds/:id", get(handlers::get_build))
            // Firebase App Distribution
            .route(
                "/projects/:project/apps/:app/releases",
                get(handlers::list_releases),
            )
            // Health check
            .route("/health", get(health_check))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                handlers::record_and_authorize,
            ))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}
