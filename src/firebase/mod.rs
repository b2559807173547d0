//! Firebase App Distribution API client.
//!
//! ```no_run
//! use appdist::firebase::{AppIdentifier, FirebaseClient};
//!
//! # async fn example() -> appdist::Result<()> {
//! let client = FirebaseClient::from_env()?;
//! let app = AppIdentifier::from_app_id("1:228333310124:ios:5e439e0d0231a788ac8f09")?;
//!
//! let build_version = client.releases().latest_build_version(&app).await?;
//! println!("next build: {}", build_version + 1);
//! # Ok(())
//! # }
//! ```

mod manager;
mod release;

use std::env;

use crate::client::ApiSession;
use crate::error::{AppDistError, Result};

pub use manager::{FirebaseResource, ParentIdentifier, ResourceManager, TokenPageSource};
pub use release::{
    AppIdentifier, OrderBy, Release, ReleaseListOptions, ReleaseListQuery, ReleaseNotes, Releases,
    DEFAULT_PAGE_SIZE,
};

const DEFAULT_API_URL: &str = "https://firebaseappdistribution.googleapis.com/v1";

/// Firebase App Distribution API client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct FirebaseClient {
    session: ApiSession,
}

impl FirebaseClient {
    /// Create a client from environment variables.
    ///
    /// Uses `FIREBASE_ACCESS_TOKEN` (an OAuth2 access token) and optionally
    /// `FIREBASE_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if `FIREBASE_ACCESS_TOKEN` is not set.
    pub fn from_env() -> Result<Self> {
        let token = env::var("FIREBASE_ACCESS_TOKEN").map_err(|_| {
            AppDistError::ConfigMissing(
                "FIREBASE_ACCESS_TOKEN environment variable not set".to_string(),
            )
        })?;
        let base_url = env::var("FIREBASE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(&token, &base_url)
    }

    /// # Errors
    ///
    /// Returns an error if the token is empty or the base URL is invalid.
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        Ok(Self {
            session: ApiSession::new(token, base_url)?,
        })
    }

    pub fn with_session(session: ApiSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ApiSession {
        &self.session
    }

    /// Releases, logging in a `firebase` span.
    pub fn releases(&self) -> Releases {
        let span = tracing::info_span!("firebase", resource = "releases");
        ResourceManager::new(self.session.clone(), span)
    }
}
