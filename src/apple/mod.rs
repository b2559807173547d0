//! App Store Connect API client.
//!
//! Resources follow the JSON:API envelope: single resources come wrapped in
//! `{"data": {...}}`, collections carry a `links.next` URL that serves as
//! the page cursor.
//!
//! ```no_run
//! use appdist::apple::{AppStoreConnectClient, BetaBuildLocalizationFilter};
//!
//! # async fn example() -> appdist::Result<()> {
//! let client = AppStoreConnectClient::from_env()?;
//! let localizations = client.beta_build_localizations();
//!
//! let created = localizations.create("123", "en-US", "Fixed bugs").await?;
//! assert!(created.is_created());
//!
//! let mut listing = localizations.list(&BetaBuildLocalizationFilter::default())?;
//! while let Some(localization) = listing.next().await? {
//!     println!("{localization}");
//! }
//! # Ok(())
//! # }
//! ```

mod beta_build_localization;
mod build;
mod manager;
mod resource;

use std::env;

use crate::client::ApiSession;
use crate::error::{AppDistError, Result};
use crate::resource::Resource;

pub use beta_build_localization::{
    BetaBuildLocalization, BetaBuildLocalizationAttributes, BetaBuildLocalizationFilter,
    BetaBuildLocalizations,
};
pub use build::{Build, BuildAttributes, BuildFilter, BuildOrdering, BuildProcessingState, Builds};
pub use manager::{LinksPageSource, ResourceManager, DEFAULT_PAGE_SIZE};
pub use resource::{Attributes, Entity, LinkedResourceData, ResourceType};

const DEFAULT_API_URL: &str = "https://api.appstoreconnect.apple.com/v1";

/// App Store Connect API client.
///
/// Owns the authenticated session and hands out one resource manager per
/// resource family. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppStoreConnectClient {
    session: ApiSession,
}

impl AppStoreConnectClient {
    /// Create a client from environment variables.
    ///
    /// Uses `APP_STORE_CONNECT_TOKEN` (a signed API JWT) and optionally
    /// `APP_STORE_CONNECT_API_URL` (defaults to
    /// `https://api.appstoreconnect.apple.com/v1`).
    ///
    /// # Errors
    ///
    /// Returns an error if `APP_STORE_CONNECT_TOKEN` is not set.
    pub fn from_env() -> Result<Self> {
        let token = env::var("APP_STORE_CONNECT_TOKEN").map_err(|_| {
            AppDistError::ConfigMissing(
                "APP_STORE_CONNECT_TOKEN environment variable not set".to_string(),
            )
        })?;

        let base_url =
            env::var("APP_STORE_CONNECT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Self::new(&token, &base_url)
    }

    /// Create a client with the provided token and base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the base URL is invalid.
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        Ok(Self::with_session(ApiSession::new(token, base_url)?))
    }

    /// Wrap an existing session.
    pub fn with_session(session: ApiSession) -> Self {
        Self { session }
    }

    /// The underlying session.
    pub fn session(&self) -> &ApiSession {
        &self.session
    }

    /// Manager for any resource type, logging in an `app_store_connect` span.
    pub fn manager<A: Attributes>(&self) -> ResourceManager<A> {
        let span = tracing::info_span!(
            "app_store_connect",
            resource = <Entity<A> as Resource>::LABEL
        );
        ResourceManager::new(self.session.clone(), span)
    }

    /// Beta build localizations.
    pub fn beta_build_localizations(&self) -> BetaBuildLocalizations {
        self.manager()
    }

    /// Builds.
    pub fn builds(&self) -> Builds {
        self.manager()
    }
}
