//! Typed clients for app distribution services.
//!
//! A Rust library for the App Store Connect API and the Firebase App
//! Distribution API, plus a helper that downloads code signing files from
//! blob storage. Every vendor resource family is served by a resource
//! manager generic over the resource type; listings are lazy and follow the
//! vendor's page cursor only when the caller asks for more.
//!
//! # Quick Start
//!
//! ```no_run
//! use appdist::apple::{AppStoreConnectClient, BuildFilter};
//! use appdist::firebase::{AppIdentifier, FirebaseClient};
//!
//! #[tokio::main]
//! async fn main() -> appdist::Result<()> {
//!     let apple = AppStoreConnectClient::from_env()?;
//!
//!     // Attach "What to Test" notes to build 123
//!     let localization = apple
//!         .beta_build_localizations()
//!         .create("123", "en-US", "Fixed bugs")
//!         .await?;
//!     println!("{localization}");
//!
//!     // Walk builds lazily, stopping after ten
//!     let mut builds = apple.builds().list_with_limit(&BuildFilter::default(), Some(10))?;
//!     while let Some(build) = builds.next().await? {
//!         println!("{:?}", build.build_number());
//!     }
//!
//!     let firebase = FirebaseClient::from_env()?;
//!     let app = AppIdentifier::from_app_id("1:228333310124:ios:5e439e0d0231a788ac8f09")?;
//!     let latest = firebase.releases().latest_build_version(&app).await?;
//!     println!("Latest build version: {latest}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`ApiSession`] - Authenticated HTTP verbs and error envelope handling
//! - [`Paginator`] - Lazy, single-pass walk over a [`PageSource`]
//! - [`Filter`] - Declarative filters serialized into query parameters
//! - [`Resource`] - Typed, immutable entities with [`Resource::dict`]
//!
//! # Configuration
//!
//! Clients read configuration from environment variables:
//!
//! - `APP_STORE_CONNECT_TOKEN` / `APP_STORE_CONNECT_API_URL`
//! - `FIREBASE_ACCESS_TOKEN` / `FIREBASE_API_URL`
//! - `APPDIST_STORAGE_URL` / `APPDIST_STORAGE_TOKEN`

mod client;
mod error;
mod filter;
mod output;
mod pagination;
mod resource;

pub mod apple;
pub mod cli;
pub mod firebase;
pub mod provisioning;

#[cfg(feature = "test-server")]
pub mod mock_server;

pub use client::{ApiSession, QueryParams};
pub use error::{AppDistError, Result};
pub use filter::{to_query_params, Filter, ResourceRef};
pub use output::{format_attribute_name, render_value, PrettyPrint};
pub use pagination::{CursorPage, PageSource, Paginator};
pub use resource::Resource;

pub use apple::AppStoreConnectClient;
pub use firebase::FirebaseClient;
pub use provisioning::{BlobStorage, HttpBlobStorage, ManualProvisioning};
