//! Mock server state management.
//!
//! Provides the in-memory data store for the mock App Store Connect and
//! Firebase App Distribution server.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::apple::{
    BetaBuildLocalization, BetaBuildLocalizationAttributes, Build, LinkedResourceData,
    ResourceType,
};
use crate::firebase::Release;

/// Shared state handle used by the handlers.
pub type SharedState = Arc<RwLock<MockState>>;

/// Shared state for the mock server.
///
/// Collections are kept in insertion order so listings are deterministic.
#[derive(Debug, Default)]
pub struct MockState {
    /// Beta build localizations, related to their build.
    pub localizations: Vec<BetaBuildLocalization>,

    /// Builds, related to their app.
    pub builds: Vec<Build>,

    /// Releases indexed by Firebase app id.
    pub releases: BTreeMap<String, Vec<Release>>,

    /// Optional authentication token. If set, requests must include this token.
    pub required_token: Option<String>,

    /// Base URL used in pagination links. Set by the server on startup.
    pub base_url: String,

    /// Every request received, as `"METHOD /path"`.
    pub requests: Vec<String>,

    next_id: u64,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    pub fn with_localization(mut self, localization: BetaBuildLocalization) -> Self {
        self.localizations.push(localization);
        self
    }

    pub fn with_build(mut self, build: Build) -> Self {
        self.builds.push(build);
        self
    }

    /// Register a Firebase app that has no releases yet.
    pub fn with_app(mut self, app_id: &str) -> Self {
        self.releases.entry(app_id.to_string()).or_default();
        self
    }

    pub fn with_release(mut self, app_id: &str, release: Release) -> Self {
        self.releases
            .entry(app_id.to_string())
            .or_default()
            .push(release);
        self
    }

    /// Set the required authentication token.
    pub fn with_required_token(mut self, token: &str) -> Self {
        self.required_token = Some(token.to_string());
        self
    }

    /// Number of recorded requests matching `method` and `path`.
    pub fn request_count(&self, method: &str, path: &str) -> usize {
        let wanted = format!("{method} {path}");
        self.requests.iter().filter(|r| **r == wanted).count()
    }

    /// Localizations matching the optional build and locale filters.
    pub fn list_localizations(
        &self,
        build_id: Option<&str>,
        locale: Option<&str>,
    ) -> Vec<&BetaBuildLocalization> {
        self.localizations
            .iter()
            .filter(|l| build_id.map_or(true, |b| l.related_id("build") == Some(b)))
            .filter(|l| locale.map_or(true, |loc| l.attributes.locale.as_deref() == Some(loc)))
            .collect()
    }

    /// Create a localization, rejecting a duplicate build and locale pair.
    pub fn create_localization(
        &mut self,
        build_id: &str,
        locale: &str,
        whats_new: Option<String>,
    ) -> Result<BetaBuildLocalization, String> {
        if !self.list_localizations(Some(build_id), Some(locale)).is_empty() {
            return Err(format!(
                "A localization for locale '{locale}' already exists on build '{build_id}'"
            ));
        }

        self.next_id += 1;
        let build = LinkedResourceData {
            id: build_id.to_string(),
            resource_type: ResourceType::Builds,
        };
        let localization = BetaBuildLocalization::new(
            format!("loc-{}", self.next_id),
            BetaBuildLocalizationAttributes {
                locale: Some(locale.to_string()),
                whats_new,
            },
        )
        .with_relationship("build", &build);

        self.localizations.push(localization.clone());
        Ok(localization)
    }

    /// Replace the "What to Test" text and return the updated localization.
    pub fn update_localization(
        &mut self,
        id: &str,
        whats_new: Option<String>,
    ) -> Option<&BetaBuildLocalization> {
        let localization = self.localizations.iter_mut().find(|l| l.id == id)?;
        if whats_new.is_some() {
            localization.attributes.whats_new = whats_new;
        }
        Some(localization)
    }

    /// Remove a localization. Returns whether it existed.
    pub fn delete_localization(&mut self, id: &str) -> bool {
        let before = self.localizations.len();
        self.localizations.retain(|l| l.id != id);
        self.localizations.len() != before
    }

    pub fn get_build(&self, id: &str) -> Option<&Build> {
        self.builds.iter().find(|b| b.id == id)
    }

    /// Builds matching the optional app and build number filters.
    pub fn list_builds(&self, app_id: Option<&str>, version: Option<&str>) -> Vec<&Build> {
        self.builds
            .iter()
            .filter(|b| app_id.map_or(true, |a| b.related_id("app") == Some(a)))
            .filter(|b| version.map_or(true, |v| b.attributes.version.as_deref() == Some(v)))
            .collect()
    }

    /// Releases of an app ordered by creation time.
    pub fn list_releases(&self, app_id: &str, newest_first: bool) -> Vec<&Release> {
        let mut releases: Vec<&Release> = self
            .releases
            .get(app_id)
            .map(|r| r.iter().collect())
            .unwrap_or_default();
        releases.sort_by_key(|r| r.create_time);
        if newest_first {
            releases.reverse();
        }
        releases
    }
}
