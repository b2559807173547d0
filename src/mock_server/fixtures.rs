//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use chrono::{DateTime, Utc};

use crate::apple::{
    BetaBuildLocalization, BetaBuildLocalizationAttributes, Build, BuildAttributes,
    BuildProcessingState, LinkedResourceData, ResourceType,
};
use crate::firebase::{Release, ReleaseNotes};

/// App Store Connect app used by the default scenario.
pub const DEFAULT_APP_ID: &str = "6440000000";

/// Firebase project number used by the default scenario.
pub const DEFAULT_PROJECT_NUMBER: &str = "228333310124";

/// Firebase app used by the default scenario.
pub const DEFAULT_FIREBASE_APP_ID: &str = "1:228333310124:ios:5e439e0d0231a788ac8f09";

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    /// A localization of `build_id`.
    pub fn localization(
        id: &str,
        build_id: &str,
        locale: &str,
        whats_new: &str,
    ) -> BetaBuildLocalization {
        let build = LinkedResourceData {
            id: build_id.to_string(),
            resource_type: ResourceType::Builds,
        };
        BetaBuildLocalization::new(
            id,
            BetaBuildLocalizationAttributes {
                locale: Some(locale.to_string()),
                whats_new: Some(whats_new.to_string()),
            },
        )
        .with_relationship("build", &build)
    }

    /// A processed, unexpired build of `app_id`.
    pub fn build(id: &str, app_id: &str, version: &str) -> Build {
        let app = LinkedResourceData {
            id: app_id.to_string(),
            resource_type: ResourceType::Apps,
        };
        let uploaded = Self::timestamp("2023-05-18T12:30:17Z");
        Build::new(
            id,
            BuildAttributes {
                version: Some(version.to_string()),
                uploaded_date: Some(uploaded),
                expiration_date: Some(uploaded + chrono::Duration::days(90)),
                expired: Some(false),
                min_os_version: Some("15.0".to_string()),
                processing_state: Some(BuildProcessingState::Valid),
                uses_non_exempt_encryption: Some(false),
            },
        )
        .with_relationship("app", &app)
    }

    /// A release of `app_id` in `project_id`.
    pub fn release(
        project_id: &str,
        app_id: &str,
        release_id: &str,
        display_version: &str,
        build_version: u64,
        create_time: &str,
    ) -> Release {
        let name = format!("projects/{project_id}/apps/{app_id}/releases/{release_id}");
        Release {
            firebase_console_uri: Some(format!(
                "https://console.firebase.google.com/project/{project_id}/appdistribution/app/ios:{app_id}/releases/{release_id}"
            )),
            testing_uri: Some(format!("https://appdistribution.firebase.google.com/testerapps/{app_id}/releases/{release_id}")),
            binary_download_uri: None,
            name,
            release_notes: Some(ReleaseNotes {
                text: format!("Release {display_version} ({build_version})"),
            }),
            display_version: display_version.to_string(),
            build_version,
            create_time: Self::timestamp(create_time),
        }
    }

    /// Default scenario with one app, two builds, one localization and
    /// three releases.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario {
            builds: vec![
                Self::build("123", DEFAULT_APP_ID, "41"),
                Self::build("124", DEFAULT_APP_ID, "42"),
            ],
            localizations: vec![Self::localization(
                "loc-default",
                "123",
                "en-US",
                "Initial notes",
            )],
            releases: vec![
                Self::release(
                    DEFAULT_PROJECT_NUMBER,
                    DEFAULT_FIREBASE_APP_ID,
                    "rel-1",
                    "1.0.0",
                    68,
                    "2023-05-01T09:00:00Z",
                ),
                Self::release(
                    DEFAULT_PROJECT_NUMBER,
                    DEFAULT_FIREBASE_APP_ID,
                    "rel-2",
                    "1.0.1",
                    69,
                    "2023-05-10T09:00:00Z",
                ),
                Self::release(
                    DEFAULT_PROJECT_NUMBER,
                    DEFAULT_FIREBASE_APP_ID,
                    "rel-3",
                    "1.1.0",
                    70,
                    "2023-05-18T12:30:17.454581Z",
                ),
            ],
        }
    }

    fn timestamp(value: &str) -> DateTime<Utc> {
        value
            .parse()
            .expect("fixture timestamps are RFC 3339")
    }
}

/// Data loaded into a server started with [`MockServer::start`](super::MockServer::start).
pub struct DefaultScenario {
    pub builds: Vec<Build>,
    pub localizations: Vec<BetaBuildLocalization>,
    /// Releases of [`DEFAULT_FIREBASE_APP_ID`].
    pub releases: Vec<Release>,
}
