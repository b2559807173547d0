//! Firebase App Distribution releases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use super::manager::{FirebaseResource, ParentIdentifier, ResourceManager, TokenPageSource};
use crate::error::{require_non_empty, AppDistError, Result};
use crate::filter::Filter;
use crate::pagination::Paginator;
use crate::resource::{display_via_pretty_print, Resource};

/// Default number of releases requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Manager for `projects/{project}/apps/{app}/releases`.
pub type Releases = ResourceManager<Release>;

/// A release distributed to testers.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Full resource name:
    /// `projects/{project}/apps/{app}/releases/{release}`.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<ReleaseNotes>,

    /// Marketing version, e.g. `1.2.0`.
    pub display_version: String,

    /// Build number. The API sends it as a string.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub build_version: u64,

    pub create_time: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firebase_console_uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testing_uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_download_uri: Option<String>,
}

/// Release notes attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseNotes {
    #[serde(default)]
    pub text: String,
}

impl Release {
    /// The trailing release id of the resource name.
    pub fn release_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

impl Resource for Release {
    const LABEL: &'static str = "releases";

    fn id(&self) -> &str {
        &self.name
    }
}

display_via_pretty_print!(Release);

impl FirebaseResource for Release {
    const COLLECTION: &'static str = "releases";
    type Parent = AppIdentifier;
    type Query = ReleaseListQuery;
}

/// Identifies a Firebase app within a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppIdentifier {
    pub project_id: String,
    pub app_id: String,
}

impl AppIdentifier {
    pub fn new(project_id: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            app_id: app_id.into(),
        }
    }

    /// Derive the identifier from an app id such as
    /// `1:228333310124:ios:5e439e0d0231a788ac8f09`, whose second segment is
    /// the project number.
    ///
    /// # Errors
    ///
    /// Returns [`AppDistError::InvalidParameter`] if the app id has no
    /// project number.
    pub fn from_app_id(app_id: &str) -> Result<Self> {
        let project = app_id
            .split(':')
            .nth(1)
            .filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
            .ok_or_else(|| {
                AppDistError::InvalidParameter(format!(
                    "cannot derive project number from app id '{app_id}'"
                ))
            })?;
        Ok(Self::new(project, app_id))
    }
}

impl ParentIdentifier for AppIdentifier {
    fn path(&self) -> Result<String> {
        require_path_segment("project id", &self.project_id)?;
        require_path_segment("app id", &self.app_id)?;
        Ok(format!("projects/{}/apps/{}", self.project_id, self.app_id))
    }
}

fn require_path_segment(name: &str, value: &str) -> Result<()> {
    require_non_empty(name, value)?;
    if value.contains(['/', '?', '#']) {
        return Err(AppDistError::InvalidParameter(format!(
            "{name} '{value}' is not a valid path segment"
        )));
    }
    Ok(())
}

/// Sort order for release listings, passed to the API verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum OrderBy {
    #[serde(rename = "createTime")]
    CreateTimeAsc,
    #[default]
    #[serde(rename = "createTime desc")]
    CreateTimeDesc,
}

/// Query parameters for listing releases.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Server-side filter expression, e.g. `releaseNotes.text="beta"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Filter for ReleaseListQuery {
    fn validate(&self) -> Result<()> {
        if self.page_size == Some(0) {
            return Err(AppDistError::InvalidParameter(
                "page size must be a positive number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Options for [`Releases::list`].
#[derive(Debug, Clone)]
pub struct ReleaseListOptions {
    pub order_by: OrderBy,
    /// Stop after this many releases.
    pub limit: Option<usize>,
    pub page_size: u32,
}

impl Default for ReleaseListOptions {
    fn default() -> Self {
        Self {
            order_by: OrderBy::default(),
            limit: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ResourceManager<Release> {
    /// List releases of `app` lazily.
    ///
    /// The page size is lowered to the limit when the limit is smaller, so
    /// a small limit costs a single small request.
    ///
    /// # Errors
    ///
    /// Returns a local validation error for an empty identifier, a zero
    /// page size or a zero limit.
    pub fn list(
        &self,
        app: &AppIdentifier,
        options: &ReleaseListOptions,
    ) -> Result<Paginator<TokenPageSource<Release>>> {
        let page_size = match options.limit {
            Some(limit) => u32::try_from(limit).map_or(options.page_size, |l| l.min(options.page_size)),
            None => options.page_size,
        };
        let query = ReleaseListQuery {
            order_by: Some(options.order_by),
            page_size: Some(page_size),
            filter: None,
        };
        self.paginate(app, &query, options.limit)
    }

    /// Build version of the most recent release.
    ///
    /// # Errors
    ///
    /// Returns [`AppDistError::NotFound`] if the app has no releases.
    pub async fn latest_build_version(&self, app: &AppIdentifier) -> Result<u64> {
        let options = ReleaseListOptions {
            limit: Some(1),
            ..Default::default()
        };
        let mut releases = self.list(app, &options)?;
        match releases.next().await? {
            Some(release) => Ok(release.build_version),
            None => Err(AppDistError::NotFound {
                entity_type: Release::LABEL,
                id: app.app_id.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn release_response() -> serde_json::Value {
        json!({
            "name": "projects/228333310124/apps/1:228333310124:ios:5e439e0d0231a788ac8f09/releases/0fam13pr3rea0",
            "releaseNotes": {"text": "Something new :) :)"},
            "displayVersion": "0.0.42",
            "buildVersion": "70",
            "createTime": "2023-05-18T12:30:17.454581Z",
            "firebaseConsoleUri": "",
            "testingUri": "",
            "binaryDownloadUri": ""
        })
    }

    #[test]
    fn test_release_deserialize_coerces_build_version() {
        let release: Release = serde_json::from_value(release_response()).unwrap();
        assert_eq!(release.build_version, 70);
        assert_eq!(release.display_version, "0.0.42");
        assert_eq!(release.release_id(), "0fam13pr3rea0");
        assert_eq!(
            release.release_notes,
            Some(ReleaseNotes {
                text: "Something new :) :)".to_string()
            })
        );
        assert_eq!(
            release.create_time,
            "2023-05-18T12:30:17.454581Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_release_accepts_numeric_build_version() {
        let mut response = release_response();
        response["buildVersion"] = json!(71);
        let release: Release = serde_json::from_value(response).unwrap();
        assert_eq!(release.build_version, 71);
    }

    #[test]
    fn test_release_structural_equality() {
        let a: Release = serde_json::from_value(release_response()).unwrap();
        let b: Release = serde_json::from_value(release_response()).unwrap();
        assert_eq!(a, b);

        let mut other = release_response();
        other["buildVersion"] = json!("71");
        let c: Release = serde_json::from_value(other).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_release_dict_round_trip() {
        let release: Release = serde_json::from_value(release_response()).unwrap();
        let dict = release.dict().unwrap();

        let mut expected = release_response();
        expected["buildVersion"] = json!(70);
        assert_eq!(serde_json::Value::Object(dict), expected);
    }

    #[test]
    fn test_release_render() {
        let release: Release = serde_json::from_value(release_response()).unwrap();
        let rendered = release.to_string();
        assert!(rendered.starts_with(
            "\nName: projects/228333310124/apps/1:228333310124:ios:5e439e0d0231a788ac8f09/releases/0fam13pr3rea0"
        ));
        assert!(rendered.contains("\nRelease notes: \nText: Something new :) :)\n"));
        assert!(rendered.contains("\nBuild version: 70"));
        assert!(rendered.contains("\nCreate time: 2023-05-18T12:30:17.454581Z"));
        assert!(rendered.ends_with("\nBinary download URI: "));
    }

    #[test]
    fn test_app_identifier_path() {
        let app = AppIdentifier::new("228333310124", "1:228333310124:ios:5e439e0d0231a788ac8f09");
        assert_eq!(
            app.path().unwrap(),
            "projects/228333310124/apps/1:228333310124:ios:5e439e0d0231a788ac8f09"
        );
        assert!(AppIdentifier::new("", "app").path().is_err());
        assert!(AppIdentifier::new("p", "a/b").path().is_err());
    }

    #[test]
    fn test_app_identifier_from_app_id() {
        let app = AppIdentifier::from_app_id("1:228333310124:ios:5e439e0d0231a788ac8f09").unwrap();
        assert_eq!(app.project_id, "228333310124");
        assert!(AppIdentifier::from_app_id("not-an-app-id").is_err());
    }

    #[test]
    fn test_release_query_params() {
        assert!(ReleaseListQuery::default().query_params().unwrap().is_empty());

        let query = ReleaseListQuery {
            order_by: Some(OrderBy::CreateTimeAsc),
            ..Default::default()
        };
        assert_eq!(
            query.query_params().unwrap(),
            vec![("orderBy".to_string(), "createTime".to_string())]
        );

        let query = ReleaseListQuery {
            page_size: Some(0),
            ..Default::default()
        };
        assert!(query.query_params().is_err());
    }
}
