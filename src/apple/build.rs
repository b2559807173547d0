//! Builds uploaded to App Store Connect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::manager::ResourceManager;
use super::resource::{Attributes, Entity, ResourceType};
use crate::error::Result;
use crate::filter::{Filter, ResourceRef};

/// A build.
pub type Build = Entity<BuildAttributes>;

/// Manager for `/builds`.
pub type Builds = ResourceManager<BuildAttributes>;

/// Attributes of a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildAttributes {
    /// Build number (`CFBundleVersion`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_os_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_state: Option<BuildProcessingState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses_non_exempt_encryption: Option<bool>,
}

impl Attributes for BuildAttributes {
    const RESOURCE_TYPE: ResourceType = ResourceType::Builds;
    type Filter = BuildFilter;
}

/// Processing state of an uploaded build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildProcessingState {
    Processing,
    Failed,
    Invalid,
    Valid,
}

/// Sort order for build listings, passed to the API verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildOrdering {
    #[serde(rename = "uploadedDate")]
    UploadedDateAsc,
    #[serde(rename = "-uploadedDate")]
    UploadedDateDesc,
    #[serde(rename = "version")]
    VersionAsc,
    #[serde(rename = "-version")]
    VersionDesc,
}

/// Filter for listing builds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildFilter {
    /// Owning app id.
    #[serde(rename = "filter[app]", skip_serializing_if = "Option::is_none")]
    pub app: Option<ResourceRef>,

    /// Build number.
    #[serde(rename = "filter[version]", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Marketing version of the pre-release train.
    #[serde(
        rename = "filter[preReleaseVersion.version]",
        skip_serializing_if = "Option::is_none"
    )]
    pub pre_release_version: Option<String>,

    #[serde(rename = "filter[processingState]", skip_serializing_if = "Option::is_none")]
    pub processing_state: Option<BuildProcessingState>,

    #[serde(rename = "filter[expired]", skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,

    #[serde(rename = "sort", skip_serializing_if = "Option::is_none")]
    pub sort: Option<BuildOrdering>,
}

impl Filter for BuildFilter {
    fn validate(&self) -> Result<()> {
        match &self.app {
            Some(app) => app.ensure_type(ResourceType::Apps.as_str()),
            None => Ok(()),
        }
    }
}

impl Entity<BuildAttributes> {
    /// Build number parsed as an integer, if it is one.
    pub fn build_number(&self) -> Option<u64> {
        self.attributes.version.as_deref()?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;
    use crate::AppDistError;
    use serde_json::json;

    #[test]
    fn test_deserialize_build() {
        let build: Build = serde_json::from_value(json!({
            "type": "builds",
            "id": "123",
            "attributes": {
                "version": "42",
                "uploadedDate": "2023-05-18T12:30:17.000+00:00",
                "expired": false,
                "minOsVersion": "15.0",
                "processingState": "VALID"
            }
        }))
        .expect("Failed to deserialize");

        assert_eq!(build.id(), "123");
        assert_eq!(build.build_number(), Some(42));
        assert_eq!(
            build.attributes.processing_state,
            Some(BuildProcessingState::Valid)
        );
        assert_eq!(
            build.dict().unwrap()["attributes"]["uploadedDate"],
            json!("2023-05-18T12:30:17Z")
        );
    }

    #[test]
    fn test_dict_round_trip_keeps_sparse_attributes_sparse() {
        let response = json!({
            "type": "builds",
            "id": "123",
            "attributes": {"version": "42"}
        });
        let build: Build = serde_json::from_value(response.clone()).unwrap();

        let dict = build.dict().unwrap();
        assert_eq!(serde_json::Value::Object(dict.clone()), response);
        assert_eq!(
            serde_json::from_value::<Build>(serde_json::Value::Object(dict)).unwrap(),
            build
        );
    }

    #[test]
    fn test_build_filter_params() {
        let filter = BuildFilter {
            app: Some(ResourceRef::from("6440000000")),
            processing_state: Some(BuildProcessingState::Valid),
            sort: Some(BuildOrdering::UploadedDateDesc),
            ..Default::default()
        };
        assert_eq!(
            filter.query_params().unwrap(),
            vec![
                ("filter[app]".to_string(), "6440000000".to_string()),
                ("filter[processingState]".to_string(), "VALID".to_string()),
                ("sort".to_string(), "-uploadedDate".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_filter_rejects_build_as_app() {
        let build: Build = serde_json::from_value(json!({
            "type": "builds",
            "id": "123",
            "attributes": {}
        }))
        .unwrap();
        let filter = BuildFilter {
            app: Some(ResourceRef::from(&build)),
            ..Default::default()
        };
        assert!(matches!(
            filter.query_params(),
            Err(AppDistError::WrongResourceType { expected: "apps", .. })
        ));
    }
}
