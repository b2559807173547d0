//! Beta build localizations: the "What to Test" notes of a TestFlight build.

use serde::{Deserialize, Serialize};
use serde_json::Map;

use super::manager::ResourceManager;
use super::resource::{Attributes, Entity, LinkedResourceData, ResourceType};
use crate::error::{require_non_empty, Result};
use crate::filter::{Filter, ResourceRef};

/// A beta build localization.
pub type BetaBuildLocalization = Entity<BetaBuildLocalizationAttributes>;

/// Manager for `/betaBuildLocalizations`.
pub type BetaBuildLocalizations = ResourceManager<BetaBuildLocalizationAttributes>;

/// Attributes of a beta build localization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetaBuildLocalizationAttributes {
    /// Locale code, e.g. `en-US`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// "What to Test" text shown to testers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whats_new: Option<String>,
}

impl Attributes for BetaBuildLocalizationAttributes {
    const RESOURCE_TYPE: ResourceType = ResourceType::BetaBuildLocalizations;
    type Filter = BetaBuildLocalizationFilter;
}

/// Filter for listing beta build localizations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BetaBuildLocalizationFilter {
    /// Parent build, as a raw id or a [`Build`](super::Build).
    #[serde(rename = "filter[build]", skip_serializing_if = "Option::is_none")]
    pub build: Option<ResourceRef>,

    /// Locale code.
    #[serde(rename = "filter[locale]", skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl Filter for BetaBuildLocalizationFilter {
    fn validate(&self) -> Result<()> {
        match &self.build {
            Some(build) => build.ensure_type(ResourceType::Builds.as_str()),
            None => Ok(()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAttributes<'a> {
    locale: &'a str,
    whats_new: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifyAttributes<'a> {
    whats_new: &'a str,
}

impl ResourceManager<BetaBuildLocalizationAttributes> {
    /// Create the localization of `build` for `locale`.
    ///
    /// # Errors
    ///
    /// Returns a local validation error for an empty locale or a reference
    /// that is not a build, otherwise any request error.
    pub async fn create(
        &self,
        build: impl Into<ResourceRef>,
        locale: &str,
        whats_new: &str,
    ) -> Result<BetaBuildLocalization> {
        let build = LinkedResourceData::from_ref(&build.into(), ResourceType::Builds)?;
        require_non_empty("locale", locale)?;

        let attributes = CreateAttributes { locale, whats_new };
        let mut relationships = Map::new();
        relationships.insert("build".to_string(), build.to_relationship());

        self.create_resource(&attributes, &relationships).await
    }

    /// Change the "What to Test" text of the localization identified by
    /// `build` and `locale`.
    ///
    /// Issues one lookup listing followed by one PATCH.
    ///
    /// # Errors
    ///
    /// Returns a lookup error if no or several localizations match.
    pub async fn modify(
        &self,
        build: impl Into<ResourceRef>,
        locale: &str,
        whats_new: &str,
    ) -> Result<BetaBuildLocalization> {
        let localization = self.find_by_natural_key(build.into(), locale).await?;
        self.update(&localization.id, &ModifyAttributes { whats_new })
            .await
    }

    /// Delete the localization identified by `build` and `locale`.
    ///
    /// Issues one lookup listing followed by one DELETE.
    ///
    /// # Errors
    ///
    /// Returns a lookup error if no or several localizations match.
    pub async fn delete(&self, build: impl Into<ResourceRef>, locale: &str) -> Result<()> {
        let localization = self.find_by_natural_key(build.into(), locale).await?;
        self.delete_by_id(&localization.id).await
    }

    async fn find_by_natural_key(
        &self,
        build: ResourceRef,
        locale: &str,
    ) -> Result<BetaBuildLocalization> {
        let build_id = build.resolve(ResourceType::Builds.as_str())?.to_string();
        require_non_empty("locale", locale)?;

        let key = format!("build {build_id} locale {locale}");
        let filter = BetaBuildLocalizationFilter {
            build: Some(ResourceRef::Id(build_id)),
            locale: Some(locale.to_string()),
        };
        self.find_one(&filter, &key).await
    }
}
