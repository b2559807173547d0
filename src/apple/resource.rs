//! JSON:API envelope types shared by App Store Connect resources.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::filter::{Filter, ResourceRef};
use crate::output::PrettyPrint;
use crate::resource::Resource;

/// App Store Connect resource types, as sent in the `type` member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceType {
    Apps,
    BetaBuildLocalizations,
    Builds,
    PreReleaseVersions,
}

impl ResourceType {
    /// The wire name, also used as the collection path.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apps => "apps",
            Self::BetaBuildLocalizations => "betaBuildLocalizations",
            Self::Builds => "builds",
            Self::PreReleaseVersions => "preReleaseVersions",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute schema of one resource type.
///
/// Binds the attribute struct to its resource type and the filter used to
/// list it, so one generic manager serves every resource family.
pub trait Attributes:
    fmt::Debug + Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static
{
    /// The resource type these attributes belong to.
    const RESOURCE_TYPE: ResourceType;

    /// Filter accepted by list operations.
    type Filter: Filter + Default + Send + Sync;
}

/// `{"id": ..., "type": ...}` linkage object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedResourceData {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
}

impl LinkedResourceData {
    /// Build linkage data from a reference, checking its type.
    ///
    /// # Errors
    ///
    /// Returns a local validation error if the reference is of another type
    /// or its identifier is empty.
    pub fn from_ref(reference: &ResourceRef, resource_type: ResourceType) -> crate::Result<Self> {
        let id = reference.resolve(resource_type.as_str())?;
        Ok(Self {
            id: id.to_string(),
            resource_type,
        })
    }

    /// Wrap as a to-one relationship: `{"data": {...}}`.
    pub fn to_relationship(&self) -> Value {
        serde_json::json!({ "data": self })
    }
}

/// An App Store Connect resource object.
///
/// The `created` flag marks instances returned by a create call and does
/// not take part in equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity<A> {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub attributes: A,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub relationships: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    #[serde(skip)]
    created: bool,
}

impl<A> Entity<A> {
    /// Whether this instance was returned by a create call.
    pub fn is_created(&self) -> bool {
        self.created
    }

    pub(crate) fn mark_created(mut self) -> Self {
        self.created = true;
        self
    }

    /// Linkage data pointing at this resource.
    pub fn linked_data(&self) -> LinkedResourceData {
        LinkedResourceData {
            id: self.id.clone(),
            resource_type: self.resource_type,
        }
    }

    /// Identifier of a to-one related resource, if present in the response.
    pub fn related_id(&self, relationship: &str) -> Option<&str> {
        self.relationships
            .get(relationship)?
            .get("data")?
            .get("id")?
            .as_str()
    }
}

impl<A: Attributes> Entity<A> {
    /// Build an entity locally, without links or relationships.
    pub fn new(id: impl Into<String>, attributes: A) -> Self {
        Self {
            id: id.into(),
            resource_type: A::RESOURCE_TYPE,
            attributes,
            relationships: Map::new(),
            links: None,
            created: false,
        }
    }

    /// Add a to-one relationship.
    #[must_use]
    pub fn with_relationship(mut self, name: &str, related: &LinkedResourceData) -> Self {
        self.relationships
            .insert(name.to_string(), related.to_relationship());
        self
    }
}

impl<A: PartialEq> PartialEq for Entity<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.resource_type == other.resource_type
            && self.attributes == other.attributes
            && self.relationships == other.relationships
            && self.links == other.links
    }
}

impl<A: Attributes> Resource for Entity<A> {
    const LABEL: &'static str = A::RESOURCE_TYPE.as_str();

    fn id(&self) -> &str {
        &self.id
    }
}

impl<A: Attributes> fmt::Display for Entity<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_print())
    }
}

impl<A> From<&Entity<A>> for ResourceRef {
    fn from(entity: &Entity<A>) -> Self {
        Self::Typed {
            id: entity.id.clone(),
            resource_type: entity.resource_type.as_str().to_string(),
        }
    }
}

/// Single-resource document: `{"data": {...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Document<T> {
    pub data: T,
}

/// Collection document with paging links.
#[derive(Debug, Deserialize)]
pub(crate) struct ListDocument<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub links: Option<PageLinks>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageLinks {
    #[serde(default)]
    pub next: Option<String>,
}

/// Creation payload: `{"data": {"type", "attributes", "relationships"}}`.
#[derive(Debug, Serialize)]
pub(crate) struct CreatePayload<'a, B: Serialize> {
    data: CreateData<'a, B>,
}

#[derive(Debug, Serialize)]
struct CreateData<'a, B: Serialize> {
    #[serde(rename = "type")]
    resource_type: ResourceType,
    attributes: &'a B,
    #[serde(skip_serializing_if = "Map::is_empty")]
    relationships: &'a Map<String, Value>,
}

impl<'a, B: Serialize> CreatePayload<'a, B> {
    pub fn new(
        resource_type: ResourceType,
        attributes: &'a B,
        relationships: &'a Map<String, Value>,
    ) -> Self {
        Self {
            data: CreateData {
                resource_type,
                attributes,
                relationships,
            },
        }
    }
}

/// Update payload: `{"data": {"id", "type", "attributes"}}`.
#[derive(Debug, Serialize)]
pub(crate) struct UpdatePayload<'a, B: Serialize> {
    data: UpdateData<'a, B>,
}

#[derive(Debug, Serialize)]
struct UpdateData<'a, B: Serialize> {
    id: &'a str,
    #[serde(rename = "type")]
    resource_type: ResourceType,
    attributes: &'a B,
}

impl<'a, B: Serialize> UpdatePayload<'a, B> {
    pub fn new(id: &'a str, resource_type: ResourceType, attributes: &'a B) -> Self {
        Self {
            data: UpdateData {
                id,
                resource_type,
                attributes,
            },
        }
    }
}
