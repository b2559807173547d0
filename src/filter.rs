//! Declarative filters translated into query parameters.
//!
//! Filter structs derive `Serialize` and name each field after the query
//! parameter it maps to (`#[serde(rename = "filter[locale]")]`). Unset
//! fields are omitted from the query entirely.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::client::QueryParams;
use crate::error::{AppDistError, Result};

/// A set of optional predicates for a listing call.
pub trait Filter: Serialize {
    /// Check field values before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns a local validation error.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Serialize populated fields into query parameters.
    ///
    /// # Errors
    ///
    /// Returns a local validation error if [`Filter::validate`] fails.
    fn query_params(&self) -> Result<QueryParams> {
        self.validate()?;
        to_query_params(self)
    }
}

impl Filter for () {}

/// Flatten a serializable struct into query parameters.
///
/// `null` and empty strings are skipped, scalars are rendered as text and
/// arrays are joined with commas.
pub fn to_query_params<T: Serialize + ?Sized>(value: &T) -> Result<QueryParams> {
    let fields = match serde_json::to_value(value)? {
        Value::Null => return Ok(Vec::new()),
        Value::Object(fields) => fields,
        other => {
            return Err(AppDistError::InvalidParameter(format!(
                "filter must serialize to an object, got {other}"
            )))
        }
    };

    let mut params = Vec::new();
    for (name, value) in fields {
        if let Some(text) = param_value(&name, value)? {
            params.push((name, text));
        }
    }
    Ok(params)
}

fn param_value(name: &str, value: Value) -> Result<Option<String>> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(values) => {
            let parts = values
                .into_iter()
                .map(|v| param_value(name, v))
                .collect::<Result<Vec<_>>>()?;
            parts.into_iter().flatten().collect::<Vec<_>>().join(",")
        }
        Value::Object(_) => {
            return Err(AppDistError::InvalidParameter(format!(
                "filter field '{name}' cannot be a nested object"
            )))
        }
    };
    Ok((!text.is_empty()).then_some(text))
}

/// Reference to a parent resource used by composite filters and
/// relationships.
///
/// Callers pass either a raw identifier or the parent resource itself;
/// both normalize to the raw identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    /// A bare identifier, trusted to be of the expected type.
    Id(String),
    /// An identifier together with the type of the resource it came from.
    Typed { id: String, resource_type: String },
}

impl ResourceRef {
    /// The raw identifier.
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Typed { id, .. } => id,
        }
    }

    /// Normalize to the raw identifier of a resource of type `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`AppDistError::WrongResourceType`] if the reference carries
    /// a different type and [`AppDistError::InvalidParameter`] if the
    /// identifier is empty.
    pub fn resolve(&self, expected: &'static str) -> Result<&str> {
        self.ensure_type(expected)?;
        crate::error::require_non_empty(expected, self.id())?;
        Ok(self.id())
    }

    /// Check that a typed reference points at a resource of type `expected`.
    ///
    /// Bare identifiers always pass.
    ///
    /// # Errors
    ///
    /// Returns [`AppDistError::WrongResourceType`] on mismatch.
    pub fn ensure_type(&self, expected: &'static str) -> Result<()> {
        match self {
            Self::Typed { resource_type, .. } if resource_type != expected => {
                Err(AppDistError::WrongResourceType {
                    expected,
                    actual: resource_type.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl From<&str> for ResourceRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for ResourceRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl Serialize for ResourceRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}
