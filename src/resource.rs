//! Base trait for API-returned entities.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppDistError, Result};

/// A typed, immutable wrapper around one API-returned entity.
///
/// Equality is structural: two resources are equal when all their
/// attributes are equal. Resources are never mutated after construction;
/// modify operations return a new instance.
pub trait Resource:
    std::fmt::Debug + Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static
{
    /// Label used in logs and error messages (e.g. `"releases"`).
    const LABEL: &'static str;

    /// The vendor-assigned identifier.
    fn id(&self) -> &str;

    /// Convert into a plain nested mapping.
    ///
    /// Nested resources become nested mappings and datetimes become
    /// RFC 3339 text. Unset optional attributes are kept as `null`
    /// only where the server sent them.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource does not serialize to an object.
    fn dict(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(AppDistError::Client(format!(
                "{} did not serialize to a mapping: {other}",
                Self::LABEL
            ))),
        }
    }
}

/// Implement `Display` in terms of [`PrettyPrint`](crate::PrettyPrint).
macro_rules! display_via_pretty_print {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ::std::fmt::Display for $ty {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    f.write_str(&$crate::output::PrettyPrint::pretty_print(self))
                }
            }
        )+
    };
}

pub(crate) use display_via_pretty_print;
