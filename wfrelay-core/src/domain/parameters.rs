//! Parameter bag domain type

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::domain::workflow::WorkflowIdentity;

/// Key holding the workflow name (or manifest) handed to the tool as a positional argument
pub const NAME_KEY: &str = "name";

/// Key holding the target namespace
pub const NAMESPACE_KEY: &str = "namespace";

/// Key holding the manifest reference of a submission
pub const MANIFEST_KEY: &str = "manifest";

/// Reasons a parameter bag cannot be built from caller input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("parameter keys must be non-empty")]
    EmptyKey,

    #[error("parameter '{0}' must be a string, number or boolean")]
    NonScalar(String),
}

/// Ordered string parameters supplied by a caller for one operation
///
/// Keys keep their insertion order. Values are opaque: they are handed to the
/// workflow tool as individual process arguments and never interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, JsonValue>",
    into = "IndexMap<String, String>"
)]
pub struct ParameterBag {
    entries: IndexMap<String, String>,
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, replacing the value of an existing key in place
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ParameterError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ParameterError::EmptyKey);
        }
        self.entries.insert(key, value.into());
        Ok(())
    }

    /// Builder-style variant of [`ParameterBag::insert`]
    pub fn with(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, ParameterError> {
        self.insert(key, value)?;
        Ok(self)
    }

    /// Adds a JSON scalar, converting it to its string form
    pub fn insert_scalar(
        &mut self,
        key: impl Into<String>,
        value: &JsonValue,
    ) -> Result<(), ParameterError> {
        let key = key.into();
        let value = scalar_to_string(value).ok_or_else(|| ParameterError::NonScalar(key.clone()))?;
        self.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&WorkflowIdentity> for ParameterBag {
    fn from(identity: &WorkflowIdentity) -> Self {
        let mut entries = IndexMap::new();
        entries.insert(NAME_KEY.to_string(), identity.name.clone());
        entries.insert(NAMESPACE_KEY.to_string(), identity.namespace.clone());
        Self { entries }
    }
}

impl TryFrom<IndexMap<String, JsonValue>> for ParameterBag {
    type Error = ParameterError;

    fn try_from(map: IndexMap<String, JsonValue>) -> Result<Self, Self::Error> {
        let mut bag = ParameterBag::new();
        for (key, value) in &map {
            bag.insert_scalar(key.clone(), value)?;
        }
        Ok(bag)
    }
}

impl From<ParameterBag> for IndexMap<String, String> {
    fn from(bag: ParameterBag) -> Self {
        bag.entries
    }
}

/// Renders a JSON scalar the way a caller would have typed it
///
/// Returns `None` for null, arrays and objects.
pub fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}
