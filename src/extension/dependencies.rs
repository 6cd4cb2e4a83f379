//! Dependency descriptors and per-build deduplication.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// An HTML dependency as reported by a tool.
///
/// The `name` is the identity key; the whole object is kept verbatim as the
/// payload handed to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct HtmlDependency {
    name: String,
    payload: Map<String, Value>,
}

impl HtmlDependency {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Dependency carrying a single stylesheet.
    pub fn stylesheet(name: &str, path: &str) -> Self {
        let mut payload = Map::new();
        payload.insert("name".to_string(), Value::String(name.to_string()));
        payload.insert("stylesheets".to_string(), json!([path]));
        Self {
            name: name.to_string(),
            payload,
        }
    }
}

impl TryFrom<Value> for HtmlDependency {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(payload) = value else {
            return Err(format!("dependency must be an object, got {value}"));
        };
        let name = match payload.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => return Err("dependency is missing a string 'name' field".to_string()),
        };
        Ok(Self { name, payload })
    }
}

impl From<HtmlDependency> for Value {
    fn from(dep: HtmlDependency) -> Self {
        Value::Object(dep.payload)
    }
}

/// Where a dependency is attached on the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyScope {
    /// Attached to the document itself.
    Document,
    /// Attached to the dependency owned by the named extension.
    Extension(String),
}

/// Keys already handed to the host during this build.
#[derive(Debug, Default)]
pub struct RegisteredDependencies {
    keys: IndexSet<(DependencyScope, String)>,
}

impl RegisteredDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `register` unless `key` was already registered in `scope`.
    ///
    /// Returns whether `register` ran.
    pub fn register_once<F>(&mut self, scope: &DependencyScope, key: &str, register: F) -> bool
    where
        F: FnOnce(),
    {
        if self.contains(scope, key) {
            log::debug!("Dependency '{key}' already registered, skipping");
            return false;
        }
        register();
        self.keys.insert((scope.clone(), key.to_string()));
        true
    }

    pub fn contains(&self, scope: &DependencyScope, key: &str) -> bool {
        self.keys.contains(&(scope.clone(), key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Registered keys of a scope, in registration order.
    pub fn keys_in<'a>(&'a self, scope: &'a DependencyScope) -> impl Iterator<Item = &'a str> + 'a {
        self.keys
            .iter()
            .filter(move |(s, _)| s == scope)
            .map(|(_, key)| key.as_str())
    }
}
