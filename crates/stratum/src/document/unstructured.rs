//! Schemaless document backed by a JSON object tree.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{selector::Selector, StructuredDocument};
use crate::error::{DocumentError, Result};
use crate::identity::Gvk;

/// The in-memory form of one YAML or JSON manifest.
///
/// The root must be a mapping; everything below it is loosely typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Unstructured {
    root: Map<String, Value>,
}

impl Unstructured {
    pub fn new(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// Wraps a JSON value, which must be a mapping.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(DocumentError::NotAMapping),
        }
    }

    /// Parses one YAML document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(text)?;
        Self::from_value(value)
    }

    fn lookup(&self, path: &str) -> Result<&Value> {
        let missing = || DocumentError::NoFieldNamed {
            path: path.to_string(),
        };

        let mut map = Some(&self.root);
        let mut found = None;
        for segment in path.split('.') {
            let value = map.ok_or_else(missing)?.get(segment).ok_or_else(missing)?;
            map = value.as_object();
            found = Some(value);
        }
        found.ok_or_else(missing)
    }

    /// String-valued entries of the mapping at `path`; empty when the path
    /// is absent or not a mapping. Non-string values are skipped.
    fn string_map(&self, path: &str) -> HashMap<String, String> {
        let Ok(Value::Object(map)) = self.lookup(path).map(|v| v.clone()) else {
            return HashMap::new();
        };
        map.into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k, s)),
                _ => None,
            })
            .collect()
    }

    /// Overwrites the value at a root-level `parent.key` location, forcing
    /// `parent` to a mapping if the document holds something malformed
    /// there.
    fn force_set(&mut self, parent: &str, key: &str, value: Value) {
        let entry = self
            .root
            .entry(parent.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            map.insert(key.to_string(), value);
        }
    }

    fn string_map_value(map: HashMap<String, String>) -> Value {
        Value::Object(map.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
    }
}

impl StructuredDocument for Unstructured {
    fn get_field(&self, path: &str) -> Result<Value> {
        self.lookup(path).cloned()
    }

    fn set_field(&mut self, path: &str, value: Value) -> Result<()> {
        if path.is_empty() {
            return Err(DocumentError::NoFieldNamed {
                path: path.to_string(),
            });
        }
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return Err(DocumentError::NoFieldNamed {
                path: path.to_string(),
            });
        };

        let mut current = &mut self.root;
        for segment in parents {
            let entry = current
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            current = entry
                .as_object_mut()
                .ok_or_else(|| DocumentError::UnexpectedType {
                    path: path.to_string(),
                    expected: "mapping",
                })?;
        }
        current.insert((*last).to_string(), value);
        Ok(())
    }

    fn get_string(&self, path: &str) -> Result<String> {
        match self.lookup(path)? {
            Value::String(s) => Ok(s.clone()),
            _ => Err(DocumentError::UnexpectedType {
                path: path.to_string(),
                expected: "string",
            }),
        }
    }

    fn labels(&self) -> HashMap<String, String> {
        self.string_map("metadata.labels")
    }

    fn set_labels(&mut self, labels: HashMap<String, String>) {
        self.force_set("metadata", "labels", Self::string_map_value(labels));
    }

    fn annotations(&self) -> HashMap<String, String> {
        self.string_map("metadata.annotations")
    }

    fn set_annotations(&mut self, annotations: HashMap<String, String>) {
        self.force_set("metadata", "annotations", Self::string_map_value(annotations));
    }

    fn kind(&self) -> String {
        self.get_string("kind").unwrap_or_default()
    }

    fn gvk(&self) -> Gvk {
        let api_version = self.get_string("apiVersion").unwrap_or_default();
        Gvk::from_api_version(&api_version, self.kind())
    }

    fn set_gvk(&mut self, gvk: &Gvk) {
        self.root.insert(
            "apiVersion".to_string(),
            Value::String(gvk.api_version()),
        );
        self.root
            .insert("kind".to_string(), Value::String(gvk.kind.clone()));
    }

    fn name(&self) -> String {
        self.get_string("metadata.name").unwrap_or_default()
    }

    fn set_name(&mut self, name: &str) {
        self.force_set("metadata", "name", Value::String(name.to_string()));
    }

    fn set_namespace(&mut self, namespace: &str) {
        self.force_set(
            "metadata",
            "namespace",
            Value::String(namespace.to_string()),
        );
    }

    fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.root
    }

    fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.root)?)
    }

    fn matches_label_selector(&self, selector: &str) -> Result<bool> {
        Ok(Selector::parse(selector)?.matches(&self.labels()))
    }

    fn matches_annotation_selector(&self, selector: &str) -> Result<bool> {
        Ok(Selector::parse(selector)?.matches(&self.annotations()))
    }
}
