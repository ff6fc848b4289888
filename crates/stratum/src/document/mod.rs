//! The structured-document capability consumed by the tracking record.
//!
//! The overlay pipeline never touches a concrete document type directly;
//! everything it needs from one manifest is expressed here. [`Unstructured`]
//! is the shipped implementation, backed by a JSON object tree.

pub mod selector;
mod unstructured;

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::identity::Gvk;

pub use selector::Selector;
pub use unstructured::Unstructured;

/// Capability surface for one underlying declarative document.
///
/// `Clone` must produce a fully independent deep copy; implementations may
/// not share interior state between clones. `PartialEq` is structural
/// equality of the full document content.
pub trait StructuredDocument: Clone + PartialEq + std::fmt::Debug {
    /// Looks up a field by dotted path (e.g. `metadata.name`).
    fn get_field(&self, path: &str) -> Result<Value>;

    /// Sets a field by dotted path, creating intermediate mappings as
    /// needed. Fails if an intermediate segment exists and is not a
    /// mapping.
    fn set_field(&mut self, path: &str, value: Value) -> Result<()>;

    /// Looks up a field by dotted path and requires it to be a string.
    fn get_string(&self, path: &str) -> Result<String>;

    /// String-valued entries of `metadata.labels`; empty when absent.
    fn labels(&self) -> HashMap<String, String>;
    fn set_labels(&mut self, labels: HashMap<String, String>);

    /// String-valued entries of `metadata.annotations`; empty when absent.
    fn annotations(&self) -> HashMap<String, String>;
    fn set_annotations(&mut self, annotations: HashMap<String, String>);

    /// Kind of the document, or empty when unset.
    fn kind(&self) -> String;

    /// Group/version/kind derived from `apiVersion` and `kind`.
    fn gvk(&self) -> Gvk;
    fn set_gvk(&mut self, gvk: &Gvk);

    /// `metadata.name`, or empty when unset.
    fn name(&self) -> String;
    fn set_name(&mut self, name: &str);
    fn set_namespace(&mut self, namespace: &str);

    /// Root mapping of the document.
    fn as_map(&self) -> &Map<String, Value>;
    fn as_map_mut(&mut self) -> &mut Map<String, Value>;

    /// Marshals the document to its JSON byte form.
    fn to_json(&self) -> Result<Vec<u8>>;

    /// Evaluates an equality-based selector against the document's labels.
    fn matches_label_selector(&self, selector: &str) -> Result<bool>;

    /// Evaluates an equality-based selector against the document's
    /// annotations.
    fn matches_annotation_selector(&self, selector: &str) -> Result<bool>;
}
