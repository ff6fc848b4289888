//! The per-resource tracking record.
//!
//! A [`Resource`] pairs one structured document with the provenance the
//! overlay pipeline needs across transformation passes: the identity the
//! document was loaded with, the prefix/suffix history its name has
//! accumulated, and the back-references other resources and variables hold
//! on it. When two layers define the same logical resource, the record is
//! collapsed in place via [`Resource::replace`] or [`Resource::merge`].

pub mod name_stack;
pub mod refs;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::document::StructuredDocument;
use crate::error::Result;
use crate::identity::{Gvk, ResId};
use crate::options::{GenOptions, GenerationBehavior};

pub use name_stack::NameTransformStack;
pub use refs::ReferenceTracker;

/// A structured document paired with overlay-pipeline provenance.
///
/// The record exclusively owns its document; `Clone` is a full deep copy
/// and the only sanctioned way to branch a record, so mutating a clone
/// never affects the original. Concurrent mutation of one record is not
/// supported; the pipeline applies passes sequentially.
#[derive(Debug, Clone)]
pub struct Resource<D: StructuredDocument> {
    doc: D,
    original_name: String,
    original_namespace: String,
    options: Option<Arc<GenOptions>>,
    name_stack: NameTransformStack,
    refs: ReferenceTracker,
}

impl<D: StructuredDocument> Resource<D> {
    /// Wraps a freshly loaded document, snapshotting its name and
    /// namespace as the immutable original identity.
    pub fn new(doc: D) -> Self {
        let original_name = doc.name();
        let original_namespace = namespace_of(&doc);
        Self {
            doc,
            original_name,
            original_namespace,
            options: None,
            name_stack: NameTransformStack::default(),
            refs: ReferenceTracker::default(),
        }
    }

    /// Attaches generator options, shared read-only with every record the
    /// same generator emitted.
    pub fn set_options(&mut self, options: Arc<GenOptions>) {
        self.options = Some(options);
    }

    pub fn behavior(&self) -> GenerationBehavior {
        self.options
            .as_ref()
            .map(|o| o.behavior())
            .unwrap_or_default()
    }

    /// True if a content hash should be appended to the resource's name
    /// at finalization.
    pub fn needs_hash_suffix(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.needs_hash_suffix())
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn original_namespace(&self) -> &str {
        &self.original_namespace
    }

    /// The immutable identity snapshotted at load time. Not necessarily
    /// unique across the universe of resources being composed.
    pub fn org_id(&self) -> ResId {
        ResId::with_namespace(
            self.doc.gvk(),
            self.original_name.clone(),
            self.original_namespace.clone(),
        )
    }

    /// The live identity, recomputed from the document on every call so it
    /// reflects all renames applied so far. Unique within one output set.
    pub fn cur_id(&self) -> ResId {
        ResId::with_namespace(self.doc.gvk(), self.doc.name(), self.namespace())
    }

    // ------------------------------------------------------------------
    // Document delegation
    // ------------------------------------------------------------------

    pub fn get_field(&self, path: &str) -> Result<Value> {
        self.doc.get_field(path)
    }

    pub fn set_field(&mut self, path: &str, value: Value) -> Result<()> {
        self.doc.set_field(path, value)
    }

    pub fn get_string(&self, path: &str) -> Result<String> {
        self.doc.get_string(path)
    }

    pub fn labels(&self) -> HashMap<String, String> {
        self.doc.labels()
    }

    pub fn set_labels(&mut self, labels: HashMap<String, String>) {
        self.doc.set_labels(labels);
    }

    pub fn annotations(&self) -> HashMap<String, String> {
        self.doc.annotations()
    }

    pub fn set_annotations(&mut self, annotations: HashMap<String, String>) {
        self.doc.set_annotations(annotations);
    }

    pub fn kind(&self) -> String {
        self.doc.kind()
    }

    pub fn gvk(&self) -> Gvk {
        self.doc.gvk()
    }

    pub fn set_gvk(&mut self, gvk: &Gvk) {
        self.doc.set_gvk(gvk);
    }

    pub fn name(&self) -> String {
        self.doc.name()
    }

    pub fn set_name(&mut self, name: &str) {
        self.doc.set_name(name);
    }

    /// The namespace the document thinks it's in. A failed lookup means
    /// "no namespace", never an error.
    pub fn namespace(&self) -> String {
        namespace_of(&self.doc)
    }

    pub fn set_namespace(&mut self, namespace: &str) {
        self.doc.set_namespace(namespace);
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        self.doc.as_map()
    }

    pub fn matches_label_selector(&self, selector: &str) -> Result<bool> {
        self.doc.matches_label_selector(selector)
    }

    pub fn matches_annotation_selector(&self, selector: &str) -> Result<bool> {
        self.doc.matches_annotation_selector(selector)
    }

    // ------------------------------------------------------------------
    // Name transform history
    // ------------------------------------------------------------------

    pub fn push_name_prefix(&mut self, prefix: impl Into<String>) {
        self.name_stack.push_prefix(prefix);
    }

    pub fn push_name_suffix(&mut self, suffix: impl Into<String>) {
        self.name_stack.push_suffix(suffix);
    }

    pub fn name_stack(&self) -> &NameTransformStack {
        &self.name_stack
    }

    /// True iff both records carry the same outermost prefix and suffix.
    pub fn outermost_prefix_suffix_equals(&self, other: &Resource<D>) -> bool {
        self.name_stack.outermost_equals(&other.name_stack)
    }

    /// Ending-subsequence comparison of the two prefix/suffix histories;
    /// used to decide whether a referrer could be impacted by a referral's
    /// rename.
    pub fn prefixes_suffixes_equal(&self, other: &Resource<D>) -> bool {
        self.name_stack.partial_equals(&other.name_stack)
    }

    // ------------------------------------------------------------------
    // References
    // ------------------------------------------------------------------

    pub fn append_referred_by(&mut self, id: ResId) {
        self.refs.append_referred_by(id);
    }

    pub fn referred_by(&self) -> &[ResId] {
        self.refs.referred_by()
    }

    pub fn append_ref_var_name(&mut self, name: impl Into<String>) {
        self.refs.append_ref_var_name(name);
    }

    pub fn ref_var_names(&self) -> &[String] {
        self.refs.ref_var_names()
    }

    // ------------------------------------------------------------------
    // Equality and collapse
    // ------------------------------------------------------------------

    /// True iff the referrer sets are set-equal and the document content
    /// is structurally equal.
    pub fn equals(&self, other: &Resource<D>) -> bool {
        self.references_equal(other) && self.doc == other.doc
    }

    /// Set equality of the deduplicated referrer identities, insensitive
    /// to order and duplicate multiplicity.
    pub fn references_equal(&self, other: &Resource<D>) -> bool {
        self.refs.set_equals(&other.refs)
    }

    /// Structural equality of the document content alone.
    pub fn doc_equals(&self, other: &Resource<D>) -> bool {
        self.doc == other.doc
    }

    /// Replaces only the owned document content with a copy of
    /// `incoming`'s, discarding the prior content. Provenance is untouched.
    pub fn reset_primary_data(&mut self, incoming: &Resource<D>) {
        self.doc = incoming.doc.clone();
    }

    /// Collapses `other` (the earlier definition) into this record.
    ///
    /// Labels and annotations become the union of both maps with this
    /// record's values winning per key; name and namespace are adopted
    /// from `other`; all provenance fields are cloned from `other`.
    pub fn replace(&mut self, other: &Resource<D>) {
        log::debug!(
            "Replacing earlier definition of {} with {}",
            other.cur_id(),
            self.cur_id()
        );
        self.doc
            .set_labels(merge_string_maps(other.labels(), self.labels()));
        self.doc
            .set_annotations(merge_string_maps(other.annotations(), self.annotations()));
        self.doc.set_name(&other.name());
        self.doc.set_namespace(&other.namespace());
        self.adopt_provenance(other);
    }

    /// [`Resource::replace`], then the document's root `data` mapping is
    /// rebuilt as the shallow key-level union of `other`'s and this
    /// record's `data` entries, this record winning per key. The union
    /// fully replaces `data`, even when empty; a missing or non-mapping
    /// `data` contributes nothing.
    pub fn merge(&mut self, other: &Resource<D>) {
        self.replace(other);
        let mut merged = Map::new();
        for source in [other.get_field("data"), self.get_field("data")] {
            if let Ok(Value::Object(data)) = source {
                merged.extend(data);
            }
        }
        self.doc
            .as_map_mut()
            .insert("data".to_string(), Value::Object(merged));
    }

    fn adopt_provenance(&mut self, other: &Resource<D>) {
        self.original_name = other.original_name.clone();
        self.original_namespace = other.original_namespace.clone();
        self.options = other.options.clone();
        self.refs = other.refs.clone();
        self.name_stack = other.name_stack.clone();
    }

    /// YAML re-encoding of the marshaled document.
    pub fn as_yaml(&self) -> Result<String> {
        let bytes = self.doc.to_json()?;
        let value: Value = serde_json::from_slice(&bytes)?;
        Ok(serde_yaml::to_string(&value)?)
    }
}

/// Trimmed marshaled JSON with the options rendering appended directly,
/// no separator. A marshal failure degrades to a bracketed placeholder
/// instead of an error.
impl<D: StructuredDocument> std::fmt::Display for Resource<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = match self.doc.to_json() {
            Ok(bytes) => bytes,
            Err(e) => return write!(f, "<{}>", e),
        };
        let body = String::from_utf8_lossy(&bytes);
        let opts = match &self.options {
            Some(o) => o.to_string(),
            None => "{nilOptions}".to_string(),
        };
        write!(f, "{}{}", body.trim(), opts)
    }
}

fn namespace_of<D: StructuredDocument>(doc: &D) -> String {
    // Lookup failure is "no namespace", never an error.
    doc.get_string("metadata.namespace").unwrap_or_default()
}

fn merge_string_maps(
    base: HashMap<String, String>,
    winner: HashMap<String, String>,
) -> HashMap<String, String> {
    let mut result = base;
    result.extend(winner);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Unstructured;

    fn resource(yaml: &str) -> Resource<Unstructured> {
        Resource::new(Unstructured::from_yaml(yaml).unwrap())
    }

    fn config_map(name: &str, data: &[(&str, &str)]) -> Resource<Unstructured> {
        let mut yaml = format!(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {}\ndata:\n",
            name
        );
        for (k, v) in data {
            yaml.push_str(&format!("  {}: {}\n", k, v));
        }
        resource(&yaml)
    }

    #[test]
    fn test_original_identity_survives_rename() {
        let mut r = resource("apiVersion: v1\nkind: Service\nmetadata:\n  name: a\n");
        r.set_name("b");
        assert_eq!(r.cur_id().name, "b");
        assert_eq!(r.org_id().name, "a");
        assert_eq!(r.original_name(), "a");
    }

    #[test]
    fn test_current_identity_recomputed_each_call() {
        let mut r = resource(
            "apiVersion: v1\nkind: Service\nmetadata:\n  name: svc\n  namespace: one\n",
        );
        assert_eq!(r.cur_id().namespace, "one");
        r.set_namespace("two");
        assert_eq!(r.cur_id().namespace, "two");
        assert_eq!(r.org_id().namespace, "one");
    }

    #[test]
    fn test_namespace_lookup_failure_is_empty() {
        let r = resource("apiVersion: v1\nkind: Namespace\nmetadata:\n  name: prod\n");
        assert_eq!(r.namespace(), "");
        assert_eq!(r.cur_id().namespace, "");
    }

    #[test]
    fn test_clone_severs_aliasing() {
        let original = resource(
            "apiVersion: v1\nkind: Service\nmetadata:\n  name: svc\n  labels:\n    env: prod\n",
        );
        let mut copy = original.clone();
        let mut labels = copy.labels();
        labels.insert("env".to_string(), "mutated".to_string());
        copy.set_labels(labels);
        copy.append_referred_by(ResId::new(Gvk::from_api_version("v1", "Pod"), "p"));
        copy.push_name_prefix("dev-");

        assert_eq!(original.labels().get("env"), Some(&"prod".to_string()));
        assert!(original.referred_by().is_empty());
        assert_eq!(original.name_stack().prefixes().len(), 0);
    }

    #[test]
    fn test_reset_primary_data_keeps_provenance() {
        let mut r = resource("apiVersion: v1\nkind: Service\nmetadata:\n  name: old\n");
        r.push_name_prefix("base-");
        let incoming = resource("apiVersion: v1\nkind: Service\nmetadata:\n  name: new\n");
        r.reset_primary_data(&incoming);
        assert_eq!(r.name(), "new");
        assert_eq!(r.original_name(), "old");
        assert_eq!(r.name_stack().prefixes(), &["base-".to_string()]);
    }

    #[test]
    fn test_equals_ignores_reference_order() {
        let a_id = ResId::new(Gvk::from_api_version("v1", "Pod"), "a");
        let b_id = ResId::new(Gvk::from_api_version("v1", "Pod"), "b");

        let mut left = resource("apiVersion: v1\nkind: Service\nmetadata:\n  name: svc\n");
        left.append_referred_by(a_id.clone());
        left.append_referred_by(b_id.clone());
        left.append_referred_by(a_id.clone());

        let mut right = resource("apiVersion: v1\nkind: Service\nmetadata:\n  name: svc\n");
        right.append_referred_by(b_id);
        right.append_referred_by(a_id);

        assert!(left.references_equal(&right));
        assert!(left.equals(&right));

        right.set_name("renamed");
        assert!(left.references_equal(&right));
        assert!(!left.equals(&right));
    }

    #[test]
    fn test_replace_label_policy_and_identity_adoption() {
        let mut survivor = resource(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: overlay-cm\n  labels:\n    env: self\n",
        );
        let mut loser = resource(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: base-cm\n  namespace: base\n  labels:\n    env: other\n    team: x\n",
        );
        loser.push_name_prefix("base-");
        loser.append_ref_var_name("CM_NAME");

        survivor.replace(&loser);

        // Self's label values win; other's extra keys carried over.
        assert_eq!(survivor.labels().get("env"), Some(&"self".to_string()));
        assert_eq!(survivor.labels().get("team"), Some(&"x".to_string()));
        // Name and namespace adopted wholesale from other.
        assert_eq!(survivor.name(), "base-cm");
        assert_eq!(survivor.namespace(), "base");
        // Provenance cloned from other.
        assert_eq!(survivor.original_name(), "base-cm");
        assert_eq!(survivor.name_stack().prefixes(), &["base-".to_string()]);
        assert_eq!(survivor.ref_var_names(), &["CM_NAME".to_string()]);
    }

    #[test]
    fn test_replace_clones_rather_than_aliases_provenance() {
        let mut survivor = resource("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: s\n");
        let loser = config_map("l", &[]);
        survivor.replace(&loser);
        survivor.push_name_prefix("extra-");
        assert!(loser.name_stack().prefixes().is_empty());
    }

    #[test]
    fn test_merge_data_union_self_wins() {
        let mut survivor = config_map("cm", &[("k1", "v1")]);
        let loser = config_map("cm", &[("k1", "old"), ("k2", "v2")]);

        survivor.merge(&loser);

        let data = survivor.get_field("data").unwrap();
        assert_eq!(
            data,
            serde_json::json!({ "k1": "v1", "k2": "v2" })
        );
    }

    #[test]
    fn test_merge_without_data_yields_empty_mapping() {
        let mut survivor = resource("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: a\n");
        let loser = resource("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: b\n");
        survivor.merge(&loser);
        assert_eq!(
            survivor.get_field("data").unwrap(),
            serde_json::json!({})
        );
    }

    #[test]
    fn test_display_concatenates_options_rendering() {
        let mut r = config_map("cm", &[("k", "v")]);
        let json = String::from_utf8(
            serde_json::to_vec(r.as_map()).unwrap(),
        )
        .unwrap();

        assert_eq!(r.to_string(), format!("{}{{nilOptions}}", json.trim()));

        r.set_options(Arc::new(GenOptions::new(GenerationBehavior::Create, true)));
        assert_eq!(
            r.to_string(),
            format!("{}{{nsfx:true,beh:create}}", json.trim())
        );
    }

    #[test]
    fn test_as_yaml_round_trip() {
        let r = config_map("cm", &[("k", "v")]);
        let yaml = r.as_yaml().unwrap();
        let reparsed = Unstructured::from_yaml(&yaml).unwrap();
        assert!(r.doc_equals(&Resource::new(reparsed)));
    }

    #[test]
    fn test_behavior_defaults_to_unspecified() {
        let mut r = config_map("cm", &[]);
        assert_eq!(r.behavior(), GenerationBehavior::Unspecified);
        assert!(!r.needs_hash_suffix());

        r.set_options(Arc::new(GenOptions::new(GenerationBehavior::Merge, false)));
        assert_eq!(r.behavior(), GenerationBehavior::Merge);
        assert!(!r.needs_hash_suffix());
    }
}
