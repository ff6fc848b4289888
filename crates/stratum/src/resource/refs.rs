//! Back-reference bookkeeping for one resource.
//!
//! Entries are appended as later pipeline passes discover that other
//! resources, or named substitution variables, point at this one. Storage
//! is append-only and keeps duplicates; comparison deduplicates.

use std::collections::HashSet;

use crate::identity::ResId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTracker {
    referred_by: Vec<ResId>,
    ref_var_names: Vec<String>,
}

impl ReferenceTracker {
    /// Records that the resource with `id` refers to this one.
    pub fn append_referred_by(&mut self, id: ResId) {
        self.referred_by.push(id);
    }

    /// Identities of resources referring to this one, in append order.
    pub fn referred_by(&self) -> &[ResId] {
        &self.referred_by
    }

    /// Records that the variable named `name` resolves to this resource.
    pub fn append_ref_var_name(&mut self, name: impl Into<String>) {
        self.ref_var_names.push(name.into());
    }

    /// Names of variables referring to this resource, in append order.
    pub fn ref_var_names(&self) -> &[String] {
        &self.ref_var_names
    }

    /// Set equality of the two referrer lists: insensitive to order and to
    /// duplicate multiplicity in storage.
    pub fn set_equals(&self, other: &ReferenceTracker) -> bool {
        let other_set: HashSet<&ResId> = other.referred_by.iter().collect();
        let mut self_set = HashSet::new();
        for id in &self.referred_by {
            if !other_set.contains(id) {
                return false;
            }
            self_set.insert(id);
        }
        self_set.len() == other_set.len()
    }
}
