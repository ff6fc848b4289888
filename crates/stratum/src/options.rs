//! Generator options attached to a resource by whatever produced it.

use serde::{Deserialize, Serialize};

/// How a later-layer definition combines with an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationBehavior {
    #[default]
    Unspecified,
    Create,
    Replace,
    Merge,
}

impl GenerationBehavior {
    /// Parses a behavior name. Unknown names map to `Unspecified` rather
    /// than erroring, so an absent or misspelled field degrades to the
    /// default collision policy.
    pub fn from_name(name: &str) -> Self {
        match name {
            "create" => GenerationBehavior::Create,
            "replace" => GenerationBehavior::Replace,
            "merge" => GenerationBehavior::Merge,
            _ => GenerationBehavior::Unspecified,
        }
    }
}

impl std::fmt::Display for GenerationBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationBehavior::Unspecified => write!(f, "unspecified"),
            GenerationBehavior::Create => write!(f, "create"),
            GenerationBehavior::Replace => write!(f, "replace"),
            GenerationBehavior::Merge => write!(f, "merge"),
        }
    }
}

/// Options shared read-only by every record a generator emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenOptions {
    behavior: GenerationBehavior,
    needs_hash_suffix: bool,
}

impl GenOptions {
    pub fn new(behavior: GenerationBehavior, needs_hash_suffix: bool) -> Self {
        Self {
            behavior,
            needs_hash_suffix,
        }
    }

    pub fn behavior(&self) -> GenerationBehavior {
        self.behavior
    }

    /// True if a content hash must be appended to the resource's name at
    /// finalization.
    pub fn needs_hash_suffix(&self) -> bool {
        self.needs_hash_suffix
    }
}

// Compact rendering appended to a resource's string form. Consumers parse
// this informally, so the shape is part of the contract.
impl std::fmt::Display for GenOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{nsfx:{},beh:{}}}", self.needs_hash_suffix, self.behavior)
    }
}
