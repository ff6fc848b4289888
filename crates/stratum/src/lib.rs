//! Identity, provenance, and reference tracking for a configuration-overlay
//! engine.
//!
//! This crate is the core of a tool that composes layered declarative
//! resource documents (Kubernetes-manifest style bases and overlays) into
//! one merged output set. It provides:
//! - [`Resource`]: the per-document tracking record, with an immutable
//!   original identity and a live current identity
//! - [`NameTransformStack`]: the ordered prefix/suffix history pushed by
//!   enclosing overlay layers, with partial (ending-subsequence) matching
//! - [`ReferenceTracker`]: back-references from other resources and from
//!   substitution variables
//! - [`Resource::replace`] / [`Resource::merge`]: the combinators used
//!   when two layers define the same logical resource
//!
//! Loading overlay trees, selecting resources, and emitting the final
//! output set are the orchestrator's job; this layer assumes sequential,
//! single-writer access to each record.

pub mod document;
pub mod error;
pub mod identity;
pub mod options;
pub mod resource;

pub use document::{Selector, StructuredDocument, Unstructured};
pub use error::{DocumentError, Result};
pub use identity::{Gvk, ResId};
pub use options::{GenOptions, GenerationBehavior};
pub use resource::{NameTransformStack, ReferenceTracker, Resource};
