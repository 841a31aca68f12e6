//! Data model types for JSON:API documents.
//!
//! - Linkages (`{type, id}` pointers)
//! - Relationship handles (to-one, to-many)
//! - Resources and their wire identity
//! - Documents (primary data plus included pool)

pub mod document;
pub mod linkage;
pub mod relationship;
pub mod resource;

pub use document::{Document, DocumentId, PrimaryData};
pub use linkage::ResourceLinkage;
pub use relationship::{ToMany, ToOne};
pub use resource::{AnyResource, Resource, ResourceMeta, UnknownResource};
