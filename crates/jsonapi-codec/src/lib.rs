//! JSON:API resource objects for Rust types.
//!
//! This crate maps typed resources to and from the JSON:API wire format:
//! resource objects with `type`, `id`, `attributes` and `relationships`,
//! and top-level documents with primary data and included resources.
//!
//! # Overview
//!
//! - A resource type declares its wire schema once, in
//!   [`Resource::describe`]. The schema is derived on first use and cached
//!   for the life of the process.
//! - Unset attributes and relationships are never written. Unknown members
//!   and `null` values are skipped on read.
//! - A [`Document`] owns its resources. Relationship handles hold linkages
//!   and are resolved against the document.
//!
//! # Quick Start
//!
//! ```rust
//! use jsonapi_codec::{Resource, ResourceMeta, SchemaBuilder, ToOne};
//! use jsonapi_codec::codec::{decode_resource_str, encode_resource_string};
//!
//! #[derive(Debug, Default)]
//! struct Person {
//!     meta: ResourceMeta,
//!     name: Option<String>,
//! }
//!
//! impl Resource for Person {
//!     const TYPE: &'static str = "person";
//!
//!     fn meta(&self) -> &ResourceMeta { &self.meta }
//!     fn meta_mut(&mut self) -> &mut ResourceMeta { &mut self.meta }
//!
//!     fn describe(schema: &mut SchemaBuilder<Self>) {
//!         schema.attribute("name", |p| &p.name, |p| &mut p.name);
//!     }
//! }
//!
//! #[derive(Debug, Default)]
//! struct Article {
//!     meta: ResourceMeta,
//!     title: Option<String>,
//!     author: Option<ToOne<Person>>,
//! }
//!
//! impl Resource for Article {
//!     const TYPE: &'static str = "article";
//!
//!     fn meta(&self) -> &ResourceMeta { &self.meta }
//!     fn meta_mut(&mut self) -> &mut ResourceMeta { &mut self.meta }
//!
//!     fn describe(schema: &mut SchemaBuilder<Self>) {
//!         schema
//!             .attribute("title", |a| &a.title, |a| &mut a.title)
//!             .to_one("author", |a| &a.author, |a| &mut a.author);
//!     }
//! }
//!
//! let input = r#"{"type":"article","id":"1","attributes":{"title":"Hi"},"relationships":{"author":{"data":{"type":"person","id":"9"}}}}"#;
//! let article: Article = decode_resource_str(input).unwrap();
//! assert_eq!(article.title.as_deref(), Some("Hi"));
//! assert_eq!(article.author.as_ref().unwrap().linkage().unwrap().id(), "9");
//! assert_eq!(encode_resource_string(&article).unwrap(), input);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Resources, linkages, relationship handles, documents
//! - [`schema`]: Schema declaration, the schema cache, the type registry
//! - [`codec`]: Resource and document encoding/decoding, attribute codecs
//! - [`validate`]: Compound document checks
//! - [`error`]: Error types

pub mod codec;
pub mod error;
pub mod model;
pub mod schema;
pub mod validate;

#[cfg(test)]
mod testing;

// Re-export commonly used types at crate root
pub use codec::{
    DecodeOptions, EncodeOptions, TypeCheck, UnknownTypes, decode_document, decode_resource,
    encode_document, encode_resource,
};
pub use error::{
    CodecError, DecodeError, DocumentError, EncodeError, ErrorKind, InstantiationError,
    SchemaError, UnresolvedRelationship, ValidationError,
};
pub use model::{
    AnyResource, Document, DocumentId, PrimaryData, Resource, ResourceLinkage, ResourceMeta,
    ToMany, ToOne, UnknownResource,
};
pub use schema::{FieldInfo, FieldKind, Registry, Schema, SchemaBuilder, schema_of};
pub use validate::validate_document;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON:API version of the wire format this crate reads and writes.
pub const JSONAPI_VERSION: &str = "1.0";
