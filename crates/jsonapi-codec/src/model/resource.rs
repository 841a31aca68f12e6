//! Resource objects.
//!
//! A resource is an application struct implementing [`Resource`]. It keeps
//! its wire identity in a [`ResourceMeta`] and declares its attributes and
//! relationships once, in [`Resource::describe`].
//!
//! ```rust
//! use jsonapi_codec::{Resource, ResourceMeta, SchemaBuilder, ToOne};
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
//! ```

use std::any::Any;
use std::fmt;

use serde_json::Value;

use crate::codec::resource::{encode_resource_value, relationship_linkages};
use crate::error::{DocumentError, EncodeError, InstantiationError, SchemaError};
use crate::model::{Document, DocumentId, ResourceLinkage};
use crate::schema::SchemaBuilder;

/// Wire identity of a resource: its type, its id, and the document it is
/// attached to.
#[derive(Debug, Clone, Default)]
pub struct ResourceMeta {
    resource_type: String,
    id: Option<String>,
    document: Option<DocumentId>,
}

impl ResourceMeta {
    /// Creates a meta for a resource of `resource_type` without an id.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: None,
            document: None,
        }
    }

    /// Creates a meta carrying the discriminator of `R`.
    pub fn of<R: Resource>() -> Self {
        Self::new(R::TYPE)
    }

    /// Sets the id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns the type as stored. Empty until the resource was decoded or
    /// given a type explicitly; see [`Resource::resource_type`].
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn set_resource_type(&mut self, resource_type: impl Into<String>) {
        self.resource_type = resource_type.into();
    }

    /// Returns the id, or `None` for a resource that has not been assigned
    /// one yet.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    /// Returns the document this resource is attached to.
    pub fn document(&self) -> Option<DocumentId> {
        self.document
    }

    /// Clears the document back-reference so the resource can be added to
    /// another document. Only meaningful on a copy taken out of a document;
    /// [`Document::update`] rolls it back on a resource the document owns.
    pub fn detach(&mut self) {
        self.document = None;
    }

    pub(crate) fn attach(&mut self, document: DocumentId) {
        self.document = Some(document);
    }
}

/// Metas compare by type and id; the document back-reference is ignored.
impl PartialEq for ResourceMeta {
    fn eq(&self, other: &Self) -> bool {
        self.resource_type == other.resource_type && self.id == other.id
    }
}

impl Eq for ResourceMeta {}

/// A typed JSON:API resource.
///
/// Attributes are `Option<T>` fields, relationships are
/// `Option<ToOne<T>>` or `Option<ToMany<T>>` fields. `None` means absent:
/// it is never written and a wire `null` never overwrites it.
pub trait Resource: Default + Send + Sync + 'static {
    /// Type discriminator written to and read from the `type` member.
    const TYPE: &'static str;

    fn meta(&self) -> &ResourceMeta;

    fn meta_mut(&mut self) -> &mut ResourceMeta;

    /// Declares the attribute and relationship fields, in wire order.
    fn describe(schema: &mut SchemaBuilder<Self>);

    /// Creates the blank instance a decoder fills in.
    fn instantiate() -> Result<Self, InstantiationError> {
        Ok(Self::default())
    }

    /// Returns the effective type: the stored type, or [`Self::TYPE`] when
    /// none was stored.
    fn resource_type(&self) -> &str {
        match self.meta().resource_type() {
            "" => Self::TYPE,
            stored => stored,
        }
    }

    fn id(&self) -> Option<&str> {
        self.meta().id()
    }

    /// Returns the linkage pointing at this resource, if it has an id.
    fn linkage(&self) -> Option<ResourceLinkage> {
        self.id()
            .map(|id| ResourceLinkage::new(self.resource_type(), id))
    }

    /// Adds this resource to `document` as primary data.
    fn add_to(self, document: &mut Document) -> Result<(), DocumentError> {
        document.add_data(self)
    }

    /// Adds this resource to `document` as an included resource.
    fn include_by(self, document: &mut Document) -> Result<(), DocumentError> {
        document.add_include(self)
    }
}

/// Type-erased view of a resource, as stored inside a [`Document`].
pub trait AnyResource: Any + Send + Sync {
    fn meta_ref(&self) -> &ResourceMeta;

    fn meta_ref_mut(&mut self) -> &mut ResourceMeta;

    /// Effective type, see [`Resource::resource_type`].
    fn type_name(&self) -> &str;

    /// Encodes the resource object.
    fn to_wire(&self) -> Result<Value, EncodeError>;

    /// Lists `(relationship name, linkage)` for every present linkage, in
    /// schema order.
    fn linkages(&self) -> Result<Vec<(String, ResourceLinkage)>, SchemaError>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<R: Resource> AnyResource for R {
    fn meta_ref(&self) -> &ResourceMeta {
        self.meta()
    }

    fn meta_ref_mut(&mut self) -> &mut ResourceMeta {
        self.meta_mut()
    }

    fn type_name(&self) -> &str {
        self.resource_type()
    }

    fn to_wire(&self) -> Result<Value, EncodeError> {
        encode_resource_value(self)
    }

    fn linkages(&self) -> Result<Vec<(String, ResourceLinkage)>, SchemaError> {
        relationship_linkages(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn AnyResource {
    /// Returns the id, if any.
    pub fn id(&self) -> Option<&str> {
        self.meta_ref().id()
    }

    /// Returns the linkage pointing at this resource, if it has an id.
    pub fn linkage(&self) -> Option<ResourceLinkage> {
        self.id()
            .map(|id| ResourceLinkage::new(self.type_name(), id))
    }

    /// Downcasts to a concrete resource type.
    pub fn downcast_ref<R: Resource>(&self) -> Option<&R> {
        self.as_any().downcast_ref::<R>()
    }

    /// Downcasts to a concrete resource type, mutably.
    pub fn downcast_mut<R: Resource>(&mut self) -> Option<&mut R> {
        self.as_any_mut().downcast_mut::<R>()
    }
}

impl fmt::Debug for dyn AnyResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("type", &self.type_name())
            .field("id", &self.id())
            .finish()
    }
}

/// Placeholder for a resource whose type has no registered schema.
///
/// Only `type` and `id` survive decoding; attributes and relationships are
/// skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownResource {
    meta: ResourceMeta,
}

impl Resource for UnknownResource {
    const TYPE: &'static str = "__unresolved";

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ResourceMeta {
        &mut self.meta
    }

    fn describe(_schema: &mut SchemaBuilder<Self>) {}
}
