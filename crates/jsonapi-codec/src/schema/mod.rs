//! Resource schemas.
//!
//! A [`Schema`] lists the attribute and relationship fields of one resource
//! type, in declaration order, together with the accessors and codecs the
//! resource codec uses to bind them. Schemas are declared through
//! [`SchemaBuilder`] in [`Resource::describe`] and derived once per type by
//! [`schema_of`].

pub mod cache;
pub mod registry;

use std::marker::PhantomData;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::codec::attribute::{AttributeCodec, SerdeCodec};
use crate::error::{CodecError, SchemaError};
use crate::model::{Resource, ResourceLinkage, ToMany, ToOne};

pub use cache::schema_of;
pub use registry::Registry;

/// Kind of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Attribute,
    ToOne,
    ToMany,
}

/// Public description of one schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Wire name.
    pub name: String,
    pub kind: FieldKind,
    /// Target type for relationships.
    pub target: Option<&'static str>,
}

// =============================================================================
// BINDINGS
// =============================================================================

pub(crate) trait AttributeBinding<R>: Send + Sync {
    fn decode(&self, resource: &mut R, value: &Value) -> Result<(), CodecError>;

    /// Returns `None` when the field is unset.
    fn encode(&self, resource: &R) -> Result<Option<Value>, CodecError>;
}

struct AttributeAccessor<R, T, C> {
    get: fn(&R) -> &Option<T>,
    get_mut: fn(&mut R) -> &mut Option<T>,
    codec: C,
}

impl<R, T, C> AttributeBinding<R> for AttributeAccessor<R, T, C>
where
    R: 'static,
    T: 'static,
    C: AttributeCodec<T>,
{
    fn decode(&self, resource: &mut R, value: &Value) -> Result<(), CodecError> {
        *(self.get_mut)(resource) = Some(self.codec.decode(value)?);
        Ok(())
    }

    fn encode(&self, resource: &R) -> Result<Option<Value>, CodecError> {
        (self.get)(resource)
            .as_ref()
            .map(|value| self.codec.encode(value))
            .transpose()
    }
}

pub(crate) trait ToOneBinding<R>: Send + Sync {
    fn set(&self, resource: &mut R, linkage: Option<ResourceLinkage>);

    /// Outer `None`: no handle. Inner `None`: handle with null data.
    fn get<'r>(&self, resource: &'r R) -> Option<Option<&'r ResourceLinkage>>;
}

pub(crate) trait ToManyBinding<R>: Send + Sync {
    fn set(&self, resource: &mut R, linkages: Vec<ResourceLinkage>);

    fn get<'r>(&self, resource: &'r R) -> Option<&'r [ResourceLinkage]>;
}

struct ToOneAccessor<R, T> {
    get: fn(&R) -> &Option<ToOne<T>>,
    get_mut: fn(&mut R) -> &mut Option<ToOne<T>>,
}

impl<R: 'static, T: Resource> ToOneBinding<R> for ToOneAccessor<R, T> {
    fn set(&self, resource: &mut R, linkage: Option<ResourceLinkage>) {
        *(self.get_mut)(resource) = Some(ToOne::new(linkage));
    }

    fn get<'r>(&self, resource: &'r R) -> Option<Option<&'r ResourceLinkage>> {
        (self.get)(resource).as_ref().map(ToOne::linkage)
    }
}

struct ToManyAccessor<R, T> {
    get: fn(&R) -> &Option<ToMany<T>>,
    get_mut: fn(&mut R) -> &mut Option<ToMany<T>>,
}

impl<R: 'static, T: Resource> ToManyBinding<R> for ToManyAccessor<R, T> {
    fn set(&self, resource: &mut R, linkages: Vec<ResourceLinkage>) {
        *(self.get_mut)(resource) = Some(ToMany::new(linkages));
    }

    fn get<'r>(&self, resource: &'r R) -> Option<&'r [ResourceLinkage]> {
        (self.get)(resource).as_ref().map(ToMany::linkages)
    }
}

pub(crate) enum RelationshipBinding<R> {
    One(Box<dyn ToOneBinding<R>>),
    Many(Box<dyn ToManyBinding<R>>),
}

pub(crate) struct AttributeField<R> {
    pub(crate) name: String,
    pub(crate) binding: Box<dyn AttributeBinding<R>>,
}

pub(crate) struct RelationshipField<R> {
    pub(crate) name: String,
    pub(crate) target: &'static str,
    pub(crate) binding: RelationshipBinding<R>,
}

impl<R> RelationshipField<R> {
    fn kind(&self) -> FieldKind {
        match self.binding {
            RelationshipBinding::One(_) => FieldKind::ToOne,
            RelationshipBinding::Many(_) => FieldKind::ToMany,
        }
    }
}

// =============================================================================
// SCHEMA
// =============================================================================

/// Derived metadata of one resource type.
pub struct Schema<R> {
    type_name: &'static str,
    attributes: Vec<AttributeField<R>>,
    relationships: Vec<RelationshipField<R>>,
    attribute_index: FxHashMap<String, usize>,
    relationship_index: FxHashMap<String, usize>,
}

impl<R> Schema<R> {
    /// Type discriminator of the resource type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Describes every field: attributes first, then relationships, each in
    /// declaration order.
    pub fn fields(&self) -> Vec<FieldInfo> {
        let attributes = self.attributes.iter().map(|field| FieldInfo {
            name: field.name.clone(),
            kind: FieldKind::Attribute,
            target: None,
        });
        let relationships = self.relationships.iter().map(|field| FieldInfo {
            name: field.name.clone(),
            kind: field.kind(),
            target: Some(field.target),
        });
        attributes.chain(relationships).collect()
    }

    pub(crate) fn attributes(&self) -> &[AttributeField<R>] {
        &self.attributes
    }

    pub(crate) fn relationships(&self) -> &[RelationshipField<R>] {
        &self.relationships
    }

    pub(crate) fn attribute(&self, name: &str) -> Option<&AttributeField<R>> {
        self.attribute_index
            .get(name)
            .map(|&i| &self.attributes[i])
    }

    pub(crate) fn relationship(&self, name: &str) -> Option<&RelationshipField<R>> {
        self.relationship_index
            .get(name)
            .map(|&i| &self.relationships[i])
    }
}

impl<R> std::fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields())
            .finish()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

enum PendingKind<R> {
    Attribute(Box<dyn AttributeBinding<R>>),
    Relationship {
        target: &'static str,
        target_rust: &'static str,
        binding: RelationshipBinding<R>,
    },
}

struct PendingField<R> {
    /// Name passed to the declaring call; decides reservation.
    declared: String,
    /// Wire name, after any `rename`.
    name: String,
    kind: PendingKind<R>,
}

impl<R> PendingField<R> {
    fn new(name: &str, kind: PendingKind<R>) -> Self {
        Self {
            declared: name.to_owned(),
            name: name.to_owned(),
            kind,
        }
    }
}

/// Collects the field declarations of a resource type.
///
/// Field names starting with `_` are reserved for the resource's own
/// bookkeeping and are left out of the schema. Reservation follows the
/// declared name, so renaming neither hides nor exposes a field.
pub struct SchemaBuilder<R> {
    fields: Vec<PendingField<R>>,
    resource: PhantomData<fn() -> R>,
}

impl<R: Resource> SchemaBuilder<R> {
    pub(crate) fn new() -> Self {
        Self {
            fields: Vec::new(),
            resource: PhantomData,
        }
    }

    /// Declares an attribute encoded through its serde implementation.
    pub fn attribute<T>(
        &mut self,
        name: &str,
        get: fn(&R) -> &Option<T>,
        get_mut: fn(&mut R) -> &mut Option<T>,
    ) -> &mut Self
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        self.attribute_with(name, SerdeCodec, get, get_mut)
    }

    /// Declares an attribute encoded through `codec`.
    pub fn attribute_with<T, C>(
        &mut self,
        name: &str,
        codec: C,
        get: fn(&R) -> &Option<T>,
        get_mut: fn(&mut R) -> &mut Option<T>,
    ) -> &mut Self
    where
        T: 'static,
        C: AttributeCodec<T>,
    {
        self.fields.push(PendingField::new(
            name,
            PendingKind::Attribute(Box::new(AttributeAccessor { get, get_mut, codec })),
        ));
        self
    }

    /// Declares a to-one relationship to `T`.
    pub fn to_one<T: Resource>(
        &mut self,
        name: &str,
        get: fn(&R) -> &Option<ToOne<T>>,
        get_mut: fn(&mut R) -> &mut Option<ToOne<T>>,
    ) -> &mut Self {
        self.fields.push(PendingField::new(
            name,
            PendingKind::Relationship {
                target: T::TYPE,
                target_rust: std::any::type_name::<T>(),
                binding: RelationshipBinding::One(Box::new(ToOneAccessor { get, get_mut })),
            },
        ));
        self
    }

    /// Declares a to-many relationship to `T`.
    pub fn to_many<T: Resource>(
        &mut self,
        name: &str,
        get: fn(&R) -> &Option<ToMany<T>>,
        get_mut: fn(&mut R) -> &mut Option<ToMany<T>>,
    ) -> &mut Self {
        self.fields.push(PendingField::new(
            name,
            PendingKind::Relationship {
                target: T::TYPE,
                target_rust: std::any::type_name::<T>(),
                binding: RelationshipBinding::Many(Box::new(ToManyAccessor { get, get_mut })),
            },
        ));
        self
    }

    /// Overrides the wire name of the most recently declared field.
    ///
    /// Has no effect before any field is declared.
    pub fn rename(&mut self, wire_name: &str) -> &mut Self {
        if let Some(last) = self.fields.last_mut() {
            last.name = wire_name.to_owned();
        }
        self
    }

    pub(crate) fn build(self) -> Result<Schema<R>, SchemaError> {
        if R::TYPE.is_empty() {
            return Err(SchemaError::MissingTypeDiscriminator {
                rust_type: std::any::type_name::<R>(),
            });
        }

        let mut seen = FxHashSet::with_capacity_and_hasher(self.fields.len(), Default::default());
        let mut schema = Schema {
            type_name: R::TYPE,
            attributes: Vec::new(),
            relationships: Vec::new(),
            attribute_index: FxHashMap::default(),
            relationship_index: FxHashMap::default(),
        };

        for field in self.fields {
            if field.declared.starts_with('_') {
                debug!(resource = R::TYPE, field = %field.declared, "excluding reserved field");
                continue;
            }
            if !seen.insert(field.name.clone()) {
                return Err(SchemaError::DuplicateWireName {
                    resource: R::TYPE,
                    name: field.name,
                });
            }
            match field.kind {
                PendingKind::Attribute(binding) => {
                    schema
                        .attribute_index
                        .insert(field.name.clone(), schema.attributes.len());
                    schema.attributes.push(AttributeField {
                        name: field.name,
                        binding,
                    });
                }
                PendingKind::Relationship {
                    target,
                    target_rust,
                    binding,
                } => {
                    if target.is_empty() {
                        return Err(SchemaError::UnresolvableRelationshipType {
                            resource: R::TYPE,
                            field: field.name,
                            target: target_rust,
                        });
                    }
                    schema
                        .relationship_index
                        .insert(field.name.clone(), schema.relationships.len());
                    schema.relationships.push(RelationshipField {
                        name: field.name,
                        target,
                        binding,
                    });
                }
            }
        }

        Ok(schema)
    }
}
