//! Type registry for polymorphic decoding.
//!
//! A document's primary data and included pool may mix resource types. The
//! registry maps each wire `type` to the decoder of the Rust type declared
//! for it.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::codec::options::{DecodeOptions, TypeCheck, UnknownTypes};
use crate::codec::primitives::Reader;
use crate::codec::resource::decode_resource_from;
use crate::error::{DecodeError, SchemaError};
use crate::model::{AnyResource, Resource, UnknownResource};
use crate::schema::schema_of;

type DecodeFn = fn(Reader<'_>, &DecodeOptions) -> Result<Box<dyn AnyResource>, DecodeError>;

fn decode_boxed<R: Resource>(
    reader: Reader<'_>,
    options: &DecodeOptions,
) -> Result<Box<dyn AnyResource>, DecodeError> {
    let resource: R = decode_resource_from(reader, options)?;
    Ok(Box::new(resource))
}

/// Maps wire type names to resource types.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    decoders: FxHashMap<&'static str, DecodeFn>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `R` under `R::TYPE`.
    ///
    /// The schema is derived immediately, so a misdeclared type fails here
    /// rather than on the first payload that mentions it.
    pub fn register<R: Resource>(&mut self) -> Result<&mut Self, SchemaError> {
        schema_of::<R>()?;
        if self.decoders.contains_key(R::TYPE) {
            return Err(SchemaError::DuplicateType { type_name: R::TYPE });
        }
        self.decoders.insert(R::TYPE, decode_boxed::<R>);
        debug!(resource = R::TYPE, "registered resource type");
        Ok(self)
    }

    /// Consumes the registry and returns it with `R` registered.
    pub fn with<R: Resource>(mut self) -> Result<Self, SchemaError> {
        self.register::<R>()?;
        Ok(self)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.decoders.contains_key(type_name)
    }

    /// Returns the registered type names, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.decoders.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Decodes one resource object, dispatching on its `type` member.
    pub(crate) fn decode(
        &self,
        reader: Reader<'_>,
        options: &DecodeOptions,
    ) -> Result<Box<dyn AnyResource>, DecodeError> {
        reader.read_object("resource")?;
        let type_name = match reader.member("type") {
            Some(member) if !member.is_null() => member.read_str("resource type")?,
            _ => {
                return Err(DecodeError::MissingMember {
                    context: "resource",
                    member: "type",
                });
            }
        };

        if let Some(decode) = self.decoders.get(type_name) {
            return decode(reader, options);
        }

        match options.unknown_types {
            UnknownTypes::Reject => Err(DecodeError::UnknownType {
                type_name: type_name.to_owned(),
            }),
            UnknownTypes::Keep => {
                debug!(resource = type_name, "decoding unregistered type as unknown");
                let fallback = options.with_type_check(TypeCheck::Lenient);
                decode_boxed::<UnknownResource>(reader, &fallback)
            }
        }
    }
}
