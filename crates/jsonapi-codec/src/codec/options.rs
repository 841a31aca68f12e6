//! Decode and encode configuration.

/// How the `type` member of a decoded resource is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeCheck {
    /// Accept whatever `type` the payload declares.
    ///
    /// The declared type overwrites the resource's discriminator, so a
    /// payload can be read through a schema of a different type.
    #[default]
    Lenient,
    /// Reject resources whose `type` differs from the schema's type, and
    /// relationship linkages (to-one and to-many) whose type differs from
    /// the declared target.
    Strict,
}

/// What a document decoder does with resource types missing from its
/// [`Registry`](crate::schema::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTypes {
    /// Decode them as [`UnknownResource`](crate::model::UnknownResource),
    /// keeping only `type` and `id`.
    #[default]
    Keep,
    /// Fail with [`DecodeError::UnknownType`](crate::error::DecodeError::UnknownType).
    Reject,
}

/// Options for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub type_check: TypeCheck,
    pub unknown_types: UnknownTypes,
}

impl DecodeOptions {
    /// Creates default (lenient) decoding options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that reject type mismatches and unknown types.
    pub fn strict() -> Self {
        Self {
            type_check: TypeCheck::Strict,
            unknown_types: UnknownTypes::Reject,
        }
    }

    /// Sets the type check mode.
    pub fn with_type_check(mut self, type_check: TypeCheck) -> Self {
        self.type_check = type_check;
        self
    }

    /// Sets the unknown type policy.
    pub fn with_unknown_types(mut self, unknown_types: UnknownTypes) -> Self {
        self.unknown_types = unknown_types;
        self
    }
}

/// Options for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// Emit indented JSON instead of the compact form.
    pub pretty: bool,
}

impl EncodeOptions {
    /// Creates default (compact) encoding options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options producing indented output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}
