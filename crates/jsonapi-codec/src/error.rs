//! Error types for JSON:API schema derivation, encoding, decoding and
//! document assembly.

use thiserror::Error;

use crate::model::ResourceLinkage;

/// Broad classification of a [`DecodeError`].
///
/// Callers use this to tell malformed input apart from programming errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The payload does not have the shape of a JSON:API document.
    Structural,
    /// The payload is well-formed but a value was rejected.
    Data,
    /// The resource type itself is misconfigured (schema or instantiation).
    Configuration,
}

/// Error raised while deriving a resource schema or registering a type.
///
/// These are construction-time failures and are not recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("resource type {rust_type} has an empty type discriminator")]
    MissingTypeDiscriminator { rust_type: &'static str },

    #[error("relationship {field:?} on {resource:?} targets {target}, which has no type discriminator")]
    UnresolvableRelationshipType {
        resource: &'static str,
        field: String,
        target: &'static str,
    },

    #[error("wire name {name:?} is declared twice in the schema for {resource:?}")]
    DuplicateWireName { resource: &'static str, name: String },

    #[error("resource type {type_name:?} is already registered")]
    DuplicateType { type_name: &'static str },
}

/// A resource type could not be default-constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot instantiate resource type {type_name:?}: {reason}")]
pub struct InstantiationError {
    pub type_name: &'static str,
    pub reason: String,
}

/// Failure reported by an attribute codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CodecError(pub String);

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError(err.to_string())
    }
}

impl From<chrono::ParseError> for CodecError {
    fn from(err: chrono::ParseError) -> Self {
        CodecError(err.to_string())
    }
}

/// Error during decoding of a resource or document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("expected {expected} for {context}, found {found}")]
    UnexpectedType {
        context: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{context} is missing required member {member:?}")]
    MissingMember {
        context: &'static str,
        member: &'static str,
    },

    #[error("attribute {name:?} could not be decoded: {source}")]
    Attribute { name: String, source: CodecError },

    #[error("payload declares type {found:?} but was decoded as {expected:?}")]
    TypeMismatch { expected: &'static str, found: String },

    #[error("relationship {relationship:?} expects {expected:?} linkages, found {found:?}")]
    LinkageTypeMismatch {
        relationship: String,
        expected: &'static str,
        found: String,
    },

    #[error("no resource type is registered for {type_name:?}")]
    UnknownType { type_name: String },

    #[error(transparent)]
    Instantiation(#[from] InstantiationError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl DecodeError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::Json(_)
            | DecodeError::UnexpectedType { .. }
            | DecodeError::MissingMember { .. } => ErrorKind::Structural,
            DecodeError::Attribute { .. }
            | DecodeError::TypeMismatch { .. }
            | DecodeError::LinkageTypeMismatch { .. }
            | DecodeError::UnknownType { .. } => ErrorKind::Data,
            DecodeError::Instantiation(_) | DecodeError::Schema(_) => ErrorKind::Configuration,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}

/// Error during encoding of a resource or document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("attribute {name:?} could not be encoded: {source}")]
    Attribute { name: String, source: CodecError },

    #[error("JSON output failed: {0}")]
    Json(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        EncodeError::Json(err.to_string())
    }
}

/// Error while attaching a resource to a [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("resource {resource_type}/{} already belongs to another document", .id.as_deref().unwrap_or("<new>"))]
    AlreadyAttached {
        resource_type: String,
        id: Option<String>,
    },

    #[error("resource {resource_type}/{} cannot change its type, id or document while owned by a document", .id.as_deref().unwrap_or("<new>"))]
    IdentityChanged {
        resource_type: String,
        id: Option<String>,
    },
}

/// A compound document violates a JSON:API structural rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("resource {0} appears in both primary data and included")]
    DuplicateResource(ResourceLinkage),

    #[error("relationship {relationship:?} of {owner} points to {target}, which is not in the document")]
    UnresolvedLinkage {
        owner: String,
        relationship: String,
        target: ResourceLinkage,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A relationship target is not present in the owning document.
///
/// Returned as a value by relationship resolution, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("{linkage} is not included in the document")]
pub struct UnresolvedRelationship {
    pub linkage: ResourceLinkage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_kinds() {
        let structural = DecodeError::UnexpectedType {
            context: "relationships",
            expected: "object",
            found: "array",
        };
        assert_eq!(structural.kind(), ErrorKind::Structural);

        let config = DecodeError::from(InstantiationError {
            type_name: "article",
            reason: "no database handle".to_string(),
        });
        assert_eq!(config.kind(), ErrorKind::Configuration);

        let data = DecodeError::UnknownType { type_name: "x".to_string() };
        assert_eq!(data.kind(), ErrorKind::Data);
    }

    #[test]
    fn test_unresolved_display() {
        let err = UnresolvedRelationship {
            linkage: ResourceLinkage::new("comment", "11"),
        };
        assert_eq!(err.to_string(), "comment/11 is not included in the document");
    }
}
