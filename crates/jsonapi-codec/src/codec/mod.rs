//! JSON encoding/decoding for JSON:API resources and documents.

pub mod attribute;
pub mod document;
pub mod options;
pub mod primitives;
pub mod resource;

pub use attribute::{AttributeCodec, DateFormat, DateTimeFormat, EpochMillis, Rfc3339, SerdeCodec};
pub use document::{
    decode_document, decode_document_str, decode_document_value, decode_document_with_options,
    encode_document, encode_document_string, encode_document_value, encode_document_with_options,
};
pub use options::{DecodeOptions, EncodeOptions, TypeCheck, UnknownTypes};
pub use primitives::{ObjectWriter, Reader};
pub use resource::{
    decode_linkage, decode_resource, decode_resource_str, decode_resource_value,
    decode_resource_with_options, encode_linkage, encode_resource, encode_resource_string,
    encode_resource_value, encode_resource_with_options,
};
