//! Top-level document encoding and decoding.
//!
//! ```text
//! {
//!   "data": resource | [resource, ...] | null,
//!   "included": [resource, ...]                    omitted when empty
//! }
//! ```
//!
//! Resource objects are dispatched on their `type` member through a
//! [`Registry`]. A missing `data` member reads as `null`.

use serde_json::Value;
use tracing::debug;

use crate::codec::options::{DecodeOptions, EncodeOptions};
use crate::codec::primitives::{ObjectWriter, Reader};
use crate::error::{DecodeError, EncodeError};
use crate::model::{AnyResource, Document, PrimaryData};
use crate::schema::Registry;

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a document from JSON bytes.
pub fn decode_document(input: &[u8], registry: &Registry) -> Result<Document, DecodeError> {
    decode_document_with_options(input, registry, &DecodeOptions::default())
}

/// Decodes a document from JSON bytes with explicit options.
pub fn decode_document_with_options(
    input: &[u8],
    registry: &Registry,
    options: &DecodeOptions,
) -> Result<Document, DecodeError> {
    let value: Value = serde_json::from_slice(input)?;
    decode_document_from(Reader::new(&value), registry, options)
}

/// Decodes a document from a JSON string.
pub fn decode_document_str(input: &str, registry: &Registry) -> Result<Document, DecodeError> {
    let value: Value = serde_json::from_str(input)?;
    decode_document_from(Reader::new(&value), registry, &DecodeOptions::default())
}

/// Decodes a document from an already parsed JSON value.
pub fn decode_document_value(value: &Value, registry: &Registry) -> Result<Document, DecodeError> {
    decode_document_from(Reader::new(value), registry, &DecodeOptions::default())
}

fn decode_document_from(
    reader: Reader<'_>,
    registry: &Registry,
    options: &DecodeOptions,
) -> Result<Document, DecodeError> {
    let mut data = PrimaryData::Null;
    let mut included = Vec::new();

    for (name, member) in reader.read_object("document")? {
        if member.is_null() {
            continue;
        }
        match name {
            "data" => data = decode_primary(member, registry, options)?,
            "included" => {
                for element in member.read_array("included")? {
                    if element.is_null() {
                        continue;
                    }
                    included.push(registry.decode(element, options)?);
                }
            }
            other => debug!(member = other, "skipping document member"),
        }
    }

    let doc = Document::from_decoded(data, included);
    debug!(
        document = ?doc.id(),
        primary = doc.data().as_slice().len(),
        included = doc.included_len(),
        "decoded document"
    );
    Ok(doc)
}

fn decode_primary(
    reader: Reader<'_>,
    registry: &Registry,
    options: &DecodeOptions,
) -> Result<PrimaryData, DecodeError> {
    match reader.value() {
        Value::Array(_) => {
            let elements = reader.read_array("data")?;
            let mut resources = Vec::with_capacity(elements.size_hint().0);
            for element in elements {
                if element.is_null() {
                    continue;
                }
                resources.push(registry.decode(element, options)?);
            }
            Ok(PrimaryData::Many(resources))
        }
        Value::Object(_) => Ok(PrimaryData::Single(registry.decode(reader, options)?)),
        _ => Err(DecodeError::UnexpectedType {
            context: "data",
            expected: "object or array",
            found: reader.peek(),
        }),
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a document to compact JSON bytes.
pub fn encode_document(doc: &Document) -> Result<Vec<u8>, EncodeError> {
    encode_document_with_options(doc, &EncodeOptions::default())
}

/// Encodes a document to JSON bytes with explicit options.
pub fn encode_document_with_options(
    doc: &Document,
    options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    let value = encode_document_value(doc)?;
    let bytes = if options.pretty {
        serde_json::to_vec_pretty(&value)?
    } else {
        serde_json::to_vec(&value)?
    };
    Ok(bytes)
}

/// Encodes a document to a compact JSON string.
pub fn encode_document_string(doc: &Document) -> Result<String, EncodeError> {
    let value = encode_document_value(doc)?;
    Ok(serde_json::to_string(&value)?)
}

/// Encodes a document to a JSON value.
pub fn encode_document_value(doc: &Document) -> Result<Value, EncodeError> {
    let mut object = ObjectWriter::new();

    let data = match doc.data() {
        PrimaryData::Null => Value::Null,
        PrimaryData::Single(resource) => resource.to_wire()?,
        PrimaryData::Many(resources) => encode_all(resources.iter().map(|r| &**r))?,
    };
    object.write("data", data);

    if doc.included_len() > 0 {
        object.write("included", encode_all(doc.included())?);
    }

    Ok(object.into_value())
}

fn encode_all<'a, I>(resources: I) -> Result<Value, EncodeError>
where
    I: Iterator<Item = &'a (dyn AnyResource + 'static)>,
{
    resources
        .map(|resource| resource.to_wire())
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}
