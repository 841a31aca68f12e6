//! Resource object encoding and decoding.
//!
//! Wire shape:
//!
//! ```text
//! {
//!   "type": string,
//!   "id": string | null,
//!   "attributes": { name: value, ... },            omitted when empty
//!   "relationships": {                             omitted when empty
//!     name: { "data": linkage | null },            to-one
//!     name: { "data": [linkage, ...] }             to-many
//!   }
//! }
//! ```
//!
//! Decoding never fails on unknown member names or `null` values; both are
//! skipped. Encoding never writes an unset attribute or relationship, but a
//! present to-many relationship is always written, as `[]` when empty.

use serde_json::Value;
use tracing::debug;

use crate::codec::options::{DecodeOptions, EncodeOptions, TypeCheck};
use crate::codec::primitives::{ObjectWriter, Reader};
use crate::error::{DecodeError, EncodeError, SchemaError};
use crate::model::{Resource, ResourceLinkage};
use crate::schema::{RelationshipBinding, RelationshipField, Schema, schema_of};

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a resource object from JSON bytes.
pub fn decode_resource<R: Resource>(input: &[u8]) -> Result<R, DecodeError> {
    decode_resource_with_options(input, &DecodeOptions::default())
}

/// Decodes a resource object from JSON bytes with explicit options.
pub fn decode_resource_with_options<R: Resource>(
    input: &[u8],
    options: &DecodeOptions,
) -> Result<R, DecodeError> {
    let value: Value = serde_json::from_slice(input)?;
    decode_resource_from(Reader::new(&value), options)
}

/// Decodes a resource object from a JSON string.
pub fn decode_resource_str<R: Resource>(input: &str) -> Result<R, DecodeError> {
    let value: Value = serde_json::from_str(input)?;
    decode_resource_from(Reader::new(&value), &DecodeOptions::default())
}

/// Decodes a resource object from an already parsed JSON value.
pub fn decode_resource_value<R: Resource>(value: &Value) -> Result<R, DecodeError> {
    decode_resource_from(Reader::new(value), &DecodeOptions::default())
}

pub(crate) fn decode_resource_from<R: Resource>(
    reader: Reader<'_>,
    options: &DecodeOptions,
) -> Result<R, DecodeError> {
    let schema = schema_of::<R>()?;
    let members = reader.read_object("resource")?;

    let mut resource = R::instantiate()?;
    resource.meta_mut().set_resource_type(R::TYPE);

    for (name, member) in members {
        if member.is_null() {
            continue;
        }
        match name {
            "id" => {
                let id = read_id(member, "resource id")?;
                resource.meta_mut().set_id(Some(id));
            }
            "type" => {
                let declared = member.read_str("resource type")?;
                if options.type_check == TypeCheck::Strict && declared != R::TYPE {
                    return Err(DecodeError::TypeMismatch {
                        expected: R::TYPE,
                        found: declared.to_owned(),
                    });
                }
                resource.meta_mut().set_resource_type(declared);
            }
            "attributes" => decode_attributes(&schema, &mut resource, member)?,
            "relationships" => decode_relationships(&schema, &mut resource, member, options)?,
            other => {
                debug!(resource = R::TYPE, member = other, "skipping top-level member");
            }
        }
    }

    Ok(resource)
}

/// Reads an id. Numeric ids are accepted and kept in their textual form.
fn read_id(reader: Reader<'_>, context: &'static str) -> Result<String, DecodeError> {
    match reader.value() {
        Value::Number(n) => Ok(n.to_string()),
        _ => reader.read_str(context).map(str::to_owned),
    }
}

fn decode_attributes<R: Resource>(
    schema: &Schema<R>,
    resource: &mut R,
    reader: Reader<'_>,
) -> Result<(), DecodeError> {
    for (name, member) in reader.read_object("attributes")? {
        if member.is_null() {
            continue;
        }
        let Some(field) = schema.attribute(name) else {
            debug!(resource = R::TYPE, attribute = name, "skipping unknown attribute");
            continue;
        };
        field
            .binding
            .decode(resource, member.value())
            .map_err(|source| DecodeError::Attribute {
                name: field.name.clone(),
                source,
            })?;
    }
    Ok(())
}

fn decode_relationships<R: Resource>(
    schema: &Schema<R>,
    resource: &mut R,
    reader: Reader<'_>,
    options: &DecodeOptions,
) -> Result<(), DecodeError> {
    for (name, member) in reader.read_object("relationships")? {
        if member.is_null() {
            continue;
        }
        let Some(field) = schema.relationship(name) else {
            debug!(resource = R::TYPE, relationship = name, "skipping unknown relationship");
            continue;
        };
        decode_relationship(field, resource, member, options)?;
    }
    Ok(())
}

fn decode_relationship<R>(
    field: &RelationshipField<R>,
    resource: &mut R,
    reader: Reader<'_>,
    options: &DecodeOptions,
) -> Result<(), DecodeError> {
    // A missing `data` member leaves the relationship absent; `links` and
    // `meta` are not modelled.
    let mut data = None;
    for (name, member) in reader.read_object("relationship")? {
        if name == "data" {
            data = Some(member);
        }
    }
    let Some(data) = data else {
        return Ok(());
    };

    match &field.binding {
        RelationshipBinding::One(binding) => {
            let linkage = if data.is_null() {
                None
            } else {
                Some(check_target(field, decode_linkage(data)?, options)?)
            };
            binding.set(resource, linkage);
        }
        RelationshipBinding::Many(binding) => {
            if data.is_null() {
                return Ok(());
            }
            let elements = data.read_array("to-many relationship data")?;
            let mut linkages = Vec::with_capacity(elements.size_hint().0);
            for element in elements {
                linkages.push(check_target(field, decode_linkage(element)?, options)?);
            }
            binding.set(resource, linkages);
        }
    }
    Ok(())
}

/// Under strict type checking, rejects a linkage whose type is not the
/// relationship's declared target.
fn check_target<R>(
    field: &RelationshipField<R>,
    linkage: ResourceLinkage,
    options: &DecodeOptions,
) -> Result<ResourceLinkage, DecodeError> {
    if options.type_check == TypeCheck::Strict && linkage.resource_type() != field.target {
        return Err(DecodeError::LinkageTypeMismatch {
            relationship: field.name.clone(),
            expected: field.target,
            found: linkage.resource_type().to_owned(),
        });
    }
    Ok(linkage)
}

/// Decodes a `{type, id}` linkage object. Other members are ignored.
pub fn decode_linkage(reader: Reader<'_>) -> Result<ResourceLinkage, DecodeError> {
    let mut resource_type = None;
    let mut id = None;
    for (name, member) in reader.read_object("linkage")? {
        if member.is_null() {
            continue;
        }
        match name {
            "type" => resource_type = Some(member.read_str("linkage type")?),
            "id" => id = Some(read_id(member, "linkage id")?),
            _ => {}
        }
    }
    let resource_type = resource_type.ok_or(DecodeError::MissingMember {
        context: "linkage",
        member: "type",
    })?;
    let id = id.ok_or(DecodeError::MissingMember {
        context: "linkage",
        member: "id",
    })?;
    Ok(ResourceLinkage::new(resource_type, id))
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a resource object to compact JSON bytes.
pub fn encode_resource<R: Resource>(resource: &R) -> Result<Vec<u8>, EncodeError> {
    encode_resource_with_options(resource, &EncodeOptions::default())
}

/// Encodes a resource object to JSON bytes with explicit options.
pub fn encode_resource_with_options<R: Resource>(
    resource: &R,
    options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    let value = encode_resource_value(resource)?;
    let bytes = if options.pretty {
        serde_json::to_vec_pretty(&value)?
    } else {
        serde_json::to_vec(&value)?
    };
    Ok(bytes)
}

/// Encodes a resource object to a compact JSON string.
pub fn encode_resource_string<R: Resource>(resource: &R) -> Result<String, EncodeError> {
    let value = encode_resource_value(resource)?;
    Ok(serde_json::to_string(&value)?)
}

/// Encodes a resource object to a JSON value.
pub fn encode_resource_value<R: Resource>(resource: &R) -> Result<Value, EncodeError> {
    let schema = schema_of::<R>()?;

    let mut object = ObjectWriter::new();
    object.write_str("type", resource.resource_type());
    object.write_opt_str("id", resource.id());

    let mut attributes = ObjectWriter::new();
    for field in schema.attributes() {
        let encoded = field
            .binding
            .encode(resource)
            .map_err(|source| EncodeError::Attribute {
                name: field.name.clone(),
                source,
            })?;
        if let Some(value) = encoded {
            attributes.write(field.name.as_str(), value);
        }
    }
    if !attributes.is_empty() {
        object.write("attributes", attributes.into_value());
    }

    let mut relationships = ObjectWriter::new();
    for field in schema.relationships() {
        let data = match &field.binding {
            RelationshipBinding::One(binding) => match binding.get(resource) {
                Some(linkage) => linkage.map_or(Value::Null, encode_linkage),
                None => continue,
            },
            RelationshipBinding::Many(binding) => match binding.get(resource) {
                Some(linkages) => Value::Array(linkages.iter().map(encode_linkage).collect()),
                None => continue,
            },
        };
        let mut relationship = ObjectWriter::new();
        relationship.write("data", data);
        relationships.write(field.name.as_str(), relationship.into_value());
    }
    if !relationships.is_empty() {
        object.write("relationships", relationships.into_value());
    }

    Ok(object.into_value())
}

/// Encodes a linkage as `{"type": ..., "id": ...}`.
pub fn encode_linkage(linkage: &ResourceLinkage) -> Value {
    let mut object = ObjectWriter::new();
    object.write_str("type", linkage.resource_type());
    object.write_str("id", linkage.id());
    object.into_value()
}

/// Lists every present relationship linkage of `resource` as
/// `(relationship name, linkage)`, in schema order.
pub(crate) fn relationship_linkages<R: Resource>(
    resource: &R,
) -> Result<Vec<(String, ResourceLinkage)>, SchemaError> {
    let schema = schema_of::<R>()?;
    let mut out = Vec::new();
    for field in schema.relationships() {
        match &field.binding {
            RelationshipBinding::One(binding) => {
                if let Some(Some(linkage)) = binding.get(resource) {
                    out.push((field.name.clone(), linkage.clone()));
                }
            }
            RelationshipBinding::Many(binding) => {
                for linkage in binding.get(resource).unwrap_or_default() {
                    out.push((field.name.clone(), linkage.clone()));
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::error::{ErrorKind, InstantiationError};
    use crate::model::{ResourceMeta, ToMany, ToOne};
    use crate::schema::SchemaBuilder;
    use crate::testing::{Article, Comment, Person};

    const EXAMPLE: &str = r#"{"type":"article","id":"1","attributes":{"title":"Hi"},"relationships":{"author":{"data":{"type":"person","id":"9"}}}}"#;

    #[test]
    fn test_example_round_trip() {
        let article: Article = decode_resource_str(EXAMPLE).unwrap();
        assert_eq!(article.meta.resource_type(), "article");
        assert_eq!(article.id(), Some("1"));
        assert_eq!(article.title.as_deref(), Some("Hi"));
        let author = article.author.as_ref().unwrap();
        assert_eq!(author.linkage(), Some(&ResourceLinkage::new("person", "9")));
        assert!(article.comments.is_none());

        assert_eq!(encode_resource_string(&article).unwrap(), EXAMPLE);
    }

    #[test]
    fn test_null_omission_on_write() {
        let mut article = Article::with_id("1");
        assert_eq!(
            encode_resource_value(&article).unwrap(),
            json!({"type": "article", "id": "1"})
        );

        article.author = None;
        article.word_count = Some(12);
        let value = encode_resource_value(&article).unwrap();
        assert_eq!(value["attributes"], json!({"wordCount": 12}));
        assert!(value.get("relationships").is_none());
    }

    #[test]
    fn test_missing_id_written_as_null() {
        let person = Person::default();
        assert_eq!(
            encode_resource_string(&person).unwrap(),
            r#"{"type":"person","id":null}"#
        );
    }

    #[test]
    fn test_empty_vs_absent_to_many() {
        let mut article = Article::with_id("1");
        article.comments = Some(ToMany::empty());
        let value = encode_resource_value(&article).unwrap();
        assert_eq!(value["relationships"], json!({"comments": {"data": []}}));

        let decoded: Article = decode_resource_value(&value).unwrap();
        assert_eq!(decoded.comments, Some(ToMany::empty()));

        let absent: Article =
            decode_resource_value(&json!({"type": "article", "id": "1"})).unwrap();
        assert!(absent.comments.is_none());
    }

    #[test]
    fn test_to_one_null_data() {
        let mut article = Article::with_id("1");
        article.author = Some(ToOne::empty());
        let value = encode_resource_value(&article).unwrap();
        assert_eq!(value["relationships"], json!({"author": {"data": null}}));

        let decoded: Article = decode_resource_value(&value).unwrap();
        assert_eq!(decoded.author, Some(ToOne::empty()));
    }

    #[test]
    fn test_unknown_members_are_skipped() {
        let input = json!({
            "type": "article",
            "id": "1",
            "links": {"self": "/articles/1"},
            "attributes": {"title": "Hi", "subtitle": "ignored", "extra": {"deep": [1, 2]}},
            "relationships": {
                "publisher": {"data": {"type": "org", "id": "5"}},
                "author": {
                    "links": {"related": "/articles/1/author"},
                    "meta": {"count": 1},
                    "data": {"type": "person", "id": "9", "meta": {}}
                }
            }
        });
        let article: Article = decode_resource_value(&input).unwrap();
        assert_eq!(article.title.as_deref(), Some("Hi"));
        assert_eq!(
            article.author.unwrap().linkage(),
            Some(&ResourceLinkage::new("person", "9"))
        );
    }

    #[test]
    fn test_nulls_skipped_on_read() {
        let input = json!({
            "type": "article",
            "id": null,
            "attributes": {"title": null, "wordCount": 3},
            "relationships": {"author": null, "comments": {"data": null}}
        });
        let article: Article = decode_resource_value(&input).unwrap();
        assert!(article.id().is_none());
        assert!(article.title.is_none());
        assert_eq!(article.word_count, Some(3));
        assert!(article.author.is_none());
        assert!(article.comments.is_none());

        let attributes_null: Article =
            decode_resource_value(&json!({"type": "article", "attributes": null})).unwrap();
        let expected = Article {
            meta: ResourceMeta::new("article"),
            ..Article::default()
        };
        assert_eq!(attributes_null, expected);
    }

    #[test]
    fn test_structural_errors() {
        let err = decode_resource_value::<Article>(&json!({"type": "article", "relationships": []}))
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedType {
                context: "relationships",
                expected: "object",
                found: "array",
            }
        );
        assert_eq!(err.kind(), ErrorKind::Structural);

        let err = decode_resource_value::<Article>(&json!({
            "type": "article",
            "relationships": {"comments": {"data": [{"type": "comment"}]}}
        }))
        .unwrap_err();
        assert_eq!(err, DecodeError::MissingMember { context: "linkage", member: "id" });

        let err = decode_resource_str::<Article>("{\"type\": ").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_attribute_codec_failure() {
        let err = decode_resource_value::<Article>(&json!({
            "type": "article",
            "attributes": {"wordCount": "many"}
        }))
        .unwrap_err();
        assert!(matches!(err, DecodeError::Attribute { ref name, .. } if name == "wordCount"));
        assert_eq!(err.kind(), ErrorKind::Data);
    }

    #[test]
    fn test_qualified_date_codec() {
        let person: Person = decode_resource_value(&json!({
            "type": "person",
            "id": "9",
            "attributes": {"name": "Ada", "born": "10/12/1815"}
        }))
        .unwrap();
        assert_eq!(person.born, NaiveDate::from_ymd_opt(1815, 12, 10));
        assert_eq!(
            encode_resource_value(&person).unwrap()["attributes"]["born"],
            json!("10/12/1815")
        );
    }

    #[test]
    fn test_numeric_ids_are_read_as_text() {
        let comment: Comment = decode_resource_value(&json!({
            "type": "comment",
            "id": 42,
            "relationships": {"author": {"data": {"type": "person", "id": 7}}}
        }))
        .unwrap();
        assert_eq!(comment.id(), Some("42"));
        assert_eq!(
            comment.author.unwrap().linkage(),
            Some(&ResourceLinkage::new("person", "7"))
        );
    }

    #[test]
    fn test_type_override_is_lenient_by_default() {
        let input = json!({"type": "essay", "id": "1"});
        let article: Article = decode_resource_value(&input).unwrap();
        assert_eq!(article.resource_type(), "essay");
        assert_eq!(article.linkage(), Some(ResourceLinkage::new("essay", "1")));
    }

    #[test]
    fn test_strict_type_check() {
        let strict = DecodeOptions::new().with_type_check(TypeCheck::Strict);

        let err = decode_resource_with_options::<Article>(br#"{"type":"essay","id":"1"}"#, &strict)
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::TypeMismatch { expected: "article", found: "essay".to_string() }
        );

        let input = br#"{"type":"article","relationships":{"comments":{"data":[{"type":"note","id":"3"}]}}}"#;
        let err = decode_resource_with_options::<Article>(input, &strict).unwrap_err();
        assert!(matches!(err, DecodeError::LinkageTypeMismatch { expected: "comment", .. }));
        assert!(decode_resource::<Article>(input).is_ok());
    }

    #[test]
    fn test_strict_type_check_on_to_one() {
        let strict = DecodeOptions::new().with_type_check(TypeCheck::Strict);
        let input = br#"{"type":"article","relationships":{"author":{"data":{"type":"org","id":"5"}}}}"#;

        let err = decode_resource_with_options::<Article>(input, &strict).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LinkageTypeMismatch {
                relationship: "author".to_string(),
                expected: "person",
                found: "org".to_string(),
            }
        );

        let lenient: Article = decode_resource(input).unwrap();
        assert_eq!(
            lenient.author.unwrap().linkage(),
            Some(&ResourceLinkage::new("org", "5"))
        );

        let null_data = br#"{"type":"article","relationships":{"author":{"data":null}}}"#;
        let article = decode_resource_with_options::<Article>(null_data, &strict).unwrap();
        assert_eq!(article.author, Some(ToOne::empty()));
    }

    #[derive(Debug)]
    struct Pooled {
        meta: ResourceMeta,
    }

    impl Default for Pooled {
        fn default() -> Self {
            Self { meta: ResourceMeta::of::<Self>() }
        }
    }

    impl Resource for Pooled {
        const TYPE: &'static str = "pooled";

        fn meta(&self) -> &ResourceMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut ResourceMeta {
            &mut self.meta
        }

        fn describe(_schema: &mut SchemaBuilder<Self>) {}

        fn instantiate() -> Result<Self, InstantiationError> {
            Err(InstantiationError {
                type_name: Self::TYPE,
                reason: "pool exhausted".to_string(),
            })
        }
    }

    #[test]
    fn test_instantiation_failure_is_configuration() {
        let err = decode_resource_str::<Pooled>(r#"{"type":"pooled"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("pool exhausted"));
    }

    #[test]
    fn test_pretty_output() {
        let person = Person::named("1", "Ada");
        let bytes = encode_resource_with_options(&person, &EncodeOptions::pretty()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\n  \"type\": \"person\""));
    }

    #[test]
    fn test_relationship_linkages_in_schema_order() {
        let mut article = Article::with_id("1");
        article.comments = Some(ToMany::to(["11", "12"]));
        article.author = Some(ToOne::to("9"));
        let names: Vec<_> = relationship_linkages(&article)
            .unwrap()
            .into_iter()
            .map(|(name, linkage)| format!("{}={}", name, linkage))
            .collect();
        assert_eq!(names, ["author=person/9", "comments=comment/11", "comments=comment/12"]);
    }

    fn arb_id() -> impl Strategy<Value = String> {
        "[a-z0-9]{1,8}"
    }

    prop_compose! {
        fn arb_article()(
            id in proptest::option::of(arb_id()),
            title in proptest::option::of(".{0,16}"),
            word_count in proptest::option::of(any::<u32>()),
            tags in proptest::option::of(proptest::collection::vec("[a-z]{1,6}", 0..4)),
            author in proptest::option::of(proptest::option::of(arb_id())),
            comments in proptest::option::of(proptest::collection::vec(arb_id(), 0..4)),
        ) -> Article {
            let mut meta = ResourceMeta::of::<Article>();
            meta.set_id(id);
            Article {
                meta,
                title,
                word_count,
                tags,
                author: author.map(|id| match id {
                    Some(id) => ToOne::to(id),
                    None => ToOne::empty(),
                }),
                comments: comments.map(ToMany::to),
            }
        }
    }

    proptest! {
        #[test]
        fn test_decode_inverts_encode(article in arb_article()) {
            let bytes = encode_resource(&article).unwrap();
            let decoded: Article = decode_resource(&bytes).unwrap();
            prop_assert_eq!(decoded, article);
        }
    }
}
