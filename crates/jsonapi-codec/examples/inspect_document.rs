//! Simple inspector for JSON:API documents.
//!
//! Decodes a document (from the path given as first argument, or a built-in
//! sample), prints its resources, resolves article relationships and runs
//! the compound document checks. Set `RUST_LOG=debug` to see skipped members.

use std::fs;

use chrono::NaiveDate;
use jsonapi_codec::codec::{DateFormat, encode_document_with_options};
use jsonapi_codec::{
    DecodeOptions, Document, EncodeOptions, PrimaryData, Registry, Resource, ResourceMeta,
    SchemaBuilder, ToMany, ToOne, UnknownResource, decode_document, validate_document,
};
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = r#"{
  "data": [{
    "type": "articles",
    "id": "1",
    "attributes": {"title": "JSON:API paints my bikeshed!", "published": "2015-05-22"},
    "relationships": {
      "author": {"links": {"self": "/articles/1/relationships/author"}, "data": {"type": "people", "id": "9"}},
      "comments": {"data": [{"type": "comments", "id": "5"}, {"type": "comments", "id": "12"}]}
    },
    "links": {"self": "http://example.com/articles/1"}
  }],
  "included": [
    {"type": "people", "id": "9", "attributes": {"firstName": "Dan", "lastName": "Gebhardt", "twitter": "dgeb"}},
    {"type": "comments", "id": "5", "attributes": {"body": "First!"}, "relationships": {"author": {"data": {"type": "people", "id": "2"}}}},
    {"type": "comments", "id": "12", "attributes": {"body": "I like XML better"}, "relationships": {"author": {"data": {"type": "people", "id": "9"}}}},
    {"type": "tags", "id": "3", "attributes": {"label": "api"}}
  ]
}"#;

#[derive(Debug, Default)]
struct Person {
    meta: ResourceMeta,
    first_name: Option<String>,
    last_name: Option<String>,
    twitter: Option<String>,
}

impl Resource for Person {
    const TYPE: &'static str = "people";

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ResourceMeta {
        &mut self.meta
    }

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .attribute("first_name", |p| &p.first_name, |p| &mut p.first_name)
            .rename("firstName")
            .attribute("last_name", |p| &p.last_name, |p| &mut p.last_name)
            .rename("lastName")
            .attribute("twitter", |p| &p.twitter, |p| &mut p.twitter);
    }
}

#[derive(Debug, Default)]
struct Comment {
    meta: ResourceMeta,
    body: Option<String>,
    author: Option<ToOne<Person>>,
}

impl Resource for Comment {
    const TYPE: &'static str = "comments";

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ResourceMeta {
        &mut self.meta
    }

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .attribute("body", |c| &c.body, |c| &mut c.body)
            .to_one("author", |c| &c.author, |c| &mut c.author);
    }
}

#[derive(Debug, Default)]
struct Article {
    meta: ResourceMeta,
    title: Option<String>,
    published: Option<NaiveDate>,
    author: Option<ToOne<Person>>,
    comments: Option<ToMany<Comment>>,
}

impl Resource for Article {
    const TYPE: &'static str = "articles";

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ResourceMeta {
        &mut self.meta
    }

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .attribute("title", |a| &a.title, |a| &mut a.title)
            .attribute_with("published", DateFormat::iso(), |a| &a.published, |a| &mut a.published)
            .to_one("author", |a| &a.author, |a| &mut a.author)
            .to_many("comments", |a| &a.comments, |a| &mut a.comments);
    }
}

fn format_person(person: &Person) -> String {
    let name = [person.first_name.as_deref(), person.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    match &person.twitter {
        Some(handle) => format!("{} (@{})", name, handle),
        None => name,
    }
}

fn print_article(article: &Article, doc: &Document) {
    println!(
        "  {} {:?}",
        article.linkage().map(|l| l.to_string()).unwrap_or_default(),
        article.title.as_deref().unwrap_or("")
    );
    if let Some(published) = article.published {
        println!("    published: {}", published);
    }

    match article.author.as_ref().map(|author| author.resolve(doc)) {
        None => println!("    author: (absent)"),
        Some(Ok(None)) => println!("    author: null"),
        Some(Ok(Some(person))) => println!("    author: {}", format_person(person)),
        Some(Err(missing)) => println!("    author: {}", missing),
    }

    if let Some(comments) = &article.comments {
        println!("    comments ({}):", comments.len());
        for comment in comments.resolve(doc) {
            match comment {
                Ok(comment) => {
                    let by = match comment.author.as_ref().map(|a| a.resolve(doc)) {
                        Some(Ok(Some(person))) => format_person(person),
                        Some(Err(missing)) => missing.linkage.to_string(),
                        _ => "anonymous".to_string(),
                    };
                    println!("      - {:?} by {}", comment.body.as_deref().unwrap_or(""), by);
                }
                Err(missing) => println!("      - {}", missing),
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input = match std::env::args().nth(1) {
        Some(path) => {
            println!("Reading: {}", path);
            fs::read(&path).expect("Failed to read file")
        }
        None => {
            println!("Reading: built-in sample");
            SAMPLE.as_bytes().to_vec()
        }
    };
    println!("Size: {} bytes", input.len());

    let registry = Registry::new()
        .with::<Article>()
        .and_then(Registry::with::<Person>)
        .and_then(Registry::with::<Comment>)
        .expect("Failed to register resource types");
    println!("Registered types: {}", registry.type_names().join(", "));

    let doc = decode_document(&input, &registry).expect("Failed to decode");

    let shape = match doc.data() {
        PrimaryData::Null => "null",
        PrimaryData::Single(_) => "single resource",
        PrimaryData::Many(_) => "collection",
    };
    println!("\n=== Primary data: {} ===", shape);
    for resource in doc.data_iter() {
        match resource.downcast_ref::<Article>() {
            Some(article) => print_article(article, &doc),
            None => println!("  {:?}", resource),
        }
    }

    println!("\n=== Included ({}) ===", doc.included_len());
    for resource in doc.included() {
        let marker = if resource.downcast_ref::<UnknownResource>().is_some() {
            " (unregistered)"
        } else {
            ""
        };
        println!(
            "  {}/{}{}",
            resource.type_name(),
            resource.id().unwrap_or("<no id>"),
            marker
        );
    }

    println!("\n=== Validation ===");
    match validate_document(&doc) {
        Ok(()) => println!("  ok"),
        Err(e) => println!("  {}", e),
    }

    let strict = decode_document_with_strict(&input, &registry);
    println!("  strict decode: {}", strict);

    println!("\n=== Re-encoded ===");
    let output = encode_document_with_options(&doc, &EncodeOptions::pretty())
        .expect("Failed to encode");
    println!("{}", String::from_utf8_lossy(&output));
}

fn decode_document_with_strict(input: &[u8], registry: &Registry) -> String {
    let options = DecodeOptions::strict();
    match jsonapi_codec::codec::decode_document_with_options(input, registry, &options) {
        Ok(_) => "ok".to_string(),
        Err(e) => format!("{} ({:?})", e, e.kind()),
    }
}
