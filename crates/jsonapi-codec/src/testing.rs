//! Resource types shared by the unit tests.

use chrono::NaiveDate;

use crate::codec::attribute::DateFormat;
use crate::model::{Resource, ResourceMeta, ToMany, ToOne};
use crate::schema::SchemaBuilder;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub meta: ResourceMeta,
    pub name: Option<String>,
    pub born: Option<NaiveDate>,
}

impl Person {
    pub fn named(id: &str, name: &str) -> Self {
        Self {
            meta: ResourceMeta::of::<Self>().with_id(id),
            name: Some(name.to_string()),
            born: None,
        }
    }
}

impl Resource for Person {
    const TYPE: &'static str = "person";

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ResourceMeta {
        &mut self.meta
    }

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .attribute("name", |p| &p.name, |p| &mut p.name)
            .attribute_with("born", DateFormat::new("%d/%m/%Y"), |p| &p.born, |p| &mut p.born);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    pub meta: ResourceMeta,
    pub title: Option<String>,
    pub word_count: Option<u32>,
    pub tags: Option<Vec<String>>,
    pub author: Option<ToOne<Person>>,
    pub comments: Option<ToMany<Comment>>,
}

impl Article {
    pub fn with_id(id: &str) -> Self {
        Self {
            meta: ResourceMeta::of::<Self>().with_id(id),
            ..Self::default()
        }
    }
}

impl Resource for Article {
    const TYPE: &'static str = "article";

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ResourceMeta {
        &mut self.meta
    }

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .attribute("title", |a| &a.title, |a| &mut a.title)
            .attribute("word_count", |a| &a.word_count, |a| &mut a.word_count)
            .rename("wordCount")
            .attribute("tags", |a| &a.tags, |a| &mut a.tags)
            .to_one("author", |a| &a.author, |a| &mut a.author)
            .to_many("comments", |a| &a.comments, |a| &mut a.comments);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comment {
    pub meta: ResourceMeta,
    pub body: Option<String>,
    pub author: Option<ToOne<Person>>,
}

impl Comment {
    pub fn with_body(id: &str, body: &str) -> Self {
        Self {
            meta: ResourceMeta::of::<Self>().with_id(id),
            body: Some(body.to_string()),
            author: None,
        }
    }
}

impl Resource for Comment {
    const TYPE: &'static str = "comment";

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

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Post {
    pub meta: ResourceMeta,
    pub title: Option<String>,
    pub author: Option<ToOne<Person>>,
    pub editor: Option<ToOne<Person>>,
    pub comments: Option<ToMany<Comment>>,
}

impl Post {
    pub fn with_id(id: &str) -> Self {
        Self {
            meta: ResourceMeta::of::<Self>().with_id(id),
            ..Self::default()
        }
    }
}

impl Resource for Post {
    const TYPE: &'static str = "post";

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ResourceMeta {
        &mut self.meta
    }

    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .attribute("title", |p| &p.title, |p| &mut p.title)
            .to_one("author", |p| &p.author, |p| &mut p.author)
            .to_one("editor", |p| &p.editor, |p| &mut p.editor)
            .to_many("comments", |p| &p.comments, |p| &mut p.comments);
    }
}
