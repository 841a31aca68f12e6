//! Typed relationship handles.
//!
//! A handle stores linkages only. Resolving it looks the targets up in a
//! [`Document`], which owns every resource; the handle never points at
//! another resource directly.
//!
//! Three situations stay distinguishable:
//! - the field is `None`: the relationship is absent;
//! - resolution returns `Err(UnresolvedRelationship)`: the relationship is
//!   present but its target is not in the document;
//! - resolution returns the target (or `Ok(None)` for a to-one whose data
//!   is `null`).

use std::fmt;
use std::marker::PhantomData;

use crate::error::UnresolvedRelationship;
use crate::model::{Document, Resource, ResourceLinkage};

fn lookup<'d, T: Resource>(
    document: &'d Document,
    linkage: &ResourceLinkage,
) -> Result<&'d T, UnresolvedRelationship> {
    document
        .resolve::<T>(linkage)
        .ok_or_else(|| UnresolvedRelationship {
            linkage: linkage.clone(),
        })
}

// =============================================================================
// TO-ONE
// =============================================================================

/// To-one relationship to a resource of type `T`.
pub struct ToOne<T> {
    linkage: Option<ResourceLinkage>,
    target: PhantomData<fn() -> T>,
}

impl<T: Resource> ToOne<T> {
    /// Creates a handle from a linkage; `None` is an explicit `data: null`.
    pub fn new(linkage: Option<ResourceLinkage>) -> Self {
        Self {
            linkage,
            target: PhantomData,
        }
    }

    /// Creates a handle pointing at the `T` with the given id.
    pub fn to(id: impl Into<String>) -> Self {
        Self::new(Some(ResourceLinkage::new(T::TYPE, id)))
    }

    /// Creates a handle pointing at `resource`, or an empty one if the
    /// resource has no id yet.
    pub fn to_resource(resource: &T) -> Self {
        Self::new(resource.linkage())
    }

    /// Creates a handle whose data is `null`.
    pub fn empty() -> Self {
        Self::new(None)
    }

    pub fn linkage(&self) -> Option<&ResourceLinkage> {
        self.linkage.as_ref()
    }

    pub fn set_linkage(&mut self, linkage: Option<ResourceLinkage>) {
        self.linkage = linkage;
    }

    pub fn is_empty(&self) -> bool {
        self.linkage.is_none()
    }

    /// Declared target type.
    pub fn target_type(&self) -> &'static str {
        T::TYPE
    }

    /// Resolves the target in `document`.
    pub fn resolve<'d>(
        &self,
        document: &'d Document,
    ) -> Result<Option<&'d T>, UnresolvedRelationship> {
        self.linkage
            .as_ref()
            .map(|linkage| lookup(document, linkage))
            .transpose()
    }
}

impl<T> Clone for ToOne<T> {
    fn clone(&self) -> Self {
        Self {
            linkage: self.linkage.clone(),
            target: PhantomData,
        }
    }
}

impl<T> PartialEq for ToOne<T> {
    fn eq(&self, other: &Self) -> bool {
        self.linkage == other.linkage
    }
}

impl<T> Eq for ToOne<T> {}

impl<T> fmt::Debug for ToOne<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ToOne").field(&self.linkage).finish()
    }
}

// =============================================================================
// TO-MANY
// =============================================================================

/// To-many relationship to resources of type `T`, in wire order.
pub struct ToMany<T> {
    linkages: Vec<ResourceLinkage>,
    target: PhantomData<fn() -> T>,
}

impl<T: Resource> ToMany<T> {
    pub fn new(linkages: Vec<ResourceLinkage>) -> Self {
        Self {
            linkages,
            target: PhantomData,
        }
    }

    /// Creates a present relationship with no members (`data: []`).
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Creates a handle pointing at the `T`s with the given ids.
    pub fn to<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            ids.into_iter()
                .map(|id| ResourceLinkage::new(T::TYPE, id))
                .collect(),
        )
    }

    pub fn push(&mut self, linkage: ResourceLinkage) {
        self.linkages.push(linkage);
    }

    pub fn linkages(&self) -> &[ResourceLinkage] {
        &self.linkages
    }

    pub fn len(&self) -> usize {
        self.linkages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.linkages.is_empty()
    }

    /// Declared target type.
    pub fn target_type(&self) -> &'static str {
        T::TYPE
    }

    /// Resolves every linkage in order. Missing targets are reported per
    /// position.
    pub fn resolve<'d>(
        &self,
        document: &'d Document,
    ) -> Vec<Result<&'d T, UnresolvedRelationship>> {
        self.linkages
            .iter()
            .map(|linkage| lookup(document, linkage))
            .collect()
    }

    /// Resolves every linkage, failing on the first missing target.
    pub fn resolve_all<'d>(
        &self,
        document: &'d Document,
    ) -> Result<Vec<&'d T>, UnresolvedRelationship> {
        self.linkages
            .iter()
            .map(|linkage| lookup(document, linkage))
            .collect()
    }
}

impl<T: Resource> FromIterator<ResourceLinkage> for ToMany<T> {
    fn from_iter<I: IntoIterator<Item = ResourceLinkage>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> Clone for ToMany<T> {
    fn clone(&self) -> Self {
        Self {
            linkages: self.linkages.clone(),
            target: PhantomData,
        }
    }
}

impl<T> PartialEq for ToMany<T> {
    fn eq(&self, other: &Self) -> bool {
        self.linkages == other.linkages
    }
}

impl<T> Eq for ToMany<T> {}

impl<T> fmt::Debug for ToMany<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ToMany").field(&self.linkages).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Comment, Person, Post};

    fn post_with_comments(included: &[&str]) -> Document {
        let mut doc = Document::new();
        let mut post = Post::with_id("1");
        post.comments = Some(ToMany::to(["10", "11"]));
        doc.add_data(post).unwrap();
        for id in included {
            doc.add_include(Comment::with_body(id, "hi")).unwrap();
        }
        doc
    }

    #[test]
    fn test_to_many_resolves_in_order() {
        let doc = post_with_comments(&["11", "10"]);
        let post = doc.data_as::<Post>().unwrap();
        let comments = post.comments.as_ref().unwrap().resolve_all(&doc).unwrap();
        let ids: Vec<_> = comments.iter().map(|c| c.id().unwrap()).collect();
        assert_eq!(ids, ["10", "11"]);
    }

    #[test]
    fn test_to_many_reports_missing_target() {
        let doc = post_with_comments(&["10"]);
        let post = doc.data_as::<Post>().unwrap();
        let handle = post.comments.as_ref().unwrap();

        let resolved = handle.resolve(&doc);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].as_ref().unwrap().id(), Some("10"));
        assert_eq!(
            resolved[1].as_ref().unwrap_err().linkage,
            ResourceLinkage::new("comment", "11")
        );

        let err = handle.resolve_all(&doc).unwrap_err();
        assert_eq!(err.linkage.id(), "11");
    }

    #[test]
    fn test_to_one_three_states() {
        let mut doc = Document::new();
        let mut post = Post::with_id("1");
        post.author = Some(ToOne::to("9"));
        doc.add_data(post).unwrap();

        let post = doc.data_as::<Post>().unwrap();
        // present but not included
        assert!(post.author.as_ref().unwrap().resolve(&doc).is_err());
        // absent
        assert!(post.editor.is_none());

        let mut doc = Document::new();
        let mut post = Post::with_id("1");
        post.author = Some(ToOne::to("9"));
        post.editor = Some(ToOne::empty());
        doc.add_data(post).unwrap();
        doc.add_include(Person::named("9", "Ada")).unwrap();

        let post = doc.data_as::<Post>().unwrap();
        let author = post.author.as_ref().unwrap().resolve(&doc).unwrap().unwrap();
        assert_eq!(author.name.as_deref(), Some("Ada"));
        // present with null data
        assert_eq!(post.editor.as_ref().unwrap().resolve(&doc), Ok(None));
    }

    #[test]
    fn test_wrong_concrete_type_is_unresolved() {
        let mut doc = Document::new();
        doc.add_include(Person::named("10", "Ada")).unwrap();
        let handle: ToMany<Comment> = [ResourceLinkage::new("person", "10")].into_iter().collect();
        assert!(handle.resolve_all(&doc).is_err());
    }

    #[test]
    fn test_handles_compare_by_linkage() {
        let a: ToOne<Person> = ToOne::to("9");
        let b = ToOne::<Person>::to_resource(&Person::named("9", "Ada"));
        assert_eq!(a, b);
        assert_eq!(a.target_type(), "person");
        assert!(ToOne::<Person>::to_resource(&Person::default()).is_empty());

        let mut many: ToMany<Comment> = ToMany::empty();
        assert!(many.is_empty());
        many.push(ResourceLinkage::new("comment", "1"));
        assert_eq!(many.len(), 1);
        assert_eq!(format!("{:?}", many.clone()), format!("{:?}", many));
    }
}
