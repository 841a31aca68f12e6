//! Top-level JSON:API document.
//!
//! A [`Document`] owns its primary data and its included resources. Each
//! resource it owns records the document's [`DocumentId`] in its
//! [`ResourceMeta`](crate::model::ResourceMeta); that id is the only link
//! from a resource back to its document.

use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::DocumentError;
use crate::model::{AnyResource, Resource, ResourceLinkage};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    pub(crate) fn next() -> Self {
        DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The `data` member of a document.
#[derive(Debug, Default)]
pub enum PrimaryData {
    /// `"data": null`
    #[default]
    Null,
    /// `"data": {...}`
    Single(Box<dyn AnyResource>),
    /// `"data": [...]`, possibly empty.
    Many(Vec<Box<dyn AnyResource>>),
}

impl PrimaryData {
    /// Returns the primary resources in order.
    pub fn as_slice(&self) -> &[Box<dyn AnyResource>] {
        match self {
            PrimaryData::Null => &[],
            PrimaryData::Single(resource) => std::slice::from_ref(resource),
            PrimaryData::Many(resources) => resources,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [Box<dyn AnyResource>] {
        match self {
            PrimaryData::Null => &mut [],
            PrimaryData::Single(resource) => std::slice::from_mut(resource),
            PrimaryData::Many(resources) => resources,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PrimaryData::Null)
    }
}

/// A JSON:API document: primary data plus a pool of included resources
/// keyed by `(type, id)`.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    data: PrimaryData,
    included: Vec<Box<dyn AnyResource>>,
    primary_index: FxHashMap<ResourceLinkage, usize>,
    included_index: FxHashMap<ResourceLinkage, usize>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document whose primary data is `null`.
    pub fn new() -> Self {
        Self {
            id: DocumentId::next(),
            data: PrimaryData::Null,
            included: Vec::new(),
            primary_index: FxHashMap::default(),
            included_index: FxHashMap::default(),
        }
    }

    /// Creates a document whose primary data is an empty array.
    pub fn collection() -> Self {
        let mut doc = Self::new();
        doc.data = PrimaryData::Many(Vec::new());
        doc
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn data(&self) -> &PrimaryData {
        &self.data
    }

    /// Iterates over the primary resources in order.
    pub fn data_iter(&self) -> impl Iterator<Item = &(dyn AnyResource + 'static)> + '_ {
        self.data.as_slice().iter().map(|r| &**r)
    }

    /// Iterates over the included resources in insertion order.
    pub fn included(&self) -> impl Iterator<Item = &(dyn AnyResource + 'static)> + '_ {
        self.included.iter().map(|r| &**r)
    }

    pub fn included_len(&self) -> usize {
        self.included.len()
    }

    /// Returns the single primary resource as `T`.
    ///
    /// Returns `None` when the primary data is null, an array, or of another
    /// type.
    pub fn data_as<T: Resource>(&self) -> Option<&T> {
        match &self.data {
            PrimaryData::Single(resource) => resource.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Runs `f` on the single primary resource as `T`.
    ///
    /// Returns `Ok(None)` under the same conditions as [`Self::data_as`].
    /// See [`Self::update`] for the identity rule.
    pub fn update_data<T: Resource, O>(
        &mut self,
        f: impl FnOnce(&mut T) -> O,
    ) -> Result<Option<O>, DocumentError> {
        let owner = self.id;
        match &mut self.data {
            PrimaryData::Single(resource) => match resource.downcast_mut::<T>() {
                Some(resource) => mutate_owned(owner, resource, f).map(Some),
                None => Ok(None),
            },
            _ => Ok(None),
        }
    }

    /// Adds `resource` to the primary data.
    ///
    /// Null primary data becomes a single resource; a single resource is
    /// promoted to an array; an array is appended to.
    pub fn add_data<R: Resource>(&mut self, resource: R) -> Result<(), DocumentError> {
        self.push_data(Box::new(resource))
    }

    /// Adds `resource` to the included pool. A resource with the same
    /// `(type, id)` as an earlier one replaces it in place.
    pub fn add_include<R: Resource>(&mut self, resource: R) -> Result<(), DocumentError> {
        self.push_include(Box::new(resource))
    }

    pub(crate) fn push_data(
        &mut self,
        mut resource: Box<dyn AnyResource>,
    ) -> Result<(), DocumentError> {
        self.attach(resource.as_mut())?;
        let linkage = resource.linkage();
        let position = match std::mem::take(&mut self.data) {
            PrimaryData::Null => {
                self.data = PrimaryData::Single(resource);
                0
            }
            PrimaryData::Single(first) => {
                self.data = PrimaryData::Many(vec![first, resource]);
                1
            }
            PrimaryData::Many(mut resources) => {
                resources.push(resource);
                let position = resources.len() - 1;
                self.data = PrimaryData::Many(resources);
                position
            }
        };
        if let Some(linkage) = linkage {
            self.primary_index.entry(linkage).or_insert(position);
        }
        Ok(())
    }

    pub(crate) fn push_include(
        &mut self,
        mut resource: Box<dyn AnyResource>,
    ) -> Result<(), DocumentError> {
        self.attach(resource.as_mut())?;
        self.insert_included(resource);
        Ok(())
    }

    fn insert_included(&mut self, resource: Box<dyn AnyResource>) {
        let Some(linkage) = resource.linkage() else {
            self.included.push(resource);
            return;
        };
        match self.included_index.get(&linkage) {
            Some(&position) => {
                debug!(%linkage, "replacing included resource");
                self.included[position] = resource;
            }
            None => {
                self.included_index.insert(linkage, self.included.len());
                self.included.push(resource);
            }
        }
    }

    /// Assembles a document from freshly decoded resources, which belong to
    /// no document yet.
    pub(crate) fn from_decoded(data: PrimaryData, included: Vec<Box<dyn AnyResource>>) -> Self {
        let mut doc = Self::new();
        doc.data = data;
        for (position, resource) in doc.data.as_mut_slice().iter_mut().enumerate() {
            resource.meta_ref_mut().attach(doc.id);
            if let Some(linkage) = resource.linkage() {
                doc.primary_index.entry(linkage).or_insert(position);
            }
        }
        for mut resource in included {
            resource.meta_ref_mut().attach(doc.id);
            doc.insert_included(resource);
        }
        doc
    }

    fn attach(&self, resource: &mut (dyn AnyResource + 'static)) -> Result<(), DocumentError> {
        match resource.meta_ref().document() {
            Some(owner) if owner != self.id => Err(DocumentError::AlreadyAttached {
                resource_type: resource.type_name().to_owned(),
                id: resource.id().map(str::to_owned),
            }),
            _ => {
                resource.meta_ref_mut().attach(self.id);
                Ok(())
            }
        }
    }

    /// Returns true if `resource` is attached to this document.
    pub fn contains<R: Resource>(&self, resource: &R) -> bool {
        resource.meta().document() == Some(self.id)
    }

    /// Finds the resource `linkage` points at, searching primary data first
    /// and then included resources.
    pub fn find(&self, linkage: &ResourceLinkage) -> Option<&(dyn AnyResource + 'static)> {
        if let Some(&position) = self.primary_index.get(linkage) {
            return self.data.as_slice().get(position).map(|r| &**r);
        }
        self.included_index
            .get(linkage)
            .and_then(|&position| self.included.get(position))
            .map(|r| &**r)
    }

    /// Finds the resource `linkage` points at as a `T`.
    pub fn resolve<T: Resource>(&self, linkage: &ResourceLinkage) -> Option<&T> {
        self.find(linkage).and_then(|r| r.downcast_ref::<T>())
    }

    /// Finds the `T` with the given id.
    pub fn get<T: Resource>(&self, id: &str) -> Option<&T> {
        self.resolve(&ResourceLinkage::new(T::TYPE, id))
    }

    /// Runs `f` on the `T` with the given id.
    ///
    /// Returns `Ok(None)` if there is no such resource. `f` may change
    /// anything except the resource's identity: a changed type or id, or a
    /// cleared document back-reference, is rolled back and reported as
    /// [`DocumentError::IdentityChanged`]. Other changes made by `f` are kept.
    pub fn update<T: Resource, O>(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut T) -> O,
    ) -> Result<Option<O>, DocumentError> {
        let owner = self.id;
        let linkage = ResourceLinkage::new(T::TYPE, id);
        let slot = match self.primary_index.get(&linkage) {
            Some(&position) => self.data.as_mut_slice().get_mut(position),
            None => match self.included_index.get(&linkage) {
                Some(&position) => self.included.get_mut(position),
                None => None,
            },
        };
        match slot.and_then(|r| r.downcast_mut::<T>()) {
            Some(resource) => mutate_owned(owner, resource, f).map(Some),
            None => Ok(None),
        }
    }
}

/// Applies `f` to a resource owned by `owner`, restoring its identity if `f`
/// changed it. The document's indexes stay keyed by that identity.
fn mutate_owned<T: Resource, O>(
    owner: DocumentId,
    resource: &mut T,
    f: impl FnOnce(&mut T) -> O,
) -> Result<O, DocumentError> {
    let resource_type = resource.meta().resource_type().to_owned();
    let id = resource.meta().id().map(str::to_owned);

    let output = f(resource);

    let meta = resource.meta_mut();
    let unchanged = meta.resource_type() == resource_type
        && meta.id() == id.as_deref()
        && meta.document() == Some(owner);
    if unchanged {
        return Ok(output);
    }

    meta.set_resource_type(resource_type);
    meta.set_id(id.clone());
    meta.attach(owner);
    Err(DocumentError::IdentityChanged {
        resource_type: resource.resource_type().to_owned(),
        id,
    })
}
