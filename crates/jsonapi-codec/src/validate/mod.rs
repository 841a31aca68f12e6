//! Compound document validation.
//!
//! Decoding accepts any well-shaped document. These checks apply the
//! JSON:API rules for compound documents on top of that:
//! - a resource appears at most once across primary data and included;
//! - every relationship linkage points at a resource in the document
//!   (full linkage).

use rustc_hash::FxHashSet;

use crate::error::ValidationError;
use crate::model::{AnyResource, Document};

/// Validates a compound document.
///
/// Returns the first violation found, checking primary data before
/// included resources.
pub fn validate_document(doc: &Document) -> Result<(), ValidationError> {
    let primary: FxHashSet<_> = doc.data_iter().filter_map(|r| r.linkage()).collect();
    for resource in doc.included() {
        if let Some(linkage) = resource.linkage() {
            if primary.contains(&linkage) {
                return Err(ValidationError::DuplicateResource(linkage));
            }
        }
    }

    for resource in doc.data_iter().chain(doc.included()) {
        validate_linkages(doc, resource)?;
    }

    Ok(())
}

fn validate_linkages(
    doc: &Document,
    resource: &(dyn AnyResource + 'static),
) -> Result<(), ValidationError> {
    for (relationship, target) in resource.linkages()? {
        if doc.find(&target).is_none() {
            let owner = match resource.id() {
                Some(id) => format!("{}/{}", resource.type_name(), id),
                None => format!("{} without id", resource.type_name()),
            };
            return Err(ValidationError::UnresolvedLinkage {
                owner,
                relationship,
                target,
            });
        }
    }
    Ok(())
}
