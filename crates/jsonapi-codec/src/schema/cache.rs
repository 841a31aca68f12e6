//! Process-wide schema cache.
//!
//! Each resource type's schema is derived on first use and kept for the
//! lifetime of the process. Derivation is deterministic, so two threads
//! racing on the same type both build a schema; only the first one to take
//! the write lock is published and every caller receives that instance.
//! Failed derivations are not cached.

use std::any::{Any, TypeId};
use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::SchemaError;
use crate::model::Resource;
use crate::schema::{Schema, SchemaBuilder};

type CachedSchema = Arc<dyn Any + Send + Sync>;

lazy_static! {
    static ref SCHEMAS: RwLock<FxHashMap<TypeId, CachedSchema>> = RwLock::new(FxHashMap::default());
}

fn cached<R: Resource>() -> Option<Arc<Schema<R>>> {
    let schemas = SCHEMAS.read().unwrap_or_else(PoisonError::into_inner);
    let entry = schemas.get(&TypeId::of::<R>())?;
    Arc::clone(entry).downcast::<Schema<R>>().ok()
}

/// Returns the schema of `R`, deriving and caching it on first use.
pub fn schema_of<R: Resource>() -> Result<Arc<Schema<R>>, SchemaError> {
    if let Some(schema) = cached::<R>() {
        return Ok(schema);
    }

    let mut builder = SchemaBuilder::new();
    R::describe(&mut builder);
    let built = Arc::new(builder.build()?);
    debug!(
        resource = R::TYPE,
        attributes = built.attributes().len(),
        relationships = built.relationships().len(),
        "derived resource schema"
    );

    let mut schemas = SCHEMAS.write().unwrap_or_else(PoisonError::into_inner);
    let published = schemas
        .entry(TypeId::of::<R>())
        .or_insert_with(|| Arc::clone(&built) as CachedSchema);
    Ok(Arc::clone(published).downcast::<Schema<R>>().unwrap_or(built))
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::model::{ResourceMeta, ToOne};
    use crate::testing::{Comment, Person};

    #[test]
    fn test_schema_is_cached() {
        let first = schema_of::<Person>().unwrap();
        let second = schema_of::<Person>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_concurrent_derivation_publishes_once() {
        let schemas: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| schema_of::<Comment>().unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for schema in &schemas[1..] {
            assert!(Arc::ptr_eq(&schemas[0], schema));
        }
        assert!(Arc::ptr_eq(&schemas[0], &schema_of::<Comment>().unwrap()));
    }

    #[derive(Debug, Default)]
    struct Broken {
        meta: ResourceMeta,
        a: Option<ToOne<Person>>,
        b: Option<ToOne<Person>>,
    }

    impl Resource for Broken {
        const TYPE: &'static str = "broken";

        fn meta(&self) -> &ResourceMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut ResourceMeta {
            &mut self.meta
        }

        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema
                .to_one("link", |r| &r.a, |r| &mut r.a)
                .to_one("link", |r| &r.b, |r| &mut r.b);
        }
    }

    #[test]
    fn test_errors_are_reported_every_time() {
        assert!(schema_of::<Broken>().is_err());
        assert!(schema_of::<Broken>().is_err());
        assert!(cached::<Broken>().is_none());
    }
}
