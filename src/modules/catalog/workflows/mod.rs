//! Request workflows for the catalog, one module per entity.
//!
//! Each workflow returns an [`Outcome`](libris_http::Outcome) or a
//! [`CatalogError`](super::error::CatalogError); they know nothing about
//! HTTP beyond that.

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod home;

use std::future::Future;
use std::sync::Arc;

use libris_db::{
    can_delete, AggregateFetcher, Collection, Document, EntityId, Record, StoreResult, Verdict,
};

use super::error::CatalogResult;

const TARGET: &str = "target";
const VERDICT: &str = "verdict";

/// Result of a guarded delete submission.
#[derive(Debug)]
pub(crate) enum Deletion<T, D> {
    /// The target was already gone.
    Absent,
    /// Dependents still reference the target; nothing was removed.
    Blocked {
        target: Record<T>,
        dependents: Vec<D>,
    },
    Deleted,
}

/// Look up `id` and its dependents together, then delete it if nothing
/// references it.
pub(crate) async fn guarded_delete<T, D, F, Fut>(
    collection: &Arc<dyn Collection<T>>,
    id: &EntityId,
    dependents_query: F,
) -> CatalogResult<Deletion<T, D>>
where
    T: Document,
    D: Send + 'static,
    F: FnOnce(&EntityId) -> Fut + Send + 'static,
    Fut: Future<Output = StoreResult<Vec<D>>> + Send + 'static,
{
    let lookup = {
        let collection = Arc::clone(collection);
        let id = id.clone();
        async move { collection.find_by_id(&id).await }
    };
    let guard = {
        let id = id.clone();
        async move { can_delete(&id, dependents_query).await }
    };

    let mut bundle = AggregateFetcher::new()
        .query(TARGET, || lookup)
        .query(VERDICT, || guard)
        .fetch()
        .await?;
    let target: Option<Record<T>> = bundle.take(TARGET)?;
    let verdict: Verdict<D> = bundle.take(VERDICT)?;

    let Some(target) = target else {
        tracing::debug!(collection = T::COLLECTION, id = %id, "delete target already gone");
        return Ok(Deletion::Absent);
    };

    if verdict.is_blocked() {
        tracing::debug!(
            collection = T::COLLECTION,
            id = %id,
            dependents = verdict.dependents.len(),
            "delete blocked by dependents"
        );
        return Ok(Deletion::Blocked {
            target,
            dependents: verdict.dependents,
        });
    }

    collection.delete_by_id(id).await?;
    tracing::info!(collection = T::COLLECTION, id = %id, "document deleted");
    Ok(Deletion::Deleted)
}
