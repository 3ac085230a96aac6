//! Document store contract and query helpers for Libris.

use std::sync::Arc;

use libris_kernel::settings::{DatabaseSettings, StoreBackend};

pub mod aggregate;
pub mod guard;
pub mod memory;
pub mod store;

pub use aggregate::{AggregateError, AggregateFetcher, Bundle, BundleError};
pub use guard::{can_delete, Verdict};
pub use memory::MemoryCollection;
pub use store::{Collection, Document, EntityId, Query, Record, StoreError, StoreResult};

/// Open the collection for `T` on the configured backend.
pub fn open_collection<T: Document>(settings: &DatabaseSettings) -> Arc<dyn Collection<T>> {
    match settings.backend {
        StoreBackend::Memory => {
            tracing::debug!(
                target: "libris-db",
                collection = T::COLLECTION,
                "opening in-memory collection"
            );
            Arc::new(MemoryCollection::<T>::new())
        }
    }
}
