//! Entity Store contract shared by every backend.

use std::fmt;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opaque document identifier assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Mint a fresh, time-ordered id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A document type persisted in its own collection.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name, used in logs and errors.
    const COLLECTION: &'static str;
}

/// A stored document together with its id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<T> {
    pub id: EntityId,
    #[serde(flatten)]
    pub doc: T,
}

impl<T> Record<T> {
    pub fn new(id: EntityId, doc: T) -> Self {
        Self { id, doc }
    }
}

/// Equality filters plus an optional ascending sort key.
///
/// A filter on an array field matches when the array contains the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<(String, String)>,
    sort: Option<String>,
}

impl Query {
    /// Match every document in the collection.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort = Some(field.into());
        self
    }

    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    pub fn sort_field(&self) -> Option<&str> {
        self.sort.as_deref()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} document '{id}' does not exist")]
    Missing {
        collection: &'static str,
        id: EntityId,
    },

    #[error("failed to encode {collection} document")]
    Encode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{collection} store unavailable: {message}")]
    Unavailable {
        collection: &'static str,
        message: String,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-collection operations offered by a document store.
#[async_trait]
pub trait Collection<T: Document>: Send + Sync {
    async fn find_by_id(&self, id: &EntityId) -> StoreResult<Option<Record<T>>>;

    /// Documents matching `query`, in insertion order unless a sort key is set.
    async fn find(&self, query: &Query) -> StoreResult<Vec<Record<T>>>;

    async fn count(&self, query: &Query) -> StoreResult<u64>;

    async fn insert(&self, doc: T) -> StoreResult<EntityId>;

    /// Replace every field of the document stored under `id`.
    async fn update_by_id(&self, id: &EntityId, doc: T) -> StoreResult<Record<T>>;

    /// Remove the document; `Ok(false)` when nothing was stored under `id`.
    async fn delete_by_id(&self, id: &EntityId) -> StoreResult<bool>;
}
