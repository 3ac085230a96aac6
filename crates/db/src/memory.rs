//! In-process document backend.
//!
//! Documents are kept in insertion order; filters and sorting are evaluated
//! against each document's JSON encoding, the same shape a remote document
//! database would see.

use std::cmp::Ordering;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;

use crate::store::{Collection, Document, EntityId, Query, Record, StoreError, StoreResult};

pub struct MemoryCollection<T> {
    docs: RwLock<IndexMap<EntityId, T>>,
}

impl<T: Document> MemoryCollection<T> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(IndexMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    fn encode(doc: &T) -> StoreResult<Value> {
        serde_json::to_value(doc).map_err(|source| StoreError::Encode {
            collection: T::COLLECTION,
            source,
        })
    }

    /// Matching records paired with their encodings, in insertion order.
    fn select(&self, query: &Query) -> StoreResult<Vec<(Record<T>, Value)>> {
        let docs = self.docs.read();
        let mut selected = Vec::new();

        for (id, doc) in docs.iter() {
            let encoded = Self::encode(doc)?;
            let matched = query
                .filters()
                .iter()
                .all(|(field, expected)| field_matches(&encoded, field, expected));

            if matched {
                selected.push((Record::new(id.clone(), doc.clone()), encoded));
            }
        }

        Ok(selected)
    }
}

impl<T: Document> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn field_matches(doc: &Value, field: &str, expected: &str) -> bool {
    match doc.get(field) {
        Some(Value::String(value)) => value == expected,
        Some(Value::Array(items)) => items.iter().any(|item| item.as_str() == Some(expected)),
        Some(Value::Number(number)) => number.to_string() == expected,
        Some(Value::Bool(flag)) => flag.to_string() == expected,
        _ => false,
    }
}

/// Absent and null keys sort first.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

#[async_trait]
impl<T: Document> Collection<T> for MemoryCollection<T> {
    async fn find_by_id(&self, id: &EntityId) -> StoreResult<Option<Record<T>>> {
        let docs = self.docs.read();
        Ok(docs
            .get(id)
            .map(|doc| Record::new(id.clone(), doc.clone())))
    }

    async fn find(&self, query: &Query) -> StoreResult<Vec<Record<T>>> {
        let mut selected = self.select(query)?;

        if let Some(field) = query.sort_field() {
            // Stable, so ties keep insertion order.
            selected.sort_by(|(_, a), (_, b)| compare_fields(a.get(field), b.get(field)));
        }

        Ok(selected.into_iter().map(|(record, _)| record).collect())
    }

    async fn count(&self, query: &Query) -> StoreResult<u64> {
        if query.filters().is_empty() {
            return Ok(self.docs.read().len() as u64);
        }
        Ok(self.select(query)?.len() as u64)
    }

    async fn insert(&self, doc: T) -> StoreResult<EntityId> {
        let id = EntityId::generate();
        self.docs.write().insert(id.clone(), doc);
        tracing::trace!(collection = T::COLLECTION, %id, "document inserted");
        Ok(id)
    }

    async fn update_by_id(&self, id: &EntityId, doc: T) -> StoreResult<Record<T>> {
        let mut docs = self.docs.write();
        match docs.get_mut(id) {
            Some(slot) => {
                *slot = doc.clone();
                Ok(Record::new(id.clone(), doc))
            }
            None => Err(StoreError::Missing {
                collection: T::COLLECTION,
                id: id.clone(),
            }),
        }
    }

    async fn delete_by_id(&self, id: &EntityId) -> StoreResult<bool> {
        Ok(self.docs.write().shift_remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Volume {
        title: String,
        shelf: Option<String>,
        tags: Vec<String>,
        copies: u32,
    }

    impl Document for Volume {
        const COLLECTION: &'static str = "volumes";
    }

    fn volume(title: &str, shelf: Option<&str>, tags: &[&str]) -> Volume {
        Volume {
            title: title.to_string(),
            shelf: shelf.map(str::to_string),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            copies: 1,
        }
    }

    fn titles(records: &[Record<Volume>]) -> Vec<&str> {
        records.iter().map(|r| r.doc.title.as_str()).collect()
    }

    #[tokio::test]
    async fn find_keeps_insertion_order_without_sort() {
        let store = MemoryCollection::new();
        for title in ["Persuasion", "Emma", "Mansfield Park"] {
            store.insert(volume(title, None, &[])).await.unwrap();
        }

        let all = store.find(&Query::all()).await.unwrap();
        assert_eq!(titles(&all), vec!["Persuasion", "Emma", "Mansfield Park"]);
    }

    #[tokio::test]
    async fn sort_is_stable_and_puts_missing_keys_first() {
        let store = MemoryCollection::new();
        store.insert(volume("b", Some("B"), &[])).await.unwrap();
        store.insert(volume("a1", Some("A"), &[])).await.unwrap();
        store.insert(volume("none", None, &[])).await.unwrap();
        store.insert(volume("a2", Some("A"), &[])).await.unwrap();

        let sorted = store.find(&Query::all().sort_by("shelf")).await.unwrap();
        assert_eq!(titles(&sorted), vec!["none", "a1", "a2", "b"]);
    }

    #[tokio::test]
    async fn eq_filter_matches_scalars_and_array_membership() {
        let store = MemoryCollection::new();
        store
            .insert(volume("Emma", Some("A"), &["g1", "g2"]))
            .await
            .unwrap();
        store
            .insert(volume("Ivanhoe", Some("B"), &["g2"]))
            .await
            .unwrap();

        let on_a = store.find(&Query::all().eq("shelf", "A")).await.unwrap();
        assert_eq!(titles(&on_a), vec!["Emma"]);

        let tagged = store.find(&Query::all().eq("tags", "g2")).await.unwrap();
        assert_eq!(titles(&tagged), vec!["Emma", "Ivanhoe"]);

        let numeric = store.count(&Query::all().eq("copies", "1")).await.unwrap();
        assert_eq!(numeric, 2);

        let none = store.count(&Query::all().eq("tags", "g3")).await.unwrap();
        assert_eq!(none, 0);
    }

    #[tokio::test]
    async fn update_replaces_document_in_place() {
        let store = MemoryCollection::new();
        let first = store.insert(volume("Emma", None, &[])).await.unwrap();
        store.insert(volume("Ivanhoe", None, &[])).await.unwrap();

        let updated = store
            .update_by_id(&first, volume("Emma (annotated)", Some("C"), &[]))
            .await
            .unwrap();
        assert_eq!(updated.id, first);

        let all = store.find(&Query::all()).await.unwrap();
        assert_eq!(titles(&all), vec!["Emma (annotated)", "Ivanhoe"]);
        assert_eq!(all[0].doc.shelf.as_deref(), Some("C"));
    }

    #[tokio::test]
    async fn update_of_absent_id_reports_missing() {
        let store: MemoryCollection<Volume> = MemoryCollection::new();
        let err = store
            .update_by_id(&EntityId::from("nope"), volume("x", None, &[]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Missing {
                collection: "volumes",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryCollection::new();
        let id = store.insert(volume("Emma", None, &[])).await.unwrap();

        assert!(store.delete_by_id(&id).await.unwrap());
        assert!(!store.delete_by_id(&id).await.unwrap());
        assert!(store.find_by_id(&id).await.unwrap().is_none());
        assert!(store.is_empty());
    }
}
