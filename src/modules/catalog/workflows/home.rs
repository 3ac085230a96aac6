use libris_db::{AggregateFetcher, Bundle, StoreError};
use libris_http::Outcome;
use serde_json::{json, Value};

use crate::modules::catalog::error::{CatalogError, CatalogResult};
use crate::modules::catalog::models::BookStatus;
use crate::modules::catalog::store::CatalogStore;

const COUNTS: [&str; 5] = [
    "book_count",
    "book_instance_count",
    "book_instance_available_count",
    "author_count",
    "genre_count",
];

/// Catalog landing page with per-collection counts.
///
/// A failed count is shown on the page rather than failing the request.
pub async fn index(store: &CatalogStore) -> Outcome {
    let fetched = AggregateFetcher::<StoreError>::new()
        .query(COUNTS[0], || store.count_books())
        .query(COUNTS[1], || store.count_instances(None))
        .query(COUNTS[2], || store.count_instances(Some(BookStatus::Available)))
        .query(COUNTS[3], || store.count_authors())
        .query(COUNTS[4], || store.count_genres())
        .fetch()
        .await
        .map_err(CatalogError::from)
        .and_then(counts);

    let (error, data) = match fetched {
        Ok(data) => (Value::Null, data),
        Err(err) => {
            let message = format!("{:#}", anyhow::Error::new(err));
            tracing::error!(error = %message, "catalog counts unavailable");
            (Value::String(message), Value::Null)
        }
    };

    Outcome::render(
        "index",
        json!({ "title": "Local Library Home", "error": error, "data": data }),
    )
}

fn counts(mut bundle: Bundle) -> CatalogResult<Value> {
    let mut data = serde_json::Map::new();
    for name in COUNTS {
        data.insert(name.to_string(), json!(bundle.take::<u64>(name)?));
    }
    Ok(Value::Object(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::store::testing::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn counts_every_collection() {
        let store = memory_store();
        let austen = store.authors.insert(author("Jane", "Austen")).await.unwrap();
        let emma = store.books.insert(book("Emma", &austen, &[])).await.unwrap();
        store
            .instances
            .insert(copy(&emma, BookStatus::Available))
            .await
            .unwrap();
        store
            .instances
            .insert(copy(&emma, BookStatus::Loaned))
            .await
            .unwrap();

        let outcome = index(&store).await;
        let view = outcome.view().unwrap();

        assert_eq!(view.name, "index");
        assert_eq!(view.title(), Some("Local Library Home"));
        assert_eq!(view.get("error"), Some(&Value::Null));
        assert_eq!(
            view.get("data"),
            Some(&json!({
                "book_count": 1,
                "book_instance_count": 2,
                "book_instance_available_count": 1,
                "author_count": 1,
                "genre_count": 0,
            }))
        );
    }

    #[tokio::test]
    async fn failed_count_renders_error_without_data() {
        let store = CatalogStore {
            genres: Arc::new(OfflineCollection),
            ..memory_store()
        };

        let outcome = index(&store).await;
        let view = outcome.view().unwrap();

        assert_eq!(view.get("data"), Some(&Value::Null));
        let error = view.get("error").and_then(Value::as_str).unwrap();
        assert!(error.contains("genre_count"), "{error}");
        assert!(error.contains("connection refused"), "{error}");
    }
}
