use libris_db::{AggregateFetcher, EntityId, Query, Record};
use libris_http::{FormFields, Outcome};
use serde_json::json;

use super::{guarded_delete, Deletion};
use crate::modules::catalog::display::{BookSummaryView, GenreView};
use crate::modules::catalog::error::{CatalogError, CatalogResult};
use crate::modules::catalog::models::{Book, CatalogEntity, Genre};
use crate::modules::catalog::store::CatalogStore;
use crate::modules::catalog::validation::GenreInput;

pub async fn list(store: &CatalogStore) -> CatalogResult<Outcome> {
    let genres = store.genres.find(&Query::all().sort_by("name")).await?;
    let genre_list: Vec<GenreView> = genres.iter().map(GenreView::from).collect();

    Ok(Outcome::render(
        "genre_list",
        json!({ "title": "Genre List", "genre_list": genre_list }),
    ))
}

async fn with_books(
    store: &CatalogStore,
    id: &EntityId,
) -> CatalogResult<(Option<Record<Genre>>, Vec<Record<Book>>)> {
    let mut bundle = AggregateFetcher::new()
        .query("genre", || store.genre(id))
        .query("genre_books", || store.books_in_genre(id))
        .fetch()
        .await?;
    Ok((bundle.take("genre")?, bundle.take("genre_books")?))
}

fn summaries(books: &[Record<Book>]) -> Vec<BookSummaryView> {
    books.iter().map(BookSummaryView::from).collect()
}

pub async fn detail(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    let (genre, books) = with_books(store, id).await?;
    let genre = genre.ok_or(CatalogError::NotFound(Genre::LABEL))?;

    Ok(Outcome::render(
        "genre_detail",
        json!({
            "title": "Genre Detail",
            "genre": GenreView::from(&genre),
            "genre_books": summaries(&books),
        }),
    ))
}

pub fn create_form() -> Outcome {
    Outcome::render("genre_form", json!({ "title": "Create Genre" }))
}

/// Create a genre unless one with the same name already exists, in which
/// case redirect to that one.
pub async fn create(store: &CatalogStore, fields: &FormFields) -> CatalogResult<Outcome> {
    let input = GenreInput::from_form(fields);
    let genre = match input.validate() {
        Ok(genre) => genre,
        Err(errors) => {
            return Ok(Outcome::render(
                "genre_form",
                json!({ "title": "Create Genre", "genre": input.echo(), "errors": errors }),
            ))
        }
    };

    let same_name = Query::all().eq("name", genre.name.as_str());
    if let Some(existing) = store.genres.find(&same_name).await?.into_iter().next() {
        tracing::debug!(genre_id = %existing.id, name = %genre.name, "genre already exists");
        return Ok(Outcome::redirect(Genre::url(&existing.id)));
    }

    let id = store.genres.insert(genre).await?;
    tracing::info!(genre_id = %id, "genre created");
    Ok(Outcome::redirect(Genre::url(&id)))
}

fn delete_view(genre: &Record<Genre>, books: &[Record<Book>]) -> Outcome {
    Outcome::render(
        "genre_delete",
        json!({
            "title": "Delete Genre",
            "genre": GenreView::from(genre),
            "genre_books": summaries(books),
        }),
    )
}

pub async fn delete_form(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    match with_books(store, id).await? {
        (Some(genre), books) => Ok(delete_view(&genre, &books)),
        (None, _) => Ok(Outcome::redirect(Genre::list_url())),
    }
}

pub async fn delete(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    let books = store.clone();
    let deletion =
        guarded_delete(&store.genres, id, move |genre| books.books_in_genre(genre)).await?;

    match deletion {
        Deletion::Blocked { target, dependents } => Ok(delete_view(&target, &dependents)),
        Deletion::Absent | Deletion::Deleted => Ok(Outcome::redirect(Genre::list_url())),
    }
}

pub async fn update_form(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    let genre = store
        .genre(id)
        .await?
        .ok_or(CatalogError::NotFound(Genre::LABEL))?;

    Ok(Outcome::render(
        "genre_form",
        json!({ "title": "Update Genre", "genre": GenreView::from(&genre) }),
    ))
}

pub async fn update(
    store: &CatalogStore,
    id: &EntityId,
    fields: &FormFields,
) -> CatalogResult<Outcome> {
    let input = GenreInput::from_form(fields);
    let genre = match input.validate() {
        Ok(genre) => genre,
        Err(errors) => {
            return Ok(Outcome::render(
                "genre_form",
                json!({ "title": "Update Genre", "genre": input.echo(), "errors": errors }),
            ))
        }
    };

    let updated = store.genres.update_by_id(id, genre).await?;
    tracing::info!(genre_id = %updated.id, "genre updated");
    Ok(Outcome::redirect(Genre::url(&updated.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::store::testing::*;
    use std::sync::Arc;

    fn named(name: &str) -> FormFields {
        FormFields::new().with("name", name)
    }

    #[tokio::test]
    async fn duplicate_name_redirects_to_existing_genre() {
        let store = memory_store();
        let first = create(&store, &named("Fantasy")).await.unwrap();
        let second = create(&store, &named("  Fantasy ")).await.unwrap();

        let genres = store.genres.find(&Query::all()).await.unwrap();
        assert_eq!(genres.len(), 1);
        let url = Genre::url(&genres[0].id);
        assert_eq!(first.redirect_target(), Some(url.as_str()));
        assert_eq!(second.redirect_target(), Some(url.as_str()));
    }

    #[tokio::test]
    async fn blank_name_rerenders_form() {
        let store = memory_store();
        let outcome = create(&store, &named("")).await.unwrap();
        let view = outcome.view().unwrap();

        assert_eq!(view.name, "genre_form");
        assert_eq!(view.context["errors"][0]["message"], "Genre name required");
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let store = memory_store();
        for name in ["Satire", "Romance", "Gothic"] {
            store
                .genres
                .insert(Genre {
                    name: name.to_string(),
                })
                .await
                .unwrap();
        }

        let outcome = list(&store).await.unwrap();
        let names: Vec<&str> = outcome.view().unwrap().context["genre_list"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|genre| genre["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Gothic", "Romance", "Satire"]);
    }

    #[tokio::test]
    async fn genre_tagged_on_a_book_is_kept() {
        let store = memory_store();
        let austen = store.authors.insert(author("Jane", "Austen")).await.unwrap();
        let romance = store
            .genres
            .insert(Genre {
                name: "Romance".to_string(),
            })
            .await
            .unwrap();
        store
            .books
            .insert(book("Emma", &austen, &[&romance]))
            .await
            .unwrap();

        let submitted = delete(&store, &romance).await.unwrap();
        let view = submitted.view().unwrap();
        assert_eq!(view.name, "genre_delete");
        assert_eq!(view.context["genre_books"][0]["title"], "Emma");
        assert!(store.genres.find_by_id(&romance).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unused_genre_is_deleted() {
        let store = memory_store();
        let romance = store
            .genres
            .insert(Genre {
                name: "Romance".to_string(),
            })
            .await
            .unwrap();

        let submitted = delete(&store, &romance).await.unwrap();
        assert_eq!(submitted.redirect_target(), Some("/catalog/genres"));
        assert_eq!(store.genres.count(&Query::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_replaces_name_in_place() {
        let store = memory_store();
        let id = store
            .genres
            .insert(Genre {
                name: "Gothc".to_string(),
            })
            .await
            .unwrap();

        let form = update_form(&store, &id).await.unwrap();
        let view = form.view().unwrap();
        assert_eq!(view.title(), Some("Update Genre"));
        assert_eq!(view.context["genre"]["name"], "Gothc");

        let outcome = update(&store, &id, &named(" Gothic ")).await.unwrap();
        assert_eq!(outcome.redirect_target(), Some(Genre::url(&id).as_str()));

        let stored = store.genres.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.doc.name, "Gothic");
        assert_eq!(store.genres.count(&Query::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn rejected_update_leaves_genre_untouched() {
        let store = memory_store();
        let id = store
            .genres
            .insert(Genre {
                name: "Gothic".to_string(),
            })
            .await
            .unwrap();

        let outcome = update(&store, &id, &named("")).await.unwrap();
        let view = outcome.view().unwrap();
        assert_eq!(view.name, "genre_form");
        assert_eq!(view.title(), Some("Update Genre"));
        assert_eq!(view.context["errors"][0]["message"], "Genre name required");

        let stored = store.genres.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.doc.name, "Gothic");
    }

    #[tokio::test]
    async fn missing_genre_is_not_found_on_update() {
        let store = memory_store();
        let gone = EntityId::from("gone");

        let form = update_form(&store, &gone).await;
        assert!(matches!(form, Err(CatalogError::NotFound("Genre"))));

        let submitted = update(&store, &gone, &named("Gothic")).await;
        assert!(submitted.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn delete_form_lists_books_or_redirects_when_gone() {
        let store = memory_store();
        let austen = store.authors.insert(author("Jane", "Austen")).await.unwrap();
        let romance = store
            .genres
            .insert(Genre {
                name: "Romance".to_string(),
            })
            .await
            .unwrap();
        store
            .books
            .insert(book("Emma", &austen, &[&romance]))
            .await
            .unwrap();

        let confirm = delete_form(&store, &romance).await.unwrap();
        let view = confirm.view().unwrap();
        assert_eq!(view.name, "genre_delete");
        assert_eq!(view.context["genre"]["name"], "Romance");
        assert_eq!(view.context["genre_books"][0]["title"], "Emma");

        let gone = delete_form(&store, &EntityId::from("gone")).await.unwrap();
        assert_eq!(gone.redirect_target(), Some("/catalog/genres"));
    }

    #[tokio::test]
    async fn store_failure_on_detail_is_forwarded() {
        let store = CatalogStore {
            books: Arc::new(OfflineCollection),
            ..memory_store()
        };
        let romance = store
            .genres
            .insert(Genre {
                name: "Romance".to_string(),
            })
            .await
            .unwrap();

        let result = detail(&store, &romance).await;
        let err = result.unwrap_err();
        assert!(matches!(err, CatalogError::Aggregate(_)));
        assert!(!err.is_not_found());
    }
}
