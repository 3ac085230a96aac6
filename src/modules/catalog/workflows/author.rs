use libris_db::{AggregateFetcher, EntityId, Query, Record};
use libris_http::{FormFields, Outcome};
use serde_json::json;

use super::{guarded_delete, Deletion};
use crate::modules::catalog::display::{AuthorView, BookSummaryView};
use crate::modules::catalog::error::{CatalogError, CatalogResult};
use crate::modules::catalog::models::{Author, Book, CatalogEntity};
use crate::modules::catalog::store::CatalogStore;
use crate::modules::catalog::validation::AuthorInput;

pub async fn list(store: &CatalogStore) -> CatalogResult<Outcome> {
    let authors = store
        .authors
        .find(&Query::all().sort_by("family_name"))
        .await?;
    let author_list: Vec<AuthorView> = authors.iter().map(AuthorView::from).collect();

    Ok(Outcome::render(
        "author_list",
        json!({ "title": "Author List", "author_list": author_list }),
    ))
}

/// The author with the books they wrote.
async fn with_books(
    store: &CatalogStore,
    id: &EntityId,
) -> CatalogResult<(Option<Record<Author>>, Vec<Record<Book>>)> {
    let mut bundle = AggregateFetcher::new()
        .query("author", || store.author(id))
        .query("author_books", || store.books_by_author(id))
        .fetch()
        .await?;
    Ok((bundle.take("author")?, bundle.take("author_books")?))
}

fn summaries(books: &[Record<Book>]) -> Vec<BookSummaryView> {
    books.iter().map(BookSummaryView::from).collect()
}

pub async fn detail(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    let (author, books) = with_books(store, id).await?;
    let author = author.ok_or(CatalogError::NotFound(Author::LABEL))?;

    Ok(Outcome::render(
        "author_detail",
        json!({
            "title": "Author Detail",
            "author": AuthorView::from(&author),
            "author_books": summaries(&books),
        }),
    ))
}

pub fn create_form() -> Outcome {
    Outcome::render("author_form", json!({ "title": "Create Author" }))
}

pub async fn create(store: &CatalogStore, fields: &FormFields) -> CatalogResult<Outcome> {
    let input = AuthorInput::from_form(fields);
    let author = match input.validate() {
        Ok(author) => author,
        Err(errors) => {
            return Ok(Outcome::render(
                "author_form",
                json!({ "title": "Create Author", "author": input.echo(), "errors": errors }),
            ))
        }
    };

    let id = store.authors.insert(author).await?;
    tracing::info!(author_id = %id, "author created");
    Ok(Outcome::redirect(Author::url(&id)))
}

fn delete_view(author: &Record<Author>, books: &[Record<Book>]) -> Outcome {
    Outcome::render(
        "author_delete",
        json!({
            "title": "Delete Author",
            "author": AuthorView::from(author),
            "author_books": summaries(books),
        }),
    )
}

pub async fn delete_form(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    match with_books(store, id).await? {
        (Some(author), books) => Ok(delete_view(&author, &books)),
        (None, _) => Ok(Outcome::redirect(Author::list_url())),
    }
}

pub async fn delete(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    let books = store.clone();
    let deletion =
        guarded_delete(&store.authors, id, move |author| books.books_by_author(author)).await?;

    match deletion {
        Deletion::Blocked { target, dependents } => Ok(delete_view(&target, &dependents)),
        Deletion::Absent | Deletion::Deleted => Ok(Outcome::redirect(Author::list_url())),
    }
}

pub async fn update_form(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    let author = store
        .author(id)
        .await?
        .ok_or(CatalogError::NotFound(Author::LABEL))?;

    Ok(Outcome::render(
        "author_form",
        json!({ "title": "Update Author", "author": AuthorView::from(&author) }),
    ))
}

pub async fn update(
    store: &CatalogStore,
    id: &EntityId,
    fields: &FormFields,
) -> CatalogResult<Outcome> {
    let input = AuthorInput::from_form(fields);
    let author = match input.validate() {
        Ok(author) => author,
        Err(errors) => {
            return Ok(Outcome::render(
                "author_form",
                json!({ "title": "Update Author", "author": input.echo(), "errors": errors }),
            ))
        }
    };

    let updated = store.authors.update_by_id(id, author).await?;
    tracing::info!(author_id = %updated.id, "author updated");
    Ok(Outcome::redirect(Author::url(&updated.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::store::testing::*;
    use serde_json::Value;
    use time::macros::date;

    fn austen_form() -> FormFields {
        FormFields::new()
            .with("first_name", "Jane")
            .with("family_name", "Austen")
            .with("date_of_birth", "1775-12-16")
    }

    #[tokio::test]
    async fn list_is_sorted_by_family_name() {
        let store = memory_store();
        store.authors.insert(author("Walter", "Scott")).await.unwrap();
        store.authors.insert(author("Jane", "Austen")).await.unwrap();

        let outcome = list(&store).await.unwrap();
        let names: Vec<&str> = outcome.view().unwrap().context["author_list"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|author| author["family_name"].as_str())
            .collect();
        assert_eq!(names, vec!["Austen", "Scott"]);
    }

    #[tokio::test]
    async fn create_redirects_to_new_author() {
        let store = memory_store();
        let outcome = create(&store, &austen_form()).await.unwrap();

        let authors = store.authors.find(&Query::all()).await.unwrap();
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].doc.date_of_birth, Some(date!(1775 - 12 - 16)));
        assert_eq!(
            outcome.redirect_target(),
            Some(Author::url(&authors[0].id).as_str())
        );
    }

    #[tokio::test]
    async fn invalid_create_rerenders_with_errors() {
        let store = memory_store();
        let fields = FormFields::new()
            .with("first_name", "Jane!")
            .with("family_name", "Austen");

        let outcome = create(&store, &fields).await.unwrap();
        let view = outcome.view().unwrap();

        assert_eq!(view.name, "author_form");
        assert_eq!(view.context["author"]["first_name"], "Jane!");
        assert_eq!(
            view.context["errors"][0]["message"],
            "First name has non-alphanumeric characters"
        );
        assert_eq!(store.authors.count(&Query::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn detail_of_missing_author_is_not_found() {
        let store = memory_store();
        let result = detail(&store, &EntityId::from("nobody")).await;
        assert!(matches!(result, Err(CatalogError::NotFound("Author"))));
    }

    #[tokio::test]
    async fn detail_lists_books() {
        let store = memory_store();
        let austen = store.authors.insert(author("Jane", "Austen")).await.unwrap();
        store.books.insert(book("Emma", &austen, &[])).await.unwrap();

        let outcome = detail(&store, &austen).await.unwrap();
        let view = outcome.view().unwrap();
        assert_eq!(view.context["author"]["name"], "Austen, Jane");
        assert_eq!(view.context["author_books"][0]["title"], "Emma");
    }

    #[tokio::test]
    async fn author_without_books_is_deleted() {
        let store = memory_store();
        let austen = store.authors.insert(author("Jane", "Austen")).await.unwrap();

        let confirm = delete_form(&store, &austen).await.unwrap();
        let view = confirm.view().unwrap();
        assert_eq!(view.name, "author_delete");
        assert_eq!(view.context["author_books"], Value::Array(Vec::new()));

        let submitted = delete(&store, &austen).await.unwrap();
        assert_eq!(submitted.redirect_target(), Some("/catalog/authors"));
        assert!(store.authors.find_by_id(&austen).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn author_with_books_is_kept() {
        let store = memory_store();
        let austen = store.authors.insert(author("Jane", "Austen")).await.unwrap();
        store.books.insert(book("Emma", &austen, &[])).await.unwrap();

        let confirm = delete_form(&store, &austen).await.unwrap();
        assert_eq!(
            confirm.view().unwrap().context["author_books"][0]["title"],
            "Emma"
        );

        let submitted = delete(&store, &austen).await.unwrap();
        let view = submitted.view().unwrap();
        assert_eq!(view.name, "author_delete");
        assert_eq!(view.context["author_books"][0]["title"], "Emma");
        assert!(store.authors.find_by_id(&austen).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_a_missing_author_redirects_every_time() {
        let store = memory_store();
        let gone = EntityId::from("gone");

        for _ in 0..2 {
            let confirm = delete_form(&store, &gone).await.unwrap();
            assert_eq!(confirm.redirect_target(), Some("/catalog/authors"));
            let submitted = delete(&store, &gone).await.unwrap();
            assert_eq!(submitted.redirect_target(), Some("/catalog/authors"));
        }
    }

    #[tokio::test]
    async fn update_replaces_every_field_in_place() {
        let store = memory_store();
        let id = store
            .authors
            .insert(Author {
                date_of_death: Some(date!(1817 - 07 - 18)),
                ..author("Jane", "Austen")
            })
            .await
            .unwrap();

        let fields = FormFields::new()
            .with("first_name", "Mary")
            .with("family_name", "Shelley")
            .with("date_of_birth", "1797-08-30");
        let outcome = update(&store, &id, &fields).await.unwrap();
        assert_eq!(outcome.redirect_target(), Some(Author::url(&id).as_str()));

        let stored = store.authors.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(
            stored.doc,
            Author {
                first_name: "Mary".to_string(),
                family_name: "Shelley".to_string(),
                date_of_birth: Some(date!(1797 - 08 - 30)),
                date_of_death: None,
            }
        );
    }

    #[tokio::test]
    async fn update_of_missing_author_is_not_found() {
        let store = memory_store();
        let result = update(&store, &EntityId::from("nobody"), &austen_form()).await;
        assert!(result.unwrap_err().is_not_found());

        let form = update_form(&store, &EntityId::from("nobody")).await;
        assert!(matches!(form, Err(CatalogError::NotFound(_))));
    }
}
