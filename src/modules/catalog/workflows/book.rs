use libris_db::{AggregateFetcher, EntityId, Record};
use libris_http::{FormFields, Outcome};
use serde_json::{json, Value};

use super::{guarded_delete, Deletion};
use crate::modules::catalog::display::{
    genre_options, AuthorView, BookFormView, BookInstanceView, BookSummaryView, BookView,
};
use crate::modules::catalog::error::{CatalogError, CatalogResult};
use crate::modules::catalog::models::{Author, Book, BookInstance, CatalogEntity, Genre};
use crate::modules::catalog::store::{CatalogStore, PopulatedBook};
use crate::modules::catalog::validation::{BookInput, FieldError};

pub async fn list(store: &CatalogStore) -> CatalogResult<Outcome> {
    let books = store.all_books().await?;
    let populated = store.populate_books(books).await?;
    let book_list: Vec<BookView> = populated.iter().map(BookView::from).collect();

    Ok(Outcome::render(
        "book_list",
        json!({ "title": "Book List", "book_list": book_list }),
    ))
}

fn copies(instances: &[Record<BookInstance>]) -> Vec<BookInstanceView> {
    instances.iter().map(BookInstanceView::from).collect()
}

pub async fn detail(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    let mut bundle = AggregateFetcher::new()
        .query("book", || store.populated_book(id))
        .query("book_instances", || store.instances_of_book(id))
        .fetch()
        .await?;
    let book: Option<PopulatedBook> = bundle.take("book")?;
    let instances: Vec<Record<BookInstance>> = bundle.take("book_instances")?;
    let book = book.ok_or(CatalogError::NotFound(Book::LABEL))?;

    Ok(Outcome::render(
        "book_detail",
        json!({
            "title": book.title,
            "book": BookView::from(&book),
            "book_instances": copies(&instances),
        }),
    ))
}

/// Authors and genres offered as choices on the form.
async fn choices(store: &CatalogStore) -> CatalogResult<(Vec<Record<Author>>, Vec<Record<Genre>>)> {
    let mut bundle = AggregateFetcher::new()
        .query("authors", || store.all_authors())
        .query("genres", || store.all_genres())
        .fetch()
        .await?;
    Ok((bundle.take("authors")?, bundle.take("genres")?))
}

fn form_view<S: AsRef<str>>(
    title: &'static str,
    authors: &[Record<Author>],
    genres: &[Record<Genre>],
    selected: &[S],
    book: Option<Value>,
    errors: Option<Vec<FieldError>>,
) -> Outcome {
    let authors: Vec<AuthorView> = authors.iter().map(AuthorView::from).collect();
    let mut context = json!({
        "title": title,
        "authors": authors,
        "genres": genre_options(genres, selected),
    });
    if let Some(book) = book {
        context["book"] = book;
    }
    if let Some(errors) = errors {
        context["errors"] = json!(errors);
    }
    Outcome::render("book_form", context)
}

pub async fn create_form(store: &CatalogStore) -> CatalogResult<Outcome> {
    let (authors, genres) = choices(store).await?;
    Ok(form_view::<&str>("Create Book", &authors, &genres, &[], None, None))
}

pub async fn create(store: &CatalogStore, fields: &FormFields) -> CatalogResult<Outcome> {
    let input = BookInput::from_form(fields);
    let book = match input.validate() {
        Ok(book) => book,
        Err(errors) => {
            let (authors, genres) = choices(store).await?;
            return Ok(form_view(
                "Create Book",
                &authors,
                &genres,
                &input.genre_ids(),
                Some(input.echo()),
                Some(errors),
            ));
        }
    };

    let id = store.books.insert(book).await?;
    tracing::info!(book_id = %id, "book created");
    Ok(Outcome::redirect(Book::url(&id)))
}

fn delete_view(book: &Record<Book>, instances: &[Record<BookInstance>]) -> Outcome {
    Outcome::render(
        "book_delete",
        json!({
            "title": "Delete Book",
            "book": BookSummaryView::from(book),
            "book_instances": copies(instances),
        }),
    )
}

pub async fn delete_form(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    let mut bundle = AggregateFetcher::new()
        .query("book", || store.book(id))
        .query("book_instances", || store.instances_of_book(id))
        .fetch()
        .await?;
    let book: Option<Record<Book>> = bundle.take("book")?;
    let instances: Vec<Record<BookInstance>> = bundle.take("book_instances")?;

    match book {
        Some(book) => Ok(delete_view(&book, &instances)),
        None => Ok(Outcome::redirect(Book::list_url())),
    }
}

pub async fn delete(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    let instances = store.clone();
    let deletion =
        guarded_delete(&store.books, id, move |book| instances.instances_of_book(book)).await?;

    match deletion {
        Deletion::Blocked { target, dependents } => Ok(delete_view(&target, &dependents)),
        Deletion::Absent | Deletion::Deleted => Ok(Outcome::redirect(Book::list_url())),
    }
}

pub async fn update_form(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    let mut bundle = AggregateFetcher::new()
        .query("book", || store.book(id))
        .query("authors", || store.all_authors())
        .query("genres", || store.all_genres())
        .fetch()
        .await?;
    let book: Option<Record<Book>> = bundle.take("book")?;
    let authors: Vec<Record<Author>> = bundle.take("authors")?;
    let genres: Vec<Record<Genre>> = bundle.take("genres")?;
    let book = book.ok_or(CatalogError::NotFound(Book::LABEL))?;

    let selected: Vec<&str> = book.doc.genre.iter().map(EntityId::as_str).collect();
    Ok(form_view(
        "Update Book",
        &authors,
        &genres,
        &selected,
        Some(json!(BookFormView::from(&book))),
        None,
    ))
}

pub async fn update(
    store: &CatalogStore,
    id: &EntityId,
    fields: &FormFields,
) -> CatalogResult<Outcome> {
    let input = BookInput::from_form(fields);
    let book = match input.validate() {
        Ok(book) => book,
        Err(errors) => {
            let (authors, genres) = choices(store).await?;
            return Ok(form_view(
                "Update Book",
                &authors,
                &genres,
                &input.genre_ids(),
                Some(input.echo()),
                Some(errors),
            ));
        }
    };

    let updated = store.books.update_by_id(id, book).await?;
    tracing::info!(book_id = %updated.id, "book updated");
    Ok(Outcome::redirect(Book::url(&updated.id)))
}
