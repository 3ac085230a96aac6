use libris_db::{AggregateFetcher, EntityId, Query, Record};
use libris_http::{FormFields, Outcome};
use serde_json::{json, Value};
use time::{Date, OffsetDateTime};

use crate::modules::catalog::display::{BookInstanceView, BookSummaryView};
use crate::modules::catalog::error::{CatalogError, CatalogResult};
use crate::modules::catalog::models::{Book, BookInstance, CatalogEntity};
use crate::modules::catalog::store::{CatalogStore, PopulatedBookInstance};
use crate::modules::catalog::validation::{escape, BookInstanceInput, FieldError};

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub async fn list(store: &CatalogStore) -> CatalogResult<Outcome> {
    let instances = store.instances.find(&Query::all()).await?;
    let populated = store.populate_instances(instances).await?;
    let bookinstance_list: Vec<BookInstanceView> =
        populated.iter().map(BookInstanceView::from).collect();

    Ok(Outcome::render(
        "bookinstance_list",
        json!({ "title": "Book Instance List", "bookinstance_list": bookinstance_list }),
    ))
}

fn copy_title(populated: &PopulatedBookInstance) -> String {
    match &populated.book {
        Some(book) => format!("Copy {}", book.doc.title),
        None => "Copy".to_string(),
    }
}

pub async fn detail(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    let populated = store
        .populated_instance(id)
        .await?
        .ok_or(CatalogError::NotFound(BookInstance::LABEL))?;

    Ok(Outcome::render(
        "bookinstance_detail",
        json!({
            "title": copy_title(&populated),
            "bookinstance": BookInstanceView::from(&populated),
        }),
    ))
}

struct FormState {
    selected_book: Option<String>,
    bookinstance: Option<Value>,
    errors: Option<Vec<FieldError>>,
}

fn form_view(title: &'static str, books: &[Record<Book>], state: FormState) -> Outcome {
    let book_list: Vec<BookSummaryView> = books.iter().map(BookSummaryView::from).collect();
    let mut context = json!({ "title": title, "book_list": book_list });
    if let Some(selected) = state.selected_book {
        context["selected_book"] = Value::String(selected);
    }
    if let Some(bookinstance) = state.bookinstance {
        context["bookinstance"] = bookinstance;
    }
    if let Some(errors) = state.errors {
        context["errors"] = json!(errors);
    }
    Outcome::render("bookinstance_form", context)
}

fn rejected(
    title: &'static str,
    books: &[Record<Book>],
    input: &BookInstanceInput,
    errors: Vec<FieldError>,
) -> Outcome {
    form_view(
        title,
        books,
        FormState {
            selected_book: Some(escape(&input.book)),
            bookinstance: Some(input.echo()),
            errors: Some(errors),
        },
    )
}

pub async fn create_form(store: &CatalogStore) -> CatalogResult<Outcome> {
    let books = store.all_books().await?;
    Ok(form_view(
        "Create Book Instance",
        &books,
        FormState {
            selected_book: None,
            bookinstance: None,
            errors: None,
        },
    ))
}

pub async fn create(store: &CatalogStore, fields: &FormFields) -> CatalogResult<Outcome> {
    let input = BookInstanceInput::from_form(fields);
    let instance = match input.validate(today()) {
        Ok(instance) => instance,
        Err(errors) => {
            let books = store.all_books().await?;
            return Ok(rejected("Create Book Instance", &books, &input, errors));
        }
    };

    let id = store.instances.insert(instance).await?;
    tracing::info!(bookinstance_id = %id, "book copy created");
    Ok(Outcome::redirect(BookInstance::url(&id)))
}

pub async fn delete_form(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    match store.populated_instance(id).await? {
        Some(populated) => Ok(Outcome::render(
            "bookinstance_delete",
            json!({
                "title": "Delete Book Instance",
                "bookinstance": BookInstanceView::from(&populated),
            }),
        )),
        None => Ok(Outcome::redirect(BookInstance::list_url())),
    }
}

/// Copies have no dependents, so removal is unconditional.
pub async fn delete(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    if store.instances.delete_by_id(id).await? {
        tracing::info!(bookinstance_id = %id, "book copy deleted");
    } else {
        tracing::debug!(bookinstance_id = %id, "book copy already gone");
    }
    Ok(Outcome::redirect(BookInstance::list_url()))
}

pub async fn update_form(store: &CatalogStore, id: &EntityId) -> CatalogResult<Outcome> {
    let mut bundle = AggregateFetcher::new()
        .query("bookinstance", || store.populated_instance(id))
        .query("books", || store.all_books())
        .fetch()
        .await?;
    let populated: Option<PopulatedBookInstance> = bundle.take("bookinstance")?;
    let books: Vec<Record<Book>> = bundle.take("books")?;
    let populated = populated.ok_or(CatalogError::NotFound(BookInstance::LABEL))?;

    Ok(form_view(
        "Update Book Instance",
        &books,
        FormState {
            selected_book: Some(populated.instance.book.to_string()),
            bookinstance: Some(json!(BookInstanceView::from(&populated))),
            errors: None,
        },
    ))
}

pub async fn update(
    store: &CatalogStore,
    id: &EntityId,
    fields: &FormFields,
) -> CatalogResult<Outcome> {
    let input = BookInstanceInput::from_form(fields);
    let instance = match input.validate(today()) {
        Ok(instance) => instance,
        Err(errors) => {
            let books = store.all_books().await?;
            return Ok(rejected("Update Book Instance", &books, &input, errors));
        }
    };

    let updated = store.instances.update_by_id(id, instance).await?;
    tracing::info!(bookinstance_id = %updated.id, "book copy updated");
    Ok(Outcome::redirect(BookInstance::url(&updated.id)))
}
