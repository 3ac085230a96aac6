//! Axum handlers for the catalog. Each one extracts the store, the path id
//! and the submitted form, then hands off to a workflow.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use libris_db::EntityId;
use libris_http::{FormFields, Outcome};

use super::error::CatalogResult;
use super::store::CatalogStore;
use super::workflows::{author, book, book_instance, genre, home};

pub fn router(store: CatalogStore) -> Router {
    Router::new()
        .route("/", get(index))
        // authors
        .route("/authors", get(author_list))
        .route("/author/create", get(author_create_form).post(author_create))
        .route("/author/{id}", get(author_detail))
        .route("/author/{id}/delete", get(author_delete_form).post(author_delete))
        .route("/author/{id}/update", get(author_update_form).post(author_update))
        // genres
        .route("/genres", get(genre_list))
        .route("/genre/create", get(genre_create_form).post(genre_create))
        .route("/genre/{id}", get(genre_detail))
        .route("/genre/{id}/delete", get(genre_delete_form).post(genre_delete))
        .route("/genre/{id}/update", get(genre_update_form).post(genre_update))
        // books
        .route("/books", get(book_list))
        .route("/book/create", get(book_create_form).post(book_create))
        .route("/book/{id}", get(book_detail))
        .route("/book/{id}/delete", get(book_delete_form).post(book_delete))
        .route("/book/{id}/update", get(book_update_form).post(book_update))
        // copies
        .route("/bookinstances", get(copy_list))
        .route("/bookinstance/create", get(copy_create_form).post(copy_create))
        .route("/bookinstance/{id}", get(copy_detail))
        .route("/bookinstance/{id}/delete", get(copy_delete_form).post(copy_delete))
        .route("/bookinstance/{id}/update", get(copy_update_form).post(copy_update))
        .with_state(store)
}

async fn index(State(store): State<CatalogStore>) -> Outcome {
    home::index(&store).await
}

async fn author_list(State(store): State<CatalogStore>) -> CatalogResult<Outcome> {
    author::list(&store).await
}

async fn author_detail(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    author::detail(&store, &id).await
}

async fn author_create_form() -> Outcome {
    author::create_form()
}

async fn author_create(
    State(store): State<CatalogStore>,
    fields: FormFields,
) -> CatalogResult<Outcome> {
    author::create(&store, &fields).await
}

async fn author_delete_form(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    author::delete_form(&store, &id).await
}

async fn author_delete(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    author::delete(&store, &id).await
}

async fn author_update_form(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    author::update_form(&store, &id).await
}

async fn author_update(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
    fields: FormFields,
) -> CatalogResult<Outcome> {
    author::update(&store, &id, &fields).await
}

async fn genre_list(State(store): State<CatalogStore>) -> CatalogResult<Outcome> {
    genre::list(&store).await
}

async fn genre_detail(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    genre::detail(&store, &id).await
}

async fn genre_create_form() -> Outcome {
    genre::create_form()
}

async fn genre_create(
    State(store): State<CatalogStore>,
    fields: FormFields,
) -> CatalogResult<Outcome> {
    genre::create(&store, &fields).await
}

async fn genre_delete_form(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    genre::delete_form(&store, &id).await
}

async fn genre_delete(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    genre::delete(&store, &id).await
}

async fn genre_update_form(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    genre::update_form(&store, &id).await
}

async fn genre_update(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
    fields: FormFields,
) -> CatalogResult<Outcome> {
    genre::update(&store, &id, &fields).await
}

async fn book_list(State(store): State<CatalogStore>) -> CatalogResult<Outcome> {
    book::list(&store).await
}

async fn book_detail(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    book::detail(&store, &id).await
}

async fn book_create_form(State(store): State<CatalogStore>) -> CatalogResult<Outcome> {
    book::create_form(&store).await
}

async fn book_create(
    State(store): State<CatalogStore>,
    fields: FormFields,
) -> CatalogResult<Outcome> {
    book::create(&store, &fields).await
}

async fn book_delete_form(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    book::delete_form(&store, &id).await
}

async fn book_delete(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    book::delete(&store, &id).await
}

async fn book_update_form(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    book::update_form(&store, &id).await
}

async fn book_update(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
    fields: FormFields,
) -> CatalogResult<Outcome> {
    book::update(&store, &id, &fields).await
}

async fn copy_list(State(store): State<CatalogStore>) -> CatalogResult<Outcome> {
    book_instance::list(&store).await
}

async fn copy_detail(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    book_instance::detail(&store, &id).await
}

async fn copy_create_form(State(store): State<CatalogStore>) -> CatalogResult<Outcome> {
    book_instance::create_form(&store).await
}

async fn copy_create(
    State(store): State<CatalogStore>,
    fields: FormFields,
) -> CatalogResult<Outcome> {
    book_instance::create(&store, &fields).await
}

async fn copy_delete_form(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    book_instance::delete_form(&store, &id).await
}

async fn copy_delete(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    book_instance::delete(&store, &id).await
}

async fn copy_update_form(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
) -> CatalogResult<Outcome> {
    book_instance::update_form(&store, &id).await
}

async fn copy_update(
    State(store): State<CatalogStore>,
    Path(id): Path<EntityId>,
    fields: FormFields,
) -> CatalogResult<Outcome> {
    book_instance::update(&store, &id, &fields).await
}
