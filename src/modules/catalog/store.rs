//! Catalog collections and the queries the workflows issue against them.
//!
//! Query helpers return owned [`StoreQuery`] futures so they can be handed
//! to the aggregate fetcher directly.

use std::sync::Arc;

use futures::future::{try_join_all, BoxFuture, FutureExt};
use libris_db::{open_collection, Collection, Document, EntityId, Query, Record, StoreResult};
use libris_kernel::settings::DatabaseSettings;

use super::models::{Author, Book, BookInstance, BookStatus, Genre};

/// An owned store query, ready to hand to the aggregate fetcher.
pub type StoreQuery<T> = BoxFuture<'static, StoreResult<T>>;

#[derive(Clone)]
pub struct CatalogStore {
    pub authors: Arc<dyn Collection<Author>>,
    pub genres: Arc<dyn Collection<Genre>>,
    pub books: Arc<dyn Collection<Book>>,
    pub instances: Arc<dyn Collection<BookInstance>>,
}

/// A book with its author and genres resolved.
///
/// A dangling author reference resolves to `None`; dangling genre
/// references are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedBook {
    pub id: EntityId,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: Option<Record<Author>>,
    pub genre: Vec<Record<Genre>>,
}

/// A copy with its book resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedBookInstance {
    pub id: EntityId,
    pub instance: BookInstance,
    pub book: Option<Record<Book>>,
}

fn by_id<T: Document>(
    collection: &Arc<dyn Collection<T>>,
    id: &EntityId,
) -> StoreQuery<Option<Record<T>>> {
    let collection = Arc::clone(collection);
    let id = id.clone();
    async move { collection.find_by_id(&id).await }.boxed()
}

fn matching<T: Document>(
    collection: &Arc<dyn Collection<T>>,
    query: Query,
) -> StoreQuery<Vec<Record<T>>> {
    let collection = Arc::clone(collection);
    async move { collection.find(&query).await }.boxed()
}

fn counting<T: Document>(collection: &Arc<dyn Collection<T>>, query: Query) -> StoreQuery<u64> {
    let collection = Arc::clone(collection);
    async move { collection.count(&query).await }.boxed()
}

impl CatalogStore {
    pub fn open(settings: &DatabaseSettings) -> Self {
        Self {
            authors: open_collection(settings),
            genres: open_collection(settings),
            books: open_collection(settings),
            instances: open_collection(settings),
        }
    }

    pub fn author(&self, id: &EntityId) -> StoreQuery<Option<Record<Author>>> {
        by_id(&self.authors, id)
    }

    pub fn genre(&self, id: &EntityId) -> StoreQuery<Option<Record<Genre>>> {
        by_id(&self.genres, id)
    }

    pub fn book(&self, id: &EntityId) -> StoreQuery<Option<Record<Book>>> {
        by_id(&self.books, id)
    }

    pub fn instance(&self, id: &EntityId) -> StoreQuery<Option<Record<BookInstance>>> {
        by_id(&self.instances, id)
    }

    pub fn all_authors(&self) -> StoreQuery<Vec<Record<Author>>> {
        matching(&self.authors, Query::all())
    }

    pub fn all_genres(&self) -> StoreQuery<Vec<Record<Genre>>> {
        matching(&self.genres, Query::all())
    }

    pub fn all_books(&self) -> StoreQuery<Vec<Record<Book>>> {
        matching(&self.books, Query::all())
    }

    /// Books written by `author`.
    pub fn books_by_author(&self, author: &EntityId) -> StoreQuery<Vec<Record<Book>>> {
        matching(&self.books, Query::all().eq("author", author.as_str()))
    }

    /// Books tagged with `genre`.
    pub fn books_in_genre(&self, genre: &EntityId) -> StoreQuery<Vec<Record<Book>>> {
        matching(&self.books, Query::all().eq("genre", genre.as_str()))
    }

    /// Copies of `book`.
    pub fn instances_of_book(&self, book: &EntityId) -> StoreQuery<Vec<Record<BookInstance>>> {
        matching(&self.instances, Query::all().eq("book", book.as_str()))
    }

    pub fn count_authors(&self) -> StoreQuery<u64> {
        counting(&self.authors, Query::all())
    }

    pub fn count_genres(&self) -> StoreQuery<u64> {
        counting(&self.genres, Query::all())
    }

    pub fn count_books(&self) -> StoreQuery<u64> {
        counting(&self.books, Query::all())
    }

    pub fn count_instances(&self, status: Option<BookStatus>) -> StoreQuery<u64> {
        let query = match status {
            Some(status) => Query::all().eq("status", status.as_str()),
            None => Query::all(),
        };
        counting(&self.instances, query)
    }

    /// Resolve a book's author and genres concurrently.
    pub async fn populate_book(&self, record: Record<Book>) -> StoreResult<PopulatedBook> {
        let Record { id, doc: book } = record;

        let author = self.author(&book.author);
        let genres = try_join_all(book.genre.iter().map(|genre| self.genre(genre)));
        let (author, genres) = futures::try_join!(author, genres)?;

        Ok(PopulatedBook {
            id,
            title: book.title,
            summary: book.summary,
            isbn: book.isbn,
            author,
            genre: genres.into_iter().flatten().collect(),
        })
    }

    pub fn populated_book(&self, id: &EntityId) -> StoreQuery<Option<PopulatedBook>> {
        let store = self.clone();
        let lookup = self.book(id);
        async move {
            match lookup.await? {
                Some(record) => store.populate_book(record).await.map(Some),
                None => Ok(None),
            }
        }
        .boxed()
    }

    pub async fn populate_books(
        &self,
        records: Vec<Record<Book>>,
    ) -> StoreResult<Vec<PopulatedBook>> {
        try_join_all(records.into_iter().map(|record| self.populate_book(record))).await
    }

    pub async fn populate_instance(
        &self,
        record: Record<BookInstance>,
    ) -> StoreResult<PopulatedBookInstance> {
        let book = self.book(&record.doc.book).await?;
        Ok(PopulatedBookInstance {
            id: record.id,
            instance: record.doc,
            book,
        })
    }

    pub fn populated_instance(&self, id: &EntityId) -> StoreQuery<Option<PopulatedBookInstance>> {
        let store = self.clone();
        let lookup = self.instance(id);
        async move {
            match lookup.await? {
                Some(record) => store.populate_instance(record).await.map(Some),
                None => Ok(None),
            }
        }
        .boxed()
    }

    pub async fn populate_instances(
        &self,
        records: Vec<Record<BookInstance>>,
    ) -> StoreResult<Vec<PopulatedBookInstance>> {
        try_join_all(records.into_iter().map(|record| self.populate_instance(record))).await
    }
}
