//! Read-time projections from stored records to view models.
//!
//! Everything here is a pure function of a record snapshot; nothing is
//! persisted.

use libris_db::{EntityId, Record};
use serde::Serialize;
use time::{macros::format_description, Date};

use super::models::{Author, Book, BookInstance, BookStatus, CatalogEntity, Genre};
use super::store::{PopulatedBook, PopulatedBookInstance};

/// `YYYY-MM-DD`, as date inputs expect.
pub fn input_date(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(&format).unwrap_or_default()
}

/// `YYYY/MM/DD`.
pub fn slash_date(date: Date) -> String {
    let format = format_description!("[year]/[month]/[day]");
    date.format(&format).unwrap_or_default()
}

/// `January 5th, 2024`.
pub fn long_date(date: Date) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {}{}, {}", date.month(), day, suffix, date.year())
}

/// `"family, first"`, or empty when either part is missing.
pub fn author_name(author: &Author) -> String {
    if author.first_name.is_empty() || author.family_name.is_empty() {
        return String::new();
    }
    format!("{}, {}", author.family_name, author.first_name)
}

pub fn author_lifespan(author: &Author) -> String {
    let born = author.date_of_birth.map(slash_date).unwrap_or_default();
    match author.date_of_death {
        Some(died) => format!("{} - {}", born, slash_date(died)),
        None => born,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorView {
    pub id: EntityId,
    pub url: String,
    pub name: String,
    pub first_name: String,
    pub family_name: String,
    pub lifespan: String,
    pub date_of_birth: Option<String>,
    pub date_of_death: Option<String>,
}

impl From<&Record<Author>> for AuthorView {
    fn from(record: &Record<Author>) -> Self {
        let author = &record.doc;
        Self {
            id: record.id.clone(),
            url: Author::url(&record.id),
            name: author_name(author),
            first_name: author.first_name.clone(),
            family_name: author.family_name.clone(),
            lifespan: author_lifespan(author),
            date_of_birth: author.date_of_birth.map(input_date),
            date_of_death: author.date_of_death.map(input_date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreView {
    pub id: EntityId,
    pub url: String,
    pub name: String,
}

impl From<&Record<Genre>> for GenreView {
    fn from(record: &Record<Genre>) -> Self {
        Self {
            id: record.id.clone(),
            url: Genre::url(&record.id),
            name: record.doc.name.clone(),
        }
    }
}

/// A genre checkbox on the book form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreOption {
    pub id: EntityId,
    pub name: String,
    pub checked: bool,
}

/// Mark the genres whose ids appear in `selected`.
pub fn genre_options<S: AsRef<str>>(genres: &[Record<Genre>], selected: &[S]) -> Vec<GenreOption> {
    genres
        .iter()
        .map(|record| GenreOption {
            id: record.id.clone(),
            name: record.doc.name.clone(),
            checked: selected
                .iter()
                .any(|choice| choice.as_ref() == record.id.as_str()),
        })
        .collect()
}

/// A book with its references left as ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSummaryView {
    pub id: EntityId,
    pub url: String,
    pub title: String,
    pub summary: String,
}

impl From<&Record<Book>> for BookSummaryView {
    fn from(record: &Record<Book>) -> Self {
        Self {
            id: record.id.clone(),
            url: Book::url(&record.id),
            title: record.doc.title.clone(),
            summary: record.doc.summary.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookView {
    pub id: EntityId,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: Option<AuthorView>,
    pub genre: Vec<GenreView>,
}

impl From<&PopulatedBook> for BookView {
    fn from(book: &PopulatedBook) -> Self {
        Self {
            id: book.id.clone(),
            url: Book::url(&book.id),
            title: book.title.clone(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            author: book.author.as_ref().map(AuthorView::from),
            genre: book.genre.iter().map(GenreView::from).collect(),
        }
    }
}

/// Stored book values as the book form expects them: references stay ids,
/// the same shape a rejected submission is echoed back in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookFormView {
    pub id: EntityId,
    pub url: String,
    pub title: String,
    pub author: EntityId,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<EntityId>,
}

impl From<&Record<Book>> for BookFormView {
    fn from(record: &Record<Book>) -> Self {
        let book = &record.doc;
        Self {
            id: record.id.clone(),
            url: Book::url(&record.id),
            title: book.title.clone(),
            author: book.author.clone(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre: book.genre.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookInstanceView {
    pub id: EntityId,
    pub url: String,
    pub imprint: String,
    pub status: BookStatus,
    pub input_due_back: String,
    pub due_back_formatted: String,
    pub book: Option<BookSummaryView>,
}

impl BookInstanceView {
    fn project(id: &EntityId, instance: &BookInstance, book: Option<BookSummaryView>) -> Self {
        Self {
            id: id.clone(),
            url: BookInstance::url(id),
            imprint: instance.imprint.clone(),
            status: instance.status,
            input_due_back: input_date(instance.due_back),
            due_back_formatted: long_date(instance.due_back),
            book,
        }
    }
}

impl From<&Record<BookInstance>> for BookInstanceView {
    fn from(record: &Record<BookInstance>) -> Self {
        Self::project(&record.id, &record.doc, None)
    }
}

impl From<&PopulatedBookInstance> for BookInstanceView {
    fn from(populated: &PopulatedBookInstance) -> Self {
        Self::project(
            &populated.id,
            &populated.instance,
            populated.book.as_ref().map(BookSummaryView::from),
        )
    }
}
