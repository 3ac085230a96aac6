use std::fmt;
use std::str::FromStr;

use libris_db::{Document, EntityId};
use serde::{Deserialize, Serialize};
use time::Date;

/// Root under which every catalog route and URL lives.
pub const CATALOG_ROOT: &str = "/catalog";

/// A catalog document with a canonical URL and a list page.
pub trait CatalogEntity: Document {
    /// Human label used in not-found messages.
    const LABEL: &'static str;
    /// Singular path segment, e.g. `author`.
    const SEGMENT: &'static str;
    /// Plural list path segment, e.g. `authors`.
    const LIST_SEGMENT: &'static str;

    fn url(id: &EntityId) -> String {
        format!("{}/{}/{}", CATALOG_ROOT, Self::SEGMENT, id)
    }

    fn list_url() -> String {
        format!("{}/{}", CATALOG_ROOT, Self::LIST_SEGMENT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<Date>,
    pub date_of_death: Option<Date>,
}

impl Document for Author {
    const COLLECTION: &'static str = "authors";
}

impl CatalogEntity for Author {
    const LABEL: &'static str = "Author";
    const SEGMENT: &'static str = "author";
    const LIST_SEGMENT: &'static str = "authors";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
}

impl Document for Genre {
    const COLLECTION: &'static str = "genres";
}

impl CatalogEntity for Genre {
    const LABEL: &'static str = "Genre";
    const SEGMENT: &'static str = "genre";
    const LIST_SEGMENT: &'static str = "genres";
}

/// A title in the catalog. `author` and `genre` hold ids of other documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: EntityId,
    pub summary: String,
    pub isbn: String,
    #[serde(default)]
    pub genre: Vec<EntityId>,
}

impl Document for Book {
    const COLLECTION: &'static str = "books";
}

impl CatalogEntity for Book {
    const LABEL: &'static str = "Book";
    const SEGMENT: &'static str = "book";
    const LIST_SEGMENT: &'static str = "books";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BookStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl BookStatus {
    pub const ALL: [BookStatus; 4] = [
        BookStatus::Available,
        BookStatus::Maintenance,
        BookStatus::Loaned,
        BookStatus::Reserved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookStatus::Available => "Available",
            BookStatus::Maintenance => "Maintenance",
            BookStatus::Loaned => "Loaned",
            BookStatus::Reserved => "Reserved",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownStatus;

impl FromStr for BookStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        BookStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or(UnknownStatus)
    }
}

/// One physical copy of a [`Book`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInstance {
    pub book: EntityId,
    pub imprint: String,
    #[serde(default)]
    pub status: BookStatus,
    pub due_back: Date,
}

impl Document for BookInstance {
    const COLLECTION: &'static str = "bookinstances";
}

impl CatalogEntity for BookInstance {
    const LABEL: &'static str = "Book copy";
    const SEGMENT: &'static str = "bookinstance";
    const LIST_SEGMENT: &'static str = "bookinstances";
}
