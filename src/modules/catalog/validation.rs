//! Form rules for each catalog entity.
//!
//! Inputs are trimmed when read from the form. `validate` runs every rule
//! in field order, collecting one [`FieldError`] per failing rule, and on
//! success yields the document with free text HTML-escaped.

use libris_db::EntityId;
use libris_http::FormFields;
use serde::Serialize;
use serde_json::{json, Value};
use time::{format_description::well_known::Iso8601, Date, OffsetDateTime, PrimitiveDateTime};

use super::models::{Author, Book, BookInstance, BookStatus, Genre};

pub const NAME_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
    pub value: String,
}

#[derive(Default)]
struct Report {
    errors: Vec<FieldError>,
}

impl Report {
    fn check(&mut self, ok: bool, field: &'static str, message: &'static str, value: &str) {
        if !ok {
            self.errors.push(FieldError {
                field,
                message,
                value: escape(value),
            });
        }
    }

    fn finish<T>(self, build: impl FnOnce() -> T) -> Result<T, Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(build())
        } else {
            Err(self.errors)
        }
    }
}

/// Replace characters that are significant in HTML with entities.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            '\\' => escaped.push_str("&#x5C;"),
            '`' => escaped.push_str("&#96;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// An ISO-8601 date in any of its forms (calendar, ordinal or week, basic or
/// extended), or a date-time truncated to its date.
pub fn parse_iso_date(text: &str) -> Option<Date> {
    if let Ok(date) = Date::parse(text, &Iso8601::DEFAULT) {
        return Some(date);
    }
    if let Ok(stamp) = OffsetDateTime::parse(text, &Iso8601::DEFAULT) {
        return Some(stamp.date());
    }
    PrimitiveDateTime::parse(text, &Iso8601::DEFAULT)
        .ok()
        .map(|stamp| stamp.date())
}

/// Empty means absent; anything else must parse.
fn optional_date(text: &str) -> Result<Option<Date>, ()> {
    if text.is_empty() {
        return Ok(None);
    }
    parse_iso_date(text).map(Some).ok_or(())
}

fn trimmed(fields: &FormFields, key: &str) -> String {
    fields.text(key).trim().to_string()
}

fn is_alphanumeric(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|ch| ch.is_ascii_alphanumeric())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorInput {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: String,
    pub date_of_death: String,
}

impl AuthorInput {
    pub fn from_form(fields: &FormFields) -> Self {
        Self {
            first_name: trimmed(fields, "first_name"),
            family_name: trimmed(fields, "family_name"),
            date_of_birth: trimmed(fields, "date_of_birth"),
            date_of_death: trimmed(fields, "date_of_death"),
        }
    }

    pub fn validate(&self) -> Result<Author, Vec<FieldError>> {
        let mut report = Report::default();

        let first = &self.first_name;
        report.check(!first.is_empty(), "first_name", "First name must be specified.", first);
        report.check(
            is_alphanumeric(first),
            "first_name",
            "First name has non-alphanumeric characters",
            first,
        );
        report.check(
            first.chars().count() <= NAME_MAX_CHARS,
            "first_name",
            "First name must not exceed 100 characters.",
            first,
        );

        let family = &self.family_name;
        report.check(!family.is_empty(), "family_name", "Family name must be specified.", family);
        report.check(
            is_alphanumeric(family),
            "family_name",
            "Family name has non-alphanumeric characters",
            family,
        );
        report.check(
            family.chars().count() <= NAME_MAX_CHARS,
            "family_name",
            "Family name must not exceed 100 characters.",
            family,
        );

        let born = optional_date(&self.date_of_birth);
        report.check(born.is_ok(), "date_of_birth", "Invalid date of birth", &self.date_of_birth);
        let died = optional_date(&self.date_of_death);
        report.check(died.is_ok(), "date_of_death", "Invalid date of death", &self.date_of_death);

        report.finish(|| Author {
            first_name: escape(first),
            family_name: escape(family),
            date_of_birth: born.ok().flatten(),
            date_of_death: died.ok().flatten(),
        })
    }

    /// Submitted values, escaped, for re-rendering the form.
    pub fn echo(&self) -> Value {
        json!({
            "first_name": escape(&self.first_name),
            "family_name": escape(&self.family_name),
            "date_of_birth": escape(&self.date_of_birth),
            "date_of_death": escape(&self.date_of_death),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreInput {
    pub name: String,
}

impl GenreInput {
    pub fn from_form(fields: &FormFields) -> Self {
        Self {
            name: trimmed(fields, "name"),
        }
    }

    pub fn validate(&self) -> Result<Genre, Vec<FieldError>> {
        let mut report = Report::default();
        report.check(!self.name.is_empty(), "name", "Genre name required", &self.name);
        report.finish(|| Genre {
            name: escape(&self.name),
        })
    }

    pub fn echo(&self) -> Value {
        json!({ "name": escape(&self.name) })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<String>,
}

impl BookInput {
    pub fn from_form(fields: &FormFields) -> Self {
        Self {
            title: trimmed(fields, "title"),
            author: trimmed(fields, "author"),
            summary: trimmed(fields, "summary"),
            isbn: trimmed(fields, "isbn"),
            genre: fields.seq("genre"),
        }
    }

    /// Selected genre ids as they will be stored.
    pub fn genre_ids(&self) -> Vec<String> {
        self.genre.iter().map(|genre| escape(genre)).collect()
    }

    pub fn validate(&self) -> Result<Book, Vec<FieldError>> {
        let mut report = Report::default();
        report.check(!self.title.is_empty(), "title", "Title must not be empty.", &self.title);
        report.check(!self.author.is_empty(), "author", "Author must not be empty.", &self.author);
        report.check(
            !self.summary.is_empty(),
            "summary",
            "Summary must not be empty.",
            &self.summary,
        );
        report.check(!self.isbn.is_empty(), "isbn", "ISBN must not be empty", &self.isbn);

        report.finish(|| Book {
            title: escape(&self.title),
            author: EntityId::from(escape(&self.author)),
            summary: escape(&self.summary),
            isbn: escape(&self.isbn),
            genre: self.genre_ids().into_iter().map(EntityId::from).collect(),
        })
    }

    pub fn echo(&self) -> Value {
        json!({
            "title": escape(&self.title),
            "author": escape(&self.author),
            "summary": escape(&self.summary),
            "isbn": escape(&self.isbn),
            "genre": self.genre_ids(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookInstanceInput {
    pub book: String,
    pub imprint: String,
    pub due_back: String,
    pub status: String,
}

impl BookInstanceInput {
    pub fn from_form(fields: &FormFields) -> Self {
        Self {
            book: trimmed(fields, "book"),
            imprint: trimmed(fields, "imprint"),
            due_back: trimmed(fields, "due_back"),
            status: trimmed(fields, "status"),
        }
    }

    /// `today` stands in for an empty due date.
    pub fn validate(&self, today: Date) -> Result<BookInstance, Vec<FieldError>> {
        let mut report = Report::default();
        report.check(!self.book.is_empty(), "book", "Book must be specified", &self.book);
        report.check(
            !self.imprint.is_empty(),
            "imprint",
            "Imprint must be specified",
            &self.imprint,
        );

        let due_back = optional_date(&self.due_back);
        report.check(due_back.is_ok(), "due_back", "Invalid date", &self.due_back);

        let status = if self.status.is_empty() {
            Ok(BookStatus::default())
        } else {
            self.status.parse::<BookStatus>()
        };
        report.check(status.is_ok(), "status", "Invalid status", &self.status);

        report.finish(|| BookInstance {
            book: EntityId::from(escape(&self.book)),
            imprint: escape(&self.imprint),
            status: status.unwrap_or_default(),
            due_back: due_back.ok().flatten().unwrap_or(today),
        })
    }

    pub fn echo(&self) -> Value {
        json!({
            "book": escape(&self.book),
            "imprint": escape(&self.imprint),
            "due_back": escape(&self.due_back),
            "status": escape(&self.status),
        })
    }
}
