use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::error::BookError;

/// A stored book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier for the book
    pub id: String,
    /// Title of the book
    pub name: String,
    /// Publication year
    pub year: Option<i32>,
    /// Author of the book
    pub author: String,
    /// Short description
    pub summary: String,
    /// Publisher of the book
    pub publisher: String,
    /// Total number of pages
    pub page_count: u32,
    /// Pages read so far, never above `page_count`
    pub read_page: u32,
    /// Whether the book is currently being read
    pub reading: bool,
    /// `read_page == page_count`, recomputed on every write
    pub finished: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub inserted_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Book {
    /// Build a fresh record from a validated payload.
    pub(crate) fn new(id: String, payload: ValidPayload, now: OffsetDateTime) -> Self {
        let ValidPayload { name, fields } = payload;
        Self {
            id,
            name,
            year: fields.year,
            author: fields.author,
            summary: fields.summary,
            publisher: fields.publisher,
            page_count: fields.page_count,
            read_page: fields.read_page,
            reading: fields.reading,
            finished: fields.page_count == fields.read_page,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable field; `id` and `inserted_at` are kept.
    pub(crate) fn apply(&mut self, payload: ValidPayload, now: OffsetDateTime) {
        let ValidPayload { name, fields } = payload;
        self.name = name;
        self.year = fields.year;
        self.author = fields.author;
        self.summary = fields.summary;
        self.publisher = fields.publisher;
        self.page_count = fields.page_count;
        self.read_page = fields.read_page;
        self.reading = fields.reading;
        self.finished = fields.page_count == fields.read_page;
        self.updated_at = now.max(self.inserted_at);
    }

    pub fn to_summary(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

/// Entry returned by the list operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: String,
}

/// Fields accepted by create and update.
///
/// Everything except `name` has a default so partial payloads are accepted;
/// `name` stays optional here and is checked by [`BookPayload::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub fields: BookFields,
}

/// Payload fields that carry no validation of their own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFields {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub read_page: u32,
    #[serde(default)]
    pub reading: bool,
}

/// A payload that passed [`BookPayload::validate`].
#[derive(Debug, Clone)]
pub(crate) struct ValidPayload {
    name: String,
    fields: BookFields,
}

impl BookPayload {
    /// Check the name first, then the page counts.
    pub(crate) fn validate(self) -> Result<ValidPayload, BookError> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(BookError::MissingName),
        };

        if self.fields.read_page > self.fields.page_count {
            return Err(BookError::ReadPageExceedsPageCount {
                read_page: self.fields.read_page,
                page_count: self.fields.page_count,
            });
        }

        Ok(ValidPayload {
            name,
            fields: self.fields,
        })
    }
}
