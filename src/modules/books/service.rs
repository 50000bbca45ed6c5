use std::sync::{Arc, Mutex, MutexGuard};

use super::clock::{Clock, SystemClock};
use super::error::BookError;
use super::ids::{IdGenerator, NanoIdGenerator};
use super::models::{Book, BookPayload, BookSummary};
use super::store::BookStore;

/// Fresh ids drawn per create before giving up on finding an unused one.
const MAX_ID_ATTEMPTS: usize = 8;

/// Book Store Service: validates payloads and mutates the collection.
///
/// Every operation holds the store lock for its whole read-modify-write
/// sequence and never across an `.await`.
pub struct BookService {
    store: Mutex<BookStore>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl BookService {
    pub fn new(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(BookStore::new()),
            ids,
            clock,
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, BookStore>, BookError> {
        self.store
            .lock()
            .map_err(|_| BookError::Internal(anyhow::anyhow!("book store lock poisoned")))
    }

    /// Validate and append a new book, returning its id.
    pub fn create(&self, payload: BookPayload) -> Result<String, BookError> {
        let payload = payload.validate()?;

        let mut store = self.store()?;
        let id = (0..MAX_ID_ATTEMPTS)
            .map(|_| self.ids.generate())
            .find(|id| !id.is_empty() && !store.contains(id))
            .ok_or_else(|| {
                BookError::Internal(anyhow::anyhow!(
                    "no unused book id after {} attempts",
                    MAX_ID_ATTEMPTS
                ))
            })?;

        let book = Book::new(id.clone(), payload, self.clock.now());
        let finished = book.finished;
        store.insert(book).map_err(|book| {
            BookError::Internal(anyhow::anyhow!("book id {} is already taken", book.id))
        })?;

        tracing::info!(book_id = %id, finished, "book created");
        Ok(id)
    }

    /// Summaries of every book in insertion order.
    pub fn list(&self) -> Result<Vec<BookSummary>, BookError> {
        Ok(self.store()?.iter().map(Book::to_summary).collect())
    }

    pub fn get(&self, id: &str) -> Result<Book, BookError> {
        self.store()?
            .get(id)
            .cloned()
            .ok_or_else(|| BookError::NotFound(id.to_string()))
    }

    /// Replace the mutable fields of an existing book.
    ///
    /// The payload is validated before the id is looked up, so an invalid
    /// payload reports a validation error even for unknown ids.
    pub fn update(&self, id: &str, payload: BookPayload) -> Result<(), BookError> {
        let payload = payload.validate()?;

        let mut store = self.store()?;
        let book = store
            .get_mut(id)
            .ok_or_else(|| BookError::NotFound(id.to_string()))?;
        book.apply(payload, self.clock.now());

        tracing::info!(book_id = %id, finished = book.finished, "book updated");
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<(), BookError> {
        self.store()?
            .remove(id)
            .ok_or_else(|| BookError::NotFound(id.to_string()))?;

        tracing::info!(book_id = %id, "book deleted");
        Ok(())
    }

    /// Number of stored books.
    pub fn len(&self) -> Result<usize, BookError> {
        Ok(self.store()?.len())
    }
}

impl Default for BookService {
    fn default() -> Self {
        Self::new(Arc::new(NanoIdGenerator::default()), Arc::new(SystemClock))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    use time::{Duration, OffsetDateTime};

    use super::super::clock::Clock;
    use super::super::ids::IdGenerator;
    use super::BookService;

    /// Yields `book-1`, `book-2`, ...
    #[derive(Default)]
    pub(crate) struct SequentialIds(AtomicU64);

    impl IdGenerator for SequentialIds {
        fn generate(&self) -> String {
            format!("book-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    /// Hands out the scripted ids in order, then repeats the last one.
    pub(crate) struct ScriptedIds(Mutex<VecDeque<String>>);

    impl ScriptedIds {
        pub(crate) fn new(ids: &[&str]) -> Self {
            Self(Mutex::new(ids.iter().map(|id| id.to_string()).collect()))
        }
    }

    impl IdGenerator for ScriptedIds {
        fn generate(&self) -> String {
            let mut ids = self.0.lock().unwrap();
            if ids.len() > 1 {
                ids.pop_front().unwrap()
            } else {
                ids.front().cloned().unwrap_or_default()
            }
        }
    }

    /// Starts at a fixed instant and advances one second per reading.
    pub(crate) struct SteppingClock {
        start: OffsetDateTime,
        ticks: AtomicU64,
    }

    impl SteppingClock {
        pub(crate) fn new(start: OffsetDateTime) -> Self {
            Self {
                start,
                ticks: AtomicU64::new(0),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> OffsetDateTime {
            let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
            self.start + Duration::seconds(tick as i64)
        }
    }

    pub(crate) fn service() -> BookService {
        service_with_ids(Arc::new(SequentialIds::default()))
    }

    pub(crate) fn service_with_ids(ids: Arc<dyn IdGenerator>) -> BookService {
        BookService::new(
            ids,
            Arc::new(SteppingClock::new(
                time::macros::datetime!(2024-05-01 10:00 UTC),
            )),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{service, service_with_ids, ScriptedIds};
    use super::*;
    use crate::modules::books::models::BookFields;

    fn payload(name: &str, page_count: u32, read_page: u32) -> BookPayload {
        BookPayload {
            name: Some(name.to_string()),
            fields: BookFields {
                year: Some(1965),
                author: "Frank Herbert".to_string(),
                summary: "Desert planet".to_string(),
                publisher: "Chilton".to_string(),
                page_count,
                read_page,
                reading: true,
            },
        }
    }

    #[test]
    fn create_then_get_round_trips_fields() {
        let service = service();
        let submitted = payload("Dune", 412, 100);

        let id = service.create(submitted.clone()).unwrap();
        let book = service.get(&id).unwrap();

        assert_eq!(id, "book-1");
        assert_eq!(book.id, id);
        assert_eq!(book.name, "Dune");
        assert_eq!(book.year, submitted.fields.year);
        assert_eq!(book.author, submitted.fields.author);
        assert_eq!(book.summary, submitted.fields.summary);
        assert_eq!(book.publisher, submitted.fields.publisher);
        assert_eq!(book.page_count, 412);
        assert_eq!(book.read_page, 100);
        assert!(book.reading);
        assert!(!book.finished);
        assert_eq!(book.inserted_at, book.updated_at);
    }

    #[test]
    fn finished_is_derived_on_create() {
        let service = service();
        let done = service.create(payload("Dune", 400, 400)).unwrap();
        let partial = service.create(payload("Dune2", 400, 399)).unwrap();

        assert!(service.get(&done).unwrap().finished);
        assert!(!service.get(&partial).unwrap().finished);
    }

    #[test]
    fn invalid_payloads_leave_store_untouched() {
        let service = service();
        service.create(payload("Dune", 10, 1)).unwrap();

        let missing = BookPayload {
            name: None,
            ..payload("", 10, 1)
        };
        assert!(matches!(
            service.create(missing.clone()),
            Err(BookError::MissingName)
        ));
        assert!(matches!(
            service.create(payload("", 10, 1)),
            Err(BookError::MissingName)
        ));
        assert!(matches!(
            service.create(payload("Dune", 10, 11)),
            Err(BookError::ReadPageExceedsPageCount { .. })
        ));
        assert!(matches!(
            service.update("book-1", missing),
            Err(BookError::MissingName)
        ));
        assert!(matches!(
            service.update("book-1", payload("Dune", 10, 11)),
            Err(BookError::ReadPageExceedsPageCount { .. })
        ));

        assert_eq!(service.len().unwrap(), 1);
        let book = service.get("book-1").unwrap();
        assert_eq!(book.read_page, 1);
        assert_eq!(book.inserted_at, book.updated_at);
    }

    #[test]
    fn list_is_ordered_and_idempotent() {
        let service = service();
        assert!(service.list().unwrap().is_empty());

        for name in ["Dune", "Emma", "Beloved"] {
            service.create(payload(name, 1, 0)).unwrap();
        }

        let first = service.list().unwrap();
        let second = service.list().unwrap();
        assert_eq!(first, second);

        let names: Vec<&str> = first.iter().map(|summary| summary.name.as_str()).collect();
        assert_eq!(names, vec!["Dune", "Emma", "Beloved"]);
        assert_eq!(first[0].publisher, "Chilton");
    }

    #[test]
    fn update_replaces_fields_and_keeps_identity() {
        let service = service();
        let id = service.create(payload("Dune", 400, 10)).unwrap();
        let before = service.get(&id).unwrap();

        service.update(&id, payload("Dune Messiah", 256, 256)).unwrap();
        let after = service.get(&id).unwrap();

        assert_eq!(after.id, before.id);
        assert_eq!(after.inserted_at, before.inserted_at);
        assert!(after.updated_at > before.updated_at);
        assert_eq!(after.name, "Dune Messiah");
        assert_eq!(after.page_count, 256);
        assert!(after.finished);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let service = service();

        assert!(matches!(service.get("nope"), Err(BookError::NotFound(id)) if id == "nope"));
        assert!(matches!(
            service.update("nope", payload("Dune", 1, 1)),
            Err(BookError::NotFound(_))
        ));
        assert!(matches!(service.delete("nope"), Err(BookError::NotFound(_))));
    }

    #[test]
    fn validation_wins_over_not_found_on_update() {
        let service = service();
        assert!(matches!(
            service.update("nope", payload("", 1, 1)),
            Err(BookError::MissingName)
        ));
    }

    #[test]
    fn delete_removes_exactly_one_record() {
        let service = service();
        let ids: Vec<String> = ["Dune", "Emma", "Beloved"]
            .into_iter()
            .map(|name| service.create(payload(name, 1, 0)).unwrap())
            .collect();

        service.delete(&ids[1]).unwrap();

        let listed: Vec<String> = service
            .list()
            .unwrap()
            .into_iter()
            .map(|summary| summary.id)
            .collect();
        assert_eq!(listed, vec![ids[0].clone(), ids[2].clone()]);
        assert!(matches!(service.get(&ids[1]), Err(BookError::NotFound(_))));
    }

    #[test]
    fn concurrent_creates_are_all_stored() {
        let service = Arc::new(BookService::default());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || {
                    for n in 0..25 {
                        service
                            .create(payload(&format!("book {worker}-{n}"), 1, 0))
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(service.len().unwrap(), 200);
    }

    #[test]
    fn repeated_id_is_redrawn_instead_of_overwriting() {
        let service = service_with_ids(Arc::new(ScriptedIds::new(&["dup", "dup", "fresh"])));

        let first = service.create(payload("Dune", 1, 0)).unwrap();
        let second = service.create(payload("Emma", 1, 0)).unwrap();

        assert_eq!(first, "dup");
        assert_eq!(second, "fresh");
        assert_eq!(service.get("dup").unwrap().name, "Dune");
        assert_eq!(service.get("fresh").unwrap().name, "Emma");
        assert_eq!(service.len().unwrap(), 2);
    }

    #[test]
    fn exhausted_ids_fail_without_touching_existing_books() {
        let service = service_with_ids(Arc::new(ScriptedIds::new(&["dup"])));
        service.create(payload("Dune", 1, 0)).unwrap();

        let err = service.create(payload("Emma", 1, 0)).unwrap_err();

        assert!(matches!(err, BookError::Internal(_)));
        let names: Vec<String> = service
            .list()
            .unwrap()
            .into_iter()
            .map(|summary| summary.name)
            .collect();
        assert_eq!(names, vec!["Dune"]);
    }

    #[test]
    fn empty_ids_are_never_stored() {
        let service = BookService::new(Arc::new(NanoIdGenerator::new(0)), Arc::new(SystemClock));

        assert!(matches!(
            service.create(payload("Dune", 1, 0)),
            Err(BookError::Internal(_))
        ));
        assert_eq!(service.len().unwrap(), 0);
    }
}
