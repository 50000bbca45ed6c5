use std::collections::HashMap;

use super::models::Book;

/// In-memory book collection keyed by id, iterated in insertion order.
#[derive(Debug, Default)]
pub struct BookStore {
    books: HashMap<String, Book>,
    order: Vec<String>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.books.contains_key(id)
    }

    /// Append a record. An id that is already taken is refused and the
    /// record handed back; the stored one is left untouched.
    pub fn insert(&mut self, book: Book) -> Result<(), Book> {
        if self.books.contains_key(&book.id) {
            return Err(book);
        }

        self.order.push(book.id.clone());
        self.books.insert(book.id.clone(), book);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Book> {
        self.books.get_mut(id)
    }

    /// Remove a record, keeping the relative order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<Book> {
        let book = self.books.remove(id)?;
        self.order.retain(|entry| entry != id);
        Some(book)
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Book> + '_ {
        self.order.iter().filter_map(|id| self.books.get(id))
    }
}
