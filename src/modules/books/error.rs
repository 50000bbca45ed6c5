use thiserror::Error;

/// Failures reported by the book store.
#[derive(Error, Debug)]
pub enum BookError {
    #[error("book name is missing")]
    MissingName,

    #[error("readPage ({read_page}) exceeds pageCount ({page_count})")]
    ReadPageExceedsPageCount { read_page: u32, page_count: u32 },

    #[error("book {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
