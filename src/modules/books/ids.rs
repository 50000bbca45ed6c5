pub const DEFAULT_ID_LENGTH: usize = 16;

/// Produces identifiers for new books.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random URL-safe nanoid tokens. The service redraws ids that are
/// already taken.
#[derive(Debug, Clone, Copy)]
pub struct NanoIdGenerator {
    length: usize,
}

impl NanoIdGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for NanoIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LENGTH)
    }
}

impl IdGenerator for NanoIdGenerator {
    fn generate(&self) -> String {
        // nanoid! never returns for a zero size.
        if self.length == 0 {
            return String::new();
        }
        let length = self.length;
        nanoid::nanoid!(length)
    }
}
