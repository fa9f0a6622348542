pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::models::{Entity, Key, KeyKind};

/// Structural lookups the import pipeline issues against the catalog.
///
/// Edition variants address one index dimension each; the ISBN variant
/// is an any-of match across both stored ISBN fields.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogQuery {
    EditionTitle(String),
    EditionNormalizedTitle(String),
    EditionIsbn(Vec<String>),
    EditionLccn(String),
    EditionOclcNumber(String),
    EditionOcaid(String),
    EditionSourceRecord(String),
    WorksByAuthor(Key),
    AuthorByName(String),
}

/// Audit action recorded with each save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAction {
    AddBook,
    EditBook,
}

impl SaveAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveAction::AddBook => "add-book",
            SaveAction::EditBook => "edit-book",
        }
    }
}

/// The backing graph store holding editions, works and authors.
///
/// `save_many` is atomic per call: all entities commit together or not
/// at all. The store provides no cross-call serialization; callers that
/// need exactly-once semantics for concurrent imports of the same book
/// must serialize externally.
pub trait CatalogStore {
    fn get(&self, key: &Key) -> Result<Option<Entity>>;

    fn get_many(&self, keys: &[Key]) -> Result<Vec<Entity>>;

    /// Keys matching the query, in deterministic (insertion) order.
    fn query(&self, query: &CatalogQuery) -> Result<Vec<Key>>;

    /// Allocate a fresh identifier for an entity of the given kind.
    fn new_key(&self, kind: KeyKind) -> Result<Key>;

    fn save_many(&self, entities: &[Entity], comment: &str, action: SaveAction) -> Result<()>;
}
