use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::Result;
use crate::models::{Entity, Key, KeyKind};
use crate::normalize::normalize_title;

use super::{CatalogQuery, CatalogStore, SaveAction};

#[derive(Default)]
struct Inner {
    entities: HashMap<Key, Entity>,
    /// Insertion order of keys; queries scan this so results are
    /// deterministic.
    order: Vec<Key>,
    counters: HashMap<&'static str, u64>,
    saves: u64,
}

/// Arena-style in-memory catalog store.
///
/// Stands in for the external graph store in tests and small tools.
/// `save_many` holds the lock for the whole call, so each save is
/// atomic with respect to readers.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save_many` calls so far. Used to assert that an
    /// idempotent re-import performed no write.
    pub fn save_count(&self) -> u64 {
        self.inner.lock().unwrap().saves
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn edition_matches(entity: &Entity, query: &CatalogQuery) -> bool {
    let Some(e) = entity.as_edition() else {
        return false;
    };
    match query {
        CatalogQuery::EditionTitle(t) => e.title == *t,
        CatalogQuery::EditionNormalizedTitle(t) => normalize_title(&e.title) == *t,
        CatalogQuery::EditionIsbn(isbns) => {
            e.isbns().iter().any(|stored| isbns.iter().any(|q| q == stored))
        }
        CatalogQuery::EditionLccn(v) => e.lccn.iter().any(|x| x == v),
        CatalogQuery::EditionOclcNumber(v) => e.oclc_numbers.iter().any(|x| x == v),
        CatalogQuery::EditionOcaid(v) => e.ocaid.as_deref() == Some(v),
        CatalogQuery::EditionSourceRecord(v) => e.source_records.iter().any(|x| x == v),
        _ => false,
    }
}

impl CatalogStore for MemoryStore {
    fn get(&self, key: &Key) -> Result<Option<Entity>> {
        Ok(self.inner.lock().unwrap().entities.get(key).cloned())
    }

    fn get_many(&self, keys: &[Key]) -> Result<Vec<Entity>> {
        let inner = self.inner.lock().unwrap();
        Ok(keys
            .iter()
            .filter_map(|k| inner.entities.get(k).cloned())
            .collect())
    }

    fn query(&self, query: &CatalogQuery) -> Result<Vec<Key>> {
        let inner = self.inner.lock().unwrap();
        let keys = match query {
            CatalogQuery::WorksByAuthor(author) => inner
                .order
                .iter()
                .filter(|k| {
                    inner.entities.get(*k).and_then(Entity::as_work).is_some_and(|w| {
                        w.authors.iter().any(|r| r.author == *author)
                    })
                })
                .cloned()
                .collect(),
            CatalogQuery::AuthorByName(name) => inner
                .order
                .iter()
                .filter(|k| {
                    inner
                        .entities
                        .get(*k)
                        .and_then(Entity::as_author)
                        .is_some_and(|a| a.name == *name)
                })
                .cloned()
                .collect(),
            _ => inner
                .order
                .iter()
                .filter(|k| inner.entities.get(*k).is_some_and(|e| edition_matches(e, query)))
                .cloned()
                .collect(),
        };
        Ok(keys)
    }

    fn new_key(&self, kind: KeyKind) -> Result<Key> {
        let mut inner = self.inner.lock().unwrap();
        let counter = inner.counters.entry(kind.prefix()).or_insert(0);
        *counter += 1;
        Ok(kind.key_for(*counter))
    }

    fn save_many(&self, entities: &[Entity], _comment: &str, _action: SaveAction) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        for entity in entities {
            let key = entity.key().clone();
            if inner.entities.insert(key.clone(), entity.clone()).is_none() {
                inner.order.push(key);
            }
        }
        inner.saves += 1;
        Ok(())
    }
}
