use crate::error::Result;
use crate::models::{
    Author, AuthorReply, Entity, EntityStatus, ImportAuthor, Key, KeyKind,
};
use crate::store::{CatalogQuery, CatalogStore};

/// Outcome of resolving the record's author list against the catalog.
pub struct ResolvedAuthors {
    /// One key per record author, in record order.
    pub keys: Vec<Key>,
    pub replies: Vec<AuthorReply>,
    /// Newly allocated author entities, queued for the caller's save.
    pub new_entities: Vec<Entity>,
}

fn dates_compatible(incoming: &ImportAuthor, stored: &Author) -> bool {
    let birth_ok = incoming.birth_date.is_none() || incoming.birth_date == stored.birth_date;
    let death_ok = incoming.death_date.is_none() || incoming.death_date == stored.death_date;
    birth_ok && death_ok
}

/// Match an incoming author to an existing catalog author by exact name
/// (with compatible dates), or allocate a new one.
fn resolve_author(
    store: &dyn CatalogStore,
    incoming: &ImportAuthor,
    source: &str,
) -> Result<(Key, EntityStatus, Option<Entity>)> {
    if let Some(key) = &incoming.key {
        return Ok((key.clone(), EntityStatus::Matched, None));
    }

    for candidate in store.query(&CatalogQuery::AuthorByName(incoming.name.clone()))? {
        if let Some(Entity::Author(stored)) = store.get(&candidate)? {
            if dates_compatible(incoming, &stored) {
                return Ok((stored.key, EntityStatus::Matched, None));
            }
        }
    }

    let key = store.new_key(KeyKind::Author)?;
    let author = Author {
        key: key.clone(),
        name: incoming.name.clone(),
        birth_date: incoming.birth_date.clone(),
        death_date: incoming.death_date.clone(),
        source_records: vec![source.to_string()],
    };
    Ok((key, EntityStatus::Created, Some(Entity::Author(author))))
}

/// Step through the record's authors, matching existing catalog
/// authors and queueing new ones for persistence.
pub fn resolve_authors(
    store: &dyn CatalogStore,
    authors: &[ImportAuthor],
    source: &str,
) -> Result<ResolvedAuthors> {
    let mut resolved = ResolvedAuthors {
        keys: Vec::with_capacity(authors.len()),
        replies: Vec::with_capacity(authors.len()),
        new_entities: Vec::new(),
    };
    for incoming in authors {
        let (key, status, entity) = resolve_author(store, incoming, source)?;
        resolved.replies.push(AuthorReply {
            key: key.clone(),
            name: incoming.name.clone(),
            status,
        });
        resolved.keys.push(key);
        resolved.new_entities.extend(entity);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SaveAction};

    #[test]
    fn test_new_author_is_queued_with_provenance() {
        let store = MemoryStore::new();
        let incoming = [ImportAuthor {
            name: "Gibson, William".into(),
            ..Default::default()
        }];
        let resolved = resolve_authors(&store, &incoming, "ia:neuromancer0000gibs").unwrap();
        assert_eq!(resolved.keys.len(), 1);
        assert_eq!(resolved.replies[0].status, EntityStatus::Created);
        let Entity::Author(a) = &resolved.new_entities[0] else {
            panic!("expected author entity");
        };
        assert_eq!(a.source_records, vec!["ia:neuromancer0000gibs"]);
    }

    #[test]
    fn test_existing_author_matches_by_name() {
        let store = MemoryStore::new();
        let key = store.new_key(KeyKind::Author).unwrap();
        store
            .save_many(
                &[Entity::Author(Author::new(key.clone(), "Mark Twain"))],
                "import new book",
                SaveAction::AddBook,
            )
            .unwrap();

        let incoming = [ImportAuthor {
            name: "Mark Twain".into(),
            ..Default::default()
        }];
        let resolved = resolve_authors(&store, &incoming, "ia:x").unwrap();
        assert_eq!(resolved.keys, vec![key]);
        assert_eq!(resolved.replies[0].status, EntityStatus::Matched);
        assert!(resolved.new_entities.is_empty());
    }

    #[test]
    fn test_conflicting_dates_create_a_new_author() {
        let store = MemoryStore::new();
        let key = store.new_key(KeyKind::Author).unwrap();
        let mut stored = Author::new(key, "John Smith");
        stored.birth_date = Some("1920".into());
        store
            .save_many(&[Entity::Author(stored)], "import new book", SaveAction::AddBook)
            .unwrap();

        let incoming = [ImportAuthor {
            name: "John Smith".into(),
            birth_date: Some("1971".into()),
            ..Default::default()
        }];
        let resolved = resolve_authors(&store, &incoming, "ia:x").unwrap();
        assert_eq!(resolved.replies[0].status, EntityStatus::Created);
    }
}
