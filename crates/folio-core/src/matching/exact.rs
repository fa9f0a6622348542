use std::collections::HashSet;

use crate::error::Result;
use crate::models::{Edition, ImportRecord, Key};
use crate::store::CatalogStore;

use super::pool::EditionPool;

fn scalar_conflict<T: PartialEq>(rec: Option<&T>, stored: Option<&T>) -> bool {
    match (rec, stored) {
        (Some(r), Some(s)) => r != s,
        _ => false,
    }
}

fn list_conflict<T: PartialEq>(rec: &[T], stored: &[T]) -> bool {
    !rec.is_empty() && !stored.is_empty() && rec != stored
}

/// Structural author comparison: (name, birth, death) triples, in
/// order. The record-side free-form `date` and the stored entity keys
/// take no part in the comparison.
fn authors_conflict(store: &dyn CatalogStore, rec: &ImportRecord, e: &Edition) -> Result<bool> {
    if rec.authors.is_empty() || e.authors.is_empty() {
        return Ok(false);
    }
    let stored = store.get_many(&e.authors)?;
    let stored_names: Vec<(String, Option<String>, Option<String>)> = stored
        .iter()
        .filter_map(|entity| entity.as_author())
        .map(|a| (a.name.clone(), a.birth_date.clone(), a.death_date.clone()))
        .collect();
    let incoming: Vec<(String, Option<String>, Option<String>)> = rec
        .authors
        .iter()
        .map(|a| (a.name.clone(), a.birth_date.clone(), a.death_date.clone()))
        .collect();
    Ok(stored_names != incoming)
}

/// Whether any field present on the record disagrees with a non-empty
/// stored value on the candidate.
///
/// A field absent or empty on the candidate never blocks a match; only
/// an unequal non-empty value does. `source_records` is ignored
/// entirely, and stored languages are compared by their 3-letter codes.
fn fields_conflict(store: &dyn CatalogStore, rec: &ImportRecord, e: &Edition) -> Result<bool> {
    if !rec.title.is_empty() && rec.title != e.title {
        return Ok(true);
    }
    if scalar_conflict(rec.subtitle.as_ref(), e.subtitle.as_ref())
        || scalar_conflict(rec.ocaid.as_ref(), e.ocaid.as_ref())
        || scalar_conflict(rec.publish_date.as_ref(), e.publish_date.as_ref())
        || scalar_conflict(rec.number_of_pages.as_ref(), e.number_of_pages.as_ref())
        || scalar_conflict(rec.description.as_ref(), e.description.as_ref())
    {
        return Ok(true);
    }
    if list_conflict(&rec.isbn_10, &e.isbn_10)
        || list_conflict(&rec.isbn_13, &e.isbn_13)
        || list_conflict(&rec.lccn, &e.lccn)
        || list_conflict(&rec.oclc_numbers, &e.oclc_numbers)
        || list_conflict(&rec.local_id, &e.local_id)
        || list_conflict(&rec.lc_classifications, &e.lc_classifications)
        || list_conflict(&rec.publishers, &e.publishers)
    {
        return Ok(true);
    }
    if list_conflict(&rec.languages, &e.language_codes()) {
        return Ok(true);
    }
    if !rec.identifiers.is_empty()
        && !e.identifiers.is_empty()
        && rec.identifiers != e.identifiers
    {
        return Ok(true);
    }
    authors_conflict(store, rec, e)
}

/// Full-field strategy: scan the pool's candidate union in pool order
/// and accept the first candidate with no conflicting field.
pub fn find_exact_match(
    store: &dyn CatalogStore,
    rec: &ImportRecord,
    pool: &EditionPool,
) -> Result<Option<Key>> {
    let mut seen = HashSet::new();
    for keys in pool.values() {
        for key in keys {
            if !seen.insert(key.clone()) {
                continue;
            }
            let Some(entity) = store.get(key)? else {
                continue;
            };
            let Some(edition) = entity.as_edition() else {
                continue;
            };
            if !fields_conflict(store, rec, edition)? {
                return Ok(Some(key.clone()));
            }
        }
    }
    Ok(None)
}
