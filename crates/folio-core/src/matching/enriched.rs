use std::collections::HashSet;

use crate::error::Result;
use crate::models::{Entity, ImportRecord, Key};
use crate::store::CatalogStore;

use super::pool::EditionPool;
use super::score::{EditionScorer, ExpandedRecord};
use super::MAX_REDIRECTS;

/// Follow a candidate through redirects to a concrete edition.
///
/// Chains are fully resolved up to `MAX_REDIRECTS` hops; every key
/// traversed is marked seen so later pool buckets do not revisit it. A
/// chain ending on a missing entity, a non-edition, or yet another
/// redirect yields `None`.
fn resolve_candidate(
    store: &dyn CatalogStore,
    key: &Key,
    seen: &mut HashSet<Key>,
) -> Result<Option<(Key, crate::models::Edition)>> {
    let mut current = key.clone();
    for _ in 0..=MAX_REDIRECTS {
        seen.insert(current.clone());
        match store.get(&current)? {
            None => return Ok(None),
            Some(Entity::Redirect(r)) => {
                if seen.contains(&r.location) {
                    return Ok(None);
                }
                current = r.location;
            }
            Some(Entity::Edition(e)) => return Ok(Some((current, e))),
            Some(_) => return Ok(None),
        }
    }
    Ok(None)
}

/// Last-resort strategy: expand the record with derived comparison
/// fields and ask the weighted scorer about each pool candidate, in
/// pool order, each candidate visited at most once.
pub fn find_enriched_match(
    store: &dyn CatalogStore,
    rec: &ImportRecord,
    pool: &EditionPool,
    scorer: &EditionScorer,
) -> Result<Option<Key>> {
    let expanded = ExpandedRecord::from_record(rec);
    let mut seen = HashSet::new();
    for keys in pool.values() {
        for key in keys {
            if seen.contains(key) {
                continue;
            }
            let Some((resolved, edition)) = resolve_candidate(store, key, &mut seen)? else {
                continue;
            };
            if scorer.editions_match(store, &expanded, &edition)? {
                return Ok(Some(resolved));
            }
        }
    }
    Ok(None)
}
