use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{ImportRecord, Key};
use crate::normalize::normalize_title;
use crate::store::{CatalogQuery, CatalogStore};

/// A match dimension the pool builder gathers candidates for.
///
/// The enum order is the iteration order of the pool, so every scan over
/// pool candidates is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PoolDimension {
    Title,
    OclcNumbers,
    Lccn,
    Ocaid,
    Isbn,
}

/// Candidate editions per match dimension, built fresh for each
/// incoming record and never persisted. Buckets are deduplicated,
/// order-preserving; dimensions with no candidates are omitted.
pub type EditionPool = BTreeMap<PoolDimension, Vec<Key>>;

fn push_unique(bucket: &mut Vec<Key>, keys: Vec<Key>) {
    for key in keys {
        if !bucket.contains(&key) {
            bucket.push(key);
        }
    }
}

/// Search the store for existing editions matching the record on title
/// and bibliographic keys.
///
/// The title bucket also carries hits from the normalized-title index,
/// so punctuation and article variants of the same title land in the
/// pool. Returns an empty pool when the record carries no matchable
/// fields; callers treat that as "no candidates, create new".
pub fn build_pool(store: &dyn CatalogStore, rec: &ImportRecord) -> Result<EditionPool> {
    let mut pool = EditionPool::new();

    let mut title_bucket = Vec::new();
    if !rec.title.is_empty() {
        push_unique(&mut title_bucket, store.query(&CatalogQuery::EditionTitle(rec.title.clone()))?);
        push_unique(
            &mut title_bucket,
            store.query(&CatalogQuery::EditionNormalizedTitle(normalize_title(&rec.title)))?,
        );
    }
    if !title_bucket.is_empty() {
        pool.insert(PoolDimension::Title, title_bucket);
    }

    let mut oclc_bucket = Vec::new();
    for value in &rec.oclc_numbers {
        push_unique(
            &mut oclc_bucket,
            store.query(&CatalogQuery::EditionOclcNumber(value.clone()))?,
        );
    }
    if !oclc_bucket.is_empty() {
        pool.insert(PoolDimension::OclcNumbers, oclc_bucket);
    }

    let mut lccn_bucket = Vec::new();
    for value in &rec.lccn {
        push_unique(&mut lccn_bucket, store.query(&CatalogQuery::EditionLccn(value.clone()))?);
    }
    if !lccn_bucket.is_empty() {
        pool.insert(PoolDimension::Lccn, lccn_bucket);
    }

    if let Some(ocaid) = &rec.ocaid {
        let hits = store.query(&CatalogQuery::EditionOcaid(ocaid.clone()))?;
        if !hits.is_empty() {
            let mut bucket = Vec::new();
            push_unique(&mut bucket, hits);
            pool.insert(PoolDimension::Ocaid, bucket);
        }
    }

    let isbns = rec.isbns();
    if !isbns.is_empty() {
        let hits = store.query(&CatalogQuery::EditionIsbn(isbns))?;
        if !hits.is_empty() {
            let mut bucket = Vec::new();
            push_unique(&mut bucket, hits);
            pool.insert(PoolDimension::Isbn, bucket);
        }
    }

    Ok(pool)
}
