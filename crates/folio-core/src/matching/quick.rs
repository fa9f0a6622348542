use crate::error::Result;
use crate::models::{ImportRecord, Key, KeyKind};
use crate::store::{CatalogQuery, CatalogStore};

/// Provenance prefix whose source-record values are usable as a quick
/// match key. Other feeds reuse identifiers too loosely for that.
const ARCHIVE_PREFIX: &str = "ia:";

/// Cheapest strategy: resolve the record through identifier-exact
/// lookups, in fixed priority order.
///
/// Direct catalog reference outranks `ocaid`, which outranks ISBN,
/// which outranks the single-value lookups (`source_records`,
/// `oclc_numbers`, `lccn` — first value only, and source records only
/// when they carry the archive prefix). The first hit wins.
pub fn find_quick_match(store: &dyn CatalogStore, rec: &ImportRecord) -> Result<Option<Key>> {
    if let Some(id) = &rec.catalog_id {
        let key = if id.starts_with('/') {
            Key::new(id.clone())
        } else {
            Key::new(format!("{}{id}", KeyKind::Edition.prefix()))
        };
        return Ok(Some(key));
    }

    if let Some(ocaid) = &rec.ocaid {
        let hits = store.query(&CatalogQuery::EditionOcaid(ocaid.clone()))?;
        if let Some(key) = hits.into_iter().next() {
            return Ok(Some(key));
        }
    }

    let isbns = rec.isbns();
    if !isbns.is_empty() {
        let hits = store.query(&CatalogQuery::EditionIsbn(isbns))?;
        if let Some(key) = hits.into_iter().next() {
            return Ok(Some(key));
        }
    }

    // Only the first value of each of these lists is tried.
    if let Some(first) = rec.source_records.first() {
        if first.starts_with(ARCHIVE_PREFIX) {
            let hits = store.query(&CatalogQuery::EditionSourceRecord(first.clone()))?;
            if let Some(key) = hits.into_iter().next() {
                return Ok(Some(key));
            }
        }
    }
    if let Some(first) = rec.oclc_numbers.first() {
        let hits = store.query(&CatalogQuery::EditionOclcNumber(first.clone()))?;
        if let Some(key) = hits.into_iter().next() {
            return Ok(Some(key));
        }
    }
    if let Some(first) = rec.lccn.first() {
        let hits = store.query(&CatalogQuery::EditionLccn(first.clone()))?;
        if let Some(key) = hits.into_iter().next() {
            return Ok(Some(key));
        }
    }

    Ok(None)
}
