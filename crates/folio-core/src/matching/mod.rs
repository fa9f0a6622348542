pub mod enriched;
pub mod exact;
pub mod pool;
pub mod quick;
pub mod score;

pub use pool::{build_pool, EditionPool, PoolDimension};
pub use score::{EditionScorer, ExpandedRecord};

/// Longest redirect chain followed before a key is given up on.
pub const MAX_REDIRECTS: usize = 4;

use tracing::debug;

use crate::error::Result;
use crate::models::{ImportRecord, Key};
use crate::store::CatalogStore;

/// The three escalating match strategies, tried in declaration order.
/// Each shares one signature (record + pool in, optional edition key
/// out) and is total: no strategy fails a load, it just declines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    Quick,
    Exact,
    Enriched,
}

impl MatchStrategy {
    pub const ALL: [MatchStrategy; 3] =
        [MatchStrategy::Quick, MatchStrategy::Exact, MatchStrategy::Enriched];

    fn run(
        &self,
        store: &dyn CatalogStore,
        rec: &ImportRecord,
        pool: &EditionPool,
        scorer: &EditionScorer,
    ) -> Result<Option<Key>> {
        match self {
            MatchStrategy::Quick => quick::find_quick_match(store, rec),
            MatchStrategy::Exact => exact::find_exact_match(store, rec, pool),
            MatchStrategy::Enriched => enriched::find_enriched_match(store, rec, pool, scorer),
        }
    }
}

/// Pick at most one existing edition for the record, cheapest strategy
/// first; the first hit wins. Ties break to the first candidate in
/// deterministic iteration order at every stage.
pub fn find_match(
    store: &dyn CatalogStore,
    rec: &ImportRecord,
    pool: &EditionPool,
    scorer: &EditionScorer,
) -> Result<Option<Key>> {
    for strategy in MatchStrategy::ALL {
        if let Some(key) = strategy.run(store, rec, pool, scorer)? {
            debug!(?strategy, %key, "edition match");
            return Ok(Some(key));
        }
    }
    Ok(None)
}
