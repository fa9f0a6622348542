//! Folio Core — importing bibliographic records into a catalog of
//! editions, works and authors: validation, normalization, three-tier
//! matching, and create/enrich persistence.

pub mod config;
pub mod error;
pub mod load;
pub mod matching;
pub mod models;
pub mod normalize;
pub mod services;
pub mod store;

pub use config::{ImportConfig, MatchingConfig, RulesConfig};
pub use error::{FolioError, Result};
pub use load::Importer;
pub use matching::{build_pool, find_match, EditionPool, EditionScorer, MatchStrategy};
pub use models::*;
pub use services::{CoverStore, CoverUploadError, ItemLinks, ItemMetadataWriter};
pub use store::{CatalogQuery, CatalogStore, MemoryStore, SaveAction, SqliteStore};
