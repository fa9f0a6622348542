pub mod authors;
pub mod prepare;
pub mod validate;
pub mod works;

mod create;
mod enrich;

use tracing::{info, warn};

use crate::config::ImportConfig;
use crate::error::{FolioError, Result};
use crate::matching::{build_pool, find_match, EditionScorer};
use crate::models::{ImportRecord, Key, LoadReply};
use crate::services::{CoverStore, CoverUploadError, ItemLinks, ItemMetadataWriter};
use crate::store::CatalogStore;

/// Loads import records into the catalog: one synchronous operation per
/// record, ending in either a freshly created edition/work or a minimal
/// enrichment of an existing one.
///
/// The importer owns no entities; everything lives in the store, and
/// nothing is cached across operations. Cover upload and item
/// write-back are optional collaborators — without them records still
/// load, just without covers or write-backs.
pub struct Importer<'a> {
    pub(crate) store: &'a dyn CatalogStore,
    pub(crate) covers: Option<&'a dyn CoverStore>,
    pub(crate) items: Option<&'a dyn ItemMetadataWriter>,
    pub(crate) config: ImportConfig,
    pub(crate) scorer: EditionScorer,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a dyn CatalogStore) -> Self {
        Self {
            store,
            covers: None,
            items: None,
            config: ImportConfig::default(),
            scorer: EditionScorer::default(),
        }
    }

    pub fn with_covers(mut self, covers: &'a dyn CoverStore) -> Self {
        self.covers = Some(covers);
        self
    }

    pub fn with_item_writer(mut self, items: &'a dyn ItemMetadataWriter) -> Self {
        self.items = Some(items);
        self
    }

    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.scorer = EditionScorer::from_config(&config.matching);
        self.config = config;
        self
    }

    /// Load one record: validate, normalize, match against existing
    /// editions, then create or enrich.
    ///
    /// Validation failures reject the record before any store access.
    /// An unresolvable language code is reported as a structured
    /// `success: false` reply rather than an error.
    pub fn load(&self, mut rec: ImportRecord) -> Result<LoadReply> {
        let mut missing = Vec::new();
        if rec.title.is_empty() {
            missing.push("title".to_string());
        }
        if rec.source_records.is_empty() {
            missing.push("source_records".to_string());
        }
        if !missing.is_empty() {
            return Err(FolioError::RequiredFields(missing));
        }

        if !rec.is_promise_item(&self.config.rules.promise_prefix) {
            validate::validate_record(&rec, &self.config.rules)?;
        }

        prepare::prepare_record(&mut rec);

        let pool = build_pool(self.store, &rec)?;
        let matched = if pool.is_empty() {
            None
        } else {
            find_match(self.store, &rec, &pool, &self.scorer)?
        };

        let result = match matched {
            None => self.load_data(&rec),
            Some(key) => self.enrich(&rec, &key),
        };
        match result {
            Err(err @ FolioError::InvalidLanguage(_)) => Ok(LoadReply::failure(err.to_string())),
            other => other,
        }
    }

    /// Upload the record's cover through the collaborator, if any.
    /// Only the server-error class aborts the import; everything else
    /// degrades to "no cover".
    pub(crate) fn upload_cover(&self, url: &str, edition: &Key) -> Result<Option<i64>> {
        let Some(covers) = self.covers else {
            return Ok(None);
        };
        match covers.upload(url, edition) {
            Ok(id) => Ok(id),
            Err(CoverUploadError::ServerError(body)) => Err(FolioError::CoverNotSaved(body)),
            Err(CoverUploadError::Unavailable(reason)) => {
                warn!(%edition, %reason, "cover upload unavailable, proceeding without cover");
                Ok(None)
            }
        }
    }

    /// Write the new catalog ids back to the external archive item.
    /// Best-effort: failures are logged and never abort the import.
    pub(crate) fn write_back(&self, ocaid: &str, edition: &Key, work: &Key) {
        let Some(items) = self.items else {
            return;
        };
        let links = ItemLinks {
            edition_id: edition.id_part().to_string(),
            work_id: work.id_part().to_string(),
        };
        match items.write(ocaid, &links) {
            Ok(()) => info!(%ocaid, "wrote catalog ids back to archive item"),
            Err(err) => warn!(%ocaid, %err, "archive item write-back failed"),
        }
    }
}

/// Append `value` unless the list already holds it. Returns whether the
/// list grew.
pub(crate) fn push_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|v| v == value) {
        return false;
    }
    list.push(value.to_string());
    true
}
