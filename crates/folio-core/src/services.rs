use thiserror::Error;

use crate::models::Key;

/// Failure classes of the cover-upload collaborator.
///
/// Only `ServerError` is surfaced to the import caller (as
/// `FolioError::CoverNotSaved`); everything else degrades to "no
/// cover".
#[derive(Debug, Error)]
pub enum CoverUploadError {
    #[error("cover service server error: {0}")]
    ServerError(String),

    #[error("cover upload unavailable: {0}")]
    Unavailable(String),
}

/// External cover-image store.
pub trait CoverStore {
    /// Mirror the image at `url` as a cover for `edition`, returning
    /// the allocated cover id. `Ok(None)` means the service declined
    /// the image (invalid URL and the like) — the import proceeds
    /// without a cover.
    fn upload(
        &self,
        url: &str,
        edition: &Key,
    ) -> std::result::Result<Option<i64>, CoverUploadError>;
}

/// Catalog ids written back to an external archive item after import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLinks {
    pub edition_id: String,
    pub work_id: String,
}

/// Best-effort metadata write-back to the external item an `ocaid`
/// names. Failures are logged by the importer and never abort or roll
/// back the catalog write.
pub trait ItemMetadataWriter {
    fn write(&self, item_id: &str, links: &ItemLinks) -> anyhow::Result<()>;
}
