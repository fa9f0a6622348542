use thiserror::Error;

/// All errors that can occur in folio-core.
///
/// The record-rejection variants are raised before any store write, so a
/// failed import never leaves partial entities behind. Store errors
/// (`Database`, `Json`) propagate to the caller unchanged; this crate does
/// not retry store operations.
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("missing required field(s): {}", .0.join(", "))]
    RequiredFields(Vec<String>),

    #[error("publication year is too old: {0}")]
    PublicationYearTooOld(i32),

    #[error("published in future year: {0}")]
    PublishedInFutureYear(i32),

    #[error("book is independently published")]
    IndependentlyPublished,

    #[error("this source needs an ISBN")]
    SourceNeedsIsbn,

    #[error("invalid language code: {0}")]
    InvalidLanguage(String),

    #[error("coverstore responded with: '{0}'")]
    CoverNotSaved(String),

    #[error("matched edition cannot be loaded: {0}")]
    EditionNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl FolioError {
    /// Whether this error is a record rejection, as opposed to a
    /// store/infrastructure failure. Rejections are reported to the
    /// caller as structured failures with no side effects.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            FolioError::RequiredFields(_)
                | FolioError::PublicationYearTooOld(_)
                | FolioError::PublishedInFutureYear(_)
                | FolioError::IndependentlyPublished
                | FolioError::SourceNeedsIsbn
                | FolioError::InvalidLanguage(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        assert!(FolioError::RequiredFields(vec!["title".into()]).is_rejection());
        assert!(FolioError::SourceNeedsIsbn.is_rejection());
        assert!(!FolioError::CoverNotSaved("502".into()).is_rejection());
    }

    #[test]
    fn test_required_fields_message() {
        let err = FolioError::RequiredFields(vec!["title".into(), "source_records".into()]);
        assert_eq!(
            err.to_string(),
            "missing required field(s): title, source_records"
        );
    }
}
