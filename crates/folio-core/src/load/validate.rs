use chrono::{Datelike, Utc};

use crate::config::RulesConfig;
use crate::error::{FolioError, Result};
use crate::models::ImportRecord;
use crate::normalize::publication_year;

fn record_year(rec: &ImportRecord) -> Option<i32> {
    rec.publish_date.as_deref().and_then(publication_year)
}

fn source_exempt(rec: &ImportRecord, rules: &RulesConfig) -> bool {
    rec.source_prefixes()
        .any(|p| rules.exempt_sources.iter().any(|e| e == p))
}

fn too_old(rec: &ImportRecord, rules: &RulesConfig) -> Option<FolioError> {
    let year = record_year(rec)?;
    (year < rules.earliest_publish_year && !source_exempt(rec, rules))
        .then_some(FolioError::PublicationYearTooOld(year))
}

fn future_year(rec: &ImportRecord, _rules: &RulesConfig) -> Option<FolioError> {
    let year = record_year(rec)?;
    (year > Utc::now().year()).then_some(FolioError::PublishedInFutureYear(year))
}

fn independently_published(rec: &ImportRecord, rules: &RulesConfig) -> Option<FolioError> {
    let independent = rec.publishers.iter().any(|p| {
        rules
            .independent_publishers
            .iter()
            .any(|i| p.eq_ignore_ascii_case(i))
    });
    (independent && rec.isbns().is_empty()).then_some(FolioError::IndependentlyPublished)
}

fn needs_isbn(rec: &ImportRecord, rules: &RulesConfig) -> Option<FolioError> {
    let requires = rec
        .source_prefixes()
        .any(|p| rules.sources_requiring_isbn.iter().any(|s| s == p));
    (requires && rec.isbns().is_empty()).then_some(FolioError::SourceNeedsIsbn)
}

type Check = fn(&ImportRecord, &RulesConfig) -> Option<FolioError>;

/// The business rules, evaluated left to right with short-circuit on
/// the first failure. Not applied to promise items.
const CHECKS: [Check; 4] = [too_old, future_year, independently_published, needs_isbn];

/// Reject records that cannot plausibly be real books: publication
/// years too old for their source, dates in a future year, disallowed
/// independent publishers without identifiers, and ISBN-mandatory
/// sources lacking one. No store interaction happens before or during
/// validation.
pub fn validate_record(rec: &ImportRecord, rules: &RulesConfig) -> Result<()> {
    for check in CHECKS {
        if let Some(err) = check(rec, rules) {
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RulesConfig {
        RulesConfig::default()
    }

    fn base(source: &str) -> ImportRecord {
        ImportRecord {
            title: "Dune".into(),
            source_records: vec![source.to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_too_old_for_bookseller() {
        let mut rec = base("amazon:0441569595");
        rec.publish_date = Some("1066".into());
        rec.isbn_10 = vec!["0441569595".into()];
        assert!(matches!(
            validate_record(&rec, &rules()),
            Err(FolioError::PublicationYearTooOld(1066))
        ));
    }

    #[test]
    fn test_old_date_from_exempt_source_passes() {
        let mut rec = base("ia:psalterium00cath");
        rec.publish_date = Some("1066".into());
        assert!(validate_record(&rec, &rules()).is_ok());
    }

    #[test]
    fn test_future_year_rejected() {
        let mut rec = base("ia:dune00herb");
        rec.publish_date = Some("9999".into());
        assert!(matches!(
            validate_record(&rec, &rules()),
            Err(FolioError::PublishedInFutureYear(9999))
        ));
    }

    #[test]
    fn test_independently_published_without_isbn() {
        let mut rec = base("ia:x");
        rec.publishers = vec!["Independently Published".into()];
        assert!(matches!(
            validate_record(&rec, &rules()),
            Err(FolioError::IndependentlyPublished)
        ));

        rec.isbn_13 = vec!["9798668136124".into()];
        assert!(validate_record(&rec, &rules()).is_ok());
    }

    #[test]
    fn test_source_needs_isbn() {
        let rec = base("amazon:B01234");
        assert!(matches!(
            validate_record(&rec, &rules()),
            Err(FolioError::SourceNeedsIsbn)
        ));

        let mut rec = base("amazon:0441569595");
        rec.isbn_10 = vec!["0441569595".into()];
        assert!(validate_record(&rec, &rules()).is_ok());
    }
}
