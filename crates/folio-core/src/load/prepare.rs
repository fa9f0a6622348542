use crate::models::ImportRecord;
use crate::normalize::{normalize_isbn, normalize_lccn, split_subtitle};

/// Split the subtitle out of a colon-bearing bare title, but only when
/// the feed did not already separate one.
fn split_subtitle_if_needed(rec: &mut ImportRecord) {
    if rec.subtitle.is_some() || !rec.title.contains(':') {
        return;
    }
    let (title, subtitle) = split_subtitle(&rec.title);
    if let Some(subtitle) = subtitle {
        rec.title = title;
        rec.subtitle = Some(subtitle);
    }
}

/// Canonicalize every ISBN and LCCN on the record, silently dropping
/// values that cannot be normalized.
fn normalize_record_bibids(rec: &mut ImportRecord) {
    for field in [&mut rec.isbn, &mut rec.isbn_10, &mut rec.isbn_13] {
        *field = field.iter().filter_map(|i| normalize_isbn(i)).collect();
    }
    rec.lccn = rec.lccn.iter().filter_map(|l| normalize_lccn(l)).collect();
}

/// De-duplicate the author list by structural equality, keeping first
/// occurrences in order.
fn deduplicate_authors(rec: &mut ImportRecord) {
    let mut unique = Vec::with_capacity(rec.authors.len());
    for author in rec.authors.drain(..) {
        if !unique.contains(&author) {
            unique.push(author);
        }
    }
    rec.authors = unique;
}

/// The NORMALIZE stage: bring an already-validated record into its
/// canonical in-memory form before any matching.
pub fn prepare_record(rec: &mut ImportRecord) {
    split_subtitle_if_needed(rec);
    normalize_record_bibids(rec);
    deduplicate_authors(rec);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImportAuthor;

    #[test]
    fn test_subtitle_split_only_when_absent() {
        let mut rec = ImportRecord {
            title: "Secrets of the code: the guide".into(),
            ..Default::default()
        };
        prepare_record(&mut rec);
        assert_eq!(rec.title, "Secrets of the code");
        assert_eq!(rec.subtitle.as_deref(), Some("the guide"));

        let mut rec = ImportRecord {
            title: "Secrets of the code: the guide".into(),
            subtitle: Some("already here".into()),
            ..Default::default()
        };
        prepare_record(&mut rec);
        assert_eq!(rec.title, "Secrets of the code: the guide");
    }

    #[test]
    fn test_invalid_bibids_dropped_silently() {
        let mut rec = ImportRecord {
            title: "Dune".into(),
            isbn_10: vec!["0-441-56959-5".into(), "garbage".into()],
            lccn: vec!["96-39190".into(), "bad lccn".into()],
            ..Default::default()
        };
        prepare_record(&mut rec);
        assert_eq!(rec.isbn_10, vec!["0441569595"]);
        assert_eq!(rec.lccn, vec!["96039190"]);
    }

    #[test]
    fn test_author_dedup_is_structural() {
        let gibson = ImportAuthor {
            name: "Gibson, William".into(),
            ..Default::default()
        };
        let gibson_dated = ImportAuthor {
            name: "Gibson, William".into(),
            birth_date: Some("1948".into()),
            ..Default::default()
        };
        let mut rec = ImportRecord {
            title: "Neuromancer".into(),
            authors: vec![gibson.clone(), gibson_dated.clone(), gibson.clone()],
            ..Default::default()
        };
        prepare_record(&mut rec);
        assert_eq!(rec.authors, vec![gibson, gibson_dated]);
    }
}
