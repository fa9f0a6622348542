use tracing::info;

use crate::error::{FolioError, Result};
use crate::models::{
    Edition, Entity, EntityReply, EntityStatus, ImportRecord, Key, KeyKind, LoadReply,
};
use crate::store::SaveAction;

use super::authors::resolve_authors;
use super::works::{append_subject, find_matching_work, new_work, record_subject_list, SUBJECT_FIELDS};
use super::{push_unique, Importer};

/// Map the record's 3-letter language codes to `/languages/xxx`
/// references. Anything that is not exactly three ASCII letters rejects
/// the record.
fn language_refs(rec: &ImportRecord) -> Result<Vec<String>> {
    let mut refs = Vec::with_capacity(rec.languages.len());
    for code in &rec.languages {
        let lower = code.to_ascii_lowercase();
        if lower.len() != 3 || !lower.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(FolioError::InvalidLanguage(code.clone()));
        }
        let lang = format!("/languages/{lower}");
        if !refs.contains(&lang) {
            refs.push(lang);
        }
    }
    Ok(refs)
}

fn dedup(values: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(values.len());
    for v in values {
        push_unique(&mut out, v);
    }
    out
}

/// Assemble a fresh edition from the record. Generic `isbn` entries are
/// sorted into the 10- or 13-digit field by length.
fn build_edition(
    rec: &ImportRecord,
    key: Key,
    languages: Vec<String>,
    author_keys: Vec<Key>,
    cover_id: Option<i64>,
) -> Edition {
    let mut edition = Edition::new(key, rec.title.clone());
    edition.subtitle = rec.subtitle.clone();
    edition.authors = author_keys;
    edition.source_records = dedup(&rec.source_records);

    edition.isbn_10 = dedup(&rec.isbn_10);
    edition.isbn_13 = dedup(&rec.isbn_13);
    for isbn in &rec.isbn {
        if isbn.len() == 13 {
            push_unique(&mut edition.isbn_13, isbn);
        } else {
            push_unique(&mut edition.isbn_10, isbn);
        }
    }

    edition.lccn = dedup(&rec.lccn);
    edition.oclc_numbers = dedup(&rec.oclc_numbers);
    edition.local_id = dedup(&rec.local_id);
    edition.lc_classifications = dedup(&rec.lc_classifications);
    edition.ocaid = rec.ocaid.clone();
    edition.languages = languages;
    edition.identifiers = rec.identifiers.clone();
    edition.description = rec.description.clone();
    edition.publishers = rec.publishers.clone();
    edition.publish_date = rec.publish_date.clone();
    edition.number_of_pages = rec.number_of_pages;
    edition.covers = cover_id.into_iter().collect();
    edition
}

impl Importer<'_> {
    /// Create path: no existing edition matched, so persist a new
    /// edition together with its work and any new authors, all in one
    /// atomic save.
    ///
    /// The work is reused when one of the resolved authors already has
    /// a work with the same normalized title; a reused work only picks
    /// up missing subjects and, if it has none, the new cover.
    pub(crate) fn load_data(&self, rec: &ImportRecord) -> Result<LoadReply> {
        let languages = language_refs(rec)?;

        let edition_key = self.store.new_key(KeyKind::Edition)?;
        let cover_id = match &rec.cover {
            Some(url) => self.upload_cover(url, &edition_key)?,
            None => None,
        };

        let source = &rec.source_records[0];
        let resolved = resolve_authors(self.store, &rec.authors, source)?;

        let (work, work_status) =
            match find_matching_work(self.store, &resolved.keys, &rec.title)? {
                Some(wkey) => match self.store.get(&wkey)? {
                    Some(Entity::Work(mut work)) => {
                        let mut changed = false;
                        for field in SUBJECT_FIELDS {
                            let values = record_subject_list(rec, field);
                            if values.is_empty() {
                                continue;
                            }
                            let Some(list) = work.subject_list_mut(field) else {
                                continue;
                            };
                            for value in values {
                                changed |= append_subject(list, value);
                            }
                        }
                        if let Some(id) = cover_id {
                            if work.covers.is_empty() {
                                work.covers.push(id);
                                changed = true;
                            }
                        }
                        let status = if changed {
                            EntityStatus::Modified
                        } else {
                            EntityStatus::Matched
                        };
                        (work, status)
                    }
                    _ => {
                        let wkey = self.store.new_key(KeyKind::Work)?;
                        (new_work(wkey, rec, &resolved.keys, cover_id), EntityStatus::Created)
                    }
                },
                None => {
                    let wkey = self.store.new_key(KeyKind::Work)?;
                    (new_work(wkey, rec, &resolved.keys, cover_id), EntityStatus::Created)
                }
            };

        let work_key = work.key.clone();
        let mut edition = build_edition(
            rec,
            edition_key.clone(),
            languages,
            resolved.keys.clone(),
            cover_id,
        );
        edition.works = vec![work_key.clone()];

        let mut to_save = resolved.new_entities;
        if work_status != EntityStatus::Matched {
            to_save.push(Entity::Work(work));
        }
        to_save.push(Entity::Edition(edition));
        self.store
            .save_many(&to_save, "import new book", SaveAction::AddBook)?;
        info!(edition = %edition_key, work = %work_key, "created edition");

        if let Some(ocaid) = &rec.ocaid {
            self.write_back(ocaid, &edition_key, &work_key);
        }

        Ok(LoadReply {
            success: true,
            error: None,
            edition: Some(EntityReply::new(edition_key, EntityStatus::Created)),
            work: Some(EntityReply::new(work_key, work_status)),
            authors: (!resolved.replies.is_empty()).then_some(resolved.replies),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImportAuthor;
    use crate::store::{CatalogStore, MemoryStore};

    fn record(title: &str) -> ImportRecord {
        ImportRecord {
            title: title.into(),
            source_records: vec!["ia:test0000item".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_generic_isbn_sorted_by_length() {
        let rec = ImportRecord {
            isbn: vec!["9780441569595".into(), "0441569595".into()],
            ..record("Neuromancer")
        };
        let e = build_edition(&rec, Key::new("/books/1"), vec![], vec![], None);
        assert_eq!(e.isbn_10, vec!["0441569595"]);
        assert_eq!(e.isbn_13, vec!["9780441569595"]);
    }

    #[test]
    fn test_source_records_deduplicated() {
        let rec = ImportRecord {
            source_records: vec!["ia:x".into(), "ia:x".into(), "marc:y".into()],
            ..record("Dune")
        };
        let e = build_edition(&rec, Key::new("/books/1"), vec![], vec![], None);
        assert_eq!(e.source_records, vec!["ia:x", "marc:y"]);
    }

    #[test]
    fn test_bad_language_code_rejected() {
        let rec = ImportRecord {
            languages: vec!["english".into()],
            ..record("Dune")
        };
        assert!(matches!(
            language_refs(&rec),
            Err(FolioError::InvalidLanguage(_))
        ));
    }

    #[test]
    fn test_create_makes_edition_work_and_author() {
        let store = MemoryStore::new();
        let importer = Importer::new(&store);
        let rec = ImportRecord {
            authors: vec![ImportAuthor {
                name: "Gibson, William".into(),
                ..Default::default()
            }],
            subjects: vec!["Cyberpunk".into()],
            ..record("Neuromancer")
        };
        let reply = importer.load_data(&rec).unwrap();
        assert!(reply.success);
        assert_eq!(reply.edition.as_ref().unwrap().status, EntityStatus::Created);
        assert_eq!(reply.work.as_ref().unwrap().status, EntityStatus::Created);
        assert_eq!(reply.authors.as_ref().unwrap().len(), 1);

        let edition = store
            .get(&reply.edition.unwrap().key)
            .unwrap()
            .unwrap()
            .into_edition()
            .unwrap();
        assert_eq!(edition.works, vec![reply.work.as_ref().unwrap().key.clone()]);
        let work = store
            .get(&reply.work.unwrap().key)
            .unwrap()
            .unwrap()
            .into_work()
            .unwrap();
        assert_eq!(work.subjects, vec!["Cyberpunk"]);
        assert_eq!(work.authors.len(), 1);
    }

    #[test]
    fn test_matching_work_is_reused_and_gains_subjects() {
        let store = MemoryStore::new();
        let importer = Importer::new(&store);
        let first = ImportRecord {
            authors: vec![ImportAuthor {
                name: "Frank Herbert".into(),
                ..Default::default()
            }],
            subjects: vec!["Science fiction".into()],
            ..record("Dune")
        };
        let wkey = importer.load_data(&first).unwrap().work.unwrap().key;

        let second = ImportRecord {
            authors: vec![ImportAuthor {
                name: "Frank Herbert".into(),
                ..Default::default()
            }],
            subjects: vec!["Science Fiction".into(), "Desert planets".into()],
            ..record("Dune")
        };
        let reply = importer.load_data(&second).unwrap();
        let work_reply = reply.work.unwrap();
        assert_eq!(work_reply.key, wkey);
        assert_eq!(work_reply.status, EntityStatus::Modified);

        let work = store.get(&wkey).unwrap().unwrap().into_work().unwrap();
        // "Science Fiction" collapses onto the stored subject.
        assert_eq!(work.subjects, vec!["Science fiction", "Desert planets"]);
    }
}
