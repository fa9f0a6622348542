use strsim::jaro_winkler;

use crate::config::MatchingConfig;
use crate::error::Result;
use crate::models::{Edition, ImportRecord};
use crate::normalize::{normalize_title, publication_year};
use crate::store::CatalogStore;

/// The import record expanded with the derived fields the weighted
/// matcher compares on: the conjoined full title and author display
/// names with dates.
#[derive(Debug, Clone)]
pub struct ExpandedRecord {
    pub full_title: String,
    pub author_db_names: Vec<String>,
    pub isbns: Vec<String>,
    pub publishers: Vec<String>,
    pub publish_year: Option<i32>,
    pub number_of_pages: Option<i64>,
}

impl ExpandedRecord {
    pub fn from_record(rec: &ImportRecord) -> Self {
        Self {
            full_title: rec.full_title(),
            author_db_names: rec.authors.iter().map(|a| a.db_name()).collect(),
            isbns: rec.isbns(),
            publishers: rec.publishers.clone(),
            publish_year: rec.publish_date.as_deref().and_then(publication_year),
            number_of_pages: rec.number_of_pages,
        }
    }
}

fn fold(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Record-equivalence collaborator for the enriched matching stage:
/// deterministic weighted partial-field scoring between an expanded
/// record and a stored edition.
///
/// Titles gate the comparison: two records whose normalized full titles
/// are neither equal nor similar never match, whatever the other fields
/// say. Conflicting non-empty ISBN sets and conflicting author sets
/// also veto outright.
#[derive(Debug, Clone)]
pub struct EditionScorer {
    threshold: i32,
    title_similarity: f64,
}

const TITLE_EXACT: i32 = 600;
const TITLE_SIMILAR: i32 = 450;
const ISBN_SHARED: i32 = 400;
const AUTHORS_MATCHED: i32 = 200;
const AUTHORS_ONE_SIDE_EMPTY: i32 = 75;
const YEAR_EQUAL: i32 = 100;
const PUBLISHER_EQUAL: i32 = 100;
const PUBLISHER_ABSENT: i32 = 25;
const PAGES_WITHIN_ONE: i32 = 100;

impl Default for EditionScorer {
    fn default() -> Self {
        Self::from_config(&MatchingConfig::default())
    }
}

impl EditionScorer {
    pub fn from_config(cfg: &MatchingConfig) -> Self {
        Self {
            threshold: cfg.match_threshold,
            title_similarity: cfg.title_similarity,
        }
    }

    fn title_score(&self, rec: &ExpandedRecord, edition: &Edition) -> Option<i32> {
        let stored_full = match &edition.subtitle {
            Some(sub) => format!("{}: {sub}", edition.title),
            None => edition.title.clone(),
        };
        let a = normalize_title(&rec.full_title);
        let b = normalize_title(&stored_full);
        if a == b {
            Some(TITLE_EXACT)
        } else if jaro_winkler(&a, &b) >= self.title_similarity {
            Some(TITLE_SIMILAR)
        } else {
            None
        }
    }

    fn author_score(&self, store: &dyn CatalogStore, rec: &ExpandedRecord, edition: &Edition) -> Result<Option<i32>> {
        if rec.author_db_names.is_empty() || edition.authors.is_empty() {
            return Ok(Some(AUTHORS_ONE_SIDE_EMPTY));
        }
        let stored = store.get_many(&edition.authors)?;
        let stored_names: Vec<String> = stored
            .iter()
            .filter_map(|e| e.as_author())
            .map(|a| fold(&a.db_name()))
            .collect();
        let all_found = rec
            .author_db_names
            .iter()
            .all(|name| stored_names.contains(&fold(name)));
        Ok(all_found.then_some(AUTHORS_MATCHED))
    }

    fn isbn_score(&self, rec: &ExpandedRecord, edition: &Edition) -> Option<i32> {
        let stored = edition.isbns();
        if rec.isbns.is_empty() || stored.is_empty() {
            return Some(0);
        }
        let shared = rec.isbns.iter().any(|i| stored.contains(&i.as_str()));
        shared.then_some(ISBN_SHARED)
    }

    /// Whether the expanded record and the stored edition describe the
    /// same published book.
    pub fn editions_match(
        &self,
        store: &dyn CatalogStore,
        rec: &ExpandedRecord,
        edition: &Edition,
    ) -> Result<bool> {
        let Some(mut score) = self.title_score(rec, edition) else {
            return Ok(false);
        };
        let Some(isbn) = self.isbn_score(rec, edition) else {
            return Ok(false);
        };
        score += isbn;
        let Some(authors) = self.author_score(store, rec, edition)? else {
            return Ok(false);
        };
        score += authors;

        let stored_year = edition.publish_date.as_deref().and_then(publication_year);
        if let (Some(a), Some(b)) = (rec.publish_year, stored_year) {
            if a == b {
                score += YEAR_EQUAL;
            }
        }

        if rec.publishers.is_empty() || edition.publishers.is_empty() {
            score += PUBLISHER_ABSENT;
        } else if rec
            .publishers
            .iter()
            .any(|p| edition.publishers.iter().any(|q| fold(p) == fold(q)))
        {
            score += PUBLISHER_EQUAL;
        }

        if let (Some(a), Some(b)) = (rec.number_of_pages, edition.number_of_pages) {
            if (a - b).abs() <= 1 {
                score += PAGES_WITHIN_ONE;
            }
        }

        Ok(score >= self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, Entity, ImportAuthor, Key, KeyKind};
    use crate::store::{MemoryStore, SaveAction};

    fn expanded(rec: &ImportRecord) -> ExpandedRecord {
        ExpandedRecord::from_record(rec)
    }

    fn store_with_author(name: &str) -> (MemoryStore, Key) {
        let store = MemoryStore::new();
        let akey = store.new_key(KeyKind::Author).unwrap();
        store
            .save_many(
                &[Entity::Author(Author::new(akey.clone(), name))],
                "import new book",
                SaveAction::AddBook,
            )
            .unwrap();
        (store, akey)
    }

    #[test]
    fn test_same_title_and_authors_match() {
        let (store, akey) = store_with_author("Gibson, William");
        let mut edition = Edition::new(Key::new("/books/1"), "Neuromancer");
        edition.authors = vec![akey];

        let rec = ImportRecord {
            title: "Neuromancer".into(),
            authors: vec![ImportAuthor {
                name: "Gibson, William".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let scorer = EditionScorer::default();
        assert!(scorer.editions_match(&store, &expanded(&rec), &edition).unwrap());
    }

    #[test]
    fn test_different_titles_never_match() {
        let store = MemoryStore::new();
        let mut edition = Edition::new(Key::new("/books/1"), "Count Zero");
        edition.isbn_10 = vec!["0441569595".into()];
        let rec = ImportRecord {
            title: "Neuromancer".into(),
            isbn_10: vec!["0441569595".into()],
            publishers: vec!["Ace".into()],
            publish_date: Some("1984".into()),
            ..Default::default()
        };
        let scorer = EditionScorer::default();
        assert!(!scorer.editions_match(&store, &expanded(&rec), &edition).unwrap());
    }

    #[test]
    fn test_disjoint_isbns_veto() {
        let (store, akey) = store_with_author("Gibson, William");
        let mut edition = Edition::new(Key::new("/books/1"), "Neuromancer");
        edition.authors = vec![akey];
        edition.isbn_10 = vec!["0006546064".into()];

        let rec = ImportRecord {
            title: "Neuromancer".into(),
            isbn_10: vec!["0441569595".into()],
            authors: vec![ImportAuthor {
                name: "Gibson, William".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let scorer = EditionScorer::default();
        assert!(!scorer.editions_match(&store, &expanded(&rec), &edition).unwrap());
    }

    #[test]
    fn test_similar_title_needs_supporting_fields() {
        let (store, akey) = store_with_author("Herbert, Frank");
        let mut edition = Edition::new(Key::new("/books/1"), "Dune Messiah.");
        edition.authors = vec![akey];
        edition.publishers = vec!["Ace Books".into()];
        edition.publish_date = Some("1969".into());

        // normalized titles differ only in trailing punctuation
        let rec = ImportRecord {
            title: "Dune Messiah".into(),
            authors: vec![ImportAuthor {
                name: "Herbert, Frank".into(),
                ..Default::default()
            }],
            publishers: vec!["ACE BOOKS".into()],
            publish_date: Some("June 1969".into()),
            ..Default::default()
        };
        let scorer = EditionScorer::default();
        assert!(scorer.editions_match(&store, &expanded(&rec), &edition).unwrap());
    }
}
