use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::key::Key;

/// An author as it arrives on an import record. `key` is present only
/// when the feed already knows the catalog author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportAuthor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,

    /// A single free-form date, mutually exclusive with the
    /// birth/death pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
}

impl ImportAuthor {
    /// Display name followed by dates, used for author comparison.
    pub fn db_name(&self) -> String {
        if let Some(date) = &self.date {
            return format!("{} {date}", self.name);
        }
        if self.birth_date.is_none() && self.death_date.is_none() {
            return self.name.clone();
        }
        format!(
            "{} {}-{}",
            self.name,
            self.birth_date.as_deref().unwrap_or(""),
            self.death_date.as_deref().unwrap_or("")
        )
    }
}

/// Incoming bibliographic metadata, one record per import operation.
///
/// Only `title` and `source_records` are mandatory; everything else is
/// best-effort feed data. The record is ephemeral: it is normalized in
/// place during loading and never persisted as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    #[serde(default)]
    pub title: String,

    /// Provenance strings, e.g. `ia:heritageofindia0000unse`. A bare
    /// string is accepted and coerced to a one-element list.
    #[serde(default, deserialize_with = "string_or_seq")]
    pub source_records: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<ImportAuthor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub isbn: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub isbn_10: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub isbn_13: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lccn: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub oclc_numbers: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocaid: Option<String>,

    /// 3-letter language codes, e.g. `eng`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject_places: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject_times: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject_people: Vec<String>,

    /// Cover image URL to mirror into the cover store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub identifiers: BTreeMap<String, Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub publishers: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_pages: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_id: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lc_classifications: Vec<String>,

    /// Direct reference to an existing catalog edition id, when the
    /// feed already knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
}

impl ImportRecord {
    /// All ISBNs from the various possible ISBN fields, order-preserving
    /// and not deduplicated.
    pub fn isbns(&self) -> Vec<String> {
        self.isbn
            .iter()
            .chain(self.isbn_10.iter())
            .chain(self.isbn_13.iter())
            .cloned()
            .collect()
    }

    /// Whether this is a placeholder ("promise") item, exempt from the
    /// business-rule validation.
    pub fn is_promise_item(&self, promise_prefix: &str) -> bool {
        self.source_records
            .first()
            .is_some_and(|s| s.starts_with(promise_prefix))
    }

    /// The source class of a provenance string: the part before the
    /// first colon, e.g. `amazon` for `amazon:059035342X`.
    pub fn source_prefixes(&self) -> impl Iterator<Item = &str> {
        self.source_records
            .iter()
            .map(|s| s.split(':').next().unwrap_or(s.as_str()))
    }

    /// Title joined with the subtitle, when one exists.
    pub fn full_title(&self) -> String {
        match &self.subtitle {
            Some(sub) => format!("{}: {sub}", self.title),
            None => self.title.clone(),
        }
    }
}

/// Accept either `"x"` or `["x", "y"]`.
fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrSeq {
        One(String),
        Many(Vec<String>),
    }

    Ok(match StringOrSeq::deserialize(deserializer)? {
        StringOrSeq::One(s) => vec![s],
        StringOrSeq::Many(v) => v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_records_accepts_bare_string() {
        let rec: ImportRecord =
            serde_json::from_str(r#"{"title": "Dune", "source_records": "ia:dune00herb"}"#)
                .unwrap();
        assert_eq!(rec.source_records, vec!["ia:dune00herb"]);
    }

    #[test]
    fn test_isbns_combines_all_fields() {
        let rec = ImportRecord {
            isbn: vec!["1".into()],
            isbn_10: vec!["2".into()],
            isbn_13: vec!["3".into(), "2".into()],
            ..Default::default()
        };
        assert_eq!(rec.isbns(), vec!["1", "2", "3", "2"]);
    }

    #[test]
    fn test_promise_item() {
        let rec = ImportRecord {
            source_records: vec!["promise:bwb_daily_pallets_2022-09-40".into()],
            ..Default::default()
        };
        assert!(rec.is_promise_item("promise:"));
        assert!(!rec.is_promise_item("ia:"));
    }

    #[test]
    fn test_full_title() {
        let rec = ImportRecord {
            title: "Secrets of the code".into(),
            subtitle: Some("the unauthorized guide".into()),
            ..Default::default()
        };
        assert_eq!(rec.full_title(), "Secrets of the code: the unauthorized guide");
    }

    #[test]
    fn test_author_db_name_variants() {
        let a = ImportAuthor {
            name: "Gibson, William".into(),
            ..Default::default()
        };
        assert_eq!(a.db_name(), "Gibson, William");

        let a = ImportAuthor {
            name: "Mark Twain".into(),
            birth_date: Some("1835".into()),
            death_date: Some("1910".into()),
            ..Default::default()
        };
        assert_eq!(a.db_name(), "Mark Twain 1835-1910");

        let a = ImportAuthor {
            name: "Anon".into(),
            date: Some("fl. 1600".into()),
            ..Default::default()
        };
        assert_eq!(a.db_name(), "Anon fl. 1600");
    }
}
