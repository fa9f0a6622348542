use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::key::Key;

static RE_LANG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/languages/([a-z]{3})$").unwrap());

/// One published manifestation of a work.
///
/// `source_records` is append-only provenance; the identifier lists
/// (`lccn`, `oclc_numbers`, `source_records`) are deduplicated sets
/// kept as order-preserving sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Edition {
    pub key: Key,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    /// Author references, in credit order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Key>,

    /// At most one work reference. An edition may exist without a work,
    /// transiently.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub works: Vec<Key>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_records: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub isbn_10: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub isbn_13: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lccn: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub oclc_numbers: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_id: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lc_classifications: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocaid: Option<String>,

    /// Cover image ids, best first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub covers: Vec<i64>,

    /// Language references of the form `/languages/eng`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,

    /// Namespaced external identifiers, e.g. `goodreads` -> ids.
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
}

impl Edition {
    pub fn new(key: Key, title: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
            ..Default::default()
        }
    }

    /// All ISBNs on the edition, 10-digit forms first.
    pub fn isbns(&self) -> Vec<&str> {
        self.isbn_10
            .iter()
            .chain(self.isbn_13.iter())
            .map(String::as_str)
            .collect()
    }

    /// Extract the 3-letter codes from the stored language references.
    /// References that do not fit the `/languages/xxx` shape are skipped.
    pub fn language_codes(&self) -> Vec<String> {
        self.languages
            .iter()
            .filter_map(|l| RE_LANG.captures(l))
            .map(|c| c[1].to_string())
            .collect()
    }
}
