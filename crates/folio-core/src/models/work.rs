use serde::{Deserialize, Serialize};

use super::key::Key;

fn default_role() -> String {
    "author".to_string()
}

/// Role-tagged author reference on a work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorRole {
    #[serde(default = "default_role")]
    pub role: String,
    pub author: Key,
}

impl AuthorRole {
    pub fn new(author: Key) -> Self {
        Self {
            role: default_role(),
            author,
        }
    }
}

/// The abstract creative work behind one or more editions.
///
/// Subject lists are append-only and deduplicated under normalized-title
/// comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub key: Key,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<AuthorRole>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject_places: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject_times: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject_people: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub covers: Vec<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Work {
    pub fn new(key: Key, title: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Mutable access to a subject list by record field name.
    pub fn subject_list_mut(&mut self, field: &str) -> Option<&mut Vec<String>> {
        match field {
            "subjects" => Some(&mut self.subjects),
            "subject_places" => Some(&mut self.subject_places),
            "subject_times" => Some(&mut self.subject_times),
            "subject_people" => Some(&mut self.subject_people),
            _ => None,
        }
    }
}
