use serde::{Deserialize, Serialize};

use super::key::Key;

/// A person or organization credited on editions and works.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub key: Key,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,

    /// Provenance of the import that created this author.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_records: Vec<String>,
}

impl Author {
    pub fn new(key: Key, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Display name followed by dates, the form used for author
    /// comparison during matching.
    pub fn db_name(&self) -> String {
        match (&self.birth_date, &self.death_date) {
            (None, None) => self.name.clone(),
            (birth, death) => format!(
                "{} {}-{}",
                self.name,
                birth.as_deref().unwrap_or(""),
                death.as_deref().unwrap_or("")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_name() {
        let mut a = Author::new(Key::new("/authors/1"), "Mark Twain");
        assert_eq!(a.db_name(), "Mark Twain");
        a.birth_date = Some("1835".into());
        a.death_date = Some("1910".into());
        assert_eq!(a.db_name(), "Mark Twain 1835-1910");
    }
}
