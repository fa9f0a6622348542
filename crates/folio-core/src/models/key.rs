use serde::{Deserialize, Serialize};

/// Catalog entity identifier, e.g. `/books/7`, `/works/3`, `/authors/12`.
///
/// Keys are allocated by the store (`CatalogStore::new_key`); the import
/// pipeline never invents them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The entity kind this key addresses, judged by its path prefix.
    pub fn kind(&self) -> Option<KeyKind> {
        KeyKind::ALL
            .iter()
            .copied()
            .find(|k| self.0.starts_with(k.prefix()))
    }

    /// Trailing id segment, e.g. `7` for `/books/7`. Used for external
    /// write-backs which address items by bare id.
    pub fn id_part(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Edition,
    Work,
    Author,
}

impl KeyKind {
    pub const ALL: [KeyKind; 3] = [KeyKind::Edition, KeyKind::Work, KeyKind::Author];

    pub fn prefix(&self) -> &'static str {
        match self {
            KeyKind::Edition => "/books/",
            KeyKind::Work => "/works/",
            KeyKind::Author => "/authors/",
        }
    }

    pub fn key_for(&self, id: u64) -> Key {
        Key::new(format!("{}{id}", self.prefix()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyKind::Edition => "edition",
            KeyKind::Work => "work",
            KeyKind::Author => "author",
        }
    }
}
