use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Import pipeline configuration, loadable from a TOML file.
///
/// The defaults reproduce the production rules: bookseller feeds may not
/// claim publication dates older than 1400, a handful of source classes
/// must carry an ISBN, and promise items bypass validation entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub rules: RulesConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Records published before this year are rejected unless their
    /// source is exempt.
    pub earliest_publish_year: i32,

    /// Source-record prefixes exempt from the publication-year floor
    /// (archival scans legitimately describe very old books).
    pub exempt_sources: Vec<String>,

    /// Source-record prefixes that must carry an ISBN.
    pub sources_requiring_isbn: Vec<String>,

    /// Source-record prefix marking a placeholder ("promise") item,
    /// which skips all business-rule validation.
    pub promise_prefix: String,

    /// Publisher names (compared case-insensitively) that are rejected
    /// when the record lacks an ISBN.
    pub independent_publishers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum weighted score for the enriched matcher to accept a
    /// candidate edition.
    pub match_threshold: i32,

    /// Jaro-Winkler similarity floor for "similar" (non-identical)
    /// normalized titles.
    pub title_similarity: f64,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            rules: RulesConfig::default(),
            matching: MatchingConfig::default(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            earliest_publish_year: 1400,
            exempt_sources: vec!["ia".to_string(), "osp".to_string()],
            sources_requiring_isbn: vec![
                "amazon".to_string(),
                "bwb".to_string(),
                "idb".to_string(),
            ],
            promise_prefix: "promise:".to_string(),
            independent_publishers: vec!["independently published".to_string()],
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            match_threshold: 800,
            title_similarity: 0.91,
        }
    }
}

impl ImportConfig {
    /// Load configuration from a TOML file. Missing keys fall back to
    /// the defaults above.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ImportConfig::default();
        assert_eq!(cfg.rules.earliest_publish_year, 1400);
        assert!(cfg.rules.sources_requiring_isbn.contains(&"amazon".to_string()));
        assert_eq!(cfg.matching.match_threshold, 800);
    }

    #[test]
    fn test_partial_toml_overlays_defaults() {
        let cfg: ImportConfig =
            toml::from_str("[rules]\nearliest_publish_year = 1500\n").unwrap();
        assert_eq!(cfg.rules.earliest_publish_year, 1500);
        assert_eq!(cfg.rules.promise_prefix, "promise:");
        assert_eq!(cfg.matching.title_similarity, 0.91);
    }
}
