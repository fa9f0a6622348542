use serde::{Deserialize, Serialize};

use super::key::Key;

/// Outcome of an import for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Created,
    Matched,
    Modified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityReply {
    pub key: Key,
    pub status: EntityStatus,
}

impl EntityReply {
    pub fn new(key: Key, status: EntityStatus) -> Self {
        Self { key, status }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorReply {
    pub key: Key,
    pub name: String,
    pub status: EntityStatus,
}

/// JSON-shaped response of `Importer::load`: what was created, matched
/// or modified by one import operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReply {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<EntityReply>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<EntityReply>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<AuthorReply>>,
}

impl LoadReply {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            edition: None,
            work: None,
            authors: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&EntityStatus::Created).unwrap(),
            "\"created\""
        );
        assert_eq!(
            serde_json::to_string(&EntityStatus::Modified).unwrap(),
            "\"modified\""
        );
    }

    #[test]
    fn test_failure_reply_shape() {
        let reply = LoadReply::failure("invalid language code: qqq");
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("edition").is_none());
    }
}
