use serde::{Deserialize, Serialize};

use super::author::Author;
use super::edition::Edition;
use super::key::Key;
use super::work::Work;

/// A merged entity moved to a new key leaves a redirect at the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Redirect {
    pub key: Key,
    pub location: Key,
}

/// Any entity the catalog store holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entity {
    Edition(Edition),
    Work(Work),
    Author(Author),
    Redirect(Redirect),
}

impl Entity {
    pub fn key(&self) -> &Key {
        match self {
            Entity::Edition(e) => &e.key,
            Entity::Work(w) => &w.key,
            Entity::Author(a) => &a.key,
            Entity::Redirect(r) => &r.key,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Entity::Redirect(_))
    }

    pub fn as_edition(&self) -> Option<&Edition> {
        match self {
            Entity::Edition(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_edition(self) -> Option<Edition> {
        match self {
            Entity::Edition(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_work(&self) -> Option<&Work> {
        match self {
            Entity::Work(w) => Some(w),
            _ => None,
        }
    }

    pub fn into_work(self) -> Option<Work> {
        match self {
            Entity::Work(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_author(&self) -> Option<&Author> {
        match self {
            Entity::Author(a) => Some(a),
            _ => None,
        }
    }
}
