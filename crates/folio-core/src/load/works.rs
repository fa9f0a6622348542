use std::collections::HashSet;

use crate::error::Result;
use crate::models::{AuthorRole, ImportRecord, Key, Work};
use crate::normalize::normalize_title;
use crate::store::{CatalogQuery, CatalogStore};

/// Subject fields carried from records onto works.
pub const SUBJECT_FIELDS: [&str; 4] =
    ["subjects", "subject_places", "subject_times", "subject_people"];

pub fn record_subject_list<'r>(rec: &'r ImportRecord, field: &str) -> &'r [String] {
    match field {
        "subjects" => &rec.subjects,
        "subject_places" => &rec.subject_places,
        "subject_times" => &rec.subject_times,
        "subject_people" => &rec.subject_people,
        _ => &[],
    }
}

/// Look for an existing work representing the import by comparing
/// normalized titles across every work by each of the given authors.
/// First match wins, in author order.
pub fn find_matching_work(
    store: &dyn CatalogStore,
    author_keys: &[Key],
    title: &str,
) -> Result<Option<Key>> {
    let norm_title = normalize_title(title);
    let mut seen = HashSet::new();
    for author in author_keys {
        for wkey in store.query(&CatalogQuery::WorksByAuthor(author.clone()))? {
            if !seen.insert(wkey.clone()) {
                continue;
            }
            let Some(entity) = store.get(&wkey)? else {
                continue;
            };
            let Some(work) = entity.as_work() else {
                continue;
            };
            if !work.title.is_empty() && normalize_title(&work.title) == norm_title {
                return Ok(Some(wkey));
            }
        }
    }
    Ok(None)
}

/// Append `value` to `list` unless a normalized-equal entry already
/// exists. Returns whether the list grew.
pub fn append_subject(list: &mut Vec<String>, value: &str) -> bool {
    let norm = normalize_title(value);
    if list.iter().any(|existing| normalize_title(existing) == norm) {
        return false;
    }
    list.push(value.to_string());
    true
}

/// Synthesize a work for a new or work-less edition: title and subject
/// fields from the record, role-tagged references to the edition's
/// authors, and any cover already obtained.
pub fn new_work(
    key: Key,
    rec: &ImportRecord,
    author_keys: &[Key],
    cover_id: Option<i64>,
) -> Work {
    let mut work = Work::new(key, rec.title.clone());
    for field in SUBJECT_FIELDS {
        let values = record_subject_list(rec, field);
        if !values.is_empty() {
            if let Some(list) = work.subject_list_mut(field) {
                *list = values.to_vec();
            }
        }
    }
    work.authors = author_keys.iter().cloned().map(AuthorRole::new).collect();
    work.description = rec.description.clone();
    if let Some(cover) = cover_id {
        work.covers = vec![cover];
    }
    work
}
