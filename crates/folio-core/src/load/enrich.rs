use tracing::info;

use crate::error::{FolioError, Result};
use crate::models::{
    AuthorRole, Edition, Entity, EntityReply, EntityStatus, ImportRecord, Key, KeyKind, LoadReply,
};
use crate::store::SaveAction;

use super::authors::resolve_authors;
use super::works::{append_subject, new_work, record_subject_list, SUBJECT_FIELDS};
use super::{push_unique, Importer};

use crate::matching::MAX_REDIRECTS;

/// The edition's list fields that only grow under enrichment.
const LIST_FIELDS: [fn(&mut Edition) -> &mut Vec<String>; 5] = [
    |e| &mut e.local_id,
    |e| &mut e.lccn,
    |e| &mut e.lc_classifications,
    |e| &mut e.oclc_numbers,
    |e| &mut e.source_records,
];

fn record_list<'r>(rec: &'r ImportRecord, index: usize) -> &'r [String] {
    match index {
        0 => &rec.local_id,
        1 => &rec.lccn,
        2 => &rec.lc_classifications,
        3 => &rec.oclc_numbers,
        4 => &rec.source_records,
        _ => &[],
    }
}

impl Importer<'_> {
    /// Follow a key through redirects, up to the hop limit.
    fn resolve_key(&self, key: &Key) -> Result<Option<(Key, Entity)>> {
        let mut current = key.clone();
        for _ in 0..=MAX_REDIRECTS {
            match self.store.get(&current)? {
                None => return Ok(None),
                Some(Entity::Redirect(r)) => {
                    if r.location == current {
                        return Ok(None);
                    }
                    current = r.location;
                }
                Some(entity) => return Ok(Some((current, entity))),
            }
        }
        Ok(None)
    }

    /// Enrich path: a matched edition absorbs whatever the record adds,
    /// without ever overwriting present data.
    ///
    /// The one creation this path allows is a work for a matched
    /// edition that has none. Only entities that actually changed are
    /// written; an import adding nothing performs no store write at
    /// all.
    pub(crate) fn enrich(&self, rec: &ImportRecord, matched: &Key) -> Result<LoadReply> {
        let Some((_, Entity::Edition(mut edition))) = self.resolve_key(matched)? else {
            return Err(FolioError::EditionNotFound(matched.to_string()));
        };
        let mut edition_changed = false;

        // Stale author references left behind by merges are repaired
        // in passing.
        for i in 0..edition.authors.len() {
            if let Some((resolved, Entity::Author(_))) = self.resolve_key(&edition.authors[i])? {
                if resolved != edition.authors[i] {
                    edition.authors[i] = resolved;
                    edition_changed = true;
                }
            }
        }

        let (mut work, mut work_status) = match edition.works.first().cloned() {
            Some(wkey) => match self.resolve_key(&wkey)? {
                Some((resolved, Entity::Work(work))) => {
                    if resolved != wkey {
                        edition.works[0] = resolved;
                        edition_changed = true;
                    }
                    (work, EntityStatus::Matched)
                }
                _ => return Err(FolioError::EditionNotFound(wkey.to_string())),
            },
            None => {
                let wkey = self.store.new_key(KeyKind::Work)?;
                let mut work = new_work(wkey.clone(), rec, &[], None);
                work.title = edition.title.clone();
                work.authors = edition
                    .authors
                    .iter()
                    .cloned()
                    .map(AuthorRole::new)
                    .collect();
                edition.works = vec![wkey];
                edition_changed = true;
                (work, EntityStatus::Created)
            }
        };

        if edition.covers.is_empty() {
            if let Some(url) = &rec.cover {
                if let Some(id) = self.upload_cover(url, &edition.key)? {
                    edition.covers.push(id);
                    edition_changed = true;
                }
            }
        }
        if edition.ocaid.is_none() && rec.ocaid.is_some() {
            edition.ocaid = rec.ocaid.clone();
            edition_changed = true;
        }

        for (i, field) in LIST_FIELDS.iter().enumerate() {
            let values = record_list(rec, i);
            let list = field(&mut edition);
            for value in values {
                edition_changed |= push_unique(list, value);
            }
        }

        if edition.description.is_none() && rec.description.is_some() {
            edition.description = rec.description.clone();
            edition_changed = true;
        }
        if edition.number_of_pages.is_none() && rec.number_of_pages.is_some() {
            edition.number_of_pages = rec.number_of_pages;
            edition_changed = true;
        }
        if edition.publishers.is_empty() && !rec.publishers.is_empty() {
            edition.publishers = rec.publishers.clone();
            edition_changed = true;
        }
        if edition.publish_date.is_none() && rec.publish_date.is_some() {
            edition.publish_date = rec.publish_date.clone();
            edition_changed = true;
        }

        for (namespace, values) in &rec.identifiers {
            let list = edition.identifiers.entry(namespace.clone()).or_default();
            for value in values {
                edition_changed |= push_unique(list, value);
            }
        }

        let mut work_changed = false;
        for field in SUBJECT_FIELDS {
            let values = record_subject_list(rec, field);
            if values.is_empty() {
                continue;
            }
            let Some(list) = work.subject_list_mut(field) else {
                continue;
            };
            for value in values {
                work_changed |= append_subject(list, value);
            }
        }
        if work.covers.is_empty() {
            if let Some(id) = edition.covers.first() {
                work.covers.push(*id);
                work_changed = true;
            }
        }
        if work.description.is_none() && edition.description.is_some() {
            work.description = edition.description.clone();
            work_changed = true;
        }

        let mut author_replies = None;
        let mut new_authors = Vec::new();
        if work.authors.is_empty() && !rec.authors.is_empty() {
            let source = &rec.source_records[0];
            let resolved = resolve_authors(self.store, &rec.authors, source)?;
            work.authors = resolved.keys.into_iter().map(AuthorRole::new).collect();
            work_changed = true;
            new_authors = resolved.new_entities;
            author_replies = Some(resolved.replies);
        }

        if work_changed && work_status == EntityStatus::Matched {
            work_status = EntityStatus::Modified;
        }

        let work_key = work.key.clone();
        let mut to_save = new_authors;
        if work_status != EntityStatus::Matched {
            to_save.push(Entity::Work(work));
        }
        if edition_changed {
            to_save.push(Entity::Edition(edition.clone()));
        }
        if !to_save.is_empty() {
            self.store
                .save_many(&to_save, "import existing book", SaveAction::EditBook)?;
        }
        info!(
            edition = %edition.key,
            changed = edition_changed,
            "enriched matched edition"
        );

        // Write-back is keyed on the incoming record: enriching an
        // archive-backed edition from a non-archive feed must not
        // touch the external item.
        if let Some(ocaid) = &rec.ocaid {
            self.write_back(ocaid, &edition.key, &work_key);
        }

        let edition_status = if edition_changed {
            EntityStatus::Modified
        } else {
            EntityStatus::Matched
        };
        Ok(LoadReply {
            success: true,
            error: None,
            edition: Some(EntityReply::new(edition.key, edition_status)),
            work: Some(EntityReply::new(work_key, work_status)),
            authors: author_replies,
        })
    }
}
