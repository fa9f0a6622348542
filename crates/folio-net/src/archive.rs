use anyhow::{bail, Result};
use serde::Serialize;
use tracing::debug;

use folio_core::services::{ItemLinks, ItemMetadataWriter};

#[derive(Debug, Serialize)]
struct MetadataPatch<'a> {
    catalog_edition: &'a str,
    catalog_work: &'a str,
}

/// Writes the catalog ids of a freshly imported book back to the
/// archive item its `ocaid` names. The importer treats failures as
/// log-and-continue.
pub struct ArchiveItemClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ArchiveItemClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, item_id: &str) -> String {
        format!("{}/metadata/{item_id}", self.base_url.trim_end_matches('/'))
    }
}

impl ItemMetadataWriter for ArchiveItemClient {
    fn write(&self, item_id: &str, links: &ItemLinks) -> Result<()> {
        let patch = MetadataPatch {
            catalog_edition: &links.edition_id,
            catalog_work: &links.work_id,
        };
        let response = self
            .client
            .post(self.endpoint(item_id))
            .json(&patch)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            bail!("metadata write for {item_id} failed with status {status}");
        }
        debug!(%item_id, "archive item metadata updated");
        Ok(())
    }
}
