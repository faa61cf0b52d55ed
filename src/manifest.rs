//! Manifest parsing and loading.
//!
//! The manifest is a JSON array of image descriptors:
//!
//! ```json
//! [
//!   { "url": "images/harbor.jpg", "name": "Harbor at dusk", "size": 482113 },
//!   { "path": "images/dunes%20at%20noon.png" },
//!   { "url": "https://cdn.example.com/a.webp" }
//! ]
//! ```
//!
//! ## Descriptor precedence
//!
//! All field fallbacks are decided once, in [`Descriptor::from_value`]:
//!
//! | Field   | Rule |
//! |---------|------|
//! | locator | `url` if a non-empty string, else `path` if a non-empty string, else skip the entry |
//! | name    | `name` if a non-empty string, else derived from the locator at ingestion |
//! | size    | `size` if a positive number, else the fetched body length at ingestion |
//!
//! ## Loading
//!
//! [`ManifestLoader::load`] ingests descriptors strictly one after the
//! other: the next fetch starts only once the previous image is in the
//! gallery or has failed. A bad descriptor is logged and skipped; only an
//! unreachable or malformed manifest stops the load, and even then nothing
//! in the gallery changes.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::fetch::{FetchError, FetchOptions};
use crate::ingest::Ingestor;
use crate::store::ItemId;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("invalid manifest location {path:?}: {source}")]
    BadLocation {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("manifest fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("manifest not available (status {0})")]
    Unavailable(u16),
    #[error("manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("manifest is not an array")]
    NotArray,
}

/// One validated manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Raw locator as written in the manifest (not yet normalized).
    pub locator: String,
    pub name: Option<String>,
    pub size: Option<u64>,
}

impl Descriptor {
    /// Apply the precedence rules to a manifest entry. Returns `None` when the
    /// entry has no usable locator (including non-object entries).
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let locator = non_empty_str(obj.get("url")).or_else(|| non_empty_str(obj.get("path")))?;
        Some(Self {
            locator: locator.to_string(),
            name: non_empty_str(obj.get("name")).map(str::to_string),
            size: obj.get("size").and_then(positive_size),
        })
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn positive_size(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return (n > 0).then_some(n);
    }
    let f = value.as_f64()?;
    (f.is_finite() && f >= 1.0).then(|| f as u64)
}

/// Parse a manifest body into its raw entries.
pub fn parse_manifest(body: &[u8]) -> Result<Vec<Value>, ManifestError> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Array(entries) => Ok(entries),
        _ => Err(ManifestError::NotArray),
    }
}

/// Outcome of one manifest load.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Ids of the items added, in manifest order.
    pub added: Vec<ItemId>,
    /// Entries without a locator.
    pub skipped: usize,
    /// Entries whose fetch, type check or encoding failed.
    pub failed: usize,
}

/// Loads the manifest and feeds its descriptors to an [`Ingestor`].
pub struct ManifestLoader<'a> {
    ingestor: &'a Ingestor,
    manifest_path: &'a str,
    no_cache: bool,
}

impl<'a> ManifestLoader<'a> {
    pub fn new(ingestor: &'a Ingestor, manifest_path: &'a str, no_cache: bool) -> Self {
        Self {
            ingestor,
            manifest_path,
            no_cache,
        }
    }

    /// Absolute manifest URL.
    pub fn manifest_url(&self) -> Result<Url, ManifestError> {
        self.ingestor
            .base()
            .join(self.manifest_path)
            .map_err(|source| ManifestError::BadLocation {
                path: self.manifest_path.to_string(),
                source,
            })
    }

    /// Fetch and validate the manifest, returning its raw entries.
    pub async fn fetch(&self) -> Result<Vec<Value>, ManifestError> {
        let url = self.manifest_url()?;
        let opts = FetchOptions {
            no_cache: self.no_cache,
        };
        let response = self.ingestor.fetcher().get(&url, opts).await?;
        if !response.is_success() {
            return Err(ManifestError::Unavailable(response.status));
        }
        parse_manifest(&response.body)
    }

    /// Fetch the manifest and ingest every descriptor in order.
    ///
    /// Errors only describe why the manifest itself could not be used; the
    /// gallery is untouched in that case.
    pub async fn load(&self) -> Result<LoadReport, ManifestError> {
        let entries = match self.fetch().await {
            Ok(entries) => entries,
            Err(err) => {
                match &err {
                    ManifestError::Unavailable(_) | ManifestError::Fetch(_) => {
                        info!(manifest = self.manifest_path, error = %err, "no manifest images loaded")
                    }
                    _ => warn!(manifest = self.manifest_path, error = %err, "manifest ignored"),
                }
                return Err(err);
            }
        };
        debug!(entries = entries.len(), "manifest fetched");

        let mut report = LoadReport::default();
        for (index, entry) in entries.iter().enumerate() {
            let Some(descriptor) = Descriptor::from_value(entry) else {
                debug!(index, "manifest entry without locator skipped");
                report.skipped += 1;
                continue;
            };
            match self.ingestor.ingest_remote(&descriptor).await {
                Ok(id) => report.added.push(id),
                Err(err) => {
                    warn!(index, locator = %descriptor.locator, error = %err, "manifest image skipped");
                    report.failed += 1;
                }
            }
        }
        info!(
            added = report.added.len(),
            skipped = report.skipped,
            failed = report.failed,
            "manifest loaded"
        );
        Ok(report)
    }
}
