//! Turning descriptors and local files into gallery items.
//!
//! Both paths end the same way: bytes are encoded into an
//! [`EmbeddedImage`] (awaited on the blocking pool), and only then is the
//! gallery locked for a single insert. A failure at any earlier step leaves
//! the gallery exactly as it was.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::content::{ContentError, EmbeddedImage, is_image_type, mime_essence};
use crate::fetch::{FetchError, FetchOptions, Fetcher};
use crate::gallery::{self, SharedGallery};
use crate::manifest::Descriptor;
use crate::store::{GalleryItem, ItemId};
use crate::urlnorm::normalize_locator;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("invalid locator {locator:?}: {source}")]
    BadLocator {
        locator: String,
        #[source]
        source: url::ParseError,
    },
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("{url} answered with status {status}")]
    Status { url: Url, status: u16 },
    #[error("{source_name} is not an image (content type {content_type:?})")]
    NotImage {
        source_name: String,
        content_type: Option<String>,
    },
    #[error("encoding failed: {0}")]
    Encode(#[from] ContentError),
}

/// A local file handed over by a file picker or a drop.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub name: String,
    /// Declared content type; files without an `image/*` type are ignored.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn is_image(&self) -> bool {
        is_image_type(self.content_type.as_deref())
    }
}

/// Display name fallback: the last path segment of the locator.
pub fn name_from_locator(locator: &str) -> String {
    let path = locator
        .split(['?', '#'])
        .next()
        .unwrap_or(locator);
    match path.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => locator.to_string(),
    }
}

#[derive(Clone)]
pub struct Ingestor {
    fetcher: Arc<dyn Fetcher>,
    base: Url,
    gallery: SharedGallery,
}

impl Ingestor {
    pub fn new(fetcher: Arc<dyn Fetcher>, base: Url, gallery: SharedGallery) -> Self {
        Self {
            fetcher,
            base,
            gallery,
        }
    }

    /// Location relative locators are resolved against.
    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    pub fn gallery(&self) -> &SharedGallery {
        &self.gallery
    }

    /// Fetch a manifest descriptor's image and add it to the gallery.
    pub async fn ingest_remote(&self, descriptor: &Descriptor) -> Result<ItemId, IngestError> {
        let normalized = normalize_locator(&descriptor.locator);
        let url = self
            .base
            .join(&normalized.encoded)
            .map_err(|source| IngestError::BadLocator {
                locator: descriptor.locator.clone(),
                source,
            })?;

        let response = self.fetcher.get(&url, FetchOptions::default()).await?;
        if !response.is_success() {
            return Err(IngestError::Status {
                url,
                status: response.status,
            });
        }
        let Some(mime) = response.mime_essence().filter(|_| response.is_image()) else {
            return Err(IngestError::NotImage {
                source_name: url.to_string(),
                content_type: response.content_type,
            });
        };

        let name = descriptor.name.clone().unwrap_or_else(|| {
            name_from_locator(normalized.decoded.as_deref().unwrap_or(&descriptor.locator))
        });
        let size = descriptor.size.or(Some(response.body.len() as u64));
        let content = EmbeddedImage::encode_async(response.body, mime).await?;
        Ok(self.commit(GalleryItem::new(name, content, size)))
    }

    /// Add a local file to the gallery. Non-image files are rejected with
    /// [`IngestError::NotImage`]; callers treat that as a silent skip.
    pub async fn ingest_file(&self, file: LocalFile) -> Result<ItemId, IngestError> {
        let Some(content_type) = file.content_type.filter(|t| is_image_type(Some(t))) else {
            return Err(IngestError::NotImage {
                source_name: file.name,
                content_type: None,
            });
        };
        let size = file.bytes.len() as u64;
        let content = EmbeddedImage::encode_async(file.bytes, mime_essence(&content_type)).await?;
        Ok(self.commit(GalleryItem::new(file.name, content, Some(size))))
    }

    fn commit(&self, item: GalleryItem) -> ItemId {
        debug!(name = %item.name, size = ?item.size, "image added");
        gallery::lock(&self.gallery).insert(item)
    }
}
