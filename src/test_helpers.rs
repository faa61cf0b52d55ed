//! Shared test utilities for the session-gal test suite.
//!
//! Provides item builders, an in-memory [`Fetcher`], and the store/surface
//! lockstep assertion used by gallery and session tests.
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let fetcher = MemoryFetcher::new()
//!     .with_json("images/list.json", r#"[{"url":"a.png"}]"#)
//!     .with_image("a.png", "image/png", PIXEL);
//! let session = Session::new(Arc::new(fetcher), base_url(), GalleryConfig::default());
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

use crate::content::EmbeddedImage;
use crate::fetch::{FetchError, FetchOptions, FetchResponse, Fetcher};
use crate::gallery::Gallery;
use crate::ingest::LocalFile;
use crate::store::{GalleryItem, ItemId};

/// A 1×1 transparent PNG.
pub const PIXEL: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

// =========================================================================
// Item builders
// =========================================================================

/// Base URL every [`MemoryFetcher`] path is resolved against.
pub fn base_url() -> Url {
    Url::parse("https://gallery.test/").unwrap()
}

/// An item holding [`PIXEL`] with its real size.
pub fn item(name: &str) -> GalleryItem {
    item_with_size(name, Some(PIXEL.len() as u64))
}

pub fn item_with_size(name: &str, size: Option<u64>) -> GalleryItem {
    let content = EmbeddedImage::encode(PIXEL, "image/png").unwrap();
    GalleryItem::new(name, content, size)
}

/// A dropped PNG file named `name`.
pub fn png_file(name: &str) -> LocalFile {
    LocalFile {
        name: name.to_string(),
        content_type: Some("image/png".to_string()),
        bytes: PIXEL.to_vec(),
    }
}

// =========================================================================
// Invariant checks
// =========================================================================

/// Assert the surface holds exactly one card per store item, newest first.
pub fn assert_in_lockstep(gallery: &Gallery) {
    let mut store_ids: Vec<ItemId> = gallery.store().iter().map(|i| i.id).collect();
    store_ids.reverse();
    assert_eq!(
        gallery.surface().ids(),
        store_ids,
        "surface cards out of step with store"
    );
}

// =========================================================================
// In-memory fetcher
// =========================================================================

/// Serves canned responses keyed by absolute URL; anything else is a 404.
///
/// Every request is recorded as a `start <url>` / `end <url>` pair in
/// [`MemoryFetcher::log`] so tests can check request ordering.
#[derive(Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Option<FetchResponse>>,
    delay: Option<Duration>,
    log: Arc<Mutex<Vec<String>>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(path: &str) -> String {
        base_url().join(path).unwrap().to_string()
    }

    pub fn with_response(mut self, path: &str, response: FetchResponse) -> Self {
        self.responses.insert(Self::key(path), Some(response));
        self
    }

    pub fn with_image(self, path: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.with_response(
            path,
            FetchResponse {
                status: 200,
                content_type: Some(content_type.to_string()),
                body: bytes.to_vec(),
            },
        )
    }

    pub fn with_json(self, path: &str, body: &str) -> Self {
        self.with_response(
            path,
            FetchResponse {
                status: 200,
                content_type: Some("application/json".to_string()),
                body: body.as_bytes().to_vec(),
            },
        )
    }

    /// Requests for `path` fail at the transport level.
    pub fn with_failure(mut self, path: &str) -> Self {
        self.responses.insert(Self::key(path), None);
        self
    }

    /// Sleep this long inside every request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn get(&self, url: &Url, _opts: FetchOptions) -> Result<FetchResponse, FetchError> {
        self.log.lock().unwrap().push(format!("start {url}"));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.log.lock().unwrap().push(format!("end {url}"));
        match self.responses.get(url.as_str()) {
            Some(Some(response)) => Ok(response.clone()),
            Some(None) => Err(FetchError::Io {
                path: url.to_string(),
                source: std::io::Error::other("connection reset"),
            }),
            None => Ok(FetchResponse {
                status: 404,
                content_type: None,
                body: Vec::new(),
            }),
        }
    }
}
