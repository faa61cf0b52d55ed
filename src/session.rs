//! The user-facing gallery session.
//!
//! A [`Session`] bundles the shared gallery, the fetcher and the config, and
//! exposes one method per user action: page load / reload, adding files,
//! removing one item, clearing everything, downloading, and rendering.
//! It is cheap to clone; clones operate on the same gallery, which is how a
//! manifest load and a file drop can run at the same time.

use std::sync::Arc;

use maud::Markup;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use url::Url;

use crate::config::GalleryConfig;
use crate::content::ContentError;
use crate::fetch::Fetcher;
use crate::gallery::{self, Download, Gallery, SharedGallery};
use crate::ingest::{IngestError, Ingestor, LocalFile};
use crate::manifest::{LoadReport, ManifestError, ManifestLoader};
use crate::store::{GalleryItem, ItemId};
use crate::view;

#[derive(Clone)]
pub struct Session {
    ingestor: Ingestor,
    config: Arc<GalleryConfig>,
}

impl Session {
    pub fn new(fetcher: Arc<dyn Fetcher>, base: Url, config: GalleryConfig) -> Self {
        let gallery = Gallery::shared(config.page.lazy_thumbnails);
        Self {
            ingestor: Ingestor::new(fetcher, base, gallery),
            config: Arc::new(config),
        }
    }

    pub fn gallery(&self) -> &SharedGallery {
        self.ingestor.gallery()
    }

    /// Load every image listed in the manifest, one at a time.
    ///
    /// Runs on page load and again for each manual reload; a reload adds the
    /// manifest's images again rather than replacing existing items.
    pub async fn load_manifest(&self) -> Result<LoadReport, ManifestError> {
        ManifestLoader::new(
            &self.ingestor,
            &self.config.manifest_path,
            self.config.http.no_cache,
        )
        .load()
        .await
    }

    /// Manual reload action. Same as [`Session::load_manifest`].
    pub async fn reload(&self) -> Result<LoadReport, ManifestError> {
        self.load_manifest().await
    }

    /// Add files from a picker or a drop.
    ///
    /// Non-image files are ignored. Each image is encoded in its own task and
    /// inserted as soon as it is ready, so the returned ids (and the cards)
    /// follow completion order, not argument order.
    pub async fn add_files(&self, files: Vec<LocalFile>) -> Vec<ItemId> {
        let mut tasks = JoinSet::new();
        for file in files {
            if !file.is_image() {
                debug!(name = %file.name, "non-image file ignored");
                continue;
            }
            let ingestor = self.ingestor.clone();
            tasks.spawn(async move {
                let name = file.name.clone();
                (name, ingestor.ingest_file(file).await)
            });
        }

        let mut added = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(id))) => added.push(id),
                Ok((name, Err(err))) => warn!(name = %name, error = %err, "file not added"),
                Err(err) => warn!(error = %err, "file task failed"),
            }
        }
        added
    }

    /// Add a single file. Returns `Ok(None)` for non-image files.
    pub async fn add_file(&self, file: LocalFile) -> Result<Option<ItemId>, IngestError> {
        match self.ingestor.ingest_file(file).await {
            Ok(id) => Ok(Some(id)),
            Err(IngestError::NotImage { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Remove one item and its card. Unknown ids are a no-op returning false.
    pub fn remove(&self, id: &ItemId) -> bool {
        gallery::lock(self.gallery()).remove(id)
    }

    /// Clear-all action.
    pub fn clear(&self) {
        gallery::lock(self.gallery()).clear();
    }

    pub fn len(&self) -> usize {
        gallery::lock(self.gallery()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the items, newest first.
    pub fn items(&self) -> Vec<GalleryItem> {
        gallery::lock(self.gallery()).items_newest_first()
    }

    /// Card ids in render order.
    pub fn card_ids(&self) -> Vec<ItemId> {
        gallery::lock(self.gallery()).surface().ids()
    }

    pub fn download(&self, id: &ItemId) -> Option<Result<Download, ContentError>> {
        gallery::lock(self.gallery()).download(id)
    }

    /// Render the whole page for the current state.
    pub fn render_page(&self) -> Markup {
        let gallery = gallery::lock(self.gallery());
        view::render_page(gallery.surface(), &self.config.page)
    }
}
