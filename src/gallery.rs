//! Store and surface, mutated together.
//!
//! [`Gallery`] is the only place either half changes, which is what keeps
//! the one-card-per-item correspondence: an item is appended to the store
//! and its card prepended to the surface in the same call, and removal or
//! clearing touches both before returning.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::content::ContentError;
use crate::store::{GalleryItem, GalleryStore, ItemId};
use crate::view::{self, Surface};

/// Gallery shared between the session's concurrent ingestion tasks.
pub type SharedGallery = Arc<Mutex<Gallery>>;

/// Lock a shared gallery. Every critical section is a single synchronous
/// mutation, so a poisoned lock still guards consistent data.
pub fn lock(gallery: &SharedGallery) -> MutexGuard<'_, Gallery> {
    gallery.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An item's content offered for saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Suggested filename, see [`GalleryItem::download_filename`].
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct Gallery {
    store: GalleryStore,
    surface: Surface,
    lazy_thumbnails: bool,
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Gallery {
    pub fn new(lazy_thumbnails: bool) -> Self {
        Self {
            store: GalleryStore::new(),
            surface: Surface::new(),
            lazy_thumbnails,
        }
    }

    pub fn shared(lazy_thumbnails: bool) -> SharedGallery {
        Arc::new(Mutex::new(Self::new(lazy_thumbnails)))
    }

    /// Add an item and render its card at the front of the grid.
    pub fn insert(&mut self, item: GalleryItem) -> ItemId {
        let id = item.id;
        let card = view::render_card(&item, self.lazy_thumbnails);
        self.store.add(item);
        self.surface.prepend(id, card);
        id
    }

    /// Remove an item and its card. Unknown ids are a no-op returning false.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        if self.store.remove(id).is_none() {
            return false;
        }
        self.surface.remove(id);
        true
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.surface.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&GalleryItem> {
        self.store.get(id)
    }

    pub fn store(&self) -> &GalleryStore {
        &self.store
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Items newest first, matching the rendered order.
    pub fn items_newest_first(&self) -> Vec<GalleryItem> {
        self.store.iter().rev().cloned().collect()
    }

    /// The item's content as a file to save, `None` for unknown ids.
    pub fn download(&self, id: &ItemId) -> Option<Result<Download, ContentError>> {
        let item = self.store.get(id)?;
        Some(item.content.decode().map(|bytes| Download {
            filename: item.download_filename(),
            mime: item.content.mime().to_string(),
            bytes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{assert_in_lockstep, item};

    #[test]
    fn insert_adds_to_store_and_surface() {
        let mut gallery = Gallery::default();
        let id = gallery.insert(item("a.png"));
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.surface().ids(), vec![id]);
        assert_in_lockstep(&gallery);
    }

    #[test]
    fn render_order_is_reverse_of_store_order() {
        let mut gallery = Gallery::default();
        let a = gallery.insert(item("a"));
        let b = gallery.insert(item("b"));
        let c = gallery.insert(item("c"));
        let store_order: Vec<_> = gallery.store().iter().map(|i| i.id).collect();
        assert_eq!(store_order, vec![a, b, c]);
        assert_eq!(gallery.surface().ids(), vec![c, b, a]);
        let newest: Vec<_> = gallery.items_newest_first().iter().map(|i| i.id).collect();
        assert_eq!(newest, vec![c, b, a]);
    }

    #[test]
    fn remove_drops_item_and_card() {
        let mut gallery = Gallery::default();
        let a = gallery.insert(item("a"));
        let b = gallery.insert(item("b"));

        assert!(gallery.remove(&a));
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.surface().ids(), vec![b]);
        assert_in_lockstep(&gallery);

        assert!(!gallery.remove(&a));
        assert_eq!(gallery.len(), 1);
        assert_in_lockstep(&gallery);
    }

    #[test]
    fn clear_empties_both() {
        let mut gallery = Gallery::default();
        gallery.insert(item("a"));
        gallery.insert(item("b"));
        gallery.clear();
        assert!(gallery.is_empty());
        assert!(gallery.surface().is_empty());
    }

    #[test]
    fn download_decodes_content_with_escaped_name() {
        let mut gallery = Gallery::default();
        let id = gallery.insert(item("summer trip.png"));
        let download = gallery.download(&id).unwrap().unwrap();
        assert_eq!(download.filename, "summer%20trip.png");
        assert_eq!(download.mime, "image/png");
        assert_eq!(download.bytes, crate::test_helpers::PIXEL);
    }

    #[test]
    fn download_of_dot_dot_name_is_a_file_name() {
        let mut gallery = Gallery::default();
        let id = gallery.insert(item(".."));
        let download = gallery.download(&id).unwrap().unwrap();
        assert_eq!(download.filename, format!("{id}.png"));
    }

    #[test]
    fn download_unknown_id_is_none() {
        let gallery = Gallery::default();
        assert!(gallery.download(&ItemId::generate()).is_none());
    }

    #[test]
    fn lazy_flag_controls_card_markup() {
        let mut gallery = Gallery::new(false);
        gallery.insert(item("a"));
        let card = gallery.surface().cards().next().unwrap();
        assert!(!card.markup.0.contains("loading="));
    }
}
