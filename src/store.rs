//! The in-memory item collection.
//!
//! Items live only for the session: nothing here is persisted, and dropping
//! the store drops every image with it.

use crate::content::{EmbeddedImage, extension_for};
use crate::urlnorm::encode_component;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Opaque item identifier, rendered as `id-<32 hex>`.
///
/// Random v4 UUIDs keep collisions out of reach for any human-scale
/// session without needing a shared counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the `id-<hex>` form produced by `Display`.
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.strip_prefix("id-")?;
        Uuid::parse_str(hex).ok().map(Self)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id-{}", self.0.simple())
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.to_string()
    }
}

/// A single gallery entry.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryItem {
    pub id: ItemId,
    /// Display name (descriptor name, file name, or locator's last segment)
    pub name: String,
    pub content: EmbeddedImage,
    /// Byte count; `None` when no source reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl GalleryItem {
    /// Create an item with a freshly generated id.
    pub fn new(name: impl Into<String>, content: EmbeddedImage, size: Option<u64>) -> Self {
        Self {
            id: ItemId::generate(),
            name: name.into(),
            content,
            size,
        }
    }

    /// Suggested filename for saving: the display name, percent-encoded.
    /// Names that would resolve to a directory (`.`, `..`, empty) become
    /// `<id>.<ext>` instead.
    pub fn download_filename(&self) -> String {
        let encoded = encode_component(&self.name);
        match encoded.as_str() {
            "" | "." | ".." => format!("{}.{}", self.id, extension_for(self.content.mime())),
            _ => encoded,
        }
    }
}

/// Ordered collection of gallery items, in append order.
#[derive(Debug, Default)]
pub struct GalleryStore {
    items: Vec<GalleryItem>,
}

impl GalleryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: GalleryItem) {
        self.items.push(item);
    }

    /// Remove by id, keeping the order of the rest. Absent ids are a no-op.
    pub fn remove(&mut self, id: &ItemId) -> Option<GalleryItem> {
        let idx = self.items.iter().position(|i| &i.id == id)?;
        Some(self.items.remove(idx))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, id: &ItemId) -> Option<&GalleryItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in append order (oldest first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &GalleryItem> {
        self.items.iter()
    }
}
