//! HTML rendering of gallery items.
//!
//! Uses [maud](https://maud.lambda.xyz/) like the rest of the crate's output:
//! every interpolated name goes through maud's escaping, so a file called
//! `<img onerror=alert(1)>.png` shows up as text, never as markup.
//!
//! ## Surface
//!
//! [`Surface`] is the rendered counterpart of the store: one [`Card`] per
//! item, keyed by [`ItemId`], newest first. It is only mutated through
//! [`Gallery`](crate::gallery::Gallery), which keeps the two in lockstep.
//!
//! ## Card layout
//!
//! ```text
//! div.gallery-col[data-id]
//! ├── div.gallery-card
//! │   ├── img.gallery-thumb        lazy thumbnail
//! │   ├── div.gallery-actions      view / download / remove
//! │   └── div.gallery-caption      name + formatted size
//! └── div.viewer#view-<id>         full-size presentation (CSS :target)
//! ```

use crate::config::{self, PageConfig};
use crate::format::format_bytes;
use crate::store::{GalleryItem, ItemId};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::VecDeque;

const CSS_STATIC: &str = include_str!("../static/gallery.css");
const JS: &str = include_str!("../static/gallery.js");

/// Anchor target of an item's viewer.
pub fn viewer_anchor(id: &ItemId) -> String {
    format!("view-{id}")
}

/// Render the card for one item.
pub fn render_card(item: &GalleryItem, lazy: bool) -> Markup {
    let id = item.id.to_string();
    html! {
        div.gallery-col data-id=(id) {
            div.gallery-card {
                img.gallery-thumb src=(item.content) alt=(item.name) loading=[lazy.then_some("lazy")];
                div.gallery-actions {
                    a.view-btn href={ "#" (viewer_anchor(&item.id)) } title="View" { "View" }
                    a.download-btn
                        href=(item.content)
                        download=(item.download_filename())
                        title="Download" { "Download" }
                    button.delete-btn type="button" data-id=(id) title="Remove" { "Remove" }
                }
                div.gallery-caption {
                    div.gallery-name { (item.name) }
                    small.gallery-size { (format_bytes(item.size)) }
                }
            }
            (render_viewer(item))
        }
    }
}

/// Render the enlarged presentation of an item, captioned with its name.
pub fn render_viewer(item: &GalleryItem) -> Markup {
    html! {
        div.viewer id=(viewer_anchor(&item.id)) role="dialog" aria-label=(item.name) {
            a.viewer-close href="#" title="Close" { "×" }
            figure {
                img.viewer-image src=(item.content) alt=(item.name);
                figcaption.viewer-title { (item.name) }
            }
        }
    }
}

/// Empty card skeleton the page script clones for files added in the browser.
pub fn render_card_template(lazy: bool) -> Markup {
    html! {
        template id="cardTemplate" {
            div.gallery-col {
                div.gallery-card {
                    img.gallery-thumb alt="" loading=[lazy.then_some("lazy")];
                    div.gallery-actions {
                        a.view-btn title="View" { "View" }
                        a.download-btn title="Download" { "Download" }
                        button.delete-btn type="button" title="Remove" { "Remove" }
                    }
                    div.gallery-caption {
                        div.gallery-name {}
                        small.gallery-size {}
                    }
                }
                div.viewer role="dialog" {
                    a.viewer-close href="#" title="Close" { "×" }
                    figure {
                        img.viewer-image alt="";
                        figcaption.viewer-title {}
                    }
                }
            }
        }
    }
}

/// A rendered card and the item it mirrors.
#[derive(Debug, Clone)]
pub struct Card {
    pub id: ItemId,
    pub markup: Markup,
}

/// The rendered gallery grid, newest card first.
#[derive(Debug, Default)]
pub struct Surface {
    cards: VecDeque<Card>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a card at the front of the grid.
    pub fn prepend(&mut self, id: ItemId, markup: Markup) {
        self.cards.push_front(Card { id, markup });
    }

    /// Drop the card for `id`. Returns false when no such card exists.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        match self.cards.iter().position(|c| &c.id == id) {
            Some(idx) => {
                self.cards.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Card ids in render order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.cards.iter().map(|c| c.id).collect()
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}

/// Render the full gallery page around the current surface.
pub fn render_page(surface: &Surface, page: &PageConfig) -> Markup {
    let css = format!("{}\n\n{}", config::generate_page_css(page), CSS_STATIC);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (page.title) }
                style { (PreEscaped(css)) }
            }
            body {
                header.gallery-header {
                    h1 { (page.title) }
                    nav.gallery-controls {
                        a id="loadServer" href="" title="Reload" { "Reload" }
                        button id="clearAll" type="button" title="Clear all" { "Clear all" }
                    }
                }
                section.gallery-drop id="dropArea" {
                    label for="fileInput" {
                        "Drop images here or "
                        span.gallery-pick { "choose files" }
                    }
                    input id="fileInput" type="file" accept="image/*" multiple;
                }
                main.gallery-grid id="gallery" {
                    @for card in surface.cards() {
                        (card.markup)
                    }
                }
                (render_card_template(page.lazy_thumbnails))
                script { (PreEscaped(JS)) }
            }
        }
    }
}
