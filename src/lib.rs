//! # Session Gal
//!
//! An in-memory image gallery. Images come from two places: a JSON manifest
//! served next to the page, and local files picked or dropped by the user.
//! Every image is embedded into the page as a `data:` URL, so the rendered
//! HTML is self-contained and each card can be viewed, downloaded, or
//! removed without another request.
//!
//! # Architecture
//!
//! ```text
//! manifest (images/list.json) ─┐
//!                              ├─→ Ingestor ─→ Gallery { store, surface } ─→ HTML page
//! local files (picker / drop) ─┘
//! ```
//!
//! Manifest descriptors are fetched strictly one after another, in manifest
//! order. Local files are encoded concurrently and land in whatever order
//! they finish. Both paths insert through the same [`gallery::Gallery`],
//! which keeps the item store and the rendered cards in lockstep: every
//! stored item has exactly one card, newest first.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | User-facing actions: load / reload, add files, remove, clear, download, render |
//! | [`manifest`] | Manifest fetch, descriptor parsing, sequential loading |
//! | [`ingest`] | Descriptor and local-file ingestion into the gallery |
//! | [`gallery`] | The shared gallery: store and surface mutated together |
//! | [`store`] | Ordered in-memory item collection and item ids |
//! | [`view`] | Maud templates for cards, the full-size viewer, and the page |
//! | [`content`] | `data:` URL encoding and decoding, image content-type checks |
//! | [`fetch`] | The [`fetch::Fetcher`] seam and its reqwest / `file://` client |
//! | [`urlnorm`] | Locator repair for double-encoded percent escapes |
//! | [`format`] | Human-readable byte sizes |
//! | [`config`] | `gallery.toml` loading, validation, merging, and CSS generation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Embedded Content
//!
//! Images are kept as `data:` URLs rather than as references to their
//! source. A removed or re-hosted source never breaks a card, downloads need
//! no network access, and a saved page keeps working offline. Encoding runs
//! on tokio's blocking pool so a large drop does not stall a manifest load
//! in flight.
//!
//! ## Escaped Markup
//!
//! Names come from manifests and file systems the page does not control.
//! All markup is produced by [Maud](https://maud.lambda.xyz/), which escapes
//! every interpolated value, so a crafted name renders as text.
//!
//! ## Lenient Manifests
//!
//! A missing, unreachable, or malformed manifest is not an error the user
//! has to act on: it is logged and the gallery simply shows no manifest
//! images. A bad entry skips that entry only.

pub mod config;
pub mod content;
pub mod fetch;
pub mod format;
pub mod gallery;
pub mod ingest;
pub mod manifest;
pub mod output;
pub mod session;
pub mod store;
pub mod urlnorm;
pub mod view;

pub use config::GalleryConfig;
pub use session::Session;

#[cfg(test)]
pub(crate) mod test_helpers;
