//! CLI output formatting.
//!
//! Output leads with what the user sees in the gallery, newest first, the
//! same order as the rendered grid:
//!
//! ```text
//! Gallery (3 images)
//! 001 Harbor at dusk (470.8 KB)
//!     id-6f1c0b2e9d4a4c51a7e3f0d2b8c9e1a4
//! 002 dunes at noon.png (1.2 MB)
//!     id-0a9d...
//! ```
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::format::format_bytes;
use crate::manifest::LoadReport;
use crate::store::GalleryItem;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// One line per item: index, name, and size when known.
fn item_line(index: usize, item: &GalleryItem) -> String {
    let size = format_bytes(item.size);
    if size.is_empty() {
        format!("{} {}", format_index(index), item.name)
    } else {
        format!("{} {} ({})", format_index(index), item.name, size)
    }
}

/// Format the outcome of a manifest load.
pub fn format_load_report(report: &LoadReport) -> Vec<String> {
    let mut line = format!("Manifest: {} added", plural(report.added.len(), "image"));
    if report.failed > 0 {
        line.push_str(&format!(", {} failed", report.failed));
    }
    if report.skipped > 0 {
        line.push_str(&format!(", {} without locator", report.skipped));
    }
    vec![line]
}

/// Format the gallery contents, newest first.
pub fn format_gallery(items: &[GalleryItem]) -> Vec<String> {
    let mut lines = vec![format!("Gallery ({})", plural(items.len(), "image"))];
    for (i, item) in items.iter().enumerate() {
        lines.push(item_line(i + 1, item));
        lines.push(format!("{}{}", indent(1), item.id));
    }
    lines
}

/// Format the files written by `download`.
pub fn format_downloads(written: &[(String, u64)], dir: &Path) -> Vec<String> {
    let mut lines = vec![format!("Downloads → {}", dir.display())];
    for (i, (filename, bytes)) in written.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            filename,
            format_bytes(Some(*bytes))
        ));
    }
    lines
}

pub fn print_load_report(report: &LoadReport) {
    for line in format_load_report(report) {
        println!("{}", line);
    }
}

pub fn print_gallery(items: &[GalleryItem]) {
    for line in format_gallery(items) {
        println!("{}", line);
    }
}

pub fn print_downloads(written: &[(String, u64)], dir: &Path) {
    for line in format_downloads(written, dir) {
        println!("{}", line);
    }
}
