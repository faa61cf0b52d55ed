//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `gallery.toml`. User values are
//! layered over stock defaults, so a config file only needs the keys it
//! wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! manifest_path = "images/list.json"  # Manifest location, relative to the base
//!
//! [http]
//! user_agent = "session-gal"  # User-Agent sent with every request
//! no_cache = true             # Ask caches to revalidate the manifest
//!
//! [page]
//! title = "Gallery"
//! lazy_thumbnails = true      # loading="lazy" on card thumbnails
//! thumbnail_min_width = "14rem"
//! thumbnail_gap = "1rem"
//! grid_padding = "2rem"
//!
//! [page.colors.light]
//! background = "#ffffff"
//! text = "#111111"
//! text_muted = "#666666"      # Captions, sizes
//! border = "#e0e0e0"
//!
//! [page.colors.dark]
//! background = "#0a0a0a"
//! text = "#eeeeee"
//! text_muted = "#999999"
//! border = "#333333"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the config directory.
pub const CONFIG_FILENAME: &str = "gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `gallery.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Manifest location relative to the gallery base.
    pub manifest_path: String,
    /// Request settings.
    pub http: HttpConfig,
    /// Rendered page settings.
    pub page: PageConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            manifest_path: "images/list.json".to_string(),
            http: HttpConfig::default(),
            page: PageConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let path = self.manifest_path.trim();
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "manifest_path must not be empty".into(),
            ));
        }
        if path.starts_with('/') || path.contains("://") {
            return Err(ConfigError::Validation(
                "manifest_path must be relative to the gallery base".into(),
            ));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "http.user_agent must not be empty".into(),
            ));
        }
        if self.page.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "page.title must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Request settings shared by manifest and image fetches.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Send `Cache-Control: no-cache` with the manifest request.
    pub no_cache: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("session-gal/", env!("CARGO_PKG_VERSION")).to_string(),
            no_cache: true,
        }
    }
}

/// Rendered page settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// Document title and page heading.
    pub title: String,
    /// Whether card thumbnails load lazily.
    pub lazy_thumbnails: bool,
    /// Minimum card width before the grid wraps (CSS value).
    pub thumbnail_min_width: String,
    /// Gap between cards (CSS value).
    pub thumbnail_gap: String,
    /// Padding around the grid (CSS value).
    pub grid_padding: String,
    /// Light and dark color schemes.
    pub colors: ColorConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Gallery".to_string(),
            lazy_thumbnails: true,
            thumbnail_min_width: "14rem".to_string(),
            thumbnail_gap: "1rem".to_string(),
            grid_padding: "2rem".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text (file sizes).
    pub text_muted: String,
    pub border: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            border: "#e0e0e0".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#333333".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Parse and validate the contents of a `gallery.toml`.
///
/// Missing keys take their defaults (every section is `#[serde(default)]`),
/// unknown keys are a [`ConfigError::Toml`].
pub fn parse_config(content: &str) -> Result<GalleryConfig, ConfigError> {
    let config: GalleryConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load `gallery.toml` from `dir`. Without a file the stock defaults apply.
pub fn load_config(dir: &Path) -> Result<GalleryConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(GalleryConfig::default());
    }
    parse_config(&fs::read_to_string(&config_path)?)
}

/// Returns a fully-commented stock `gallery.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Session Gal Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Manifest location, relative to the gallery base (--base).
# The manifest is a JSON array of {"url" | "path", "name"?, "size"?} objects.
manifest_path = "images/list.json"

# ---------------------------------------------------------------------------
# Requests
# ---------------------------------------------------------------------------
[http]
# User-Agent header sent with every request.
# user_agent = "session-gal/<version>"

# Send Cache-Control: no-cache with the manifest request.
no_cache = true

# ---------------------------------------------------------------------------
# Rendered page
# ---------------------------------------------------------------------------
[page]
title = "Gallery"

# Add loading="lazy" to card thumbnails.
lazy_thumbnails = true

# Minimum card width before the grid wraps (CSS value).
thumbnail_min_width = "14rem"

# Gap between cards (CSS value).
thumbnail_gap = "1rem"

# Padding around the grid (CSS value).
grid_padding = "2rem"

# Colors - light mode (prefers-color-scheme: light)
[page.colors.light]
background = "#ffffff"
text = "#111111"
text_muted = "#666666"    # File sizes
border = "#e0e0e0"

# Colors - dark mode (prefers-color-scheme: dark)
[page.colors.dark]
background = "#0a0a0a"
text = "#eeeeee"
text_muted = "#999999"
border = "#333333"
"##
}

/// Generate the CSS custom properties used by the page stylesheet.
pub fn generate_page_css(page: &PageConfig) -> String {
    let colors = &page.colors;
    format!(
        r#":root {{
    --thumbnail-min-width: {min_width};
    --thumbnail-gap: {gap};
    --grid-padding: {padding};
    --color-background: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-background: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
    }}
}}"#,
        min_width = page.thumbnail_min_width,
        gap = page.thumbnail_gap,
        padding = page.grid_padding,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
    )
}
