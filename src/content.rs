//! Self-contained image payloads.
//!
//! Every gallery item carries its image as a `data:<mime>;base64,<payload>`
//! URL. The same string serves as the thumbnail `src`, the viewer `src` and
//! the download `href`, so nothing needs the network once an item exists.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use serde::Serialize;
use thiserror::Error;

const IMAGE_PREFIX: &str = "image/";

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("content type {0:?} is not an image type")]
    NotImage(String),
    #[error("encoding task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("not a base64 data URL")]
    NotDataUrl,
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Reduce a content type header to its lowercase essence:
/// `"Image/PNG; charset=binary"` → `"image/png"`.
pub fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a declared content type denotes image data.
pub fn is_image_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|t| mime_essence(t).starts_with(IMAGE_PREFIX))
}

/// Usual file extension for an image mime type, `"bin"` when unknown.
pub fn extension_for(mime: &str) -> &'static str {
    if let Some(ext) = ImageFormat::from_mime_type(mime).and_then(|f| f.extensions_str().first().copied()) {
        return ext;
    }
    match mime {
        "image/svg+xml" => "svg",
        _ => "bin",
    }
}

/// An image embedded as a base64 `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EmbeddedImage {
    data_url: String,
}

impl EmbeddedImage {
    /// Encode bytes synchronously. The content type must be an image type.
    pub fn encode(bytes: &[u8], content_type: &str) -> Result<Self, ContentError> {
        let mime = mime_essence(content_type);
        if !mime.starts_with(IMAGE_PREFIX) {
            return Err(ContentError::NotImage(content_type.to_string()));
        }
        let payload = STANDARD.encode(bytes);
        Ok(Self {
            data_url: format!("data:{mime};base64,{payload}"),
        })
    }

    /// Encode on the blocking pool. Large images don't stall other tasks
    /// while base64 runs.
    pub async fn encode_async(bytes: Vec<u8>, content_type: String) -> Result<Self, ContentError> {
        tokio::task::spawn_blocking(move || Self::encode(&bytes, &content_type)).await?
    }

    /// The full `data:` URL.
    pub fn as_str(&self) -> &str {
        &self.data_url
    }

    /// The mime type embedded in the URL.
    pub fn mime(&self) -> &str {
        self.data_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .unwrap_or_default()
    }

    /// Decode the payload back into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, ContentError> {
        let (_, payload) = self
            .data_url
            .split_once(";base64,")
            .ok_or(ContentError::NotDataUrl)?;
        Ok(STANDARD.decode(payload)?)
    }
}

impl std::fmt::Display for EmbeddedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.data_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn essence_strips_parameters_and_case() {
        assert_eq!(mime_essence("Image/PNG; charset=binary"), "image/png");
        assert_eq!(mime_essence(" image/webp "), "image/webp");
    }

    #[test]
    fn image_type_detection() {
        assert!(is_image_type(Some("image/jpeg")));
        assert!(is_image_type(Some("IMAGE/GIF")));
        assert!(!is_image_type(Some("text/plain")));
        assert!(!is_image_type(Some("")));
        assert!(!is_image_type(None));
    }

    #[test]
    fn extensions_from_mime() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/svg+xml"), "svg");
        assert_eq!(extension_for("image/x-unknown"), "bin");
    }

    #[test]
    fn encode_builds_data_url() {
        let img = EmbeddedImage::encode(b"abc", "image/png").unwrap();
        assert_eq!(img.as_str(), "data:image/png;base64,YWJj");
        assert_eq!(img.mime(), "image/png");
    }

    #[test]
    fn encode_rejects_non_image() {
        let err = EmbeddedImage::encode(b"hello", "text/plain").unwrap_err();
        assert!(matches!(err, ContentError::NotImage(_)));
    }

    #[test]
    fn decode_returns_original_bytes() {
        let bytes = vec![0u8, 1, 2, 254, 255];
        let img = EmbeddedImage::encode(&bytes, "image/x-icon").unwrap();
        assert_eq!(img.decode().unwrap(), bytes);
    }

    #[tokio::test]
    async fn async_encoding_matches_sync() {
        let bytes = vec![7u8; 4096];
        let sync = EmbeddedImage::encode(&bytes, "image/png").unwrap();
        let async_ = EmbeddedImage::encode_async(bytes, "image/png".into())
            .await
            .unwrap();
        assert_eq!(sync, async_);
    }
}
