//! Resource fetching for manifests and images.
//!
//! The loader and ingestor only see the [`Fetcher`] trait. [`Client`] is the
//! production implementation: `http`/`https` through `reqwest`, `file` URLs
//! straight from disk so a gallery directory can be loaded without a server.
//! A missing file is reported as a 404 response rather than an error, the
//! same way a static file server would answer.

use async_trait::async_trait;
use image::ImageFormat;
use std::path::Path;
use thiserror::Error;
use url::Url;

use crate::config::HttpConfig;
use crate::content;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported URL scheme {0:?}")]
    UnsupportedScheme(String),
    #[error("file URL {0} does not map to a local path")]
    BadFileUrl(Url),
}

/// Per-request options.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Ask intermediaries to revalidate instead of serving a cached copy.
    pub no_cache: bool,
}

/// A completed response. Non-success statuses are still responses; callers
/// decide what to do with them.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Lowercase content type without parameters, if any was declared.
    pub fn mime_essence(&self) -> Option<String> {
        self.content_type.as_deref().map(content::mime_essence)
    }

    pub fn is_image(&self) -> bool {
        content::is_image_type(self.content_type.as_deref())
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &Url, opts: FetchOptions) -> Result<FetchResponse, FetchError>;
}

/// Fetches over HTTP(S) and from the local filesystem.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
}

impl Client {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http })
    }

    async fn get_http(&self, url: &Url, opts: FetchOptions) -> Result<FetchResponse, FetchError> {
        let mut request = self.http.get(url.clone());
        if opts.no_cache {
            request = request.header(reqwest::header::CACHE_CONTROL, "no-cache");
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();
        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }

    async fn get_file(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|_| FetchError::BadFileUrl(url.clone()))?;
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(FetchResponse {
                status: 200,
                content_type: guess_content_type(&path),
                body,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse {
                status: 404,
                content_type: None,
                body: Vec::new(),
            }),
            Err(source) => Err(FetchError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

#[async_trait]
impl Fetcher for Client {
    async fn get(&self, url: &Url, opts: FetchOptions) -> Result<FetchResponse, FetchError> {
        match url.scheme() {
            "http" | "https" => self.get_http(url, opts).await,
            "file" => self.get_file(url).await,
            other => Err(FetchError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Content type for a local file, from its extension.
pub fn guess_content_type(path: &Path) -> Option<String> {
    if let Ok(format) = ImageFormat::from_path(path) {
        return Some(format.to_mime_type().to_string());
    }
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "json" => "application/json",
        "txt" | "md" => "text/plain",
        "html" | "htm" => "text/html",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    };
    Some(mime.to_string())
}
