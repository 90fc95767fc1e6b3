use std::io::Write;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use tempfile::NamedTempFile;

use crate::fetch::{map_reqwest_error, map_status, FetchSettings, HttpPageFetcher};
use crate::filename::handle_prefix;
use crate::persist::ensure_cache_dir;
use crate::{FailureKind, FetchError};

/// Short-lived local handle to fetched image bytes, the object-URL analog.
///
/// The bytes are spooled to a named file in the cache directory; the path is
/// usable as a display source. The backing file is removed when the handle
/// is dropped — exactly once, enforced by ownership.
#[derive(Debug)]
pub struct ImageHandle {
    file: NamedTempFile,
    byte_len: u64,
    content_type: Option<String>,
}

impl ImageHandle {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// Outcome of a protected image load. Authorization failures are a normal
/// outcome, not an error: the consumer renders nothing for that image.
#[derive(Debug)]
pub enum ImageOutcome {
    Ready(ImageHandle),
    Unauthorized,
}

#[async_trait::async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load_image(&self, url: &str) -> Result<ImageOutcome, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    settings: FetchSettings,
    cache_dir: PathBuf,
}

impl HttpImageLoader {
    pub fn new(settings: FetchSettings, cache_dir: PathBuf) -> Self {
        Self {
            settings,
            cache_dir,
        }
    }
}

#[async_trait::async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load_image(&self, url: &str) -> Result<ImageOutcome, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = HttpPageFetcher::build_client(&self.settings)?;

        let response = client.get(parsed).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if matches!(status.as_u16(), 401 | 403) {
            return Ok(ImageOutcome::Unauthorized);
        }
        if let Some(err) = map_status(status) {
            return Err(err);
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_image_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_image_bytes,
                        actual: Some(content_len),
                    },
                    "image too large",
                ));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        if let Some(ct) = content_type.as_deref() {
            let essence = ct.split(';').next().unwrap_or(ct).trim();
            if !essence.starts_with("image/") {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: essence.to_string(),
                    },
                    "not an image response",
                ));
            }
        }

        ensure_cache_dir(&self.cache_dir)
            .map_err(|err| FetchError::new(FailureKind::Cache, err.to_string()))?;
        let mut file = tempfile::Builder::new()
            .prefix(&handle_prefix(url))
            .tempfile_in(&self.cache_dir)
            .map_err(|err| FetchError::new(FailureKind::Cache, err.to_string()))?;

        let mut byte_len: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            byte_len += chunk.len() as u64;
            if byte_len > self.settings.max_image_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_image_bytes,
                        actual: Some(byte_len),
                    },
                    "image too large",
                ));
            }
            file.write_all(&chunk)
                .map_err(|err| FetchError::new(FailureKind::Cache, err.to_string()))?;
        }
        file.flush()
            .map_err(|err| FetchError::new(FailureKind::Cache, err.to_string()))?;

        Ok(ImageOutcome::Ready(ImageHandle {
            file,
            byte_len,
            content_type,
        }))
    }
}

/// Token pairing a slot binding with the load that must resolve it.
pub type Generation = u64;

/// Per-instance display slot for one protected image.
///
/// `Pending -> Ready(handle) | Unauthorized`; binding a new source returns
/// to `Pending` and releases the previous handle. Resolutions carrying a
/// superseded generation are discarded, so a late result for an abandoned
/// source never leaves a live handle behind.
#[derive(Debug, Default)]
pub struct ImageSlot {
    generation: Generation,
    source: Option<String>,
    state: SlotState,
}

#[derive(Debug, Default)]
enum SlotState {
    #[default]
    Pending,
    Ready(ImageHandle),
    Unauthorized,
}

impl ImageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a new source URL. Any previous handle is released here; the
    /// returned generation must accompany the eventual resolution.
    pub fn set_source(&mut self, url: &str) -> Generation {
        self.generation += 1;
        self.source = Some(url.to_string());
        self.state = SlotState::Pending;
        self.generation
    }

    /// Apply a finished load. Returns false (and drops the outcome,
    /// releasing its handle) when the generation has been superseded.
    pub fn resolve(&mut self, generation: Generation, outcome: ImageOutcome) -> bool {
        if generation != self.generation {
            return false;
        }
        self.state = match outcome {
            ImageOutcome::Ready(handle) => SlotState::Ready(handle),
            ImageOutcome::Unauthorized => SlotState::Unauthorized,
        };
        true
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Display path while `Ready`; gated and pending images render nothing.
    pub fn display_path(&self) -> Option<&Path> {
        match &self.state {
            SlotState::Ready(handle) => Some(handle.path()),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SlotState::Pending)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.state, SlotState::Unauthorized)
    }

    /// Teardown: release the current handle and invalidate in-flight loads.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.source = None;
        self.state = SlotState::Pending;
    }
}
