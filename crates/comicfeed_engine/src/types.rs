use std::fmt;

use crate::fetch::ChapterLookahead;
use crate::image::ImageOutcome;
use crate::models::ItemRecord;

/// Correlates an image load with the display slot that requested it.
pub type RequestId = u64;

/// One fetched page of a listing resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBatch {
    pub items: Vec<ItemRecord>,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    /// Content is purchase/login gated (HTTP 401/403).
    Unauthorized,
    /// Resource absent (HTTP 404).
    NotFound,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode,
    Cache,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Unauthorized => write!(f, "unauthorized"),
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Decode => write!(f, "response decode error"),
            FailureKind::Cache => write!(f, "image cache error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Results the engine thread reports back to its consumer.
#[derive(Debug)]
pub enum EngineEvent {
    PageFetched {
        session: u64,
        cursor: u32,
        result: Result<PageBatch, FetchError>,
    },
    ChapterFetched {
        session: u64,
        result: Result<ChapterLookahead, FetchError>,
    },
    ImageLoaded {
        request: RequestId,
        result: Result<ImageOutcome, FetchError>,
    },
}
