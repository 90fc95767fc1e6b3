//! Comicfeed engine: content API fetch pipeline and image handle management.
mod chapter;
mod engine;
mod fetch;
mod filename;
mod image;
mod models;
mod persist;
mod types;

pub use chapter::chapter_page_urls;
pub use engine::{EngineConfig, EngineHandle};
pub use fetch::{ChapterLookahead, FetchSettings, HttpPageFetcher, PageFetcher};
pub use filename::handle_prefix;
pub use image::{
    Generation, HttpImageLoader, ImageHandle, ImageLoader, ImageOutcome, ImageSlot,
};
pub use models::{ChapterRecord, ChapterStatus, Envelope, ItemRecord, ResultPage};
pub use persist::{ensure_cache_dir, AtomicFileWriter, PersistError};
pub use types::{EngineEvent, FailureKind, FetchError, PageBatch, RequestId};
