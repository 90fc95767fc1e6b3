use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use feed_logging::feed_debug;

use crate::fetch::{FetchSettings, HttpPageFetcher, PageFetcher};
use crate::image::{HttpImageLoader, ImageLoader};
use crate::{EngineEvent, RequestId};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub base_url: String,
    pub settings: FetchSettings,
    pub cache_dir: PathBuf,
}

impl EngineConfig {
    pub fn new(base_url: impl Into<String>, cache_dir: PathBuf) -> Self {
        Self {
            base_url: base_url.into(),
            settings: FetchSettings::default(),
            cache_dir,
        }
    }
}

enum EngineCommand {
    FetchPage {
        session: u64,
        resource_id: String,
        cursor: u32,
        page_size: u32,
    },
    FetchChapter {
        session: u64,
        comic_id: String,
        chapter_id: u32,
    },
    LoadImage {
        request: RequestId,
        url: String,
    },
}

/// Command/event bridge to the IO thread. Each command becomes an
/// independent async task; results come back as [`EngineEvent`]s.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new(
            config.base_url,
            config.settings.clone(),
        ));
        let loader: Arc<dyn ImageLoader> =
            Arc::new(HttpImageLoader::new(config.settings, config.cache_dir));

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let fetcher = fetcher.clone();
                let loader = loader.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(fetcher.as_ref(), loader.as_ref(), command, event_tx).await;
                });
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn fetch_page(
        &self,
        session: u64,
        resource_id: impl Into<String>,
        cursor: u32,
        page_size: u32,
    ) {
        let _ = self.cmd_tx.send(EngineCommand::FetchPage {
            session,
            resource_id: resource_id.into(),
            cursor,
            page_size,
        });
    }

    pub fn fetch_chapter(&self, session: u64, comic_id: impl Into<String>, chapter_id: u32) {
        let _ = self.cmd_tx.send(EngineCommand::FetchChapter {
            session,
            comic_id: comic_id.into(),
            chapter_id,
        });
    }

    pub fn load_image(&self, request: RequestId, url: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::LoadImage {
            request,
            url: url.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }
}

async fn handle_command(
    fetcher: &dyn PageFetcher,
    loader: &dyn ImageLoader,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::FetchPage {
            session,
            resource_id,
            cursor,
            page_size,
        } => {
            feed_debug!("fetch_page {} cursor={} limit={}", resource_id, cursor, page_size);
            let result = fetcher.fetch_page(&resource_id, cursor, page_size).await;
            let _ = event_tx.send(EngineEvent::PageFetched {
                session,
                cursor,
                result,
            });
        }
        EngineCommand::FetchChapter {
            session,
            comic_id,
            chapter_id,
        } => {
            feed_debug!("fetch_chapter {}/{}", comic_id, chapter_id);
            let result = fetcher.fetch_chapter(&comic_id, chapter_id).await;
            let _ = event_tx.send(EngineEvent::ChapterFetched { session, result });
        }
        EngineCommand::LoadImage { request, url } => {
            feed_debug!("load_image request={} url={}", request, url);
            let result = loader.load_image(&url).await;
            let _ = event_tx.send(EngineEvent::ImageLoaded { request, result });
        }
    }
}
