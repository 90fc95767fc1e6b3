use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use comicfeed_core::{Access, Effect, FeedErrorKind, Item, Msg};
use comicfeed_engine::{
    EngineConfig, EngineEvent, EngineHandle, FailureKind, ItemRecord,
};
use feed_logging::{feed_debug, feed_info, feed_warn};

/// Executes feed effects against the engine and feeds engine events back
/// into the update loop as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, msg_tx: mpsc::Sender<Msg>) -> Self {
        let engine = EngineHandle::new(config);
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchPage {
                    session,
                    resource_id,
                    cursor,
                    page_size,
                } => {
                    feed_info!("FetchPage {} cursor={}", resource_id, cursor);
                    self.engine.fetch_page(session, resource_id, cursor, page_size);
                }
                Effect::PromptUnlock { resource_id } => {
                    // The Buy/Login modal is an external collaborator; the
                    // hand-off is the whole of our responsibility here.
                    feed_info!("Unlock prompt hand-off for {}", resource_id);
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                let msg = match event {
                    EngineEvent::PageFetched {
                        session,
                        cursor,
                        result,
                    } => match result {
                        Ok(batch) => Msg::PageLoaded {
                            session,
                            cursor,
                            items: batch.items.into_iter().map(map_item).collect(),
                            has_more: batch.has_more,
                        },
                        Err(err) => {
                            feed_warn!("Page {} failed: {}", cursor, err.kind);
                            Msg::PageFailed {
                                session,
                                cursor,
                                error: map_error(&err.kind),
                            }
                        }
                    },
                    other => {
                        feed_debug!("Ignoring non-listing event: {:?}", other);
                        continue;
                    }
                };
                if msg_tx.send(msg).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn map_item(record: ItemRecord) -> Item {
    // Listing entries without a status (tokens, publications) are not gated.
    let access = match record.status.as_deref() {
        None | Some("read") => Access::Unlocked,
        Some(_) => Access::Locked,
    };
    Item {
        id: record.id,
        access,
    }
}

fn map_error(kind: &FailureKind) -> FeedErrorKind {
    match kind {
        FailureKind::Unauthorized => FeedErrorKind::Unauthorized,
        FailureKind::NotFound => FeedErrorKind::NotFound,
        _ => FeedErrorKind::Network,
    }
}
