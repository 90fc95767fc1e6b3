use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use comicfeed_core::{update, FeedErrorKind, FeedState, FeedViewModel, Msg};
use comicfeed_engine::{
    chapter_page_urls, EngineConfig, EngineEvent, EngineHandle, ImageSlot,
};
use feed_logging::{feed_debug, feed_info, feed_warn};

use crate::effects::EffectRunner;
use crate::persistence::{self, ReadingProgress};

const EVENT_TIMEOUT: Duration = Duration::from_secs(30);

fn cache_dir() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("cache")
}

/// Drive a listing session to exhaustion, standing in for a user who keeps
/// scrolling: every loaded page immediately re-arms the proximity trigger.
pub fn run_listing(base_url: &str, resource_id: String) -> anyhow::Result<()> {
    let cache_dir = cache_dir();
    if let Some(progress) = persistence::load_progress(&cache_dir) {
        if progress.resource_id == resource_id {
            feed_info!(
                "Previous session saw {} items (updated {})",
                progress.items_seen,
                progress.updated_at
            );
        }
    }

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(EngineConfig::new(base_url, cache_dir.clone()), msg_tx.clone());

    let (mut state, effects) = update(
        FeedState::new(),
        Msg::ResourceChanged {
            resource_id: resource_id.clone(),
        },
    );
    runner.enqueue(effects);
    if state.consume_dirty() {
        render(&state.view());
    }

    loop {
        let msg = msg_rx
            .recv_timeout(EVENT_TIMEOUT)
            .context("timed out waiting for the content API")?;
        let failure = match &msg {
            Msg::PageFailed { error, .. } => Some(*error),
            _ => None,
        };
        let loaded = matches!(msg, Msg::PageLoaded { .. });

        let (next, effects) = update(state, msg);
        state = next;
        runner.enqueue(effects);
        if state.consume_dirty() {
            render(&state.view());
        }

        match failure {
            Some(FeedErrorKind::Unauthorized) => {
                bail!("content is locked; complete the purchase and re-run")
            }
            Some(FeedErrorKind::Network) => bail!("network failure; re-run to retry"),
            Some(FeedErrorKind::NotFound) => {
                feed_warn!("Resource {} not found", resource_id);
                break;
            }
            None => {}
        }

        if loaded {
            if state.has_more() {
                // Headless stand-in for the scroll-proximity trigger.
                let _ = msg_tx.send(Msg::NearEnd);
            } else {
                break;
            }
        }
    }

    persistence::save_progress(
        &cache_dir,
        &ReadingProgress {
            resource_id,
            items_seen: state.view().item_count,
            updated_at: chrono::Utc::now().to_rfc3339(),
        },
    );
    Ok(())
}

fn render(view: &FeedViewModel) {
    if view.show_empty {
        feed_info!("No content");
        return;
    }
    feed_info!(
        "{} items{}",
        view.item_count,
        if view.show_loader { " (loading...)" } else { "" }
    );
    for row in &view.items {
        feed_debug!("  {} {}", row.id, if row.locked { "[locked]" } else { "" });
    }
}

/// Open one chapter: fetch its metadata, then load every page image into a
/// display slot. Locked or unpublished chapters hand off to the external
/// modals instead of erroring.
pub fn run_viewer(
    base_url: &str,
    comic_id: &str,
    chapter_id: u32,
    lang: &str,
) -> anyhow::Result<()> {
    let cache_dir = cache_dir();
    let engine = EngineHandle::new(EngineConfig::new(base_url, cache_dir.clone()));

    let session = 1;
    engine.fetch_chapter(session, comic_id, chapter_id);
    let lookahead = wait_for_chapter(&engine, session)?;

    let Some(chapter) = lookahead.chapter else {
        feed_warn!("Chapter {}/{} not found", comic_id, chapter_id);
        return Ok(());
    };
    feed_info!(
        "Chapter {} of {} (next chapter available: {})",
        chapter.id,
        comic_id,
        lookahead.has_next
    );
    if !chapter.is_available() {
        // External "chapter not available" modal takes over.
        feed_info!("Chapter has no published languages yet");
        return Ok(());
    }
    if !chapter.status.is_unlocked() {
        // External purchase modal takes over; pages stay hidden.
        feed_info!("Chapter is locked; hand-off to purchase modal");
        return Ok(());
    }
    let Some(page_count) = chapter.page_count(lang) else {
        feed_warn!("Chapter has no pages for language {:?}", lang);
        return Ok(());
    };

    let urls = chapter_page_urls(base_url, comic_id, chapter_id, lang, page_count);
    let mut slots = Vec::with_capacity(urls.len());
    for (index, url) in urls.iter().enumerate() {
        let mut slot = ImageSlot::new();
        let generation = slot.set_source(url);
        slots.push((slot, generation));
        engine.load_image(index as u64, url.clone());
    }

    let mut remaining = slots.len();
    let deadline = Instant::now() + EVENT_TIMEOUT;
    while remaining > 0 {
        if Instant::now() > deadline {
            bail!("timed out loading chapter pages");
        }
        match engine.try_recv() {
            Some(EngineEvent::ImageLoaded { request, result }) => {
                remaining -= 1;
                let index = request as usize;
                let (slot, generation) = &mut slots[index];
                match result {
                    Ok(outcome) => {
                        if slot.resolve(*generation, outcome) {
                            match slot.display_path() {
                                Some(path) => feed_info!("Page {} ready: {:?}", index + 1, path),
                                // Gated page: silently omitted, no error placeholder.
                                None => feed_debug!("Page {} suppressed", index + 1),
                            }
                        }
                    }
                    Err(err) => {
                        // Already-loaded pages stay visible; the user can
                        // re-open the chapter to retry.
                        feed_warn!("Page {} failed: {}", index + 1, err.kind);
                    }
                }
            }
            Some(other) => feed_debug!("Ignoring event: {:?}", other),
            None => thread::sleep(Duration::from_millis(20)),
        }
    }

    let displayable = slots
        .iter()
        .filter(|(slot, _)| slot.display_path().is_some())
        .count();
    feed_info!("{} of {} pages displayable", displayable, slots.len());

    persistence::save_progress(
        &cache_dir,
        &ReadingProgress {
            resource_id: format!("{comic_id}/{chapter_id}"),
            items_seen: displayable,
            updated_at: chrono::Utc::now().to_rfc3339(),
        },
    );
    // Dropping the slots releases every image handle.
    Ok(())
}

fn wait_for_chapter(
    engine: &EngineHandle,
    session: u64,
) -> anyhow::Result<comicfeed_engine::ChapterLookahead> {
    let deadline = Instant::now() + EVENT_TIMEOUT;
    loop {
        if Instant::now() > deadline {
            bail!("timed out waiting for chapter metadata");
        }
        match engine.try_recv() {
            Some(EngineEvent::ChapterFetched {
                session: event_session,
                result,
            }) if event_session == session => {
                return result.map_err(|err| anyhow::anyhow!("chapter fetch failed: {}", err.kind));
            }
            Some(other) => feed_debug!("Ignoring event: {:?}", other),
            None => thread::sleep(Duration::from_millis(20)),
        }
    }
}
