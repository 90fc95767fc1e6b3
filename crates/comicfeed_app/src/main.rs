mod effects;
mod logging;
mod persistence;
mod session;

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    logging::initialize(logging::LogDestination::Terminal);

    let base_url = std::env::var("COMIC_API_URL").context("COMIC_API_URL must be set")?;
    let mut args = std::env::args().skip(1);
    let resource_id = args
        .next()
        .context("usage: comicfeed_app <resource-id> [chapter-id] [lang]")?;

    match args.next() {
        Some(chapter) => {
            let chapter_id: u32 = chapter.parse().context("chapter id must be a number")?;
            let lang = args.next().unwrap_or_else(|| "en".to_string());
            session::run_viewer(&base_url, &resource_id, chapter_id, &lang)
        }
        None => session::run_listing(&base_url, resource_id),
    }
}
