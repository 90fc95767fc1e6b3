/// Enumerate the protected page-image URLs for one chapter and language:
/// `{base}/pages/{comicId}/{chapterId}/{pageNum}/{lang}`, pages 1-based.
pub fn chapter_page_urls(
    base_url: &str,
    comic_id: &str,
    chapter_id: u32,
    lang: &str,
    page_count: u32,
) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    (1..=page_count)
        .map(|page| format!("{base}/pages/{comic_id}/{chapter_id}/{page}/{lang}"))
        .collect()
}
