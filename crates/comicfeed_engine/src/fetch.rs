use std::time::Duration;

use crate::models::{ChapterRecord, Envelope, ItemRecord};
use crate::{FailureKind, FetchError, PageBatch};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_image_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_image_bytes: 20 * 1024 * 1024,
        }
    }
}

/// The viewer's lookahead request: the chapter itself plus whether the
/// following chapter exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterLookahead {
    pub chapter: Option<ChapterRecord>,
    pub has_next: bool,
}

#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page of a listing resource. Never retries on its own.
    async fn fetch_page(
        &self,
        resource_id: &str,
        cursor: u32,
        page_size: u32,
    ) -> Result<PageBatch, FetchError>;

    /// Fetch chapter metadata together with the next-chapter lookahead.
    async fn fetch_chapter(
        &self,
        comic_id: &str,
        chapter_id: u32,
    ) -> Result<ChapterLookahead, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    base_url: String,
    settings: FetchSettings,
}

impl HttpPageFetcher {
    pub fn new(base_url: impl Into<String>, settings: FetchSettings) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, settings }
    }

    pub(crate) fn build_client(settings: &FetchSettings) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    async fn get_envelope<T>(&self, url: reqwest::Url) -> Result<Envelope<T>, FetchError>
    where
        T: serde::de::DeserializeOwned,
    {
        let client = Self::build_client(&self.settings)?;
        let response = client.get(url).send().await.map_err(map_reqwest_error)?;
        if let Some(err) = map_status(response.status()) {
            return Err(err);
        }
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(
        &self,
        resource_id: &str,
        cursor: u32,
        page_size: u32,
    ) -> Result<PageBatch, FetchError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/{}", self.base_url, resource_id),
            &[
                ("page", cursor.to_string()),
                ("limit", page_size.to_string()),
            ],
        )
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let envelope: Envelope<ItemRecord> = self.get_envelope(url).await?;
        Ok(PageBatch {
            items: envelope.data.results,
            has_more: envelope.data.has_more,
        })
    }

    async fn fetch_chapter(
        &self,
        comic_id: &str,
        chapter_id: u32,
    ) -> Result<ChapterLookahead, FetchError> {
        // Request the chapter plus its successor; a second result means
        // there is a next chapter to navigate to.
        let url = reqwest::Url::parse_with_params(
            &format!("{}/chapters", self.base_url),
            &[
                ("comic_id", comic_id.to_string()),
                ("chapter_ids[]", chapter_id.to_string()),
                ("chapter_ids[]", (chapter_id + 1).to_string()),
            ],
        )
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let envelope: Envelope<ChapterRecord> = self.get_envelope(url).await?;
        let mut results = envelope.data.results;
        let has_next = results.len() > 1;
        let chapter = if results.is_empty() {
            None
        } else {
            Some(results.remove(0))
        };
        Ok(ChapterLookahead { chapter, has_next })
    }
}

pub(crate) fn map_status(status: reqwest::StatusCode) -> Option<FetchError> {
    if status.is_success() {
        return None;
    }
    let kind = match status.as_u16() {
        401 | 403 => FailureKind::Unauthorized,
        404 => FailureKind::NotFound,
        code => FailureKind::HttpStatus(code),
    };
    Some(FetchError::new(kind, status.to_string()))
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
