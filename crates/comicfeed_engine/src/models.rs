use std::collections::HashMap;

use serde::Deserialize;

/// Top-level content API envelope: `{ "data": { "results": [...] } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: ResultPage<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultPage<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

/// Listing entry (token, publication). Only identity and the optional
/// gating status are interpreted; everything else stays with the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemRecord {
    #[serde(alias = "_id", alias = "token_id")]
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Chapter metadata from `GET /chapters`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChapterRecord {
    #[serde(alias = "chapter_id")]
    pub id: u32,
    pub status: ChapterStatus,
    /// Language code to page count. Empty means the chapter has no
    /// published pages in any language yet.
    #[serde(default)]
    pub lang: HashMap<String, u32>,
}

impl ChapterRecord {
    pub fn is_available(&self) -> bool {
        !self.lang.is_empty()
    }

    pub fn page_count(&self, lang: &str) -> Option<u32> {
        self.lang.get(lang).copied()
    }
}

/// The API reports `"read"` for readable chapters; every other value is
/// treated as locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChapterStatus {
    Read,
    #[serde(other)]
    Locked,
}

impl ChapterStatus {
    pub fn is_unlocked(self) -> bool {
        matches!(self, ChapterStatus::Read)
    }
}
