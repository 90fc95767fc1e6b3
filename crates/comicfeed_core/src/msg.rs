use crate::{FeedErrorKind, Item, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The bound resource identity changed (e.g. navigating to another comic).
    ResourceChanged { resource_id: String },
    /// Consumer scrolled near the end of the visible content.
    NearEnd,
    /// A page fetch finished for the given session.
    PageLoaded {
        session: SessionId,
        cursor: u32,
        items: Vec<Item>,
        has_more: bool,
    },
    /// A page fetch failed for the given session.
    PageFailed {
        session: SessionId,
        cursor: u32,
        error: FeedErrorKind,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
