use crate::view_model::{FeedViewModel, ItemRowView};

/// Identity of one resource session. Bumped on every resource change so
/// late-arriving responses for an abandoned session can be discarded.
pub type SessionId = u64;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Authorization status of an item, abstracted from the content API's
/// `status` field (`"read"` means unlocked, anything else is gated).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Unlocked,
    Locked,
}

/// An opaque feed entry; the pipeline only interprets identity and access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub access: Access,
}

/// Error classes surfaced to the feed by the effect runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedErrorKind {
    /// Transient; retriable by a later scroll trigger at the same cursor.
    Network,
    /// Content is purchase/login gated; triggers the unlock prompt hand-off.
    Unauthorized,
    /// Resource absent; the feed renders the empty state.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    session: SessionId,
    resource_id: Option<String>,
    items: Vec<Item>,
    cursor: u32,
    page_size: u32,
    has_more: bool,
    loading: bool,
    dirty: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedState {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            session: 0,
            resource_id: None,
            items: Vec::new(),
            cursor: 1,
            page_size,
            has_more: true,
            loading: false,
            dirty: false,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    /// Next cursor to request; 1-based, monotonically increasing per session.
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether a response tagged with `session` belongs to the live session.
    pub(crate) fn accepts(&self, session: SessionId) -> bool {
        self.session == session
    }

    /// Reset for a new resource identity. Invalidates any in-flight fetch.
    pub(crate) fn begin_session(&mut self, resource_id: String) {
        self.session += 1;
        self.resource_id = Some(resource_id);
        self.items.clear();
        self.cursor = 1;
        self.has_more = true;
        self.loading = true;
        self.dirty = true;
    }

    pub(crate) fn begin_fetch(&mut self) {
        self.loading = true;
        self.dirty = true;
    }

    pub(crate) fn apply_page(&mut self, items: Vec<Item>, has_more: bool) {
        self.items.extend(items);
        self.cursor += 1;
        self.has_more = has_more;
        self.loading = false;
        self.dirty = true;
    }

    /// Fetch failure: items and cursor stay untouched so a later trigger
    /// retries the same page. `terminal` marks the session exhausted.
    pub(crate) fn apply_failure(&mut self, terminal: bool) {
        self.loading = false;
        if terminal {
            self.has_more = false;
        }
        self.dirty = true;
    }

    pub fn view(&self) -> FeedViewModel {
        let items = self
            .items
            .iter()
            .map(|item| ItemRowView {
                id: item.id.clone(),
                locked: item.access == Access::Locked,
            })
            .collect::<Vec<_>>();
        FeedViewModel {
            item_count: items.len(),
            items,
            show_loader: self.loading,
            show_empty: self.items.is_empty() && !self.has_more && !self.loading,
            exhausted: !self.has_more,
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }
}
