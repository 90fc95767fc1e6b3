//! Comicfeed core: pure feed state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{Access, FeedErrorKind, FeedState, Item, SessionId, DEFAULT_PAGE_SIZE};
pub use update::update;
pub use view_model::{FeedViewModel, ItemRowView};
