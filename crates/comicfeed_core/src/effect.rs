use crate::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Request the next page of the resource from the content API.
    FetchPage {
        session: SessionId,
        resource_id: String,
        cursor: u32,
        page_size: u32,
    },
    /// Hand off to the external Buy/Login modal; the feed does not retry.
    PromptUnlock { resource_id: String },
}
