#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedViewModel {
    pub items: Vec<ItemRowView>,
    pub item_count: usize,
    /// Render the loading placeholder below the existing rows.
    pub show_loader: bool,
    /// Render the "no content" indicator instead of the placeholder.
    pub show_empty: bool,
    pub exhausted: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRowView {
    pub id: String,
    pub locked: bool,
}
