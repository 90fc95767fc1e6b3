use crate::{Effect, FeedErrorKind, FeedState, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: FeedState, msg: Msg) -> (FeedState, Vec<Effect>) {
    let effects = match msg {
        Msg::ResourceChanged { resource_id } => {
            state.begin_session(resource_id.clone());
            vec![Effect::FetchPage {
                session: state.session(),
                resource_id,
                cursor: 1,
                page_size: state.page_size(),
            }]
        }
        Msg::NearEnd => {
            // Triggers while a fetch is in flight are coalesced; an
            // exhausted session never fetches again.
            if state.is_loading() || !state.has_more() {
                return (state, Vec::new());
            }
            match state.resource_id().map(ToOwned::to_owned) {
                Some(resource_id) => {
                    state.begin_fetch();
                    vec![Effect::FetchPage {
                        session: state.session(),
                        resource_id,
                        cursor: state.cursor(),
                        page_size: state.page_size(),
                    }]
                }
                None => Vec::new(),
            }
        }
        Msg::PageLoaded {
            session,
            cursor,
            items,
            has_more,
        } => {
            if !state.accepts(session) {
                // Late result for an abandoned session.
                return (state, Vec::new());
            }
            debug_assert_eq!(cursor, state.cursor());
            state.apply_page(items, has_more);
            Vec::new()
        }
        Msg::PageFailed {
            session,
            cursor: _,
            error,
        } => {
            if !state.accepts(session) {
                return (state, Vec::new());
            }
            state.apply_failure(error == FeedErrorKind::NotFound);
            match (error, state.resource_id()) {
                (FeedErrorKind::Unauthorized, Some(resource_id)) => {
                    vec![Effect::PromptUnlock {
                        resource_id: resource_id.to_owned(),
                    }]
                }
                _ => Vec::new(),
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
