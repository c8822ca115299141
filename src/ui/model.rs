use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::api::{Item, ItemId, SearchHit};
use crate::render::Renderer;

/// One display row of the main list, produced by flattening the posts and
/// their expanded reply subtrees.
#[derive(Clone)]
pub enum Row {
    Post(Arc<Item>),
    /// A poll option under its poll, displayed with its score. Leaf.
    PollOption(Arc<Item>),
    Comment { depth: usize, item: Arc<Item> },
    /// A search-override hit.
    Hit(SearchHit),
    Notice(&'static str),
}

#[derive(Default)]
struct ViewState {
    /// Posts in rendered order, each with its materialized poll options.
    posts: Vec<(Arc<Item>, Vec<Arc<Item>>)>,
    /// Expanded children per parent, in rendered (newest-first) order.
    children: HashMap<ItemId, Vec<Arc<Item>>>,
    no_more: bool,
    empty_feed: bool,
    error: Option<String>,
    live_count: Option<usize>,
    /// When set, the hit list overrides the feed display. The feed state
    /// underneath stays untouched.
    search_hits: Option<Vec<SearchHit>>,
    /// Bumped on every mutation; the UI loop redraws on change.
    version: u64,
}

/// The render model behind the TUI: the engine writes into it through
/// [`Renderer`], the draw pass reads flattened rows out of it.
///
/// All methods take `&self`; state lives behind a mutex so engine tasks
/// and the UI loop can share it.
#[derive(Default)]
pub struct FeedView {
    state: Mutex<ViewState>,
}

impl FeedView {
    pub fn new() -> Self {
        Self::default()
    }

    fn mutate(&self, f: impl FnOnce(&mut ViewState)) {
        let mut state = self.state.lock().expect("view lock poisoned");
        f(&mut state);
        state.version = state.version.wrapping_add(1);
    }

    pub fn version(&self) -> u64 {
        self.state.lock().expect("view lock poisoned").version
    }

    pub fn live_count(&self) -> Option<usize> {
        self.state.lock().expect("view lock poisoned").live_count
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.lock().expect("view lock poisoned").error.clone()
    }

    pub fn search_active(&self) -> bool {
        self.state
            .lock()
            .expect("view lock poisoned")
            .search_hits
            .is_some()
    }

    /// Install the search override. Hits display as-is; sort before
    /// calling.
    pub fn set_search_results(&self, hits: Vec<SearchHit>) {
        self.mutate(|s| s.search_hits = Some(hits));
    }

    pub fn clear_search(&self) {
        self.mutate(|s| s.search_hits = None);
    }

    /// Flatten the model into display rows: each post, its poll options,
    /// then its expanded reply subtree depth-first; notices trail the
    /// list. A search override replaces all of it.
    pub fn rows(&self) -> Vec<Row> {
        let state = self.state.lock().expect("view lock poisoned");

        if let Some(hits) = &state.search_hits {
            return hits.iter().cloned().map(Row::Hit).collect();
        }

        let mut rows = Vec::new();
        for (post, options) in &state.posts {
            rows.push(Row::Post(post.clone()));
            for option in options {
                rows.push(Row::PollOption(option.clone()));
            }
            push_subtree(&state.children, post.id, 0, &mut rows);
        }
        if state.empty_feed {
            rows.push(Row::Notice("No polls available."));
        }
        if state.no_more {
            rows.push(Row::Notice("No more results."));
        }
        rows
    }
}

fn push_subtree(
    children: &HashMap<ItemId, Vec<Arc<Item>>>,
    parent: ItemId,
    depth: usize,
    rows: &mut Vec<Row>,
) {
    let Some(kids) = children.get(&parent) else {
        return;
    };
    for kid in kids {
        rows.push(Row::Comment {
            depth,
            item: kid.clone(),
        });
        push_subtree(children, kid.id, depth + 1, rows);
    }
}

impl Renderer for FeedView {
    fn render_item(&self, item: &Arc<Item>, poll_options: &[Arc<Item>]) {
        self.mutate(|s| s.posts.push((item.clone(), poll_options.to_vec())));
    }

    fn render_no_more_results(&self) {
        self.mutate(|s| s.no_more = true);
    }

    fn render_empty_feed(&self) {
        self.mutate(|s| s.empty_feed = true);
    }

    fn render_comment_children(&self, parent: ItemId, children: &[Arc<Item>]) {
        self.mutate(|s| {
            s.children.insert(parent, children.to_vec());
        });
    }

    fn clear_children(&self, parent: ItemId) {
        self.mutate(|s| {
            s.children.remove(&parent);
        });
    }

    fn clear_feed(&self) {
        self.mutate(|s| {
            s.posts.clear();
            s.children.clear();
            s.no_more = false;
            s.empty_feed = false;
            s.search_hits = None;
        });
    }

    fn render_error_banner(&self, message: &str) {
        self.mutate(|s| s.error = Some(message.to_string()));
    }

    fn clear_error_banner(&self) {
        self.mutate(|s| s.error = None);
    }

    fn render_live_update_banner(&self, count: usize) {
        self.mutate(|s| s.live_count = Some(count));
    }

    fn clear_live_update_banner(&self) {
        self.mutate(|s| s.live_count = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ItemKind;

    fn story(id: ItemId, kids: Option<Vec<ItemId>>) -> Arc<Item> {
        Arc::new(Item {
            id,
            kind: Some(ItemKind::Story),
            by: None,
            title: Some(format!("story {id}")),
            url: None,
            time: id as i64,
            kids,
            parts: None,
            descendants: None,
            text: None,
            score: None,
            deleted: false,
            dead: false,
        })
    }

    #[test]
    fn test_rows_nest_expanded_children() {
        let view = FeedView::new();
        view.render_item(&story(1, Some(vec![10])), &[]);
        view.render_comment_children(1, &[story(10, Some(vec![20]))]);
        view.render_comment_children(10, &[story(20, None)]);

        let rows = view.rows();
        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[0], Row::Post(ref p) if p.id == 1));
        assert!(matches!(rows[1], Row::Comment { depth: 0, ref item } if item.id == 10));
        assert!(matches!(rows[2], Row::Comment { depth: 1, ref item } if item.id == 20));
    }

    #[test]
    fn test_clear_children_removes_subtree_rows() {
        let view = FeedView::new();
        view.render_item(&story(1, Some(vec![10])), &[]);
        view.render_comment_children(1, &[story(10, None)]);
        view.clear_children(1);
        assert_eq!(view.rows().len(), 1);
    }

    #[test]
    fn test_search_override_replaces_feed_rows() {
        let view = FeedView::new();
        view.render_item(&story(1, None), &[]);
        view.set_search_results(vec![SearchHit {
            id: "9".into(),
            title: Some("hit".into()),
            url: None,
            created_at: 1,
        }]);
        assert!(matches!(view.rows()[0], Row::Hit(_)));
        view.clear_search();
        assert!(matches!(view.rows()[0], Row::Post(_)));
    }

    #[test]
    fn test_version_bumps_on_mutation() {
        let view = FeedView::new();
        let before = view.version();
        view.render_no_more_results();
        assert_ne!(view.version(), before);
    }
}
