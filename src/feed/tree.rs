use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::api::{Item, ItemId};
use crate::feed::cache::ItemCache;
use crate::render::Renderer;

/// Per-node expansion state. `Expanding` marks an in-flight child fetch;
/// a collapse arriving during it wins, and the fetch discards its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandState {
    Collapsed,
    Expanding,
    Expanded,
}

/// What a tree operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeOp {
    /// Expanded: rendered this many children.
    Expanded(usize),
    /// Collapsed: children left the view.
    Collapsed,
    /// The node has no child ids; nothing to expand.
    NoChildren,
    /// Unknown node, or the operation was already satisfied (re-entrant
    /// expand, double collapse).
    Ignored,
    /// A collapse overtook an in-flight expand; its result was discarded.
    Cancelled,
}

struct CommentNode {
    item: Arc<Item>,
    state: ExpandState,
    /// Child node ids, populated while expanded (and retained across
    /// collapse when subtree caching is on).
    children: Vec<ItemId>,
}

/// Lazily-materialized reply tree, one node per item id.
///
/// Expanding a node fetches and renders only its immediate children; each
/// child expands independently on request, so depth is unbounded while
/// every call does work proportional to one child list.
///
/// By default a collapse discards the fetched subtree and a re-expand
/// re-fetches it (the item cache absorbs the cost). With
/// `keep_collapsed_subtrees` the children survive collapse and re-expand
/// renders without refetching.
pub struct CommentTree {
    cache: Arc<ItemCache>,
    renderer: Arc<dyn Renderer>,
    keep_collapsed_subtrees: bool,
    nodes: Mutex<HashMap<ItemId, CommentNode>>,
}

impl CommentTree {
    pub fn new(
        cache: Arc<ItemCache>,
        renderer: Arc<dyn Renderer>,
        keep_collapsed_subtrees: bool,
    ) -> Self {
        Self {
            cache,
            renderer,
            keep_collapsed_subtrees,
            nodes: Mutex::new(HashMap::new()),
        }
    }

    /// Register a rendered post as a tree root, collapsed. Idempotent.
    pub fn insert_root(&self, item: Arc<Item>) {
        let mut nodes = self.nodes.lock().expect("tree lock poisoned");
        nodes.entry(item.id).or_insert(CommentNode {
            item,
            state: ExpandState::Collapsed,
            children: Vec::new(),
        });
    }

    /// Drop every node. Called on feed switch; the next session starts
    /// from fresh roots.
    pub fn clear(&self) {
        self.nodes.lock().expect("tree lock poisoned").clear();
    }

    pub fn state_of(&self, id: ItemId) -> Option<ExpandState> {
        self.nodes
            .lock()
            .expect("tree lock poisoned")
            .get(&id)
            .map(|n| n.state)
    }

    /// Expand if collapsed, collapse otherwise.
    pub async fn toggle(&self, id: ItemId) -> TreeOp {
        let state = self.state_of(id);
        match state {
            None => TreeOp::Ignored,
            Some(ExpandState::Collapsed) => self.expand(id).await,
            Some(ExpandState::Expanding) | Some(ExpandState::Expanded) => self.collapse(id),
        }
    }

    /// Fetch, sort, and render the node's immediate children.
    ///
    /// No-op unless the node is collapsed and has child ids. Children that
    /// are missing, deleted, or dead drop out. The fetched list commits
    /// only if the node is still expanding when it lands.
    pub async fn expand(&self, id: ItemId) -> TreeOp {
        let kids = {
            let mut nodes = self.nodes.lock().expect("tree lock poisoned");
            let Some(node) = nodes.get_mut(&id) else {
                return TreeOp::Ignored;
            };
            match node.state {
                ExpandState::Expanding | ExpandState::Expanded => return TreeOp::Ignored,
                ExpandState::Collapsed => {}
            }

            if self.keep_collapsed_subtrees && !node.children.is_empty() {
                node.state = ExpandState::Expanded;
                let child_ids = node.children.clone();
                let children: Vec<Arc<Item>> = child_ids
                    .iter()
                    .filter_map(|cid| nodes.get(cid).map(|n| n.item.clone()))
                    .collect();
                self.renderer.render_comment_children(id, &children);
                return TreeOp::Expanded(children.len());
            }

            let kids = match &node.item.kids {
                Some(kids) if !kids.is_empty() => kids.clone(),
                _ => return TreeOp::NoChildren,
            };
            node.state = ExpandState::Expanding;
            kids
        };

        let mut children: Vec<Arc<Item>> = self
            .cache
            .get_many(&kids)
            .await
            .into_iter()
            .flatten()
            .filter(|child| !child.is_tombstone())
            .collect();
        children.sort_by(|a, b| b.time.cmp(&a.time));

        let mut nodes = self.nodes.lock().expect("tree lock poisoned");
        match nodes.get_mut(&id) {
            Some(node) if node.state == ExpandState::Expanding => {
                node.state = ExpandState::Expanded;
                node.children = children.iter().map(|c| c.id).collect();
            }
            _ => {
                tracing::debug!(id, "Discarding expand result (collapsed mid-flight)");
                return TreeOp::Cancelled;
            }
        }
        for child in &children {
            nodes.insert(
                child.id,
                CommentNode {
                    item: child.clone(),
                    state: ExpandState::Collapsed,
                    children: Vec::new(),
                },
            );
        }
        self.renderer.render_comment_children(id, &children);
        TreeOp::Expanded(children.len())
    }

    /// Remove the node's rendered subtree from view. Idempotent; a collapse
    /// during an in-flight expand cancels it.
    pub fn collapse(&self, id: ItemId) -> TreeOp {
        let mut nodes = self.nodes.lock().expect("tree lock poisoned");
        let Some(node) = nodes.get_mut(&id) else {
            return TreeOp::Ignored;
        };
        match node.state {
            ExpandState::Collapsed => return TreeOp::Ignored,
            ExpandState::Expanding => {
                // The in-flight expand sees this and discards its fetch.
                node.state = ExpandState::Collapsed;
                return TreeOp::Cancelled;
            }
            ExpandState::Expanded => {}
        }
        node.state = ExpandState::Collapsed;

        let children = if self.keep_collapsed_subtrees {
            node.children.clone()
        } else {
            std::mem::take(&mut node.children)
        };

        if self.keep_collapsed_subtrees {
            // Keep the items, reset display state all the way down so a
            // re-expand re-renders one level at a time.
            let mut stack = children;
            while let Some(cid) = stack.pop() {
                if let Some(child) = nodes.get_mut(&cid) {
                    child.state = ExpandState::Collapsed;
                    stack.extend(child.children.iter().copied());
                }
            }
        } else {
            // Discard the subtree; re-expand re-fetches through the cache.
            let mut stack = children;
            while let Some(cid) = stack.pop() {
                if let Some(child) = nodes.remove(&cid) {
                    stack.extend(child.children);
                }
            }
        }

        self.renderer.clear_children(id);
        TreeOp::Collapsed
    }
}
