//! Shared fixtures for the engine integration tests: an in-memory
//! counting `ItemSource` stub and a call-recording `Renderer`.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use kindling::api::{FeedType, FetchError, Item, ItemId, ItemKind, ItemSource};
use kindling::feed::{CommentTree, FeedCursor, ItemCache};
use kindling::render::Renderer;

// ============================================================================
// Item Builders
// ============================================================================

pub fn item(id: ItemId, kind: ItemKind, time: i64) -> Item {
    Item {
        id,
        kind: Some(kind),
        by: Some(format!("user{id}")),
        title: Some(format!("item {id}")),
        url: None,
        time,
        kids: None,
        parts: None,
        descendants: None,
        text: None,
        score: None,
        deleted: false,
        dead: false,
    }
}

pub fn item_with_kids(id: ItemId, kind: ItemKind, time: i64, kids: Vec<ItemId>) -> Item {
    Item {
        kids: Some(kids),
        ..item(id, kind, time)
    }
}

pub fn poll(id: ItemId, time: i64, parts: Vec<ItemId>) -> Item {
    Item {
        parts: Some(parts),
        ..item(id, ItemKind::Poll, time)
    }
}

pub fn deleted(id: ItemId, time: i64) -> Item {
    Item {
        deleted: true,
        ..item(id, ItemKind::Comment, time)
    }
}

// ============================================================================
// Counting Item Source Stub
// ============================================================================

/// In-memory `ItemSource` with per-call counters, injectable failures,
/// and an optional gate that holds item fetches until the test releases
/// permits — the lever for deterministic overlap in race tests.
#[derive(Default)]
pub struct StubSource {
    lists: Mutex<HashMap<FeedType, Vec<ItemId>>>,
    items: Mutex<HashMap<ItemId, Item>>,
    fail_items: Mutex<HashSet<ItemId>>,
    fail_lists: Mutex<bool>,
    item_calls: AtomicUsize,
    list_calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stub whose item fetches block until the returned semaphore gets
    /// permits (one per fetch).
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let stub = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (stub, gate)
    }

    pub fn set_list(&self, feed: FeedType, ids: Vec<ItemId>) {
        self.lists.lock().unwrap().insert(feed, ids);
    }

    pub fn insert_item(&self, item: Item) {
        self.items.lock().unwrap().insert(item.id, item);
    }

    pub fn insert_items(&self, items: Vec<Item>) {
        for item in items {
            self.insert_item(item);
        }
    }

    pub fn fail_item(&self, id: ItemId) {
        self.fail_items.lock().unwrap().insert(id);
    }

    pub fn unfail_item(&self, id: ItemId) {
        self.fail_items.lock().unwrap().remove(&id);
    }

    pub fn set_fail_lists(&self, fail: bool) {
        *self.fail_lists.lock().unwrap() = fail;
    }

    /// Upstream item fetches issued so far.
    pub fn item_calls(&self) -> usize {
        self.item_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemSource for StubSource {
    async fn list_ids(&self, feed: FeedType) -> Result<Vec<ItemId>, FetchError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_lists.lock().unwrap() {
            return Err(FetchError::HttpStatus(500));
        }
        Ok(self
            .lists
            .lock()
            .unwrap()
            .get(&feed)
            .cloned()
            .unwrap_or_default())
    }

    async fn item(&self, id: ItemId) -> Result<Option<Item>, FetchError> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        // Force concurrent callers to interleave at an await point even
        // when ungated, so de-duplication is actually exercised.
        tokio::task::yield_now().await;
        if self.fail_items.lock().unwrap().contains(&id) {
            return Err(FetchError::HttpStatus(500));
        }
        Ok(self.items.lock().unwrap().get(&id).cloned())
    }
}

// ============================================================================
// Recording Renderer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Item(ItemId),
    NoMore,
    EmptyFeed,
    Children(ItemId, Vec<ItemId>),
    ClearChildren(ItemId),
    ClearFeed,
    Error(String),
    ClearError,
    Live(usize),
    ClearLive,
}

/// Records every `Renderer` call, in order.
#[derive(Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<RenderEvent>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: RenderEvent) {
        self.events.lock().unwrap().push(event);
    }

    /// Ids of all rendered feed items, in render order, across the whole
    /// session history.
    pub fn rendered_ids(&self) -> Vec<ItemId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderEvent::Item(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Ids rendered since the most recent feed clear.
    pub fn visible_ids(&self) -> Vec<ItemId> {
        let events = self.events();
        let start = events
            .iter()
            .rposition(|e| *e == RenderEvent::ClearFeed)
            .map(|i| i + 1)
            .unwrap_or(0);
        events[start..]
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Item(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Every child list rendered under `parent`, oldest event first.
    pub fn children_of(&self, parent: ItemId) -> Vec<Vec<ItemId>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderEvent::Children(p, kids) if p == parent => Some(kids),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &RenderEvent) -> usize {
        self.events().iter().filter(|e| *e == wanted).count()
    }
}

impl Renderer for RecordingRenderer {
    fn render_item(&self, item: &Arc<Item>, _poll_options: &[Arc<Item>]) {
        self.push(RenderEvent::Item(item.id));
    }

    fn render_no_more_results(&self) {
        self.push(RenderEvent::NoMore);
    }

    fn render_empty_feed(&self) {
        self.push(RenderEvent::EmptyFeed);
    }

    fn render_comment_children(&self, parent: ItemId, children: &[Arc<Item>]) {
        let kids = children.iter().map(|c| c.id).collect();
        self.push(RenderEvent::Children(parent, kids));
    }

    fn clear_children(&self, parent: ItemId) {
        self.push(RenderEvent::ClearChildren(parent));
    }

    fn clear_feed(&self) {
        self.push(RenderEvent::ClearFeed);
    }

    fn render_error_banner(&self, message: &str) {
        self.push(RenderEvent::Error(message.to_string()));
    }

    fn clear_error_banner(&self) {
        self.push(RenderEvent::ClearError);
    }

    fn render_live_update_banner(&self, count: usize) {
        self.push(RenderEvent::Live(count));
    }

    fn clear_live_update_banner(&self) {
        self.push(RenderEvent::ClearLive);
    }
}

// ============================================================================
// Engine Harness
// ============================================================================

pub struct Harness {
    pub source: Arc<StubSource>,
    pub renderer: Arc<RecordingRenderer>,
    pub cache: Arc<ItemCache>,
    pub cursor: Arc<FeedCursor>,
    pub tree: Arc<CommentTree>,
}

/// Wire the engine around a stub source and recording renderer.
pub fn build(source: StubSource, batch_size: usize, keep_collapsed_subtrees: bool) -> Harness {
    let source = Arc::new(source);
    let renderer = Arc::new(RecordingRenderer::new());
    let cache = Arc::new(ItemCache::new(source.clone(), renderer.clone()));
    let cursor = Arc::new(FeedCursor::new(
        source.clone(),
        cache.clone(),
        renderer.clone(),
        FeedType::Stories,
        batch_size,
    ));
    let tree = Arc::new(CommentTree::new(
        cache.clone(),
        renderer.clone(),
        keep_collapsed_subtrees,
    ));
    Harness {
        source,
        renderer,
        cache,
        cursor,
        tree,
    }
}
