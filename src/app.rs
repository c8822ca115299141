use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::api::{FeedType, ItemId, SearchHit, SearchSource};
use crate::config::Config;
use crate::feed::{Advance, CommentTree, Debounce, FeedCursor, LoadTrigger, TreeOp};
use crate::render::Renderer;
use crate::ui::FeedView;

/// How long a status message stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(4);

// ============================================================================
// Background Task Events
// ============================================================================

/// Events from background tasks.
///
/// The engine renders directly through the [`crate::render::Renderer`]
/// surface; these events only carry task completions back to the UI loop
/// for status-line updates and stale-search filtering.
pub enum AppEvent {
    /// A load-more trigger finished. `None` means the throttle dropped it.
    AdvanceComplete { outcome: Option<Advance> },
    /// A feed switch (tab change, reload, live-update accept) finished.
    SwitchComplete { feed: FeedType, outcome: Advance },
    /// A comment toggle finished.
    ToggleComplete { id: ItemId, op: TreeOp },
    /// Search completed with results.
    ///
    /// `generation` is the counter value when the search was spawned;
    /// results from an older generation are discarded (rapid typing).
    SearchCompleted {
        query: String,
        generation: u64,
        results: Result<Vec<SearchHit>, String>,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state.
pub struct App {
    pub config: Config,

    // Engine handles, shared with background tasks
    pub cursor: Arc<FeedCursor>,
    pub tree: Arc<CommentTree>,
    pub trigger: Arc<LoadTrigger>,
    pub search_source: Arc<dyn SearchSource>,
    /// The render model; the engine writes into it through `Renderer`.
    pub view: Arc<FeedView>,

    /// The feed tab the UI believes is active. Updated optimistically on
    /// switch; the cursor's generation guard handles the races.
    pub feed: FeedType,

    // UI state
    pub selected: usize,
    pub needs_redraw: bool,
    /// Last observed `FeedView` version, for change-driven redraw.
    pub seen_view_version: u64,

    // Search
    pub search_mode: bool,
    pub search_input: String,
    pub search_debounce: Debounce,
    pub search_generation: u64,
    search_handle: Option<JoinHandle<()>>,

    status: Option<(String, Instant)>,
}

impl App {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        cursor: Arc<FeedCursor>,
        tree: Arc<CommentTree>,
        trigger: Arc<LoadTrigger>,
        search_source: Arc<dyn SearchSource>,
        view: Arc<FeedView>,
        feed: FeedType,
    ) -> Self {
        let search_debounce = Debounce::new(config.search_debounce());
        Self {
            config,
            cursor,
            tree,
            trigger,
            search_source,
            view,
            feed,
            selected: 0,
            needs_redraw: true,
            seen_view_version: 0,
            search_mode: false,
            search_input: String::new(),
            search_debounce,
            search_generation: 0,
            search_handle: None,
            status: None,
        }
    }

    // ========================================================================
    // Status Line
    // ========================================================================

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
        self.needs_redraw = true;
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(msg, _)| msg.as_str())
    }

    /// Returns true if an expired status message was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        match &self.status {
            Some((_, at)) if at.elapsed() >= STATUS_TTL => {
                self.status = None;
                true
            }
            _ => false,
        }
    }

    // ========================================================================
    // Background Task Spawning
    // ========================================================================

    /// Switch feeds (also used for reload and live-update accept). Resets
    /// the comment tree and selection; the cursor clears the rest.
    pub fn spawn_switch(&mut self, feed: FeedType, tx: &mpsc::Sender<AppEvent>) {
        self.feed = feed;
        self.selected = 0;
        self.tree.clear();
        self.view.clear_search();

        let cursor = self.cursor.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = cursor.switch_type(feed).await;
            let _ = tx.send(AppEvent::SwitchComplete { feed, outcome }).await;
        });
    }

    /// Explicit load-more activation.
    pub fn spawn_manual_load(&self, tx: &mpsc::Sender<AppEvent>) {
        let trigger = self.trigger.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = trigger.manual().await;
            let _ = tx.send(AppEvent::AdvanceComplete { outcome }).await;
        });
    }

    /// Selection moved near the bottom of the list.
    pub fn spawn_scroll_signal(&self, tx: &mpsc::Sender<AppEvent>) {
        let trigger = self.trigger.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = trigger.scroll_proximity().await;
            let _ = tx.send(AppEvent::AdvanceComplete { outcome }).await;
        });
    }

    /// The last rendered row came into view.
    pub fn spawn_sentinel_signal(&self, tx: &mpsc::Sender<AppEvent>) {
        let trigger = self.trigger.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = trigger.sentinel_visible().await;
            let _ = tx.send(AppEvent::AdvanceComplete { outcome }).await;
        });
    }

    /// Toggle a post's or comment's replies.
    pub fn spawn_toggle(&self, id: ItemId, tx: &mpsc::Sender<AppEvent>) {
        let tree = self.tree.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let op = tree.toggle(id).await;
            let _ = tx.send(AppEvent::ToggleComplete { id, op }).await;
        });
    }

    /// Accept the live-update notification: clear it and reload.
    pub fn accept_live_update(&mut self, tx: &mpsc::Sender<AppEvent>) {
        if self.view.live_count().is_none() {
            return;
        }
        self.view.clear_live_update_banner();
        self.spawn_switch(self.feed, tx);
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// A keystroke landed in the search input; restart the quiet window.
    pub fn search_keystroke(&mut self) {
        self.search_debounce.poke();
        self.needs_redraw = true;
    }

    /// Run the debounced query now. Empty query restores the feed with a
    /// full reload, mirroring the upstream behavior.
    pub fn execute_search(&mut self, tx: &mpsc::Sender<AppEvent>) {
        let query = self.search_input.trim().to_string();
        if query.is_empty() {
            self.spawn_switch(self.feed, tx);
            return;
        }

        // A newer query supersedes any search still in flight.
        if let Some(handle) = self.search_handle.take() {
            handle.abort();
            tracing::debug!("Aborted previous search task");
        }
        self.search_generation = self.search_generation.wrapping_add(1);
        let generation = self.search_generation;
        self.set_status("Searching...");

        let source = self.search_source.clone();
        let tx = tx.clone();
        let query_for_task = query.clone();
        tracing::debug!(query = %query, generation, "Spawning search task");

        self.search_handle = Some(tokio::spawn(async move {
            let results = source
                .search(&query_for_task)
                .await
                .map_err(|e| e.to_string());
            let event = AppEvent::SearchCompleted {
                query: query_for_task,
                generation,
                results,
            };
            if tx.send(event).await.is_err() {
                tracing::warn!("Failed to send search results (receiver dropped)");
            }
        }));
    }

    /// Leave search mode without reloading; the feed underneath was never
    /// touched, so dropping the override restores it instantly.
    pub fn exit_search(&mut self) {
        self.search_mode = false;
        self.search_input.clear();
        self.search_debounce.cancel();
        if let Some(handle) = self.search_handle.take() {
            handle.abort();
        }
        self.view.clear_search();
        self.needs_redraw = true;
    }
}
