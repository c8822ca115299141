use std::sync::{Arc, Mutex};

use crate::api::{FeedType, Item, ItemId, ItemKind, ItemSource};
use crate::feed::cache::ItemCache;
use crate::render::Renderer;

/// Where the cursor sits in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    Loading,
    Exhausted,
}

/// What a call to [`FeedCursor::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Rendered this many items and moved the cursor.
    Loaded(usize),
    /// Another advance was already in flight; this call was dropped.
    Busy,
    /// The id list is exhausted; nothing new to render.
    Exhausted,
    /// A feed switch overtook this call; its results were discarded.
    Stale,
}

struct FeedState {
    feed: FeedType,
    ids: Vec<ItemId>,
    /// Index into `ids`; non-decreasing within one generation, always in
    /// `[0, ids.len()]`.
    cursor: usize,
    /// Items fed to the renderer this generation, append-only.
    rendered: Vec<Arc<Item>>,
    phase: FeedPhase,
    /// Bumped by every feed switch; batches issued under an older value
    /// discard their results instead of committing.
    generation: u64,
}

/// A post ready to hand to the renderer: the item plus, for polls, its
/// materialized options.
type Post = (Arc<Item>, Vec<Arc<Item>>);

/// Owns the ordered id list for the active feed type and a scan position
/// that advances in fixed strides, classifying fetched records into the
/// visible sequence.
pub struct FeedCursor {
    source: Arc<dyn ItemSource>,
    cache: Arc<ItemCache>,
    renderer: Arc<dyn Renderer>,
    batch_size: usize,
    state: Mutex<FeedState>,
}

impl FeedCursor {
    pub fn new(
        source: Arc<dyn ItemSource>,
        cache: Arc<ItemCache>,
        renderer: Arc<dyn Renderer>,
        initial: FeedType,
        batch_size: usize,
    ) -> Self {
        Self {
            source,
            cache,
            renderer,
            batch_size: batch_size.max(1),
            state: Mutex::new(FeedState {
                feed: initial,
                ids: Vec::new(),
                cursor: 0,
                rendered: Vec::new(),
                phase: FeedPhase::Idle,
                generation: 0,
            }),
        }
    }

    /// Reset to a (possibly new) feed type: bump the generation, clear all
    /// session state, re-fetch the id list, and perform one advance.
    ///
    /// A list-fetch failure surfaces the error banner and yields an empty
    /// feed rather than an error.
    pub async fn switch_type(&self, feed: FeedType) -> Advance {
        let generation = {
            let mut state = self.state.lock().expect("feed state lock poisoned");
            state.generation += 1;
            state.feed = feed;
            state.ids.clear();
            state.cursor = 0;
            state.rendered.clear();
            state.phase = FeedPhase::Idle;
            self.renderer.clear_feed();
            self.renderer.clear_error_banner();
            state.generation
        };
        tracing::debug!(feed = %feed, generation, "Switching feed type");

        let ids = match self.source.list_ids(feed).await {
            Ok(ids) => Some(ids),
            Err(e) => {
                tracing::warn!(feed = %feed, error = %e, "Id list fetch failed");
                None
            }
        };

        {
            let mut state = self.state.lock().expect("feed state lock poisoned");
            if state.generation != generation {
                return Advance::Stale;
            }
            match ids {
                Some(ids) => state.ids = ids,
                // Banner raised under the generation check so a stale
                // switch cannot paint over a newer feed.
                None => self.renderer.render_error_banner("Unable to load posts."),
            }
        }

        self.advance().await
    }

    /// Consume the next stride of the id list and render what passes the
    /// feed's kind filter, newest first.
    ///
    /// No-op while a previous advance is loading. Once the cursor reaches
    /// the end of the list the call flips to `Exhausted`, signaling "no
    /// more results" exactly once per exhaustion event.
    pub async fn advance(&self) -> Advance {
        let (feed, generation, batch, remaining) = {
            let mut state = self.state.lock().expect("feed state lock poisoned");
            match state.phase {
                FeedPhase::Loading => return Advance::Busy,
                FeedPhase::Exhausted => return Advance::Exhausted,
                FeedPhase::Idle => {}
            }
            if state.cursor >= state.ids.len() {
                state.phase = FeedPhase::Exhausted;
                self.renderer.render_no_more_results();
                return Advance::Exhausted;
            }
            state.phase = FeedPhase::Loading;
            let end = (state.cursor + self.batch_size).min(state.ids.len());
            let batch = state.ids[state.cursor..end].to_vec();
            // Polls scan past a single stride, so they take the whole tail.
            let remaining = match state.feed {
                FeedType::Polls => state.ids[state.cursor..].to_vec(),
                _ => Vec::new(),
            };
            (state.feed, state.generation, batch, remaining)
        };

        match feed {
            FeedType::Stories | FeedType::Jobs => self.advance_batch(feed, generation, batch).await,
            FeedType::Polls => self.advance_polls(generation, remaining).await,
        }
    }

    /// Single-stride advance for stories and jobs.
    async fn advance_batch(&self, feed: FeedType, generation: u64, batch: Vec<ItemId>) -> Advance {
        let page = self.fetch_page(&batch, feed.kind_filter()).await;
        let posts = self.materialize(page).await;

        let mut state = self.state.lock().expect("feed state lock poisoned");
        if state.generation != generation {
            tracing::debug!(feed = %feed, generation, "Discarding stale batch");
            return Advance::Stale;
        }
        state.cursor += batch.len();
        let shown = self.commit(&mut state, &posts);
        state.phase = FeedPhase::Idle;
        tracing::debug!(
            feed = %feed,
            cursor = state.cursor,
            fetched = batch.len(),
            shown,
            "Advanced feed"
        );
        Advance::Loaded(shown)
    }

    /// Poll advance: polls are sparse in the story stream, so keep
    /// consuming strides until at least one poll renders or the list runs
    /// out. Bounded by the remaining list length.
    async fn advance_polls(&self, generation: u64, remaining: Vec<ItemId>) -> Advance {
        let mut consumed = 0;
        let mut posts: Vec<Post> = Vec::new();

        while consumed < remaining.len() && posts.is_empty() {
            // A switch mid-scan makes the rest of the list pointless.
            if self.generation() != generation {
                return Advance::Stale;
            }
            let end = (consumed + self.batch_size).min(remaining.len());
            let stride = &remaining[consumed..end];
            let page = self.fetch_page(stride, ItemKind::Poll).await;
            posts = self.materialize(page).await;
            consumed = end;
        }

        let mut state = self.state.lock().expect("feed state lock poisoned");
        if state.generation != generation {
            tracing::debug!(generation, "Discarding stale poll scan");
            return Advance::Stale;
        }
        let first_advance = state.rendered.is_empty();
        state.cursor += consumed;
        let shown = self.commit(&mut state, &posts);
        if shown == 0 {
            // The scan ran the whole list dry; this generation is done.
            state.phase = FeedPhase::Exhausted;
            if first_advance {
                self.renderer.render_empty_feed();
            } else {
                self.renderer.render_no_more_results();
            }
            tracing::debug!(cursor = state.cursor, first_advance, "Poll scan found nothing");
            return Advance::Exhausted;
        }
        state.phase = FeedPhase::Idle;
        tracing::debug!(cursor = state.cursor, consumed, shown, "Advanced polls");
        Advance::Loaded(shown)
    }

    /// Fetch a stride through the cache and keep the records whose kind
    /// matches, newest first. Missing items and fetch failures drop out
    /// silently; the batch never aborts.
    async fn fetch_page(&self, ids: &[ItemId], want: ItemKind) -> Vec<Arc<Item>> {
        let mut page: Vec<Arc<Item>> = self
            .cache
            .get_many(ids)
            .await
            .into_iter()
            .flatten()
            .filter(|item| item.kind == Some(want))
            .collect();
        // Stable: equal timestamps keep their stride order.
        page.sort_by(|a, b| b.time.cmp(&a.time));
        page
    }

    /// Attach poll options to each page entry. Options render with the
    /// poll itself rather than lazily.
    async fn materialize(&self, page: Vec<Arc<Item>>) -> Vec<Post> {
        let mut posts = Vec::with_capacity(page.len());
        for item in page {
            let options = match (&item.kind, &item.parts) {
                (Some(ItemKind::Poll), Some(parts)) => self
                    .cache
                    .get_many(parts)
                    .await
                    .into_iter()
                    .flatten()
                    .collect(),
                _ => Vec::new(),
            };
            posts.push((item, options));
        }
        posts
    }

    /// Append a page to the rendered sequence and feed it to the renderer,
    /// in order, under the state lock so a concurrent switch cannot
    /// interleave a clear with these renders.
    fn commit(&self, state: &mut FeedState, posts: &[Post]) -> usize {
        for (item, options) in posts {
            state.rendered.push(item.clone());
            self.renderer.render_item(item, options);
        }
        posts.len()
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// The active feed type and its full id list, taken atomically. The
    /// live-update monitor diffs against this by membership only.
    pub fn feed_snapshot(&self) -> (FeedType, Vec<ItemId>) {
        let state = self.state.lock().expect("feed state lock poisoned");
        (state.feed, state.ids.clone())
    }

    pub fn current_feed(&self) -> FeedType {
        self.state.lock().expect("feed state lock poisoned").feed
    }

    pub fn phase(&self) -> FeedPhase {
        self.state.lock().expect("feed state lock poisoned").phase
    }

    /// Scan position, for tests and diagnostics.
    pub fn position(&self) -> usize {
        self.state.lock().expect("feed state lock poisoned").cursor
    }

    pub fn rendered_len(&self) -> usize {
        self.state
            .lock()
            .expect("feed state lock poisoned")
            .rendered
            .len()
    }

    fn generation(&self) -> u64 {
        self.state
            .lock()
            .expect("feed state lock poisoned")
            .generation
    }
}
