use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::api::{ItemId, ItemSource};
use crate::feed::cursor::FeedCursor;
use crate::render::Renderer;

/// Watches the upstream id list for the active feed type and announces how
/// many unseen ids have appeared.
///
/// Read-only by design: it diffs by membership against the cursor's id
/// snapshot, never fetches item bodies, and never mutates feed state.
/// Accepting the notification is the UI's job (a full reload of the
/// current feed type). Poll failures are silent.
pub struct LiveUpdateMonitor {
    source: Arc<dyn ItemSource>,
    cursor: Arc<FeedCursor>,
    renderer: Arc<dyn Renderer>,
    interval: Duration,
}

impl LiveUpdateMonitor {
    pub fn new(
        source: Arc<dyn ItemSource>,
        cursor: Arc<FeedCursor>,
        renderer: Arc<dyn Renderer>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            cursor,
            renderer,
            interval,
        }
    }

    /// Start the polling loop. The caller holds the handle and aborts it
    /// on shutdown.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick completes immediately; swallow it so the
            // first check happens one full interval after startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.check().await;
            }
        })
    }

    /// One polling pass. Returns the count of unseen ids when a
    /// notification was raised.
    pub async fn check(&self) -> Option<usize> {
        let (feed, known) = self.cursor.feed_snapshot();
        let latest = match self.source.list_ids(feed).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::debug!(feed = %feed, error = %e, "Live update poll failed");
                return None;
            }
        };

        let known: HashSet<ItemId> = known.into_iter().collect();
        let fresh = latest.iter().filter(|id| !known.contains(id)).count();
        if fresh == 0 {
            return None;
        }

        tracing::debug!(feed = %feed, fresh, "New posts upstream");
        self.renderer.render_live_update_banner(fresh);
        Some(fresh)
    }
}
