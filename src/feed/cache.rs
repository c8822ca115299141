use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

use crate::api::{Item, ItemId, ItemSource};
use crate::render::Renderer;

/// What a settled cache slot holds.
///
/// `item == None` with `failed == false` means the upstream genuinely has
/// no such item; that outcome is retained so the id is not re-fetched this
/// session. A failed fetch is not retained at all.
#[derive(Clone)]
struct Fetched {
    item: Option<Arc<Item>>,
    failed: bool,
}

type Slot = Arc<OnceCell<Fetched>>;

/// Memoizing id → item store shared by the cursor and the comment tree.
///
/// Overlapping requests for the same uncached id share one slot, so
/// exactly one upstream fetch is issued and every caller observes its
/// result. Entries are never evicted; the cache lives for the session.
pub struct ItemCache {
    source: Arc<dyn ItemSource>,
    renderer: Arc<dyn Renderer>,
    slots: Mutex<HashMap<ItemId, Slot>>,
}

impl ItemCache {
    pub fn new(source: Arc<dyn ItemSource>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            source,
            renderer,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch one item through the cache.
    ///
    /// Returns `None` for missing items and for failed fetches; failures
    /// additionally raise the error banner and leave the id retryable.
    pub async fn get(&self, id: ItemId) -> Option<Arc<Item>> {
        let slot = {
            let mut slots = self.slots.lock().expect("cache lock poisoned");
            slots.entry(id).or_default().clone()
        };

        let fetched = slot
            .get_or_init(|| async {
                match self.source.item(id).await {
                    Ok(item) => Fetched {
                        item: item.map(Arc::new),
                        failed: false,
                    },
                    Err(e) => {
                        tracing::warn!(id, error = %e, "Item fetch failed");
                        self.renderer.render_error_banner("Unable to load item.");
                        Fetched {
                            item: None,
                            failed: true,
                        }
                    }
                }
            })
            .await
            .clone();

        if fetched.failed {
            // Drop the slot so a later call can retry. The pointer check
            // keeps a concurrent retry's fresh slot intact.
            let mut slots = self.slots.lock().expect("cache lock poisoned");
            if let Some(current) = slots.get(&id) {
                if Arc::ptr_eq(current, &slot) {
                    slots.remove(&id);
                }
            }
        }

        fetched.item
    }

    /// Fetch many items concurrently; results come back in request order.
    pub async fn get_many(&self, ids: &[ItemId]) -> Vec<Option<Arc<Item>>> {
        futures::future::join_all(ids.iter().map(|&id| self.get(id))).await
    }

    /// Number of settled or in-flight entries, for diagnostics.
    pub fn len(&self) -> usize {
        self.slots.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
