//! The rendering surface the engine drives.
//!
//! The core never builds widgets; it narrates what entered the rendered
//! sequence through this trait. The TUI's `FeedView` is the production
//! implementation; tests record the calls.

use std::sync::Arc;

use crate::api::{Item, ItemId};

pub trait Renderer: Send + Sync {
    /// A feed item entered the rendered sequence, in batch-sorted order.
    ///
    /// `poll_options` is empty for everything but polls, whose options are
    /// materialized up front and displayed with their scores.
    fn render_item(&self, item: &Arc<Item>, poll_options: &[Arc<Item>]);

    /// The id list is exhausted. Fires once per exhaustion event.
    fn render_no_more_results(&self);

    /// A full-list scan produced nothing to show ("No polls available.").
    /// Fires at most once per feed session.
    fn render_empty_feed(&self);

    /// `children` were expanded under `parent`, sorted newest first.
    fn render_comment_children(&self, parent: ItemId, children: &[Arc<Item>]);

    /// `parent` was collapsed; its rendered subtree leaves the view.
    fn clear_children(&self, parent: ItemId);

    /// The rendered sequence was reset by a feed-type switch.
    fn clear_feed(&self);

    fn render_error_banner(&self, message: &str);

    fn clear_error_banner(&self);

    /// `count` new ids appeared upstream. Replaces any prior notification;
    /// accepting it is the UI's job (reload + [`Self::clear_live_update_banner`]).
    fn render_live_update_banner(&self, count: usize);

    fn clear_live_update_banner(&self);
}
