//! The feed pagination and lazy-tree-materialization engine.
//!
//! This is the core of the application: the machinery that turns an
//! ordered list of opaque item ids into a continuously-growing,
//! type-filtered, time-sorted, render-ready sequence of posts, each able
//! to expand an unbounded reply tree on demand.
//!
//! # Architecture
//!
//! - [`ItemCache`] - memoizing item store with concurrent-fetch de-duplication
//! - [`FeedCursor`] - ordered id list, scan position, batch classification
//! - [`CommentTree`] - per-node lazy expansion of reply subtrees
//! - [`LoadTrigger`] - throttled funnel for load-more signals
//! - [`LiveUpdateMonitor`] - upstream id-list polling and new-post notification
//!
//! Every entry point is guarded against re-entrancy (phase flag, per-node
//! expand state) and against feed-switch races (generation tags); see the
//! individual types.

mod cache;
mod cursor;
mod live;
mod tree;
mod trigger;

pub use cache::ItemCache;
pub use cursor::{Advance, FeedCursor, FeedPhase};
pub use live::LiveUpdateMonitor;
pub use tree::{CommentTree, ExpandState, TreeOp};
pub use trigger::{Debounce, LoadTrigger, Throttle};
