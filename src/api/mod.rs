//! Upstream transport for the Hacker News Firebase API and Algolia search.
//!
//! The engine consumes two collaborator traits defined here:
//!
//! - [`ItemSource`] — the current ordered id list for a feed type, and
//!   single item records by id
//! - [`SearchSource`] — full-text search over the upstream archive
//!
//! Production wires up [`HnClient`] and [`AlgoliaClient`]; tests substitute
//! in-memory stubs.

mod client;
mod search;
mod types;

pub use client::{FetchError, HnClient, ItemSource, DEFAULT_API_BASE};
pub use search::{AlgoliaClient, SearchError, SearchSource, DEFAULT_SEARCH_BASE};
pub use types::{FeedType, Item, ItemId, ItemKind, SearchHit, HN_ITEM_BASE};
