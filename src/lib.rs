//! kindling — a terminal Hacker News reader.
//!
//! The interesting machinery is the feed engine in [`feed`]: a scan
//! cursor over the upstream id lists that materializes type-filtered,
//! time-sorted batches, a memoizing item cache that de-duplicates
//! concurrent fetches, lazily-expanded reply trees, throttled load
//! triggers, and a live-update monitor. The [`ui`] module is a thin
//! ratatui front-end over the [`render::Renderer`] surface the engine
//! drives.

pub mod api;
pub mod app;
pub mod config;
pub mod feed;
pub mod render;
pub mod ui;
pub mod util;
